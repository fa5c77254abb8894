use resto_core::tokenizer::{is_stopword, tokenize};

#[test]
fn it_normalizes_and_stems() {
    let words = tokenize("Running Runs RUN! The chef's menu.");
    assert_eq!(words.iter().filter(|w| *w == "run").count(), 3);
    assert!(words.contains(&"chef".to_string()));
    assert!(words.contains(&"menu".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.iter().all(|w| !is_stopword(w)));
}

#[test]
fn it_strips_non_alphanumeric() {
    // Non-ASCII letters are separators too.
    assert_eq!(tokenize("wine-bar/terrace"), tokenize("wine bar terrace"));
    assert_eq!(tokenize("café"), vec!["caf".to_string()]);
    assert_eq!(tokenize("  TERRACE\t\n"), tokenize("terrace"));
}

#[test]
fn it_keeps_digits() {
    let words = tokenize("Open since 1987");
    assert!(words.contains(&"1987".to_string()));
}

#[test]
fn it_is_idempotent_on_its_output() {
    let samples = [
        "Fresh seasonal fish, modern cuisine and running chefs",
        "owning a vineyard",
        "overs and wills",
        "We agreed on the generously portioned tasting menus",
        "Hospitality, generosity and happiness since 1966",
    ];
    for text in samples {
        let first = tokenize(text);
        let second = tokenize(&first.join(" "));
        assert_eq!(first, second, "re-tokenizing {text:?}");
    }
}

#[test]
fn it_drops_stems_that_are_stopwords() {
    let words = tokenize("owning a vineyard");
    assert!(!words.contains(&"own".to_string()));
    assert_eq!(words.len(), 1);
    assert!(tokenize("overs wills").is_empty());
}

#[test]
fn inflections_share_a_root() {
    assert_eq!(tokenize("seasonal"), tokenize("season"));
    assert_eq!(tokenize("cuisines"), tokenize("cuisine"));
}
