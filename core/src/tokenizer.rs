use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

// Snowball English settles within two or three passes.
const MAX_STEM_PASSES: usize = 4;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^A-Za-z0-9]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        // Apostrophes never survive normalization, so contractions appear split ("don", "t").
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn",
            "d","did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","ll","m","ma","me","mightn","more","most","mustn","my","myself",
            "needn","no","nor","not","now","o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","wouldn",
            "y","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into stemmed terms: non-alphanumeric ASCII becomes whitespace, then
/// lowercase, split, stopword removal and English stemming. Empty terms are dropped.
///
/// Every emitted term is a stemmer fixed point and not a stopword, so running
/// `tokenize` over its own output returns it unchanged.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = NON_ALNUM.replace_all(text, " ").to_lowercase();
    cleaned
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .map(stem)
        .filter(|term| !term.is_empty() && !is_stopword(term))
        .collect()
}

// "agreed" -> "agre" -> "agr": one pass is not always stable.
fn stem(token: &str) -> String {
    let mut term = STEMMER.stem(token).into_owned();
    for _ in 0..MAX_STEM_PASSES {
        let next = STEMMER.stem(&term).into_owned();
        if next == term {
            break;
        }
        term = next;
    }
    term
}
