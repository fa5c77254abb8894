use resto_core::rank::{cosine_similarity, rank};
use resto_core::{
    CoreError, DocumentRecord, FilterRequest, Mode, ProcessedQuery, QueryRequest, SearchEngine, SearchOutcome,
    TermPolicy,
};
use std::collections::BTreeSet;

fn record(name: &str, description: &str) -> DocumentRecord {
    DocumentRecord { name: name.into(), description: description.into(), ..Default::default() }
}

fn set(items: &[&str]) -> BTreeSet<String> { items.iter().map(|s| s.to_string()).collect() }

fn tiny_engine() -> SearchEngine {
    SearchEngine::build(vec![
        record("Lanterna", "fresh seasonal fish"),
        record("Nuvola", "modern seasonal cuisine"),
        record("Bistrot", "classic french cuisine"),
    ])
}

fn guide_engine() -> SearchEngine {
    let mut a = record("Osteria del Mare", "seasonal fish and seafood by the harbour");
    a.price_range = Some("€€".into());
    a.cuisine_type = Some("Seafood, Mediterranean Cuisine".into());
    a.facilities = vec!["['Terrace', 'Air conditioning']".into()];
    a.credit_cards = vec!["['amex', 'mastercard']".into()];
    a.region = Some("Liguria".into());

    let mut b = record("Trattoria Alta", "seasonal fish with a view of the mountains");
    b.price_range = Some("€€€€".into());
    b.cuisine_type = Some("Modern Cuisine".into());
    b.facilities = vec!["Car park".into()];
    b.credit_cards = vec!["visa".into()];
    b.region = Some("Piedmont".into());

    let mut c = record("Pesce Crudo", "raw fish bar");
    c.price_range = Some("€".into());
    c.cuisine_type = Some("Seafood".into());
    c.facilities = vec!["Terrace".into(), "Wheelchair access".into()];
    c.credit_cards = vec!["mastercard".into(), "visa".into()];
    c.region = Some("Liguria".into());

    SearchEngine::build(vec![a, b, c])
}

fn ranked(outcome: SearchOutcome) -> Vec<(u32, f32)> {
    match outcome {
        SearchOutcome::Ranked { results, .. } => results.iter().map(|r| (r.doc_id, r.score)).collect(),
        other => panic!("expected ranked results, got {other:?}"),
    }
}

#[test]
fn ranked_example_puts_full_overlap_first() {
    let engine = tiny_engine();
    let outcome = engine.search(&QueryRequest::new("seasonal cuisine", Mode::Ranked, 3)).unwrap();
    let results = ranked(outcome);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, 1);
    assert!((results[0].1 - 1.0).abs() < 1e-5);
    // doc0 and doc2 each share one term with equal TF-IDF magnitude, so the tie falls to doc id.
    assert_eq!(results[1].0, 0);
    assert_eq!(results[2].0, 2);
    assert!((results[1].1 - results[2].1).abs() < 1e-6);
    assert!((results[1].1 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
}

#[test]
fn ranked_k_is_clamped_to_candidates() {
    let engine = tiny_engine();
    let results = ranked(engine.search(&QueryRequest::new("fish", Mode::Ranked, 10)).unwrap());
    assert_eq!(results.len(), 1);
    let results = ranked(engine.search(&QueryRequest::new("seasonal cuisine", Mode::Ranked, 1)).unwrap());
    assert_eq!(results, vec![(1, results[0].1)]);
}

#[test]
fn ranked_reports_candidate_count() {
    let engine = tiny_engine();
    match engine.search(&QueryRequest::new("seasonal cuisine", Mode::Ranked, 1)).unwrap() {
        SearchOutcome::Ranked { candidates, results } => {
            assert_eq!(candidates, 3);
            assert_eq!(results.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn scores_are_cosines_in_unit_range() {
    let engine = guide_engine();
    let query = ProcessedQuery::new(engine.index(), "seasonal fish harbour", TermPolicy::Strict).unwrap();
    for r in rank(engine.index(), &query, 10) {
        assert!((0.0..=1.0).contains(&r.score), "score {} out of range", r.score);
    }
    let v = [0.25f32, 0.5, 0.0];
    assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
}

#[test]
fn boolean_examples_intersect_postings() {
    let engine = tiny_engine();
    let outcome = engine.search(&QueryRequest::new("cuisine", Mode::Boolean, 5)).unwrap();
    assert_eq!(outcome, SearchOutcome::Matched { documents: vec![1, 2] });
    let outcome = engine.search(&QueryRequest::new("seasonal fish", Mode::Boolean, 5)).unwrap();
    assert_eq!(outcome, SearchOutcome::Matched { documents: vec![0] });
    let outcome = engine.search(&QueryRequest::new("french fish", Mode::Boolean, 5)).unwrap();
    assert_eq!(outcome, SearchOutcome::NoMatch);
}

#[test]
fn boolean_ignores_extend_policy() {
    let engine = tiny_engine();
    let request = QueryRequest::new("cuisine pizza", Mode::Boolean, 5).with_policy(TermPolicy::Extend);
    assert_eq!(engine.search(&request).unwrap(), SearchOutcome::Matched { documents: vec![1, 2] });
}

#[test]
fn unknown_or_stopword_queries_have_no_recognized_terms() {
    let engine = tiny_engine();
    for mode in [Mode::Boolean, Mode::Ranked] {
        assert_eq!(engine.search(&QueryRequest::new("pizza", mode, 5)).unwrap(), SearchOutcome::NoRecognizedTerms);
        assert_eq!(engine.search(&QueryRequest::new("the and", mode, 5)).unwrap(), SearchOutcome::NoRecognizedTerms);
    }
}

#[test]
fn indexed_terms_are_reachable_by_query() {
    let engine = SearchEngine::build(vec![
        record("Cantina", "owning a vineyard, we agreed on our own wines"),
        record("Lanterna", "fresh seasonal fish"),
    ]);
    for term in engine.index().vocabulary().terms() {
        let outcome = engine.search(&QueryRequest::new(term, Mode::Boolean, 5)).unwrap();
        assert!(outcome.is_match(), "term {term:?} is indexed but unreachable");
    }
    assert_eq!(engine.index().vocabulary().id("own"), None);
}

#[test]
fn extended_terms_never_match() {
    let engine = tiny_engine();
    let request = QueryRequest::new("pizza", Mode::Ranked, 5).with_policy(TermPolicy::Extend);
    assert_eq!(engine.search(&request).unwrap(), SearchOutcome::NoMatch);

    let strict = ranked(engine.search(&QueryRequest::new("classic", Mode::Ranked, 5)).unwrap());
    let extended =
        ranked(engine.search(&QueryRequest::new("classic pizza", Mode::Ranked, 5).with_policy(TermPolicy::Extend)).unwrap());
    assert_eq!(strict.iter().map(|r| r.0).collect::<Vec<_>>(), extended.iter().map(|r| r.0).collect::<Vec<_>>());
    assert_eq!(engine.index().vocabulary().id("pizza"), None);
}

#[test]
fn invalid_requests_are_errors() {
    let engine = tiny_engine();
    assert_eq!(engine.search(&QueryRequest::new("fish", Mode::Ranked, 0)), Err(CoreError::ZeroResultCount));
    assert_eq!(engine.search(&QueryRequest::new("fish", Mode::Boosted, 3)), Err(CoreError::MissingFilter));
    let bad = FilterRequest { price_min: 4, price_max: 1, ..Default::default() };
    assert_eq!(
        engine.search(&QueryRequest::new("fish", Mode::Boosted, 3).with_filter(bad)),
        Err(CoreError::InvalidPriceBand { min: 4, max: 1 })
    );
    assert!("fuzzy".parse::<Mode>().is_err());
    assert_eq!("Boosted".parse::<Mode>().unwrap(), Mode::Boosted);
}

#[test]
fn boosts_are_additive() {
    let engine = guide_engine();
    let base = ranked(engine.search(&QueryRequest::new("fish", Mode::Ranked, 3)).unwrap());
    let base_score = |doc: u32| base.iter().find(|r| r.0 == doc).map(|r| r.1).unwrap();

    let filter = FilterRequest {
        facilities: set(&["Terrace", "wheelchair access"]),
        cuisines: set(&["seafood"]),
        price_min: 1,
        price_max: 2,
        ..Default::default()
    };
    let boosted = ranked(engine.search(&QueryRequest::new("fish", Mode::Boosted, 3).with_filter(filter)).unwrap());
    let score = |doc: u32| boosted.iter().find(|r| r.0 == doc).map(|r| r.1).unwrap();

    // doc0: price 2 in band, seafood, terrace
    assert!((score(0) - base_score(0) - 0.6).abs() < 1e-5);
    // doc1: price 4 out of band, no overlap
    assert!((score(1) - base_score(1)).abs() < 1e-5);
    // doc2: price 1 in band, seafood, terrace, wheelchair access
    assert!((score(2) - base_score(2) - 0.8).abs() < 1e-5);
    assert_eq!(boosted[0].0, 2);
    assert!(boosted.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn boosted_keeps_only_k_best() {
    let engine = guide_engine();
    let filter = FilterRequest { cuisines: set(&["modern cuisine"]), ..Default::default() };
    let boosted = ranked(engine.search(&QueryRequest::new("fish", Mode::Boosted, 1).with_filter(filter)).unwrap());
    assert_eq!(boosted.len(), 1);
    assert_eq!(boosted[0].0, 1);
}

#[test]
fn strict_filter_checks_region_and_requested_cards() {
    let engine = guide_engine();
    let filter = FilterRequest {
        region: Some("Liguria".into()),
        credit_cards: set(&["visa"]),
        strict: true,
        ..Default::default()
    };
    let request = QueryRequest::new("fish", Mode::Boosted, 5).with_filter(filter);
    let ids = engine.search(&request).unwrap().doc_ids();
    // doc0 is in Liguria but takes no visa; doc1 takes visa but is in Piedmont.
    assert_eq!(ids, vec![2]);

    let filter = FilterRequest { region: Some("Sicily".into()), strict: true, ..Default::default() };
    let request = QueryRequest::new("fish", Mode::Boosted, 5).with_filter(filter);
    assert_eq!(engine.search(&request).unwrap(), SearchOutcome::NoMatch);
}

#[test]
fn non_strict_filter_ignores_region_and_cards() {
    let engine = guide_engine();
    let filter = FilterRequest { region: Some("Sicily".into()), credit_cards: set(&["diners"]), ..Default::default() };
    let request = QueryRequest::new("fish", Mode::Boosted, 5).with_filter(filter);
    assert_eq!(engine.search(&request).unwrap().doc_ids().len(), 3);
}

#[test]
fn concurrent_queries_share_one_engine() {
    let engine = std::sync::Arc::new(guide_engine());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.search(&QueryRequest::new("seasonal fish", Mode::Ranked, 3)).unwrap())
        })
        .collect();
    let outcomes: Vec<SearchOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(outcomes.windows(2).all(|w| w[0] == w[1]));
}
