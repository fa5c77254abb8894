//! Cosine ranking of candidate documents against a query vector.
//!
//! Document vectors are only populated on the query's dimensions: every other
//! coordinate of the query vector is zero, so the dot product cannot see them.

use crate::index::CorpusIndex;
use crate::query::ProcessedQuery;
use crate::topk::{ScoredResult, TopK};
use crate::{DocId, TermId};
use std::collections::BTreeSet;

/// `dot(a, b) / (|a| * |b|)`, defined as 0 when either norm is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Documents sharing at least one term with the query, ascending.
pub fn candidates(index: &CorpusIndex, query: &ProcessedQuery) -> Vec<DocId> {
    let set: BTreeSet<DocId> = query
        .distinct_terms()
        .flat_map(|t| index.weighted_postings(t).iter().map(|p| p.doc_id))
        .collect();
    set.into_iter().collect()
}

/// Cosine score of every candidate, in ascending doc id order.
pub fn score_candidates(index: &CorpusIndex, query: &ProcessedQuery) -> Vec<ScoredResult> {
    let dims: Vec<TermId> = query.distinct_terms().collect();
    let query_vector: Vec<f32> = dims.iter().map(|t| query.weight(*t)).collect();
    candidates(index, query)
        .into_iter()
        .map(|doc_id| {
            let doc_vector: Vec<f32> = dims.iter().map(|t| index.weight(doc_id, *t)).collect();
            ScoredResult::new(doc_id, cosine_similarity(&query_vector, &doc_vector))
        })
        .collect()
}

/// Top `k` candidates by cosine similarity, ties by doc id ascending. Empty
/// when no document shares a term with the query.
pub fn rank(index: &CorpusIndex, query: &ProcessedQuery, k: usize) -> Vec<ScoredResult> {
    select_top(score_candidates(index, query), k)
}

/// Best `k` of `scored`; `k` is clamped to the number of results.
pub fn select_top(scored: Vec<ScoredResult>, k: usize) -> Vec<ScoredResult> {
    let mut top = TopK::new(k.min(scored.len()));
    top.extend(scored);
    top.into_sorted_vec()
}
