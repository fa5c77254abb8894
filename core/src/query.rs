use crate::error::CoreError;
use crate::index::CorpusIndex;
use crate::tokenizer::tokenize;
use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// How query terms missing from the vocabulary are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermPolicy {
    /// Unknown terms are dropped.
    #[default]
    Strict,
    /// Unknown terms get query-local ids starting at the vocabulary size. They
    /// carry IDF 0 and never match a document.
    Extend,
}

impl FromStr for TermPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "extend" => Ok(Self::Extend),
            other => Err(CoreError::UnknownPolicy(other.to_string())),
        }
    }
}

/// A normalized query: term ids, per-term counts and the sparse TF-IDF vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    term_ids: Vec<TermId>,
    counts: BTreeMap<TermId, u32>,
    vector: BTreeMap<TermId, f32>,
    extension: HashMap<String, TermId>,
}

impl ProcessedQuery {
    /// Tokenizes `text` and maps it onto the index vocabulary. Returns `None`
    /// when no term survives normalization and the policy.
    pub fn new(index: &CorpusIndex, text: &str, policy: TermPolicy) -> Option<Self> {
        let vocabulary = index.vocabulary();
        let mut extension: HashMap<String, TermId> = HashMap::new();
        let mut term_ids = Vec::new();
        for term in tokenize(text) {
            if let Some(tid) = vocabulary.id(&term) {
                term_ids.push(tid);
                continue;
            }
            if policy == TermPolicy::Extend {
                let next = (vocabulary.len() + extension.len()) as TermId;
                term_ids.push(*extension.entry(term).or_insert(next));
            }
        }
        if term_ids.is_empty() {
            return None;
        }

        let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
        for tid in &term_ids {
            *counts.entry(*tid).or_insert(0) += 1;
        }
        let len = term_ids.len() as f32;
        let vector = counts
            .iter()
            .map(|(tid, count)| (*tid, (*count as f32 / len) * index.idf(*tid)))
            .collect();

        Some(Self { term_ids, counts, vector, extension })
    }

    /// Term ids in query order, duplicates kept.
    pub fn term_ids(&self) -> &[TermId] { &self.term_ids }

    /// Distinct term ids, ascending.
    pub fn distinct_terms(&self) -> impl Iterator<Item = TermId> + '_ { self.counts.keys().copied() }

    pub fn count(&self, term_id: TermId) -> u32 { self.counts.get(&term_id).copied().unwrap_or(0) }

    pub fn weight(&self, term_id: TermId) -> f32 { self.vector.get(&term_id).copied().unwrap_or(0.0) }

    /// Query-local ids minted for unknown terms under [`TermPolicy::Extend`].
    pub fn extension(&self) -> &HashMap<String, TermId> { &self.extension }
}
