use crate::TermId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Bijective term <-> id table. Ids are dense over `0..len()` and follow the
/// lexicographic order of the terms, so the same corpus always yields the same ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    ids: HashMap<String, TermId>,
}

impl Vocabulary {
    pub fn build<S: AsRef<str>>(documents: &[Vec<S>]) -> Self {
        let distinct: BTreeSet<&str> = documents
            .iter()
            .flat_map(|tokens| tokens.iter().map(|t| t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        let terms: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        let ids = terms
            .iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id as TermId))
            .collect();
        Self { terms, ids }
    }

    pub fn id(&self, term: &str) -> Option<TermId> { self.ids.get(term).copied() }

    pub fn term(&self, id: TermId) -> Option<&str> { self.terms.get(id as usize).map(String::as_str) }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    /// Terms in id order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.terms.iter().map(String::as_str) }

    /// Maps a document's tokens to its term vector. Tokens outside the vocabulary are skipped.
    pub fn term_vector<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TermId> {
        tokens.iter().filter_map(|t| self.id(t.as_ref())).collect()
    }
}
