use crate::tokenizer::tokenize;
use crate::vocab::Vocabulary;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type TermId = u32;
pub type DocId = u32;

/// One restaurant as delivered by the corpus loader. The document id is the row index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(alias = "restaurantName")]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Raw price token such as "€€".
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "facilitiesServices")]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub credit_cards: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32, // tf * idf
}

/// Frozen indexes over a corpus. Built once, then shared read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusIndex {
    vocabulary: Vocabulary,
    term_vectors: Vec<Vec<TermId>>,
    /// term id -> doc ids containing it, ascending
    boolean: Vec<Vec<DocId>>,
    /// term id -> (doc id, tf-idf) pairs, ascending by doc id
    weighted: Vec<Vec<Posting>>,
    idf: Vec<f32>,
    num_docs: u32,
}

impl CorpusIndex {
    /// Builds vocabulary, term vectors, boolean and weighted postings from document
    /// descriptions. Position in `descriptions` is the document id.
    pub fn build<S: AsRef<str> + Sync>(descriptions: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = descriptions.par_iter().map(|d| tokenize(d.as_ref())).collect();

        // Ids are fixed before any parallel mapping, so workers only read the table.
        let vocabulary = Vocabulary::build(tokenized.as_slice());
        let term_vectors: Vec<Vec<TermId>> = tokenized.par_iter().map(|tokens| vocabulary.term_vector(tokens.as_slice())).collect();
        let term_counts: Vec<BTreeMap<TermId, u32>> = term_vectors.par_iter().map(|tv| count_terms(tv)).collect();

        let num_terms = vocabulary.len();
        let num_docs = descriptions.len() as u32;

        let mut boolean: Vec<Vec<DocId>> = vec![Vec::new(); num_terms];
        for (doc_id, counts) in term_counts.iter().enumerate() {
            for tid in counts.keys() {
                boolean[*tid as usize].push(doc_id as DocId);
            }
        }

        let idf: Vec<f32> = boolean.iter().map(|docs| inverse_document_frequency(num_docs, docs.len())).collect();

        let mut weighted: Vec<Vec<Posting>> = boolean.iter().map(|docs| Vec::with_capacity(docs.len())).collect();
        for (doc_id, counts) in term_counts.iter().enumerate() {
            let len = term_vectors[doc_id].len() as f32;
            for (tid, count) in counts {
                let tf = *count as f32 / len;
                weighted[*tid as usize].push(Posting { doc_id: doc_id as DocId, weight: tf * idf[*tid as usize] });
            }
        }

        let empty_docs = term_vectors.iter().filter(|tv| tv.is_empty()).count();
        tracing::info!(num_docs, num_terms, empty_docs, "built corpus index");

        Self { vocabulary, term_vectors, boolean, weighted, idf, num_docs }
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.vocabulary.len() }

    pub fn term_vector(&self, doc_id: DocId) -> &[TermId] {
        self.term_vectors.get(doc_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Boolean posting list. Unknown ids (including query-local extensions) have none.
    pub fn postings(&self, term_id: TermId) -> &[DocId] {
        self.boolean.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn weighted_postings(&self, term_id: TermId) -> &[Posting] {
        self.weighted.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn doc_frequency(&self, term_id: TermId) -> usize { self.postings(term_id).len() }

    /// `ln(N / df)`; 0 for terms outside the vocabulary.
    pub fn idf(&self, term_id: TermId) -> f32 { self.idf.get(term_id as usize).copied().unwrap_or(0.0) }

    pub fn tf(&self, doc_id: DocId, term_id: TermId) -> f32 {
        let tv = self.term_vector(doc_id);
        if tv.is_empty() {
            return 0.0;
        }
        tv.iter().filter(|t| **t == term_id).count() as f32 / tv.len() as f32
    }

    /// TF-IDF weight of a term in a document, 0 when the document lacks the term.
    pub fn weight(&self, doc_id: DocId, term_id: TermId) -> f32 {
        let plist = self.weighted_postings(term_id);
        match plist.binary_search_by_key(&doc_id, |p| p.doc_id) {
            Ok(i) => plist[i].weight,
            Err(_) => 0.0,
        }
    }
}

fn count_terms(term_vector: &[TermId]) -> BTreeMap<TermId, u32> {
    let mut counts = BTreeMap::new();
    for tid in term_vector {
        *counts.entry(*tid).or_insert(0) += 1;
    }
    counts
}

fn inverse_document_frequency(num_docs: u32, doc_freq: usize) -> f32 {
    if doc_freq == 0 || num_docs == 0 {
        return 0.0;
    }
    ((num_docs as f32) / (doc_freq as f32)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_contributes_nothing() {
        let idx = CorpusIndex::build(&["grilled fish", "", "grilled meat"]);
        assert_eq!(idx.num_docs(), 3);
        assert!(idx.term_vector(1).is_empty());
        let grill = idx.vocabulary().id("grill").unwrap();
        assert_eq!(idx.postings(grill), &[0, 2]);
        assert_eq!(idx.tf(1, grill), 0.0);
    }

    #[test]
    fn out_of_range_lookups_are_empty() {
        let idx = CorpusIndex::build(&["fish"]);
        assert!(idx.postings(99).is_empty());
        assert!(idx.weighted_postings(99).is_empty());
        assert_eq!(idx.idf(99), 0.0);
        assert!(idx.term_vector(5).is_empty());
    }
}
