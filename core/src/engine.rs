//! Single query pipeline over a frozen corpus index, selected by [`Mode`].

use crate::boolean::match_all;
use crate::boost::{boost_and_select, FilterRequest};
use crate::error::CoreError;
use crate::index::{CorpusIndex, DocumentRecord};
use crate::query::{ProcessedQuery, TermPolicy};
use crate::rank::{score_candidates, select_top};
use crate::topk::ScoredResult;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Conjunctive match on every query term, unscored.
    Boolean,
    /// Cosine similarity over TF-IDF vectors.
    #[default]
    Ranked,
    /// Ranked, then re-scored and filtered by a [`FilterRequest`].
    Boosted,
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" => Ok(Self::Boolean),
            "ranked" => Ok(Self::Ranked),
            "boosted" => Ok(Self::Boosted),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Ranked => "ranked",
            Self::Boosted => "boosted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub text: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub policy: TermPolicy,
    #[serde(default)]
    pub filter: Option<FilterRequest>,
}

fn default_k() -> usize { 10 }

impl QueryRequest {
    pub fn new(text: impl Into<String>, mode: Mode, k: usize) -> Self {
        Self { text: text.into(), mode, k, policy: TermPolicy::Strict, filter: None }
    }

    pub fn with_policy(mut self, policy: TermPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_filter(mut self, filter: FilterRequest) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.k == 0 {
            return Err(CoreError::ZeroResultCount);
        }
        match (&self.mode, &self.filter) {
            (Mode::Boosted, None) => Err(CoreError::MissingFilter),
            (_, Some(filter)) => filter.validate(),
            _ => Ok(()),
        }
    }
}

/// Per-query pipeline states. `Unmatched` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Received,
    Tokenized,
    Unmatched,
    Matched,
    Ranked,
    Boosted,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Nothing left of the query after normalization and the term policy.
    NoRecognizedTerms,
    /// Recognized terms, but no document survived matching or filtering.
    NoMatch,
    /// Boolean mode: every matching document, ascending.
    Matched { documents: Vec<DocId> },
    /// Ranked and boosted modes: best `k` results, best first.
    Ranked { candidates: usize, results: Vec<ScoredResult> },
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool { matches!(self, Self::Matched { .. } | Self::Ranked { .. }) }

    /// Document ids in result order.
    pub fn doc_ids(&self) -> Vec<DocId> {
        match self {
            Self::Matched { documents } => documents.clone(),
            Self::Ranked { results, .. } => results.iter().map(|r| r.doc_id).collect(),
            _ => Vec::new(),
        }
    }
}

/// Records plus their frozen index. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchEngine {
    records: Vec<DocumentRecord>,
    index: CorpusIndex,
}

impl SearchEngine {
    pub fn build(records: Vec<DocumentRecord>) -> Self {
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        let index = CorpusIndex::build(descriptions.as_slice());
        Self { records, index }
    }

    pub fn index(&self) -> &CorpusIndex { &self.index }

    pub fn records(&self) -> &[DocumentRecord] { &self.records }

    pub fn record(&self, doc_id: DocId) -> Option<&DocumentRecord> { self.records.get(doc_id as usize) }

    pub fn search(&self, request: &QueryRequest) -> Result<SearchOutcome, CoreError> {
        request.validate()?;
        trace_stage(QueryStage::Received, request);

        // Boolean retrieval never sees transient ids.
        let policy = match request.mode {
            Mode::Boolean => TermPolicy::Strict,
            _ => request.policy,
        };
        let Some(query) = ProcessedQuery::new(&self.index, &request.text, policy) else {
            trace_stage(QueryStage::Unmatched, request);
            return Ok(SearchOutcome::NoRecognizedTerms);
        };
        tracing::debug!(stage = ?QueryStage::Tokenized, terms = query.term_ids().len(), extended = query.extension().len());

        let outcome = match request.mode {
            Mode::Boolean => {
                let documents = match_all(&self.index, query.term_ids());
                if documents.is_empty() {
                    SearchOutcome::NoMatch
                } else {
                    trace_stage(QueryStage::Matched, request);
                    SearchOutcome::Matched { documents }
                }
            }
            Mode::Ranked => {
                let scored = score_candidates(&self.index, &query);
                let candidates = scored.len();
                let results = select_top(scored, request.k);
                if results.is_empty() {
                    SearchOutcome::NoMatch
                } else {
                    trace_stage(QueryStage::Ranked, request);
                    SearchOutcome::Ranked { candidates, results }
                }
            }
            Mode::Boosted => {
                let scored = score_candidates(&self.index, &query);
                trace_stage(QueryStage::Ranked, request);
                let filter = request.filter.as_ref().ok_or(CoreError::MissingFilter)?;
                let results = boost_and_select(&scored, &self.records, filter, request.k);
                if results.is_empty() {
                    SearchOutcome::NoMatch
                } else {
                    trace_stage(QueryStage::Boosted, request);
                    SearchOutcome::Ranked { candidates: scored.len(), results }
                }
            }
        };

        let stage = if outcome.is_match() { QueryStage::Delivered } else { QueryStage::Unmatched };
        trace_stage(stage, request);
        Ok(outcome)
    }
}

fn trace_stage(stage: QueryStage, request: &QueryRequest) {
    tracing::debug!(?stage, mode = %request.mode, query = %request.text);
}
