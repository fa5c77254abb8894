//! Attribute-based score boosting and filtering of ranked candidates.

use crate::error::CoreError;
use crate::index::DocumentRecord;
use crate::topk::{ScoredResult, TopK};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const BOOST_STEP: f32 = 0.2;
pub const MAX_PRICE_LEVEL: u8 = 4;

/// Structured filter collected by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub facilities: BTreeSet<String>,
    #[serde(default)]
    pub cuisines: BTreeSet<String>,
    /// Inclusive bounds, counted in "€" symbols.
    #[serde(default = "default_price_min")]
    pub price_min: u8,
    #[serde(default = "default_price_max")]
    pub price_max: u8,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub credit_cards: BTreeSet<String>,
    /// Discard candidates outside `region` or accepting none of `credit_cards`.
    #[serde(default)]
    pub strict: bool,
}

fn default_price_min() -> u8 { 1 }
fn default_price_max() -> u8 { MAX_PRICE_LEVEL }

impl Default for FilterRequest {
    fn default() -> Self {
        Self {
            facilities: BTreeSet::new(),
            cuisines: BTreeSet::new(),
            price_min: default_price_min(),
            price_max: default_price_max(),
            region: None,
            credit_cards: BTreeSet::new(),
            strict: false,
        }
    }
}

impl FilterRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.price_min < 1 || self.price_max > MAX_PRICE_LEVEL || self.price_min > self.price_max {
            return Err(CoreError::InvalidPriceBand { min: self.price_min, max: self.price_max });
        }
        Ok(())
    }

    /// Boost for one record on top of its base score, or `None` when the strict
    /// variant rejects it.
    pub fn adjustment(&self, record: &DocumentRecord) -> Option<f32> {
        if self.strict && !self.accepts(record) {
            return None;
        }
        let mut boost = 0.0;
        if let Some(level) = record.price_range.as_deref().map(price_level) {
            if (self.price_min as usize..=self.price_max as usize).contains(&level) {
                boost += BOOST_STEP;
            }
        }
        let cuisines = normalize_attributes(record.cuisine_type.as_slice());
        boost += BOOST_STEP * overlap(&cuisines, &normalize_requested(&self.cuisines)) as f32;
        let facilities = normalize_attributes(record.facilities.as_slice());
        boost += BOOST_STEP * overlap(&facilities, &normalize_requested(&self.facilities)) as f32;
        Some(boost)
    }

    fn accepts(&self, record: &DocumentRecord) -> bool {
        if let Some(region) = &self.region {
            if record.region.as_deref().map(str::trim) != Some(region.trim()) {
                return false;
            }
        }
        if !self.credit_cards.is_empty() {
            let accepted = normalize_attributes(record.credit_cards.as_slice());
            if overlap(&accepted, &normalize_requested(&self.credit_cards)) == 0 {
                return false;
            }
        }
        true
    }
}

/// Number of "€" symbols in a raw price token.
pub fn price_level(raw: &str) -> usize { raw.chars().filter(|c| *c == '€').count() }

/// Lowercases, strips bracket and quote punctuation, splits on commas.
/// Accepts both clean lists and list renderings such as `"['Terrace', 'Garden']"`.
pub fn normalize_attributes<S: AsRef<str>>(raw: &[S]) -> BTreeSet<String> {
    raw.iter()
        .flat_map(|value| {
            value
                .as_ref()
                .to_lowercase()
                .replace(['[', ']', '\'', '"'], "")
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn normalize_requested(requested: &BTreeSet<String>) -> BTreeSet<String> {
    let values: Vec<&String> = requested.iter().collect();
    normalize_attributes(values.as_slice())
}

fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize { a.intersection(b).count() }

/// Re-scores `candidates` and keeps the `k` best adjusted scores in one pass
/// over a bounded min-heap. `records` is indexed by doc id.
pub fn boost_and_select(
    candidates: &[ScoredResult],
    records: &[DocumentRecord],
    request: &FilterRequest,
    k: usize,
) -> Vec<ScoredResult> {
    let mut top = TopK::new(k);
    let mut rejected = 0usize;
    for candidate in candidates {
        let Some(record) = records.get(candidate.doc_id as usize) else {
            rejected += 1;
            continue;
        };
        match request.adjustment(record) {
            Some(boost) => {
                top.offer(ScoredResult::new(candidate.doc_id, candidate.score + boost));
            }
            None => rejected += 1,
        }
    }
    tracing::debug!(scanned = candidates.len(), rejected, kept = top.len(), "boost stage complete");
    top.into_sorted_vec()
}
