use crate::index::CorpusIndex;
use crate::{DocId, TermId};

/// Intersects the boolean posting lists of every term. Returns the matching
/// document ids ascending; empty when `terms` is empty or nothing matches.
pub fn match_all(index: &CorpusIndex, terms: &[TermId]) -> Vec<DocId> {
    let mut lists: Vec<&[DocId]> = terms.iter().map(|t| index.postings(*t)).collect();
    if lists.is_empty() {
        return Vec::new();
    }
    // Shortest list first bounds the work of every later step.
    lists.sort_by_key(|l| l.len());
    let mut result: Vec<DocId> = lists[0].to_vec();
    for list in &lists[1..] {
        if result.is_empty() {
            break;
        }
        result = intersect_sorted(&result, list);
    }
    result
}

fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
