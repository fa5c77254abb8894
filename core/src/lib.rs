//! TF-IDF search over a fixed corpus of restaurant records.
//!
//! The index is built once ([`SearchEngine::build`]) and is read-only afterwards;
//! queries go through [`SearchEngine::search`] in boolean, ranked or boosted mode.

pub mod boolean;
pub mod boost;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod rank;
pub mod tokenizer;
pub mod topk;
pub mod vocab;

pub use boost::FilterRequest;
pub use engine::{Mode, QueryRequest, QueryStage, SearchEngine, SearchOutcome};
pub use error::CoreError;
pub use index::{CorpusIndex, DocId, DocumentRecord, Posting, TermId};
pub use query::{ProcessedQuery, TermPolicy};
pub use topk::{ScoredResult, TopK};
pub use vocab::Vocabulary;
