//! Indexing and ranking over a crawled link graph: TF-IDF, cosine similarity
//! and undamped PageRank.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod page;
pub mod pagerank;
pub mod scorer;
pub mod snippet;
pub mod tokenizer;
pub mod vector;

pub use config::EngineConfig;
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use index::IndexBuilder;
pub use page::Page;
pub use pagerank::{PageRank, PageRankConfig};
pub use scorer::{Hit, QueryScorer, RankingPolicy};
pub use tokenizer::{Normalizer, TextNormalizer};
pub use vector::TokenVector;
