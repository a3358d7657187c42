//! Error taxonomy for index construction and ranking.

/// Faults raised while building or querying a [`SearchEngine`](crate::SearchEngine).
///
/// An empty ranking is not an error; these variants only cover broken input
/// or broken internal invariants.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// TF-IDF is undefined over zero documents.
    #[error("cannot build an index over an empty page collection")]
    EmptyCorpus,

    /// IDF was requested for a token that no indexed page contains.
    #[error("token `{0}` does not occur in any indexed page")]
    InvalidToken(String),

    /// The link graph broke an invariant, e.g. a crawled url has no page rank entry.
    #[error("inconsistent link graph: {0}")]
    GraphConsistency(String),

    /// PageRank construction hit an internal fault.
    #[error("page rank could not be initialized")]
    Initialization(#[source] Box<SearchError>),

    /// Combined scoring needs a page rank table.
    #[error("combined ranking requested without a page rank table")]
    PageRankUnavailable,
}

pub type Result<T> = std::result::Result<T, SearchError>;
