//! Query scoring under the three ranking policies.

use crate::error::{Result, SearchError};
use crate::index::IndexBuilder;
use crate::pagerank::PageRank;
use crate::vector::TokenVector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Deserialization goes through [`FromStr`], so query strings and the CLI accept the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RankingPolicy {
    /// Sum of the query tokens' TF-IDF weights per page.
    #[default]
    TfIdf,
    /// Cosine similarity between the query and each page's TF-IDF vector.
    Cosine,
    /// Cosine similarity multiplied by page rank.
    Combined,
}

impl RankingPolicy {
    pub const ALL: [RankingPolicy; 3] = [RankingPolicy::TfIdf, RankingPolicy::Cosine, RankingPolicy::Combined];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingPolicy::TfIdf => "tfidf",
            RankingPolicy::Cosine => "cosine",
            RankingPolicy::Combined => "combined",
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" | "1" => Ok(RankingPolicy::TfIdf),
            "cosine" | "2" => Ok(RankingPolicy::Cosine),
            "combined" | "pagerank" | "3" => Ok(RankingPolicy::Combined),
            other => Err(format!("unknown ranking policy `{other}` (expected tfidf, cosine or combined)")),
        }
    }
}

impl TryFrom<String> for RankingPolicy {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> { s.parse() }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub url: String,
    pub score: f64,
}

/// One normalized TF-IDF vector per indexed url, built once and shared by all queries.
pub fn document_vectors(index: &IndexBuilder) -> BTreeMap<String, TokenVector> {
    index
        .forward_tfidf()
        .iter()
        .map(|(url, weights)| (url.clone(), TokenVector::new(weights.clone())))
        .collect()
}

/// Read-only view over the built structures. Cheap to construct per query.
pub struct QueryScorer<'a> {
    index: &'a IndexBuilder,
    vectors: &'a BTreeMap<String, TokenVector>,
    page_rank: Option<&'a PageRank>,
}

impl<'a> QueryScorer<'a> {
    pub fn new(index: &'a IndexBuilder, vectors: &'a BTreeMap<String, TokenVector>) -> Self {
        Self { index, vectors, page_rank: None }
    }

    pub fn with_page_rank(mut self, page_rank: &'a PageRank) -> Self {
        self.page_rank = Some(page_rank);
        self
    }

    pub fn score(&self, policy: RankingPolicy, tokens: &[String]) -> Result<Vec<Hit>> {
        match policy {
            RankingPolicy::TfIdf => Ok(self.tfidf(tokens)),
            RankingPolicy::Cosine => Ok(self.cosine(tokens)),
            RankingPolicy::Combined => self.combined(tokens),
        }
    }

    /// Accumulates reverse-index weights; tokens outside the vocabulary are skipped.
    pub fn tfidf(&self, tokens: &[String]) -> Vec<Hit> {
        let reverse = self.index.reverse_index();
        let mut scores: BTreeMap<&str, f64> = BTreeMap::new();
        for token in tokens {
            let Some(postings) = reverse.get(token) else { continue };
            for (url, weight) in postings {
                *scores.entry(url.as_str()).or_insert(0.0) += weight;
            }
        }
        rank_scores(scores)
    }

    pub fn cosine(&self, tokens: &[String]) -> Vec<Hit> { rank_scores(self.similarities(tokens)) }

    pub fn combined(&self, tokens: &[String]) -> Result<Vec<Hit>> {
        let page_rank = self.page_rank.ok_or(SearchError::PageRankUnavailable)?;
        let mut scores = BTreeMap::new();
        for (url, similarity) in self.similarities(tokens) {
            let rank = page_rank
                .rank(url)
                .ok_or_else(|| SearchError::GraphConsistency(format!("`{url}` has no page rank entry")))?;
            scores.insert(url, similarity * rank);
        }
        Ok(rank_scores(scores))
    }

    /// Boolean query vector over the full vocabulary: 1.0 for vocabulary tokens in the query, 0.0 otherwise.
    pub fn query_vector(&self, tokens: &[String]) -> TokenVector {
        let present: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
        self.index
            .vocabulary()
            .iter()
            .map(|token| (token.clone(), if present.contains(token.as_str()) { 1.0 } else { 0.0 }))
            .collect()
    }

    fn similarities(&self, tokens: &[String]) -> BTreeMap<&'a str, f64> {
        let query = self.query_vector(tokens);
        self.index
            .forward_index()
            .keys()
            .map(|url| {
                let similarity = self.vectors.get(url).map_or(0.0, |doc| query.cosine_similarity(doc));
                (url.as_str(), similarity)
            })
            .collect()
    }
}

// Stable descending sort: equal scores keep url order. Exact zeros are dropped.
fn rank_scores(scores: BTreeMap<&str, f64>) -> Vec<Hit> {
    let mut hits: Vec<Hit> = scores
        .into_iter()
        .filter(|(_, score)| *score != 0.0)
        .map(|(url, score)| Hit { url: url.to_string(), score })
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    tracing::debug!(hits = hits.len(), "ranked query");
    hits
}
