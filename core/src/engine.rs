use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::IndexBuilder;
use crate::page::Page;
use crate::pagerank::PageRank;
use crate::scorer::{self, Hit, QueryScorer, RankingPolicy};
use crate::snippet;
use crate::tokenizer::{Normalizer, TextNormalizer};
use crate::vector::TokenVector;
use std::collections::BTreeMap;

/// Ties the index, the page rank table and the query scorer together over one crawl snapshot.
///
/// Construction does all the work; afterwards the engine is immutable and can be
/// shared between readers without locking.
pub struct SearchEngine<N = TextNormalizer> {
    normalizer: N,
    pages: BTreeMap<String, Page>,
    index: IndexBuilder,
    page_rank: PageRank,
    vectors: BTreeMap<String, TokenVector>,
}

impl<N: Normalizer> SearchEngine<N> {
    pub fn new(pages: Vec<Page>, normalizer: N) -> Result<Self> {
        Self::with_config(pages, normalizer, &EngineConfig::default())
    }

    /// Uses `config.page_rank`. `config.stemming` is not consulted: `normalizer` is taken as
    /// given. Use [`SearchEngine::from_config`] to build the default normalizer from the config.
    pub fn with_config(pages: Vec<Page>, normalizer: N, config: &EngineConfig) -> Result<Self> {
        let index = IndexBuilder::new(&pages, &normalizer)?;
        let page_rank = PageRank::with_config(&pages, &config.page_rank)?;
        let vectors = scorer::document_vectors(&index);

        let mut by_url = BTreeMap::new();
        for page in pages {
            by_url.entry(page.url().to_string()).or_insert(page);
        }
        tracing::info!(pages = by_url.len(), page_rank_iterations = page_rank.iterations(), "search engine ready");
        Ok(Self { normalizer, pages: by_url, index, page_rank, vectors })
    }

    /// Query words joined, lowercased and run through the indexing normalizer.
    pub fn query_tokens<S: AsRef<str>>(&self, query: &[S]) -> Vec<String> {
        let joined = query.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        self.normalizer.normalize(&joined.to_lowercase())
    }

    pub fn rank<S: AsRef<str>>(&self, policy: RankingPolicy, query: &[S]) -> Result<Vec<Hit>> {
        let tokens = self.query_tokens(query);
        tracing::debug!(%policy, tokens = ?tokens, "scoring query");
        self.scorer().score(policy, &tokens)
    }

    pub fn search_tfidf<S: AsRef<str>>(&self, query: &[S]) -> Vec<String> {
        urls(self.scorer().tfidf(&self.query_tokens(query)))
    }

    pub fn search_cosine<S: AsRef<str>>(&self, query: &[S]) -> Vec<String> {
        urls(self.scorer().cosine(&self.query_tokens(query)))
    }

    pub fn search_combined<S: AsRef<str>>(&self, query: &[S]) -> Result<Vec<String>> {
        Ok(urls(self.scorer().combined(&self.query_tokens(query))?))
    }

    fn scorer(&self) -> QueryScorer<'_> {
        QueryScorer::new(&self.index, &self.vectors).with_page_rank(&self.page_rank)
    }

    /// Result excerpt for `url`; empty if the url is unknown or no query word occurs in its body.
    pub fn snippet<S: AsRef<str>>(&self, url: &str, query: &[S]) -> String {
        self.pages.get(url).map(|p| snippet::snippet(p.body(), query)).unwrap_or_default()
    }

    pub fn page_rank(&self, url: &str) -> Option<f64> { self.page_rank.rank(url) }
    pub fn page_ranks(&self) -> &BTreeMap<String, f64> { self.page_rank.ranks() }
    pub fn page_rank_solver(&self) -> &PageRank { &self.page_rank }
    pub fn index(&self) -> &IndexBuilder { &self.index }
    pub fn page(&self, url: &str) -> Option<&Page> { self.pages.get(url) }
    pub fn pages(&self) -> impl Iterator<Item = &Page> { self.pages.values() }
}

impl SearchEngine<TextNormalizer> {
    /// Engine over the default normalizer, stemming per `config.stemming`.
    pub fn from_config(pages: Vec<Page>, config: &EngineConfig) -> Result<Self> {
        Self::with_config(pages, TextNormalizer::with_stemming(config.stemming), config)
    }
}

fn urls(hits: Vec<Hit>) -> Vec<String> { hits.into_iter().map(|h| h.url).collect() }
