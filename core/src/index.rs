//! Forward and reverse indices with TF-IDF weights.
//!
//! Everything is computed once in [`IndexBuilder::new`] and is read-only afterwards.
//! Maps are ordered so that exports and tie-breaking are stable across runs.

use crate::error::{Result, SearchError};
use crate::page::Page;
use crate::tokenizer::Normalizer;
use std::collections::{BTreeMap, BTreeSet};

/// url -> token sequence, duplicates kept.
pub type ForwardIndex = BTreeMap<String, Vec<String>>;
/// token -> (url -> TF-IDF).
pub type ReverseIndex = BTreeMap<String, BTreeMap<String, f64>>;
/// url -> (token -> TF-IDF), dense over the whole vocabulary.
pub type ForwardTfIdf = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug)]
pub struct IndexBuilder {
    forward: ForwardIndex,
    term_counts: BTreeMap<String, BTreeMap<String, u32>>,
    doc_frequency: BTreeMap<String, BTreeSet<String>>,
    reverse: ReverseIndex,
    forward_tfidf: ForwardTfIdf,
    vocabulary: BTreeSet<String>,
    total_pages: usize,
}

impl IndexBuilder {
    /// Build all indices for `pages`. Fails with [`SearchError::EmptyCorpus`] when there is nothing to index.
    pub fn new<N: Normalizer + ?Sized>(pages: &[Page], normalizer: &N) -> Result<Self> {
        if pages.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }

        let mut forward: ForwardIndex = BTreeMap::new();
        for page in pages {
            if forward.contains_key(page.url()) {
                tracing::warn!(url = page.url(), "duplicate url in page collection, keeping first occurrence");
                continue;
            }
            forward.insert(page.url().to_string(), normalizer.normalize(&page.indexable_text()));
        }

        let mut term_counts: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
        let mut doc_frequency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (url, tokens) in &forward {
            let counts = term_counts.entry(url.clone()).or_default();
            for token in tokens {
                *counts.entry(token.clone()).or_insert(0) += 1;
                doc_frequency.entry(token.clone()).or_default().insert(url.clone());
            }
        }

        let vocabulary: BTreeSet<String> = doc_frequency.keys().cloned().collect();
        let mut index = Self {
            total_pages: forward.len(),
            forward,
            term_counts,
            doc_frequency,
            reverse: BTreeMap::new(),
            forward_tfidf: BTreeMap::new(),
            vocabulary,
        };
        index.reverse = index.compute_reverse()?;
        index.forward_tfidf = index.compute_forward_tfidf();

        tracing::info!(pages = index.total_pages, vocabulary = index.vocabulary.len(), "built index");
        Ok(index)
    }

    fn compute_reverse(&self) -> Result<ReverseIndex> {
        let mut reverse: ReverseIndex = BTreeMap::new();
        for (token, urls) in &self.doc_frequency {
            let idf = self.idf(token)?;
            let postings = reverse.entry(token.clone()).or_default();
            for url in urls {
                postings.insert(url.clone(), self.tf(token, url) * idf);
            }
        }
        Ok(reverse)
    }

    // Dense expansion keeps every url vector on the same token domain. Cost is
    // vocabulary x pages, fine for a few thousand pages.
    fn compute_forward_tfidf(&self) -> ForwardTfIdf {
        let mut out: ForwardTfIdf = BTreeMap::new();
        for url in self.forward.keys() {
            let vector = self
                .vocabulary
                .iter()
                .map(|token| {
                    let weight = self.reverse.get(token).and_then(|p| p.get(url)).copied().unwrap_or(0.0);
                    (token.clone(), weight)
                })
                .collect();
            out.insert(url.clone(), vector);
        }
        out
    }

    /// Share of `url`'s tokens equal to `token`; 0.0 for unknown urls, absent tokens or empty pages.
    pub fn tf(&self, token: &str, url: &str) -> f64 {
        let Some(tokens) = self.forward.get(url) else { return 0.0 };
        if tokens.is_empty() {
            return 0.0;
        }
        let count = self.term_counts.get(url).and_then(|c| c.get(token)).copied().unwrap_or(0);
        f64::from(count) / tokens.len() as f64
    }

    /// ln(N / df). Callers must check [`contains_token`](Self::contains_token) first.
    pub fn idf(&self, token: &str) -> Result<f64> {
        match self.doc_frequency.get(token) {
            Some(urls) if !urls.is_empty() => Ok((self.total_pages as f64 / urls.len() as f64).ln()),
            _ => Err(SearchError::InvalidToken(token.to_string())),
        }
    }

    /// TF x IDF. Zero whenever the token is absent from the page.
    pub fn tf_idf(&self, token: &str, url: &str) -> Result<f64> {
        let tf = self.tf(token, url);
        if tf == 0.0 {
            return Ok(0.0);
        }
        Ok(tf * self.idf(token)?)
    }

    pub fn contains_token(&self, token: &str) -> bool { self.vocabulary.contains(token) }

    pub fn document_frequency(&self, token: &str) -> usize {
        self.doc_frequency.get(token).map_or(0, BTreeSet::len)
    }

    pub fn tokens(&self, url: &str) -> Option<&[String]> { self.forward.get(url).map(Vec::as_slice) }

    pub fn forward_index(&self) -> &ForwardIndex { &self.forward }
    pub fn reverse_index(&self) -> &ReverseIndex { &self.reverse }
    pub fn forward_tfidf(&self) -> &ForwardTfIdf { &self.forward_tfidf }
    pub fn vocabulary(&self) -> &BTreeSet<String> { &self.vocabulary }
    pub fn total_pages(&self) -> usize { self.total_pages }
}
