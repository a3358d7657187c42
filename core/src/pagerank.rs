//! Link authority by power iteration over the crawled link graph.
//!
//! The formulation is undamped: a page's new rank is the sum of its linkers'
//! ranks divided by their out-degree, and pages without internal out-links
//! leak their mass instead of redistributing it. Links to urls outside the
//! collection are ignored.

use crate::error::{Result, SearchError};
use crate::page::Page;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Iteration stops once the L1 distance between two tables drops below this.
    pub tolerance: f64,
    /// Upper bound on iterations. Periodic graphs never converge without damping.
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self { tolerance: 1e-4, max_iterations: 1000 }
    }
}

#[derive(Debug)]
pub struct PageRank {
    ranks: BTreeMap<String, f64>,
    incoming: BTreeMap<String, BTreeSet<String>>,
    out_degree: BTreeMap<String, usize>,
    iterations: usize,
    delta: f64,
    converged: bool,
}

impl PageRank {
    pub fn new(pages: &[Page]) -> Result<Self> {
        Self::with_config(pages, &PageRankConfig::default())
    }

    pub fn with_config(pages: &[Page], config: &PageRankConfig) -> Result<Self> {
        if pages.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        let (incoming, out_degree) = link_maps(pages);
        let mut solver = Self { ranks: BTreeMap::new(), incoming, out_degree, iterations: 0, delta: 0.0, converged: false };
        solver.solve(config).map_err(|e| SearchError::Initialization(Box::new(e)))?;
        Ok(solver)
    }

    fn solve(&mut self, config: &PageRankConfig) -> Result<()> {
        let seed = 1.0 / self.incoming.len() as f64;
        self.ranks = self.incoming.keys().map(|url| (url.clone(), seed)).collect();

        while self.iterations < config.max_iterations.max(1) {
            let next = self.step()?;
            let delta = self.l1_distance(&next)?;
            self.ranks = next;
            self.iterations += 1;
            self.delta = delta;
            tracing::debug!(iteration = self.iterations, delta, "page rank iteration");
            if delta < config.tolerance {
                self.converged = true;
                break;
            }
        }

        if self.converged {
            tracing::info!(pages = self.ranks.len(), iterations = self.iterations, "page rank converged");
        } else {
            tracing::warn!(iterations = self.iterations, delta = self.delta, "page rank stopped before converging");
        }
        Ok(())
    }

    fn step(&self) -> Result<BTreeMap<String, f64>> {
        let mut next = BTreeMap::new();
        for (url, linkers) in &self.incoming {
            let mut rank = 0.0;
            for linker in linkers {
                let degree = self
                    .out_degree
                    .get(linker)
                    .copied()
                    .ok_or_else(|| SearchError::GraphConsistency(format!("`{linker}` links to `{url}` but has no out-degree")))?;
                rank += self.current(linker)? / degree as f64;
            }
            next.insert(url.clone(), rank);
        }
        Ok(next)
    }

    fn l1_distance(&self, next: &BTreeMap<String, f64>) -> Result<f64> {
        let mut delta = 0.0;
        for (url, rank) in next {
            delta += (rank - self.current(url)?).abs();
        }
        Ok(delta)
    }

    fn current(&self, url: &str) -> Result<f64> {
        self.ranks
            .get(url)
            .copied()
            .ok_or_else(|| SearchError::GraphConsistency(format!("`{url}` has no page rank entry")))
    }

    pub fn rank(&self, url: &str) -> Option<f64> { self.ranks.get(url).copied() }
    pub fn ranks(&self) -> &BTreeMap<String, f64> { &self.ranks }
    pub fn incoming(&self, url: &str) -> Option<&BTreeSet<String>> { self.incoming.get(url) }
    /// Number of in-collection links leaving `url`; 0 for pages without any.
    pub fn out_degree(&self, url: &str) -> usize { self.out_degree.get(url).copied().unwrap_or(0) }
    pub fn iterations(&self) -> usize { self.iterations }
    pub fn delta(&self) -> f64 { self.delta }
    pub fn converged(&self) -> bool { self.converged }
}

// Every url gets an incoming entry, even with no linkers. Out-degrees count
// only links that stay inside the collection and are kept for linking pages only.
fn link_maps(pages: &[Page]) -> (BTreeMap<String, BTreeSet<String>>, BTreeMap<String, usize>) {
    let mut incoming: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for page in pages {
        incoming.entry(page.url().to_string()).or_default();
    }

    let mut out_degree = BTreeMap::new();
    let mut seen = BTreeSet::new();
    for page in pages {
        if !seen.insert(page.url()) {
            continue;
        }
        let internal: Vec<&String> = page.links().iter().filter(|l| incoming.contains_key(l.as_str())).collect();
        if internal.is_empty() {
            continue;
        }
        out_degree.insert(page.url().to_string(), internal.len());
        for link in internal {
            if let Some(linkers) = incoming.get_mut(link.as_str()) {
                linkers.insert(page.url().to_string());
            }
        }
    }
    (incoming, out_degree)
}
