#![allow(dead_code)]

use search_core::{Normalizer, Page};

/// Whitespace tokenizer, so expected TF-IDF values can be worked out by hand.
pub struct Split;

impl Normalizer for Split {
    fn normalize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

pub fn page(url: &str, body: &str, links: &[&str]) -> Page {
    Page::new(url, "", "", body, links.iter().copied())
}

pub fn link_page(url: &str, links: &[&str]) -> Page {
    page(url, "", links)
}

/// Four cheese pages; feta links in but nothing links to it.
pub fn cheese_pages() -> Vec<Page> {
    vec![
        page("http://brie.cheesy", "brie soft brie creamy", &["http://gouda.cheesy", "http://cheddar.cheesy"]),
        page("http://gouda.cheesy", "gouda hard nutty", &["http://brie.cheesy"]),
        page("http://cheddar.cheesy", "cheddar hard sharp brie", &["http://brie.cheesy", "http://gouda.cheesy"]),
        page("http://feta.cheesy", "feta salty", &["http://brie.cheesy", "http://external.example"]),
    ]
}

pub fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}
