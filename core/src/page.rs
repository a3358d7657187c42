use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A crawled page. Read-only once built; the url is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "headings")]
    header: String,
    #[serde(default, alias = "paragraphs")]
    body: String,
    #[serde(default, alias = "outgoingLinks")]
    links: BTreeSet<String>,
}

impl Page {
    pub fn new<I, S>(url: impl Into<String>, title: impl Into<String>, header: impl Into<String>, body: impl Into<String>, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url: url.into(),
            title: title.into(),
            header: header.into(),
            body: body.into(),
            links: links.into_iter().map(Into::into).collect(),
        }
    }

    pub fn url(&self) -> &str { &self.url }
    pub fn title(&self) -> &str { &self.title }
    pub fn header(&self) -> &str { &self.header }
    pub fn body(&self) -> &str { &self.body }
    pub fn links(&self) -> &BTreeSet<String> { &self.links }

    /// Title, header and body joined by spaces and lowercased; the text that gets indexed.
    pub fn indexable_text(&self) -> String {
        format!("{} {} {}", self.title.trim(), self.header.trim(), self.body.trim()).to_lowercase()
    }
}
