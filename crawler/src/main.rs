use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use reqwest::{header, Client};
use scraper::{ElementRef, Html, Selector};
use search_core::Page;
use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;
use tracing_subscriber::{fmt, EnvFilter};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Breadth-first crawl from seed urls to a JSONL file of pages")]
struct Cli {
    /// Seed urls: a text file (one per line) or a JSON file with a "Seed-URLs" array
    #[arg(long)]
    seeds: String,
    /// Output JSONL file path
    #[arg(long, default_value = "./crawl.jsonl")]
    output: String,
    /// Maximum number of pages to emit
    #[arg(long, default_value_t = 1024)]
    max_pages: usize,
    /// Concurrency (number of in-flight fetches)
    #[arg(long, default_value_t = 16)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    #[arg(long, default_value = "search-engine-rs-bot/0.1 (+https://example.com/bot)")]
    user_agent: String,
    /// Only follow links that stay on the host of the page they were found on
    #[arg(long)]
    same_host_only: bool,
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(rename = "Seed-URLs")]
    seed_urls: Vec<String>,
}

#[derive(Clone)]
struct Selectors {
    title: Selector,
    header: Selector,
    body: Selector,
    links: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: selector("title")?,
            header: selector("header h1")?,
            body: selector("main p")?,
            links: selector("a[href]")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    if args.concurrency == 0 {
        bail!("--concurrency must be at least 1");
    }
    if let Some(dir) = Path::new(&args.output).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
    }

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;
    let selectors = Selectors::new()?;

    let seeds = load_seeds(&args.seeds)?;
    if seeds.is_empty() {
        bail!("no valid seeds in {}", args.seeds);
    }
    tracing::info!(
        seeds = seeds.len(),
        max_pages = args.max_pages,
        concurrency = args.concurrency,
        same_host_only = args.same_host_only,
        output = %args.output,
        "crawl starting"
    );

    let mut out = BufWriter::new(File::create(&args.output).with_context(|| format!("creating {}", args.output))?);
    let mut frontier: VecDeque<Url> = seeds.into();
    let mut seen: HashSet<String> = HashSet::new();
    let mut inflight: JoinSet<Option<Page>> = JoinSet::new();
    let mut emitted = 0usize;

    loop {
        while inflight.len() < args.concurrency && emitted + inflight.len() < args.max_pages {
            let Some(url) = frontier.pop_front() else { break };
            if !seen.insert(url.to_string()) {
                continue;
            }
            inflight.spawn(fetch_page(client.clone(), selectors.clone(), url));
        }

        let Some(joined) = inflight.join_next().await else { break };
        let page = match joined {
            Ok(Some(page)) => page,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "fetch task failed");
                continue;
            }
        };

        let origin_host = Url::parse(page.url()).ok().and_then(|u| u.host_str().map(str::to_owned));
        for link in page.links() {
            let Ok(next) = Url::parse(link) else { continue };
            if args.same_host_only && next.host_str() != origin_host.as_deref() {
                continue;
            }
            if !seen.contains(next.as_str()) {
                frontier.push_back(next);
            }
        }

        serde_json::to_writer(&mut out, &page)?;
        out.write_all(b"\n")?;
        emitted += 1;
        if emitted % 100 == 0 {
            tracing::info!(emitted, visited = seen.len(), frontier = frontier.len(), "crawl progress");
        }
    }
    out.flush()?;

    tracing::info!(emitted, visited = seen.len(), frontier = frontier.len(), output = %args.output, "crawl finished");
    Ok(())
}

fn load_seeds(path: &str) -> Result<Vec<Url>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading seeds {path}"))?;
    let is_json = Path::new(path).extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
    parse_seeds(&content, is_json).with_context(|| format!("parsing seeds {path}"))
}

fn parse_seeds(content: &str, is_json: bool) -> Result<Vec<Url>> {
    let raw: Vec<String> = if is_json {
        serde_json::from_str::<SeedFile>(content)?.seed_urls
    } else {
        content.lines().map(str::to_owned).collect()
    };
    let mut seeds = Vec::new();
    for s in raw.iter().map(|s| s.trim()) {
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        match parse_seed(s) {
            Ok(mut u) => {
                u.set_fragment(None);
                seeds.push(u);
            }
            Err(e) => tracing::warn!(seed = s, error = %e, "skipping invalid seed"),
        }
    }
    Ok(seeds)
}

// `host:port` parses as a url with scheme `host`, so only http(s) parses are
// taken as is. Anything else without an explicit `://` gets `https://` prepended.
fn parse_seed(s: &str) -> Result<Url> {
    match Url::parse(s) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(u),
        Ok(u) if s.contains("://") => bail!("unsupported scheme `{}`", u.scheme()),
        _ => Ok(Url::parse(&format!("https://{s}"))?),
    }
}

async fn fetch_page(client: Client, selectors: Selectors, url: Url) -> Option<Page> {
    let resp = match client.get(url.clone()).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(%url, error = %e, "request failed");
            return None;
        }
    };
    if !resp.status().is_success() {
        tracing::warn!(%url, status = %resp.status(), "skipping non-success response");
        return None;
    }
    if let Some(ct) = resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        if !ct.starts_with("text/html") {
            tracing::warn!(%url, content_type = ct, "skipping non-html content");
            return None;
        }
    }
    // Relative links resolve against where redirects ended up. The page keeps
    // the requested url as its identity since that is what other pages link to.
    let base = resp.url().clone();
    let bytes = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(%url, error = %e, "reading body failed");
            return None;
        }
    };
    if bytes.len() > MAX_BODY_BYTES {
        tracing::warn!(%url, bytes = bytes.len(), "skipping oversized body");
        return None;
    }
    let page = extract_page(&url, &base, &String::from_utf8_lossy(&bytes), &selectors);
    tracing::debug!(%url, %base, links = page.links().len(), "page fetched");
    Some(page)
}

fn extract_page(url: &Url, base: &Url, html: &str, selectors: &Selectors) -> Page {
    let doc = Html::parse_document(html);
    let links = doc
        .select(&selectors.links)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|mut u| {
            u.set_fragment(None);
            u.to_string()
        });
    let mut own = url.clone();
    own.set_fragment(None);
    Page::new(
        own.to_string(),
        select_text(&doc, &selectors.title),
        select_text(&doc, &selectors.header),
        select_text(&doc, &selectors.body),
        links.collect::<Vec<_>>(),
    )
}

/// Text of every match, joined by single spaces with whitespace collapsed.
fn select_text(doc: &Html, sel: &Selector) -> String {
    doc.select(sel)
        .flat_map(|n: ElementRef<'_>| n.text())
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
