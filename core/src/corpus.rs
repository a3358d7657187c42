use crate::page::Page;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Load crawled pages from a `.json`/`.jsonl` file or a directory of them.
///
/// Directories are walked recursively and files are read in path order, so the
/// resulting page order is stable. A `.json` file holds one page or an array of pages;
/// a `.jsonl` file holds one page per non-empty line. `.json` files holding anything
/// else (a scalar, an object without `url`) are skipped with a warning.
pub fn load_pages<P: AsRef<Path>>(input: P) -> Result<Vec<Page>> {
    let input = input.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_page_file(p) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("corpus path {} does not exist", input.display());
    }

    let mut pages = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut pages)?;
        } else {
            read_json(&file, &mut pages)?;
        }
    }
    tracing::info!(path = %input.display(), pages = pages.len(), "loaded corpus");
    Ok(pages)
}

fn is_page_file(p: &Path) -> bool {
    matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
}

fn read_jsonl(file: &Path, pages: &mut Vec<Page>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let page: Page = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        pages.push(page);
    }
    Ok(())
}

fn read_json(file: &Path, pages: &mut Vec<Page>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                pages.push(serde_json::from_value(v).with_context(|| format!("page in {}", file.display()))?);
            }
        }
        // An object without a url is some other file (seeds, config) sharing the directory.
        serde_json::Value::Object(obj) if obj.contains_key("url") => {
            let page = serde_json::from_value(serde_json::Value::Object(obj)).with_context(|| format!("page in {}", file.display()))?;
            pages.push(page);
        }
        _ => tracing::warn!(file = %file.display(), "skipping json file that holds neither a page nor a list of pages"),
    }
    Ok(())
}
