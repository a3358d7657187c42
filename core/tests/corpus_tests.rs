use search_core::corpus::load_pages;
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_json_arrays_objects_and_jsonl() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("a.jsonl"),
        "{\"url\":\"http://a\",\"title\":\"A\",\"body\":\"brie\",\"links\":[\"http://b\"]}\n\n{\"url\":\"http://b\"}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b.json"),
        r#"[{"url":"http://c","headings":"h","paragraphs":"p","outgoingLinks":[]}]"#,
    )
    .unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/c.json"), r#"{"url":"http://d"}"#).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a page").unwrap();

    let pages = load_pages(dir.path()).unwrap();
    let urls: Vec<&str> = pages.iter().map(|p| p.url()).collect();
    assert_eq!(urls, ["http://a", "http://b", "http://c", "http://d"]);
    assert_eq!(pages[2].header(), "h");
    assert!(pages[0].links().contains("http://b"));
}

#[test]
fn loads_single_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("crawl.jsonl");
    fs::write(&file, "{\"url\":\"http://a\"}\n").unwrap();
    assert_eq!(load_pages(&file).unwrap().len(), 1);
}

#[test]
fn reports_bad_lines_and_missing_paths() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("crawl.jsonl");
    fs::write(&file, "{\"url\":\"http://a\"}\n{not json}\n").unwrap();
    let err = load_pages(&file).unwrap_err();
    assert!(format!("{err:#}").contains("crawl.jsonl:2"));
    assert!(load_pages(dir.path().join("missing")).is_err());
}

#[test]
fn skips_json_files_that_are_not_pages() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("crawl.jsonl"), "{\"url\":\"http://a\"}\n").unwrap();
    fs::write(dir.path().join("seeds.json"), r#"{"Seed-URLs":["http://a"],"Num-Websites":1}"#).unwrap();
    fs::write(dir.path().join("version.json"), "3").unwrap();

    let pages = load_pages(dir.path()).unwrap();
    let urls: Vec<&str> = pages.iter().map(|p| p.url()).collect();
    assert_eq!(urls, ["http://a"]);
}

#[test]
fn malformed_page_object_is_still_an_error() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("page.json");
    fs::write(&file, r#"{"url":"http://a","links":"not a list"}"#).unwrap();
    assert!(load_pages(&file).is_err());
}
