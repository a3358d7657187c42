mod common;

use common::{approx, cheese_pages, page, Split};
use search_core::{EngineConfig, Page, RankingPolicy, SearchEngine, SearchError, TextNormalizer};
use std::collections::HashSet;

fn engine() -> SearchEngine<Split> {
    SearchEngine::new(cheese_pages(), Split).unwrap()
}

#[test]
fn empty_collection_aborts_construction() {
    let err = SearchEngine::new(Vec::<Page>::new(), Split).err().unwrap();
    assert!(matches!(err, SearchError::EmptyCorpus));
}

#[test]
fn tfidf_orders_by_summed_weight() {
    let engine = engine();
    assert_eq!(engine.search_tfidf(&["brie"]), ["http://brie.cheesy", "http://cheddar.cheesy"]);
    assert_eq!(engine.search_tfidf(&["hard"]), ["http://gouda.cheesy", "http://cheddar.cheesy"]);
}

#[test]
fn equal_scores_keep_url_order() {
    // brie page: 2/4 brie; cheddar page: 1/4 brie + 1/4 hard. Same idf, exact tie.
    let engine = engine();
    let hits = engine.rank(RankingPolicy::TfIdf, &["brie", "hard"]).unwrap();
    assert_eq!(hits[0].score, hits[1].score);
    let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls, ["http://brie.cheesy", "http://cheddar.cheesy", "http://gouda.cheesy"]);
}

#[test]
fn query_is_lowercased_before_lookup() {
    let engine = engine();
    assert_eq!(engine.search_tfidf(&["BRIE"]), engine.search_tfidf(&["brie"]));
}

#[test]
fn cosine_only_returns_pages_sharing_a_token() {
    let engine = engine();
    assert_eq!(engine.search_cosine(&["feta"]), ["http://feta.cheesy"]);
    assert_eq!(engine.search_cosine(&["brie"]), ["http://brie.cheesy", "http://cheddar.cheesy"]);
}

#[test]
fn cosine_query_vector_is_boolean() {
    let engine = engine();
    let once = engine.rank(RankingPolicy::Cosine, &["hard"]).unwrap();
    let thrice = engine.rank(RankingPolicy::Cosine, &["hard", "hard", "hard"]).unwrap();
    assert_eq!(once, thrice);
}

#[test]
fn combined_multiplies_cosine_by_page_rank() {
    let engine = engine();
    let cosine = engine.rank(RankingPolicy::Cosine, &["brie"]).unwrap();
    let combined = engine.rank(RankingPolicy::Combined, &["brie"]).unwrap();
    for hit in &combined {
        let sim = cosine.iter().find(|h| h.url == hit.url).unwrap().score;
        let rank = engine.page_rank(&hit.url).unwrap();
        assert!(approx(hit.score, sim * rank, 1e-12));
    }
    assert_eq!(engine.search_combined(&["brie"]).unwrap(), ["http://brie.cheesy", "http://cheddar.cheesy"]);
}

#[test]
fn combined_drops_pages_without_rank() {
    // Nothing links to feta, so its undamped rank is zero.
    let engine = engine();
    assert_eq!(engine.page_rank("http://feta.cheesy"), Some(0.0));
    assert!(engine.search_combined(&["feta"]).unwrap().is_empty());
}

#[test]
fn page_ranks_of_cheese_graph() {
    let engine = engine();
    assert!(approx(engine.page_rank("http://brie.cheesy").unwrap(), 4.0 / 9.0, 1e-3));
    assert!(approx(engine.page_rank("http://gouda.cheesy").unwrap(), 1.0 / 3.0, 1e-3));
    assert!(approx(engine.page_rank("http://cheddar.cheesy").unwrap(), 2.0 / 9.0, 1e-3));
    let total: f64 = engine.page_ranks().values().sum();
    assert!(approx(total, 1.0, 1e-3));
}

#[test]
fn unknown_words_give_empty_results() {
    let engine = engine();
    assert!(engine.search_tfidf(&["camembert"]).is_empty());
    assert!(engine.search_cosine(&["camembert"]).is_empty());
    assert!(engine.search_combined(&["camembert"]).unwrap().is_empty());
    assert!(engine.search_tfidf(&[] as &[&str]).is_empty());
}

#[test]
fn no_policy_returns_duplicates_or_zero_scores() {
    let engine = engine();
    for query in [&["brie"][..], &["hard", "salty"][..], &["brie", "gouda", "feta", "sharp"][..], &["creamy"][..]] {
        for policy in RankingPolicy::ALL {
            let hits = engine.rank(policy, query).unwrap();
            let unique: HashSet<&str> = hits.iter().map(|h| h.url.as_str()).collect();
            assert_eq!(unique.len(), hits.len(), "{policy} {query:?}");
            assert!(hits.iter().all(|h| h.score != 0.0), "{policy} {query:?}");
            assert!(hits.windows(2).all(|w| w[0].score >= w[1].score), "{policy} {query:?}");
        }
    }
}

#[test]
fn snippet_comes_from_page_body() {
    let engine = engine();
    assert_eq!(engine.snippet("http://gouda.cheesy", &["Nutty"]), "...gouda hard nutty...");
    assert_eq!(engine.snippet("http://gouda.cheesy", &["brie"]), "");
    assert_eq!(engine.snippet("http://unknown", &["brie"]), "");
}

#[test]
fn accessors_expose_the_crawl() {
    let engine = engine();
    assert_eq!(engine.pages().count(), 4);
    assert_eq!(engine.page("http://feta.cheesy").unwrap().body(), "feta salty");
    assert_eq!(engine.index().total_pages(), 4);
}

#[test]
fn default_normalizer_matches_inflected_forms() {
    let pages = vec![
        page("http://a.cheesy", "Cheeses from the alps", &["http://b.cheesy"]),
        page("http://b.cheesy", "Bread and wine", &["http://a.cheesy"]),
    ];
    let engine = SearchEngine::new(pages, TextNormalizer::new()).unwrap();
    assert_eq!(engine.search_tfidf(&["cheese"]), ["http://a.cheesy"]);
    assert_eq!(engine.search_cosine(&["Cheese!"]), ["http://a.cheesy"]);
}

#[test]
fn from_config_applies_stemming_setting() {
    let pages = || {
        vec![
            page("http://a.cheesy", "Cheeses from the alps", &["http://b.cheesy"]),
            page("http://b.cheesy", "Bread and wine", &["http://a.cheesy"]),
        ]
    };
    let stemmed = SearchEngine::from_config(pages(), &EngineConfig::default()).unwrap();
    assert_eq!(stemmed.search_tfidf(&["cheese"]), ["http://a.cheesy"]);

    let config = EngineConfig { stemming: false, ..EngineConfig::default() };
    let exact = SearchEngine::from_config(pages(), &config).unwrap();
    assert!(exact.search_tfidf(&["cheese"]).is_empty());
    assert_eq!(exact.search_tfidf(&["cheeses"]), ["http://a.cheesy"]);
}
