use scix_docs_text::{get_doc_by_id, get_stats, search_by_category, search_docs, DocSearch, SearchOptions};

fn opts() -> SearchOptions {
    SearchOptions::default()
}

#[tokio::test]
async fn shipped_corpus_finds_fielded_sort_syntax() {
    let hits = search_docs("citation_count", Some(5.0), &opts()).await.expect("search");
    eprintln!("q='citation_count' -> {} hits", hits.len());
    assert!(!hits.is_empty());
    let top = &hits[0];
    assert_eq!(top.id, "search-syntax-0");
    assert_eq!(top.title, "Search Syntax");
    assert_eq!(top.section, "Basic Queries");
    assert!(top.snippet.contains("citation_count"), "snippet: {}", top.snippet);
    assert!(top.score > 0.0);
}

#[tokio::test]
async fn misspelled_query_still_finds_author_search() {
    let hits = search_docs("authr serch", None, &opts()).await.expect("search");
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    eprintln!("q='authr serch' -> {ids:?}");
    assert_eq!(ids.first().copied(), Some("search-author-0"));
    assert_eq!(hits[0].title, "Author Search");
}

#[tokio::test]
async fn blank_queries_return_nothing() {
    assert!(search_docs("", None, &opts()).await.expect("search").is_empty());
    assert!(search_docs("   ", None, &opts()).await.expect("search").is_empty());
    assert!(search_docs("\t\n", Some(3.0), &opts()).await.expect("search").is_empty());
}

#[tokio::test]
async fn results_are_sorted_and_close_to_the_best() {
    for q in ["search", "library records", "orcid", "export bibtex", "token", "author"] {
        let hits = search_docs(q, Some(50.0), &opts()).await.expect("search");
        eprintln!("q='{}' -> {} hits", q, hits.len());
        assert!(!hits.is_empty(), "'{q}' should match");
        let top = hits[0].score;
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score, "'{q}' not sorted");
        }
        for h in &hits {
            assert!(h.score >= top * 0.4, "'{q}' kept a weak hit {} ({} < 0.4 * {})", h.id, h.score, top);
        }
    }
}

#[tokio::test]
async fn limit_bounds_hold_on_shipped_corpus() {
    let all = search_docs("search fields", Some(100.0), &opts()).await.expect("search");
    assert!(!all.is_empty());

    assert!(search_docs("search fields", Some(2.7), &opts()).await.expect("search").len() <= 2);
    assert_eq!(search_docs("search fields", Some(0.0), &opts()).await.expect("search").len(), 1);
    assert_eq!(search_docs("search fields", Some(-3.0), &opts()).await.expect("search").len(), 1);
    assert!(search_docs("search fields", Some(f64::NAN), &opts()).await.expect("search").len() <= 5);
    assert!(search_docs("search fields", None, &opts()).await.expect("search").len() <= 5);

    let stats = get_stats().await.expect("stats");
    assert!(all.len() <= stats.total_docs);
}

#[tokio::test]
async fn snippets_are_bounded_and_marked() {
    for q in ["citation_count", "operators", "wildcards", "fields"] {
        for h in search_docs(q, Some(20.0), &opts()).await.expect("search") {
            assert!(h.snippet.chars().count() <= 260 + 6, "snippet too long for {}", h.id);
            let doc = get_doc_by_id(&h.id).await.expect("lookup").expect("hit id resolves");
            if doc.content.chars().count() > 260 {
                assert!(h.snippet.starts_with("...") || h.snippet.ends_with("..."), "unmarked cut for {}", h.id);
            }
        }
    }
}

#[tokio::test]
async fn hit_ids_round_trip_through_lookup() {
    let hits = search_docs("libraries", Some(10.0), &opts()).await.expect("search");
    assert!(!hits.is_empty());
    for h in hits {
        let doc = get_doc_by_id(&h.id).await.expect("lookup").expect("present");
        assert_eq!(doc.id, h.id);
        assert_eq!(doc.content.chars().count(), doc.char_count);
        assert_eq!(doc.title, h.title);
    }
}

#[tokio::test]
async fn dropped_records_are_not_served() {
    for id in ["whats-new-0", "missing-0", "empty-0", "no-such-id"] {
        assert!(get_doc_by_id(id).await.expect("lookup").is_none(), "{id} should be absent");
    }
    let hits = search_docs("highlights latest release", Some(20.0), &opts()).await.expect("search");
    assert!(hits.iter().all(|h| h.id != "whats-new-0"));
}

#[tokio::test]
async fn category_listing_keeps_corpus_order() {
    let hits = search_by_category("library_docs", "", None).await.expect("category");
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["library-create-0", "library-share-0"]);
    for h in &hits {
        assert!(h.score.abs() < f32::EPSILON);
        assert!(!h.snippet.is_empty());
    }
    assert_eq!(search_by_category("library_docs", "  ", Some(1.0)).await.expect("category").len(), 1);
}

#[tokio::test]
async fn category_query_stays_in_category() {
    let hits = search_by_category("search_docs", "author", None).await.expect("category");
    assert!(!hits.is_empty());
    assert_eq!(hits[0].id, "search-author-0");
    assert!(hits.iter().all(|h| h.category == "search_docs"));

    for cat in ["api_docs", "faq", "user_docs", "nonexistent"] {
        let hits = search_by_category(cat, "account token records", None).await.expect("category");
        assert!(hits.iter().all(|h| h.category == cat));
    }
    assert!(search_by_category("nonexistent", "", None).await.expect("category").is_empty());
}

#[tokio::test]
async fn stats_add_up() {
    let stats = get_stats().await.expect("stats");
    assert_eq!(stats.total_docs, 15);
    assert_eq!(stats.by_category.values().sum::<usize>(), stats.total_docs);
    assert_eq!(stats.by_doc_type.values().sum::<usize>(), stats.total_docs);
    assert_eq!(stats.by_category["search_docs"], 3);
    assert_eq!(stats.by_category["user_docs"], 1);
    assert!(stats.avg_content_length > 0);
}

#[tokio::test]
async fn repeated_searches_are_identical() {
    let first = search_docs("search fields", Some(10.0), &opts()).await.expect("search");
    let second = search_docs("search fields", Some(10.0), &opts()).await.expect("search");
    assert_eq!(first, second);
}

#[tokio::test]
async fn global_instance_uses_shipped_corpus() {
    let global = DocSearch::global();
    assert!(global.corpus_path().ends_with("data/docs_chunks.json"));
    let categories = global.categories().await.expect("categories");
    assert!(categories.contains(&"search_docs".to_string()));
    assert!(categories.windows(2).all(|w| w[0] < w[1]));
}
