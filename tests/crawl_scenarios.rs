//! End-to-end crawls against an in-memory web

use kodegen_tools_frontier::{CancellationToken, Crawler, DropReason, PageOutcome, TransportError};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{MemoryFileStore, MockFetcher, RecordingObserver, Route, collaborators, test_config};

const ROOT: &str = "http://example.test/";

fn crawler(
    config: kodegen_tools_frontier::CrawlConfig,
    fetcher: &Arc<MockFetcher>,
    observer: &Arc<RecordingObserver>,
) -> Crawler {
    let collaborators = collaborators(&config, Arc::clone(fetcher), Arc::new(MemoryFileStore::default()));
    Crawler::new(config, collaborators).with_observer(Arc::clone(observer) as _)
}

#[tokio::test]
async fn test_scoped_crawl_visits_in_scope_links_once() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/a">a</a> <a href="http://other.test/x">x</a>"#)
            .page("http://example.test/a", r#"<a href="/">home</a> <a href="/a">self</a>"#),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT])
        .allowed_domains(["*.example.test"])
        .build()
        .unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(report.admitted(), 2);
    assert!(report.was_visited(ROOT));
    assert!(report.was_visited("http://example.test/a"));
    assert_eq!(fetcher.calls("http://example.test/a"), 1);
    assert_eq!(fetcher.calls_to_host("other.test"), 0);
    assert!(observer.outcomes().iter().all(|(url, _)| !url.contains("other.test")));
    assert_eq!(report.stats.pages_processed, 2);
    assert!(observer.finished());
}

#[tokio::test]
async fn test_duplicate_content_extracted_once() {
    let mirror = r#"<a href="/deep">deep</a>"#;
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/one">1</a> <a href="/two">2</a>"#)
            .page("http://example.test/one", mirror)
            .page("http://example.test/two", mirror)
            .page("http://example.test/deep", "<p>leaf</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).concurrency(2).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(report.dropped(DropReason::DuplicateContent), 1);
    assert_eq!(report.stats.pages_processed, 3);
    assert_eq!(report.unique_documents, 3);
    // Both mirrors stay visited even though only one was extracted
    assert_eq!(report.admitted(), 4);
    assert_eq!(fetcher.calls("http://example.test/deep"), 1);
}

#[tokio::test]
async fn test_same_url_enqueued_twice_is_processed_once() {
    let fetcher = Arc::new(MockFetcher::new().page(ROOT, "<p>hello</p>"));
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).concurrency(4).build().unwrap();

    let report = crawler(config, &fetcher, &observer)
        .run([ROOT, "http://EXAMPLE.test:80/#top"])
        .await
        .unwrap();

    assert_eq!(fetcher.calls(ROOT), 1);
    assert_eq!(report.stats.pages_processed, 1);
    assert_eq!(report.dropped(DropReason::AlreadyVisited), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_timeout_drops_without_new_work() {
    let fetcher = Arc::new(MockFetcher::new().slow_page(
        ROOT,
        Duration::from_secs(60),
        r#"<a href="/never">never</a>"#,
    ));
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT])
        .fetch_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert!(report.was_visited(ROOT));
    assert_eq!(report.dropped(DropReason::Transport), 1);
    assert_eq!(report.stats.links_enqueued, 0);
    assert_eq!(fetcher.calls("http://example.test/never"), 0);
}

#[tokio::test]
async fn test_transport_errors_are_dropped_not_fatal() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/broken">b</a> <a href="/missing">m</a> <a href="/ok">ok</a>"#)
            .route(
                "http://example.test/broken",
                Route::Fail(TransportError::Request("connection reset".into())),
            )
            .page("http://example.test/ok", "<p>fine</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(report.dropped(DropReason::Transport), 2);
    assert_eq!(report.stats.failed(), 2);
    assert_eq!(report.stats.pages_processed, 2);
    assert_eq!(report.admitted(), 4);
}

#[tokio::test]
async fn test_robots_rules_and_sitemap_seeding() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .robots(
                "http://example.test",
                "User-agent: *\nDisallow: /private\n\nSitemap: http://example.test/sitemap.xml\n",
            )
            .xml(
                "http://example.test/sitemap.xml",
                r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>http://example.test/from-sitemap</loc></url>
  <url><loc>http://example.test/private/secret</loc></url>
  <url><loc>http://elsewhere.test/page</loc></url>
</urlset>"#,
            )
            .page(ROOT, r#"<a href="/private/x">x</a>"#)
            .page("http://example.test/from-sitemap", "<p>seeded</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(fetcher.calls("http://example.test/robots.txt"), 1);
    assert!(report.was_visited("http://example.test/from-sitemap"));
    assert_eq!(fetcher.calls("http://example.test/private/x"), 0);
    assert_eq!(fetcher.calls("http://example.test/private/secret"), 0);
    assert_eq!(report.dropped(DropReason::RobotsDisallowed), 2);
    assert_eq!(report.stats.sitemap_seeded, 2);
    assert_eq!(
        observer.seeded(),
        vec![("http://example.test/sitemap.xml".to_string(), 2)]
    );
    assert_eq!(report.policy_domains, 1);
}

#[tokio::test]
async fn test_directory_disallow_blocks_directory_link() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .robots("http://example.test", "User-agent: *\nDisallow: /private/\n")
            .page(ROOT, r#"<a href="/private/">p</a> <a href="/private">sibling</a>"#)
            .page("http://example.test/private", "<p>public sibling</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(fetcher.calls("http://example.test/private/"), 0);
    assert!(!report.was_visited("http://example.test/private/"));
    assert_eq!(fetcher.calls("http://example.test/private"), 1);
    assert_eq!(report.dropped(DropReason::RobotsDisallowed), 1);
}

#[tokio::test]
async fn test_relative_links_on_directory_page() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/docs/">docs</a>"#)
            .page("http://example.test/docs/", r#"<a href="intro">intro</a>"#)
            .page("http://example.test/docs/intro", "<p>intro</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert!(report.was_visited("http://example.test/docs/intro"));
    assert!(!report.was_visited("http://example.test/intro"));
    assert_eq!(fetcher.calls("http://example.test/intro"), 0);
    assert_eq!(report.stats.pages_processed, 3);
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .robots("http://example.test", "User-agent: *\nDisallow: /\n")
            .page(ROOT, "<p>open</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).respect_robots(false).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(fetcher.calls("http://example.test/robots.txt"), 0);
    assert_eq!(report.stats.pages_processed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_crawl_delay_paces_worker() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .robots("http://example.test", "User-agent: *\nCrawl-delay: 3\n")
            .page(ROOT, r#"<a href="/a">a</a>"#)
            .page("http://example.test/a", "<p>a</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).concurrency(1).build().unwrap();

    let started = tokio::time::Instant::now();
    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(report.stats.pages_processed, 2);
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_default_delay_applies_without_crawl_delay() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/a">a</a>"#)
            .page("http://example.test/a", "<p>a</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT])
        .concurrency(1)
        .default_crawl_delay(Duration::from_secs(2))
        .build()
        .unwrap();

    let started = tokio::time::Instant::now();
    crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_per_domain_limit_caps_parallel_fetches() {
    let links: String = (0..6).map(|i| format!(r#"<a href="/p{i}">p</a>"#)).collect();
    let mut fetcher = MockFetcher::new().page(ROOT, &links);
    for i in 0..6 {
        fetcher = fetcher.slow_page(
            &format!("http://example.test/p{i}"),
            Duration::from_millis(100),
            &format!("<p>{i}</p>"),
        );
    }
    let fetcher = Arc::new(fetcher);
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT])
        .concurrency(4)
        .max_concurrent_per_domain(1)
        .build()
        .unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(report.stats.pages_processed, 7);
    assert_eq!(fetcher.max_in_flight(), 1);
}

#[tokio::test]
async fn test_downloads_routed_to_file_store() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/files/Report.PDF">report</a>"#)
            .route(
                "http://example.test/files/Report.PDF",
                Route::Respond(kodegen_tools_frontier::FetchResponse::new(
                    200,
                    Some("application/pdf".into()),
                    "%PDF-1.7",
                )),
            ),
    );
    let observer = Arc::new(RecordingObserver::default());
    let store = Arc::new(MemoryFileStore::default());
    let config = test_config([ROOT]).build().unwrap();
    let collaborators = collaborators(&config, Arc::clone(&fetcher), Arc::clone(&store));

    let report = Crawler::new(config, collaborators)
        .with_observer(Arc::clone(&observer) as _)
        .run([ROOT])
        .await
        .unwrap();

    assert_eq!(report.stats.downloads, 1);
    assert_eq!(
        store.get("http://example.test/files/Report.PDF").as_deref(),
        Some(&b"%PDF-1.7"[..])
    );
    assert!(matches!(
        observer.outcomes_for("http://example.test/files/Report.PDF").as_slice(),
        [PageOutcome::Downloaded { .. }]
    ));
}

#[tokio::test]
async fn test_page_limit_stops_crawl() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .page(ROOT, r#"<a href="/1">1</a>"#)
            .page("http://example.test/1", r#"<a href="/2">2</a>"#)
            .page("http://example.test/2", r#"<a href="/3">3</a>"#)
            .page("http://example.test/3", "<p>end</p>"),
    );
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).concurrency(1).limit(2).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();

    assert_eq!(report.stats.pages_processed, 2);
    assert!(report.limit_reached);
    assert_eq!(fetcher.calls("http://example.test/3"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_workers() {
    let fetcher = Arc::new(MockFetcher::new().slow_page(ROOT, Duration::from_secs(3600), "<p>slow</p>"));
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT])
        .fetch_timeout(Duration::from_secs(7200))
        .build()
        .unwrap();
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        })
    };

    let report = crawler(config, &fetcher, &observer)
        .with_cancellation(token)
        .run([ROOT])
        .await
        .unwrap();
    canceller.await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.dropped(DropReason::Cancelled), 1);
    // An aborted URL stays admitted
    assert!(report.was_visited(ROOT));
}

#[tokio::test]
async fn test_invalid_and_out_of_scope_seeds() {
    let fetcher = Arc::new(MockFetcher::new().page(ROOT, "<p>home</p>"));
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).build().unwrap();

    let report = crawler(config, &fetcher, &observer)
        .run([ROOT, "ftp://example.test/file", "http://other.test/"])
        .await
        .unwrap();

    assert_eq!(report.dropped(DropReason::InvalidUrl), 1);
    assert_eq!(report.dropped(DropReason::OutOfScope), 1);
    assert_eq!(observer.count(DropReason::InvalidUrl), 1);
    assert_eq!(
        observer.outcomes_for("ftp://example.test/file"),
        vec![PageOutcome::Dropped(DropReason::InvalidUrl)]
    );
    assert!(!report.was_visited("http://other.test/"));
    assert_eq!(fetcher.calls_to_host("other.test"), 0);
}

#[tokio::test]
async fn test_report_serializes() {
    let fetcher = Arc::new(MockFetcher::new().page(ROOT, "<p>home</p>"));
    let observer = Arc::new(RecordingObserver::default());
    let config = test_config([ROOT]).build().unwrap();

    let report = crawler(config, &fetcher, &observer).run([ROOT]).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["visited"][0], ROOT);
    assert_eq!(json["stats"]["pages_processed"], 1);
}
