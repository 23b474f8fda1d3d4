//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the catalog site and run
//! discovery, asset downloads and full crawls end-to-end.

use bookshelf::config::Config;
use bookshelf::crawler::{build_http_client, discover_book_urls, download_text, Coordinator};
use bookshelf::output::{load_catalog, render_site};
use bookshelf::state::BookState;
use bookshelf::url::{CrawlRange, SiteUrls};
use bookshelf::BookshelfError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server with all output
/// under `dir`
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.start_page = 1;
    config.crawler.end_page = Some(2);
    config.output.json_path = dir.join("books.json").to_string_lossy().into_owned();
    config.output.books_folder = dir.join("books").to_string_lossy().into_owned();
    config.output.images_folder = dir.join("images").to_string_lossy().into_owned();
    config.output.pages_folder = dir.join("pages").to_string_lossy().into_owned();
    config
}

/// Builds a listing page with one book card per link and a pagination block
/// ending at `last_page`
fn listing_page(links: &[&str], last_page: u32) -> String {
    let cards: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<table class="d_book"><tr><td><a href="{}"><img src="/shots/x.jpg"></a></td></tr>
                <tr><td><a href="/a1/">Some author</a></td></tr></table>"#,
                href
            )
        })
        .collect();

    format!(
        r#"<html><body><table><tr><td><div id="content">
        <h1>Science fiction</h1>
        {}
        <p class="center"><a class="npage" href="/l55/1/">1</a><a class="npage" href="/l55/{}/">{}</a></p>
        </div></td></tr></table></body></html>"#,
        cards, last_page, last_page
    )
}

/// Builds a book detail page
fn detail_page(title: &str, author: &str, cover: &str, genres: &[&str], comments: &[&str]) -> String {
    let genres: Vec<String> = genres
        .iter()
        .map(|g| format!(r#"<a href="/l55/">{}</a>"#, g))
        .collect();
    let comments: String = comments
        .iter()
        .map(|c| format!(r#"<div class="texts"><b>Reader</b><span class="black">{}</span></div>"#, c))
        .collect();

    format!(
        r#"<html><body><table><tr><td><div id="content">
        <h1>{} &nbsp; :: &nbsp; <a href="/a1/">{}</a></h1>
        <table class="d_book"><tr><td><img src="{}" alt="cover"></td></tr></table>
        <span class="d_book">Genre: {}</span>
        {}
        </div></td></tr></table></body></html>"#,
        title,
        author,
        cover,
        genres.join(", "),
        comments
    )
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, at: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_discovery_preserves_page_and_document_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/", "/b2/"], 3)).await;
    mount_html(&mock_server, "/l55/2/", listing_page(&["/b3/"], 3)).await;
    mount_html(&mock_server, "/l55/3/", listing_page(&["/b4/", "/b5/"], 3)).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let client = build_http_client(&config.user_agent).unwrap();
    let site = SiteUrls::new(&config.site).unwrap();

    let urls = discover_book_urls(&client, &site, CrawlRange::new(1, 4))
        .await
        .unwrap();

    let expected: Vec<String> = (1..=5).map(|i| format!("{}/b{}/", base_url, i)).collect();
    let actual: Vec<String> = urls.iter().map(|u| u.to_string()).collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_redirected_book_is_skipped_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/", "/b2/", "/b3/"], 1)).await;
    mount_redirect(&mock_server, "/b1/").await;
    mount_html(
        &mock_server,
        "/b2/",
        detail_page("Second", "Author Two", "/shots/2.jpg", &["Sci-Fi"], &[]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/b3/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.skip_text = true;
    config.crawler.skip_images = true;

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run(CrawlRange::new(1, 2)).await.unwrap();

    assert_eq!(report.books_discovered, 3);
    assert_eq!(report.books_recorded, 1);
    assert_eq!(report.skipped[&BookState::SkippedRedirected], 1);
    assert_eq!(report.skipped[&BookState::SkippedHttpError], 1);

    let catalog = load_catalog(&dir.path().join("books.json")).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Second");
    assert_eq!(catalog[0].author, "Author Two");
    assert_eq!(catalog[0].genre, vec!["Sci-Fi"]);
    assert!(catalog[0].txt.is_none());
    assert!(catalog[0].image.is_none());
}

#[tokio::test]
async fn test_text_sentinel_creates_no_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", "7"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let client = build_http_client(&config.user_agent).unwrap();
    let site = SiteUrls::new(&config.site).unwrap();
    let books = dir.path().join("books");

    let saved = download_text(&client, &site, "Missing", 7, &books)
        .await
        .unwrap();

    assert_eq!(saved, None);
    assert!(!books.join("Missing.txt").exists());
}

#[tokio::test]
async fn test_text_http_error_is_distinct_from_sentinel() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let client = build_http_client(&config.user_agent).unwrap();
    let site = SiteUrls::new(&config.site).unwrap();

    let result = download_text(&client, &site, "Broken", 8, &dir.path().join("books")).await;
    assert!(matches!(result, Err(BookshelfError::Http { status: 500, .. })));
}

#[tokio::test]
async fn test_treasure_island_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b239/"], 1)).await;
    mount_html(
        &mock_server,
        "/b239/",
        detail_page(
            "Treasure Island",
            "R. Stevenson",
            "/shots/239.jpg",
            &["Adventure", "Classic"],
            &["A great read.", "Pirates!"],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", "239"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Fifteen men on the dead man's chest"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shots/239.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let output = config.output.clone();

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run(CrawlRange::new(1, 2)).await.unwrap();
    assert_eq!(report.books_recorded, 1);
    assert_eq!(report.texts_saved, 1);
    assert_eq!(report.covers_saved, 1);
    assert_eq!(report.catalog_size, 1);

    let text = std::fs::read_to_string(dir.path().join("books/Treasure Island.txt")).unwrap();
    assert_eq!(text, "Fifteen men on the dead man's chest");
    let cover = std::fs::read(dir.path().join("images/239. Cover for Treasure Island")).unwrap();
    assert_eq!(cover, vec![0xFF, 0xD8, 0xFF, 0xE0]);

    let catalog = load_catalog(&dir.path().join("books.json")).unwrap();
    assert_eq!(catalog.len(), 1);
    let entry = &catalog[0];
    assert_eq!(entry.name, "Treasure Island");
    assert_eq!(entry.author, "R. Stevenson");
    assert_eq!(entry.genre, vec!["Adventure", "Classic"]);
    assert_eq!(entry.comment, vec!["A great read.", "Pirates!"]);
    let txt = entry.txt.as_deref().unwrap();
    assert!(txt.starts_with("../"));
    assert!(txt.ends_with("books/Treasure Island.txt"));
    let image = entry.image.as_deref().unwrap();
    assert!(image.starts_with("../"));
    assert!(image.ends_with("images/239. Cover for Treasure Island"));

    let pages = render_site(&dir.path().join("books.json"), &output).unwrap();
    assert_eq!(pages.len(), 1);
    let html = std::fs::read_to_string(&pages[0]).unwrap();
    assert!(html.contains("Treasure Island"));
    assert!(html.contains("R. Stevenson"));
}

#[tokio::test]
async fn test_missing_text_keeps_book_without_txt() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b5/"], 1)).await;
    mount_html(
        &mock_server,
        "/b5/",
        detail_page("No Text", "Anon", "/shots/5.jpg", &[], &[]),
    )
    .await;
    mount_redirect(&mock_server, "/txt.php").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.skip_images = true;

    let report = Coordinator::new(config)
        .unwrap()
        .run(CrawlRange::new(1, 2))
        .await
        .unwrap();
    assert_eq!(report.books_recorded, 1);
    assert_eq!(report.texts_unavailable, 1);

    let catalog = load_catalog(&dir.path().join("books.json")).unwrap();
    assert_eq!(catalog[0].name, "No Text");
    assert!(catalog[0].txt.is_none());
}

#[tokio::test]
async fn test_two_runs_merge_into_one_catalog() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/"], 2)).await;
    mount_html(&mock_server, "/l55/2/", listing_page(&["/b2/"], 2)).await;
    mount_html(
        &mock_server,
        "/b1/",
        detail_page("First", "A", "/shots/1.jpg", &[], &[]),
    )
    .await;
    mount_html(
        &mock_server,
        "/b2/",
        detail_page("Second", "B", "/shots/2.jpg", &[], &[]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.skip_text = true;
    config.crawler.skip_images = true;

    let coordinator = Coordinator::new(config).unwrap();
    let first = coordinator.run(CrawlRange::new(1, 2)).await.unwrap();
    assert_eq!(first.catalog_size, 1);
    let second = coordinator.run(CrawlRange::new(2, 3)).await.unwrap();
    assert_eq!(second.catalog_size, 2);

    let content = std::fs::read_to_string(dir.path().join("books.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_listing_page_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/"], 2)).await;
    Mock::given(method("GET"))
        .and(path("/l55/2/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());

    let result = Coordinator::new(config)
        .unwrap()
        .run(CrawlRange::new(1, 3))
        .await;

    assert!(matches!(result, Err(BookshelfError::Http { status: 503, .. })));
    assert!(!dir.path().join("books.json").exists());
}

#[tokio::test]
async fn test_cover_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/"], 1)).await;
    mount_html(
        &mock_server,
        "/b1/",
        detail_page("Coverless", "A", "/shots/1.jpg", &[], &[]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Some text"))
        .mount(&mock_server)
        .await;
    // No mock for the cover: the server answers 404

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());

    let result = Coordinator::new(config)
        .unwrap()
        .run(CrawlRange::new(1, 2))
        .await;

    assert!(matches!(result, Err(BookshelfError::Http { status: 404, .. })));
    assert!(!dir.path().join("books.json").exists());
    // The text saved before the cover failed does not stay behind
    assert!(!dir.path().join("books/Coverless.txt").exists());
}

#[tokio::test]
async fn test_text_http_error_skips_book_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/", "/b2/"], 1)).await;
    mount_html(
        &mock_server,
        "/b1/",
        detail_page("Broken Text", "A", "/shots/1.jpg", &[], &[]),
    )
    .await;
    mount_html(
        &mock_server,
        "/b2/",
        detail_page("Good Text", "B", "/shots/2.jpg", &[], &[]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Readable"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.skip_images = true;

    let report = Coordinator::new(config)
        .unwrap()
        .run(CrawlRange::new(1, 2))
        .await
        .unwrap();

    assert_eq!(report.books_recorded, 1);
    assert_eq!(report.skipped[&BookState::SkippedHttpError], 1);
    assert_eq!(report.texts_saved, 1);

    let catalog = load_catalog(&dir.path().join("books.json")).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].name, "Good Text");
}

#[tokio::test]
async fn test_detail_page_transport_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Nothing listens on port 1: the connection is refused
    mount_html(
        &mock_server,
        "/l55/1/",
        listing_page(&["/b1/", "http://127.0.0.1:1/b2/"], 1),
    )
    .await;
    mount_html(
        &mock_server,
        "/b1/",
        detail_page("Reachable", "A", "/shots/1.jpg", &[], &[]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.skip_text = true;
    config.crawler.skip_images = true;

    let result = Coordinator::new(config)
        .unwrap()
        .run(CrawlRange::new(1, 2))
        .await;

    assert!(matches!(result, Err(BookshelfError::Transport { .. })));
    assert!(!dir.path().join("books.json").exists());
}

#[tokio::test]
async fn test_long_title_fits_file_name_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Long"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let client = build_http_client(&config.user_agent).unwrap();
    let site = SiteUrls::new(&config.site).unwrap();

    let saved = download_text(&client, &site, &"Ж".repeat(130), 1, &dir.path().join("books"))
        .await
        .unwrap()
        .unwrap();

    let name = saved.file_name().unwrap().to_str().unwrap();
    assert!(name.len() <= 255);
    assert!(name.ends_with(".txt"));
    assert_eq!(std::fs::read_to_string(&saved).unwrap(), "Long");
}

#[tokio::test]
async fn test_text_is_decoded_with_declared_charset() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // "Привет" in windows-1251
    Mock::given(method("GET"))
        .and(path("/txt.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2], "text/plain; charset=windows-1251"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let client = build_http_client(&config.user_agent).unwrap();
    let site = SiteUrls::new(&config.site).unwrap();

    let saved = download_text(&client, &site, "Greeting", 3, &dir.path().join("books"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(std::fs::read_to_string(saved).unwrap(), "Привет");
}

#[tokio::test]
async fn test_out_of_range_last_page_is_malformed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/l55/1/",
        listing_page(&["/b1/"], u32::MAX),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.end_page = None;

    let result = Coordinator::new(config).unwrap().resolve_range().await;
    assert!(matches!(result, Err(BookshelfError::MalformedPage { .. })));
}

#[tokio::test]
async fn test_malformed_detail_page_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/"], 1)).await;
    mount_html(
        &mock_server,
        "/b1/",
        "<html><body><p>Nothing here</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, dir.path());

    let result = Coordinator::new(config)
        .unwrap()
        .run(CrawlRange::new(1, 2))
        .await;

    assert!(matches!(result, Err(BookshelfError::MalformedPage { .. })));
}

#[tokio::test]
async fn test_last_page_is_read_when_no_end_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(&mock_server, "/l55/1/", listing_page(&["/b1/"], 3)).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.start_page = 2;
    config.crawler.end_page = None;

    let range = Coordinator::new(config)
        .unwrap()
        .resolve_range()
        .await
        .unwrap();

    assert_eq!(range, CrawlRange::new(2, 4));
}
