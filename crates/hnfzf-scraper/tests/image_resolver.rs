//! `ImageResolver` against a mock detail page.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use wiremock::matchers::{header, header_exists, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hnfzf_scraper::{ImageResolver, ScraperConfig};

fn resolver_for(server: &MockServer) -> ImageResolver {
    let config = ScraperConfig {
        search_base_url: server.uri(),
        detail_timeout_secs: 2,
        image_cdn_hosts: vec!["cdn.".to_string()],
        ..ScraperConfig::default()
    };
    ImageResolver::new(&config).expect("build resolver")
}

fn tracking_url(destination: &str) -> String {
    format!(
        "https://track.example/r?url={}",
        utf8_percent_encode(destination, NON_ALPHANUMERIC)
    )
}

#[tokio::test]
async fn detail_fetch_sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/1.html"))
        .and(header_regex("user-agent", "^Mozilla/5.0"))
        .and(header_exists("accept-language"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="product-media"><img src="/media/1.jpg"></div>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let images = resolver
        .resolve_images(&tracking_url(&format!("{}/p/1.html", server.uri())), "")
        .await;

    assert_eq!(images, vec![format!("{}/media/1.jpg", server.uri())]);
}

#[tokio::test]
async fn detail_page_404_keeps_thumbnail_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/gone.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let images = resolver
        .resolve_images(
            &tracking_url(&format!("{}/p/gone.html", server.uri())),
            "//thumbs.example/thumb.php?f=https%3A%2F%2Fimages.shop.example%2Fa.png",
        )
        .await;

    assert_eq!(images, vec!["https://images.shop.example/a.png"]);
}

#[tokio::test]
async fn detail_url_without_redirect_param_is_not_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let images = resolver
        .resolve_images(&format!("{}/p/direct.html", server.uri()), "//example.com/x.jpg")
        .await;

    assert_eq!(images, vec!["https://example.com/x.jpg"]);
}

#[tokio::test]
async fn gallery_duplicates_of_thumbnail_variants_are_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/dupe.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"
            <meta property="og:image" content="https://cdn.example/a.jpg">
            <div class="product-gallery">
              <img src="https://cdn.example/a.jpg?w=600&h=600">
              <img src="/img/logo.svg">
              <img src="/media/a-back.jpg">
            </div>
            "#,
        ))
        .mount(&server)
        .await;

    let resolver = resolver_for(&server);
    let images = resolver
        .resolve_images(
            &tracking_url(&format!("{}/p/dupe.html", server.uri())),
            "/thumb.php?f=https%3A%2F%2Fcdn.example%2Fa.jpg",
        )
        .await;

    assert_eq!(
        images,
        vec![
            "https://cdn.example/a.jpg".to_string(),
            "https://cdn.example/a.jpg?w=300&h=300".to_string(),
            "https://cdn.example/a.jpg?w=600&h=600".to_string(),
            "https://cdn.example/a.jpg?w=1200&h=1200".to_string(),
            format!("{}/media/a-back.jpg", server.uri()),
        ]
    );
}
