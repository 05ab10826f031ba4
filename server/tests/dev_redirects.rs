use std::fs;
use std::path::PathBuf;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use redirects::{Options, Redirects, RuleTable};
use server::{app, DevRedirects};
use tower::ServiceExt;

const RULES: &str = "/old/ /new/\n/ext/ https://example.com/external\n/caf%C3%A9/ /menu/\n/dup/ /first/\n/dup/ /second/\n";

fn site_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("server-{name}-{}", std::process::id()));
    fs::create_dir_all(root.join("kept")).unwrap();
    fs::write(root.join("kept/index.html"), "kept").unwrap();
    fs::create_dir_all(root.join("new")).unwrap();
    fs::write(root.join("new/index.html"), "new").unwrap();
    fs::write(root.join("notfound.html"), "not found").unwrap();
    root
}

fn dev_app(name: &str, base: &str) -> Router {
    let redirects = Redirects {
        table: RuleTable::parse(RULES).unwrap(),
        options: Options {
            base: base.to_owned(),
            ..Options::default()
        },
    };
    app(&site_root(name), Some(DevRedirects::new(redirects)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_owned());
    (response.status(), location)
}

#[tokio::test]
async fn redirects_matching_paths() {
    let (status, location) = get(dev_app("match", "/"), "/old").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/new/"));
}

#[tokio::test]
async fn query_string_does_not_affect_matching() {
    let (status, location) = get(dev_app("query", "/"), "/old/?utm=x").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/new/"));
}

#[tokio::test]
async fn external_destinations_are_verbatim() {
    let (status, location) = get(dev_app("external", "/docs/"), "/ext/").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("https://example.com/external"));
}

#[tokio::test]
async fn internal_redirects_land_on_served_pages() {
    let app = dev_app("follow", "/docs/");
    let (status, location) = get(app.clone(), "/old/").await;
    assert_eq!(status, StatusCode::FOUND);
    let location = location.unwrap();
    assert_eq!(location, "/new/");

    let (status, _) = get(app, &location).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn encoded_request_paths_match_decoded_rules() {
    let (status, location) = get(dev_app("encoded", "/"), "/caf%C3%A9").await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location.as_deref(), Some("/menu/"));
}

#[tokio::test]
async fn first_rule_wins() {
    let (_, location) = get(dev_app("dup", "/"), "/dup/").await;
    assert_eq!(location.as_deref(), Some("/first/"));
}

#[tokio::test]
async fn misses_fall_through_to_files() {
    let (status, location) = get(dev_app("miss", "/"), "/kept/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(location, None);
}

#[tokio::test]
async fn undecodable_paths_fall_through() {
    let (status, location) = get(dev_app("undecodable", "/"), "/bad%zz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(location, None);
}

#[tokio::test]
async fn without_dev_mode_nothing_redirects() {
    let (status, location) = get(app(&site_root("static"), None), "/old/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(location, None);
}
