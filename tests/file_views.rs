//! Integration tests for rendering templates from a views directory

use std::fs;
use std::path::Path;

use heirloom::{Context, Engine, EngineConfig, MailBody, RenderError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_view(root: &Path, relative: &str, source: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

fn views() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_view(
        dir.path(),
        "layouts/main.html",
        r#"<html><title>@yield("title", "Site")</title><body>@yield("body")</body></html>"#,
    );
    write_view(
        dir.path(),
        "pages/home.html",
        r#"@extends("layouts.main")
@section("title", title)
@section("body")@include("partials.greeting")@endsection"#,
    );
    write_view(dir.path(), "partials/greeting.html", "Welcome, {{ user ?? 'stranger' }}!");
    dir
}

#[test]
fn test_render_dotted_names_from_disk() {
    let dir = views();
    let engine = Engine::new(EngineConfig::default().with_views_root(dir.path()));
    let data = Context::new().with("title", "Home").with("user", "Ada");
    assert_eq!(
        engine.fetch("pages.home", &data).unwrap(),
        "<html><title>Home</title><body>Welcome, Ada!</body></html>"
    );
}

#[test]
fn test_missing_view_reports_path() {
    let dir = views();
    let engine = Engine::new(EngineConfig::default().with_views_root(dir.path()));
    match engine.fetch("pages.about", &Context::new()) {
        Err(RenderError::TemplateNotFound { name, location }) => {
            assert_eq!(name, "pages.about");
            assert!(location.ends_with("about.html"), "location was {}", location);
        }
        other => panic!("Expected not found, got {:?}", other),
    }
}

#[test]
fn test_names_cannot_escape_views_root() {
    let dir = views();
    let engine = Engine::new(EngineConfig::default().with_views_root(dir.path()));
    assert!(matches!(
        engine.fetch("..secret", &Context::new()),
        Err(RenderError::InvalidTemplateName { .. })
    ));
}

#[test]
fn test_config_file_drives_engine() {
    let dir = tempfile::tempdir().unwrap();
    write_view(dir.path(), "templates/hello.tpl", "Hello {{ who }}");
    fs::write(
        dir.path().join("heirloom.toml"),
        "views_root = \"templates\"\nextension = \"tpl\"\ncache = false\n",
    )
    .unwrap();

    let config = EngineConfig::from_file(&dir.path().join("heirloom.toml")).unwrap();
    let engine = Engine::new(config);
    let out = engine
        .fetch("hello", &Context::new().with("who", "file"))
        .unwrap();
    assert_eq!(out, "Hello file");
    assert!(!engine.registry().contains("hello"));
}

#[test]
fn test_cache_can_be_cleared_after_edit() {
    let dir = views();
    let engine = Engine::new(EngineConfig::default().with_views_root(dir.path()));
    let data = Context::new().with("user", "Ada");
    assert_eq!(engine.fetch("partials.greeting", &data).unwrap(), "Welcome, Ada!");

    write_view(dir.path(), "partials/greeting.html", "Bye, {{ user }}.");
    assert_eq!(engine.fetch("partials.greeting", &data).unwrap(), "Welcome, Ada!");

    engine.registry().clear();
    assert_eq!(engine.fetch("partials.greeting", &data).unwrap(), "Bye, Ada.");
}

#[test]
fn test_mail_body_from_view_and_fallback() {
    let dir = views();
    let engine = Engine::new(EngineConfig::default().with_views_root(dir.path()));
    let data = Context::new().with("user", "Ada");
    let mail = MailBody::new(&engine);

    assert_eq!(
        mail.compose(Some("partials.greeting"), &data).unwrap(),
        "Welcome, Ada!"
    );
    insta::assert_snapshot!(mail.compose(None, &data).unwrap().replace('\n', " "), @r#"{   "user": "Ada" }"#);
}

#[test]
fn test_parse_errors_render_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    write_view(dir.path(), "bad.html", "line one\n{{ user");
    let engine = Engine::new(EngineConfig::default().with_views_root(dir.path()));
    let err = engine.fetch("bad", &Context::new()).unwrap_err();
    let diagnostics = err.diagnostics().expect("parse errors carry diagnostics");
    assert!(diagnostics.contains("bad"));
}
