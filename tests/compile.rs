//! End-to-end compilation of a site directory

use std::fs;
use std::path::Path;

use portfolio_rs::error::{CompileError, ContentError};
use portfolio_rs::Portfolio;
use tempfile::TempDir;

fn write(base: &Path, rel: &str, content: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn post(title: &str, date: &str, extra: &str, body: &str) -> String {
    format!(
        "---\ntitle: {}\ndescription: About {}\ndate: {}\n{}---\n{}",
        title, title, date, extra, body
    )
}

#[test]
fn test_compiles_site_into_ordered_collection() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    write(
        base,
        "content/blog/react.md",
        &post("React", "2024-01-15", "tags: [react, web]\nfeatured: true\n", "# Intro\n\nHello"),
    );
    write(
        base,
        "content/blog/nextjs/index.mdx",
        &post("Next.js", "2024-01-08", "tags: web\n", "Some text"),
    );
    write(
        base,
        "content/blog/old.md",
        &post("Old", "2023-12-01", "", "Old text"),
    );
    write(
        base,
        "content/blog/draft.md",
        &post("Draft", "2024-02-01", "published: false\n", "Later"),
    );
    write(base, "content/notes/ignored.md", "not front-matter");

    let portfolio = Portfolio::new(base).unwrap();
    let posts = portfolio.compile().unwrap();

    assert_eq!(posts.len(), 4);
    let slugs: Vec<_> = posts.published().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["react", "nextjs", "old"]);

    let react = posts.get("react").unwrap();
    assert_eq!(react.url, "/blog/react");
    assert_eq!(react.read_time, 1);
    assert!(react.body.html.contains("<h1 id=\"intro\">Intro</h1>"));

    assert!(posts.get("draft").is_none());
    assert_eq!(posts.tags().get("web"), Some(&2));

    let (featured, rest) = posts.partition_featured();
    assert_eq!(featured.len(), 1);
    assert_eq!(rest.len(), 2);
}

#[test]
fn test_reports_every_invalid_document() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    write(base, "content/blog/a.md", "---\ndescription: x\ndate: 2024-01-01\n---\n");
    write(base, "content/blog/b.md", &post("B", "not a date", "", ""));
    write(base, "content/blog/c.md", &post("C", "2024-01-01", "slug: custom\n", ""));
    write(base, "content/blog/ok.md", &post("Ok", "2024-01-01", "", "fine"));

    let portfolio = Portfolio::new(base).unwrap();
    let err = portfolio.compile().unwrap_err();

    let errors = err.errors();
    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ContentError::MissingField { field: "title", .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ContentError::InvalidDate { .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ContentError::DerivedField { field, .. } if field == "slug")));
    assert!(matches!(err, CompileError::Invalid(_)));
}

#[test]
fn test_custom_config_changes_layout() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    write(
        base,
        "_config.yml",
        "content_dir: posts\nblog:\n  patterns: ['articles/*.md']\n  strip_prefix: articles/\n  url_prefix: /writing/\n",
    );
    write(base, "posts/articles/first.md", &post("First", "2024-03-01", "", "x"));
    write(base, "posts/articles/deep/skipped.md", &post("Deep", "2024-03-01", "", "x"));

    let portfolio = Portfolio::new(base).unwrap();
    let posts = portfolio.compile().unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts.all()[0].url, "/writing/first");
}

#[test]
fn test_build_writes_posts_json() {
    let dir = TempDir::new().unwrap();
    let base = dir.path();
    write(base, "content/blog/one.md", &post("One", "2024-01-01", "", "word"));

    let portfolio = Portfolio::new(base).unwrap();
    portfolio.build().unwrap();

    let json = fs::read_to_string(base.join("public/posts.json")).unwrap();
    assert!(json.contains("\"slug\": \"one\""));

    portfolio.clean().unwrap();
    assert!(!base.join("public").exists());
}
