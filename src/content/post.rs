//! Post model and derived fields

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

use super::frontmatter::PostMeta;

/// A compiled blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub published: bool,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub featured: bool,

    /// Unique key, derived from the document path
    pub slug: String,

    /// Canonical path: url prefix + slug
    pub url: String,

    /// Estimated minutes to read, at least 1
    pub read_time: usize,

    pub body: PostBody,

    /// Source file path relative to the content directory
    #[serde(skip)]
    pub source: PathBuf,
}

/// Raw markdown and the rendered HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostBody {
    pub raw: String,
    pub html: String,
}

/// Post fields without the body, for listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub date: &'a DateTime<Utc>,
    pub tags: &'a [String],
    pub image: Option<&'a str>,
    pub featured: bool,
    pub slug: &'a str,
    pub url: &'a str,
    pub read_time: usize,
}

impl Post {
    /// Assemble a post from validated metadata, its path-derived identity and its body
    pub fn new(
        meta: PostMeta,
        slug: String,
        url: String,
        read_time: usize,
        body: PostBody,
        source: PathBuf,
    ) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
            date: meta.date,
            published: meta.published,
            tags: meta.tags,
            image: meta.image,
            featured: meta.featured,
            slug,
            url,
            read_time,
            body,
            source,
        }
    }

    pub fn summary(&self) -> PostSummary<'_> {
        PostSummary {
            title: &self.title,
            description: &self.description,
            date: &self.date,
            tags: &self.tags,
            image: self.image.as_deref(),
            featured: self.featured,
            slug: &self.slug,
            url: &self.url,
            read_time: self.read_time,
        }
    }
}

/// Derive the slug from a path relative to the content directory.
///
/// The extension is dropped, a trailing `index` collapses onto its directory,
/// separators are normalised to `/` and `strip_prefix` is removed.
pub fn derive_slug(relative: &Path, strip_prefix: &str) -> String {
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.len() > 1 && parts.last().map(String::as_str) == Some("index") {
        parts.pop();
    }

    let flattened = parts.join("/");
    match flattened.strip_prefix(strip_prefix) {
        Some(stripped) => stripped.to_string(),
        None => flattened,
    }
}

/// Canonical URL for a slug
pub fn derive_url(url_prefix: &str, slug: &str) -> String {
    format!("{}{}", url_prefix, slug)
}

/// Count words as runs of non-whitespace; punctuation-only tokens count too
pub fn word_count(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Reading time in whole minutes, rounded up, never below 1
pub fn read_time(body: &str, words_per_minute: usize) -> usize {
    word_count(body).div_ceil(words_per_minute.max(1)).max(1)
}
