//! Content loader - compiles blog posts from the content directory

use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::post::{derive_slug, derive_url, read_time, PostBody};
use super::{FrontMatter, MarkdownRenderer, Post, Posts};
use crate::config::BlogConfig;
use crate::error::{CompileError, ContentError};
use crate::Portfolio;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Loads and validates posts from the content directory
pub struct ContentLoader {
    content_dir: PathBuf,
    blog: BlogConfig,
    renderer: MarkdownRenderer,
}

impl ContentLoader {
    /// Create a new content loader
    pub fn new(portfolio: &Portfolio) -> Self {
        let highlight = &portfolio.config.highlight;
        Self {
            content_dir: portfolio.content_dir.clone(),
            blog: portfolio.config.blog.clone(),
            renderer: MarkdownRenderer::with_options(&highlight.theme, highlight.line_number),
        }
    }

    /// Run a full compilation pass.
    ///
    /// Every document is checked and all errors are returned together; a single
    /// invalid document fails the whole pass.
    pub fn compile(&self) -> Result<Posts, CompileError> {
        let (sources, mut errors) = self.walk()?;
        tracing::debug!("Discovered {} documents", sources.len());

        let mut posts = Vec::with_capacity(sources.len());

        for relative in &sources {
            match self.load_post(relative) {
                Ok(post) => posts.push(post),
                Err(mut errs) => errors.append(&mut errs),
            }
        }

        let mut seen: HashMap<&str, &Path> = HashMap::new();
        for post in &posts {
            if let Some(first) = seen.insert(&post.slug, &post.source) {
                errors.push(ContentError::DuplicateSlug {
                    slug: post.slug.clone(),
                    first: first.to_path_buf(),
                    second: post.source.clone(),
                });
            }
        }

        if !errors.is_empty() {
            return Err(CompileError::Invalid(errors));
        }

        Ok(Posts::new(posts))
    }

    /// Relative paths of every document matching the blog patterns, sorted.
    ///
    /// A matching path that cannot be read fails discovery.
    pub fn discover(&self) -> Result<Vec<PathBuf>, CompileError> {
        let (sources, errors) = self.walk()?;
        if !errors.is_empty() {
            return Err(CompileError::Invalid(errors));
        }
        Ok(sources)
    }

    /// Matching documents plus a `Read` error for each matching path the walk could not visit
    fn walk(&self) -> Result<(Vec<PathBuf>, Vec<ContentError>), CompileError> {
        let patterns = self
            .blog
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| CompileError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !self.content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", self.content_dir);
            return Ok((Vec::new(), Vec::new()));
        }

        let is_match = |relative: &Path| {
            patterns
                .iter()
                .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
        };

        let mut sources = Vec::new();
        let mut errors = Vec::new();
        for entry in WalkDir::new(&self.content_dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let relative = e
                        .path()
                        .and_then(|p| p.strip_prefix(&self.content_dir).ok())
                        .map(Path::to_path_buf);
                    match relative {
                        Some(relative) if is_match(relative.as_path()) => {
                            errors.push(ContentError::Read {
                                path: relative,
                                message: e.to_string(),
                            });
                        }
                        _ => tracing::warn!("Skipping unreadable entry: {}", e),
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.content_dir) else {
                continue;
            };
            if is_match(relative) {
                sources.push(relative.to_path_buf());
            }
        }

        sources.sort();
        Ok((sources, errors))
    }

    /// Load a single post; `relative` is relative to the content directory
    fn load_post(&self, relative: &Path) -> Result<Post, Vec<ContentError>> {
        // Path-derived fields first
        let slug = derive_slug(relative, &self.blog.strip_prefix);
        let url = derive_url(&self.blog.url_prefix, &slug);

        let full_path = self.content_dir.join(relative);
        let content = fs::read_to_string(&full_path).map_err(|e| {
            vec![ContentError::Read {
                path: relative.to_path_buf(),
                message: e.to_string(),
            }]
        })?;

        let (fm, body) = FrontMatter::parse(&content).map_err(|e| {
            vec![ContentError::Frontmatter {
                path: relative.to_path_buf(),
                message: e.to_string(),
            }]
        })?;
        let meta = fm.into_meta(relative)?;

        let html = self.renderer.render(body);
        let read_time = read_time(body, self.blog.words_per_minute);

        tracing::debug!("Compiled {:?} -> {} ({} min)", relative, url, read_time);

        Ok(Post::new(
            meta,
            slug,
            url,
            read_time,
            PostBody {
                raw: body.to_string(),
                html,
            },
            relative.to_path_buf(),
        ))
    }
}
