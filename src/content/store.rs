//! Compiled post collection and the shared handle the server reads from

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

use super::Post;

/// Read-only, order-stable collection of compiled posts.
///
/// Posts are kept newest first (ties broken by slug) and indexed by slug.
#[derive(Debug, Clone, Default)]
pub struct Posts {
    posts: Vec<Post>,
    index: HashMap<String, usize>,
}

impl Posts {
    /// Build a collection; slugs are expected to be unique
    pub fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        let index = posts
            .iter()
            .enumerate()
            .map(|(i, p)| (p.slug.clone(), i))
            .collect::<HashMap<_, _>>();
        debug_assert_eq!(index.len(), posts.len(), "duplicate slug in collection");
        Self { posts, index }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Every post, drafts included
    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    /// Look up a published post by slug
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.index
            .get(slug)
            .map(|&i| &self.posts[i])
            .filter(|p| p.published)
    }

    /// Published posts, newest first
    pub fn published(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| p.published)
    }

    /// Published posts split into (featured, the rest), both newest first
    pub fn partition_featured(&self) -> (Vec<&Post>, Vec<&Post>) {
        self.published().partition(|p| p.featured)
    }

    /// Published posts carrying `tag`
    pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.published()
            .filter(move |p| p.tags.iter().any(|t| t == tag))
    }

    /// Tag usage over published posts, most used first
    pub fn tags(&self) -> IndexMap<&str, usize> {
        let mut tags: IndexMap<&str, usize> = IndexMap::new();
        for post in self.published() {
            for tag in &post.tags {
                *tags.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        tags.sort_by(|ka, a, kb, b| b.cmp(a).then_with(|| ka.cmp(kb)));
        tags
    }

    /// The published posts (newer, older) around `slug`
    pub fn neighbors(&self, slug: &str) -> (Option<&Post>, Option<&Post>) {
        let published: Vec<&Post> = self.published().collect();
        let Some(pos) = published.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let newer = pos.checked_sub(1).map(|i| published[i]);
        let older = published.get(pos + 1).copied();
        (newer, older)
    }
}

/// Process-wide handle to the current collection.
///
/// Readers always see a complete collection; a new compilation pass swaps
/// the whole thing in at once.
#[derive(Debug)]
pub struct ContentStore {
    current: ArcSwap<Posts>,
}

impl ContentStore {
    pub fn new(posts: Posts) -> Self {
        Self {
            current: ArcSwap::from_pointee(posts),
        }
    }

    /// Snapshot of the current collection
    pub fn load(&self) -> Arc<Posts> {
        self.current.load_full()
    }

    /// Publish a freshly compiled collection
    pub fn replace(&self, posts: Posts) {
        tracing::info!("Publishing {} compiled posts", posts.len());
        self.current.store(Arc::new(posts));
    }
}
