//! Content module - compiles markdown posts into a typed collection

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod store;

pub use frontmatter::{parse_date_string, FrontMatter, FrontmatterError, PostMeta};
pub use loader::ContentLoader;
pub use markdown::{inject_heading_anchors, render_gfm, MarkdownRenderer};
pub use post::{derive_slug, derive_url, read_time, word_count, Post, PostBody, PostSummary};
pub use store::{ContentStore, Posts};
