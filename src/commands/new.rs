//! Create a new blog post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Portfolio;

/// Write a post scaffold under the first blog directory.
///
/// `path` overrides the file name (relative to the blog directory). A `.md` or
/// `.mdx` extension is kept; anything else gets `.md`. Without `path` the
/// slugified title is used.
pub fn create_post(portfolio: &Portfolio, title: &str, path: Option<&str>) -> Result<PathBuf> {
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("Post title must not be empty");
    }

    let (stem, ext) = match path {
        Some(p) => split_extension(p.trim_matches('/')),
        None => (slug::slugify(title), "md"),
    };
    if stem.is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}", title);
    }

    let blog_dir = portfolio
        .content_dir
        .join(portfolio.config.blog.strip_prefix.trim_end_matches('/'));
    let file_path = blog_dir.join(format!("{}.{}", stem, ext));

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let date = chrono::Local::now().format("%Y-%m-%d");
    // The title doubles as the description until the author writes one
    let quoted = serde_yaml::to_string(title)?;
    let quoted = quoted.trim_end();
    let content = format!(
        "---\ntitle: {quoted}\ndescription: {quoted}\ndate: {date}\ntags: []\npublished: false\n---\n\n"
    );

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

fn split_extension(path: &str) -> (String, &'static str) {
    if let Some(stem) = path.strip_suffix(".mdx") {
        (stem.to_string(), "mdx")
    } else if let Some(stem) = path.strip_suffix(".md") {
        (stem.to_string(), "md")
    } else {
        (path.to_string(), "md")
    }
}
