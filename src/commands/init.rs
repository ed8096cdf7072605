//! Initialize a new portfolio site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# Portfolio Configuration

# Site
title: My Portfolio
author: John Doe
url: http://example.com

# Directory
content_dir: content
public_dir: public

# Blog content
blog:
  patterns:
    - blog/**/*.md
    - blog/**/*.mdx
  strip_prefix: blog/
  url_prefix: /blog/
  words_per_minute: 200

# Code highlighting
highlight:
  theme: base16-ocean.dark
  line_number: false

# Contact form delivery (the API key is read from the environment)
contact:
  from: contact@resend.dev
  to: ''
  subject_prefix: 'Contact Form: '
  api_key_env: RESEND_API_KEY
  timeout_secs: 10
  max_retries: 0

# Server
server:
  ip: localhost
  port: 4000
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Site already initialized: {:?}", config_path);
    }

    let blog_dir = target_dir.join("content/blog");
    fs::create_dir_all(&blog_dir)
        .with_context(|| format!("Failed to create {:?}", blog_dir))?;
    fs::create_dir_all(target_dir.join("public"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
description: The first post on this site
date: {today}
tags: [meta]
featured: true
---

Welcome to your portfolio blog! Posts live under `content/blog/` and are
compiled before the server starts.

## Writing posts

```bash
$ portfolio-rs new "My New Post"
```

## Running the server

```bash
$ portfolio-rs server --watch
```
"#
    );

    fs::write(blog_dir.join("hello-world.md"), sample_post)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Portfolio;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_compilable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("_config.yml").exists());
        let portfolio = Portfolio::new(dir.path()).unwrap();
        assert_eq!(portfolio.config.title, "My Portfolio");

        let posts = portfolio.compile().unwrap();
        assert_eq!(posts.len(), 1);
        let post = posts.get("hello-world").unwrap();
        assert_eq!(post.url, "/blog/hello-world");
        assert!(post.featured);
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
