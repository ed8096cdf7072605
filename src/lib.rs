//! portfolio-rs: content compiler and contact backend for a portfolio site
//!
//! Markdown blog posts are compiled ahead of serving into a typed, read-only
//! collection, and a small HTTP server exposes that collection next to a
//! contact endpoint that forwards validated submissions to an email provider.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::content::{ContentLoader, Posts};
use crate::error::CompileError;

/// The portfolio site application
#[derive(Debug, Clone)]
pub struct Portfolio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content (markdown) directory
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Portfolio {
    /// Create a new instance from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        })
    }

    /// Run one compilation pass over the content directory
    pub fn compile(&self) -> std::result::Result<Posts, CompileError> {
        ContentLoader::new(self).compile()
    }

    /// Compile and write the published collection to the public directory
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, path: Option<&str>) -> Result<PathBuf> {
        commands::new::create_post(self, title, path)
    }
}
