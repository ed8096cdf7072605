//! Compile content and write the published collection

use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;

use crate::content::Post;
use crate::Portfolio;

/// File the compiled collection is written to, inside the public directory
pub const POSTS_FILE: &str = "posts.json";

/// Run a compilation pass; any invalid document fails the whole build
pub fn run(portfolio: &Portfolio) -> Result<()> {
    let start = Instant::now();

    let posts = portfolio.compile()?;
    let published: Vec<&Post> = posts.published().collect();
    tracing::info!(
        "Compiled {} posts ({} published)",
        posts.len(),
        published.len()
    );

    fs::create_dir_all(&portfolio.public_dir)
        .with_context(|| format!("Failed to create {:?}", portfolio.public_dir))?;
    let output = portfolio.public_dir.join(POSTS_FILE);
    let json = serde_json::to_string_pretty(&published)?;
    fs::write(&output, json).with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(
        "Wrote {:?} in {:.2}s",
        output,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
