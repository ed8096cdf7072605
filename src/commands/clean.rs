//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Portfolio;

/// Remove the public directory and everything built into it
pub fn run(portfolio: &Portfolio) -> Result<()> {
    if portfolio.public_dir.exists() {
        fs::remove_dir_all(&portfolio.public_dir)?;
        tracing::info!("Deleted: {:?}", portfolio.public_dir);
    }

    Ok(())
}
