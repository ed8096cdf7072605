//! List compiled content

use anyhow::Result;

use crate::content::Post;
use crate::Portfolio;

/// List site content by type
pub fn run(portfolio: &Portfolio, content_type: &str) -> Result<()> {
    let posts = portfolio.compile()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in posts.all() {
                print_post(post);
            }
        }
        "tag" | "tags" => {
            let tags = posts.tags();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "featured" => {
            let (featured, rest) = posts.partition_featured();
            println!("Featured ({}):", featured.len());
            for post in featured {
                print_post(post);
            }
            println!("Other ({}):", rest.len());
            for post in rest {
                print_post(post);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, featured",
                content_type
            );
        }
    }

    Ok(())
}

fn print_post(post: &Post) {
    let draft = if post.published { "" } else { " (draft)" };
    println!(
        "  {} - {}{} [{}] {} min",
        post.date.format("%Y-%m-%d"),
        post.title,
        draft,
        post.url,
        post.read_time
    );
}
