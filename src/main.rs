//! CLI entry point for portfolio-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_rs::Portfolio;

#[derive(Parser)]
#[command(name = "portfolio-rs")]
#[command(version)]
#[command(about = "Content compiler and contact backend for a portfolio site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new blog post
    New {
        /// Title of the new post
        title: String,

        /// File path relative to the blog directory, without extension
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Compile content and write public/posts.json
    #[command(alias = "b")]
    Build,

    /// Compile content and serve the API
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Recompile when content changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Send a test email through the configured provider
    CheckEmail,

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag, featured)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "portfolio_rs=debug,info"
    } else {
        "portfolio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            portfolio_rs::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, path } => {
            let portfolio = Portfolio::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            portfolio.new_post(&title, path.as_deref())?;
        }

        Commands::Build => {
            let portfolio = Portfolio::new(&base_dir)?;
            tracing::info!("Compiling content...");
            portfolio.build()?;
            println!("Built successfully!");
        }

        Commands::Server { port, ip, watch } => {
            let portfolio = Portfolio::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| portfolio.config.server.ip.clone());
            let port = port.unwrap_or(portfolio.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            portfolio_rs::server::start(&portfolio, &ip, port, watch).await?;
        }

        Commands::CheckEmail => {
            let portfolio = Portfolio::new(&base_dir)?;
            portfolio_rs::commands::check_email::run(&portfolio.config.contact).await?;
        }

        Commands::Clean => {
            let portfolio = Portfolio::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            portfolio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let portfolio = Portfolio::new(&base_dir)?;
            portfolio_rs::commands::list::run(&portfolio, &r#type)?;
        }

        Commands::Version => {
            println!("portfolio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
