//! CLI entry point for inkpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(version)]
#[command(about = "A small Markdown blog engine with a JSON post API", long_about = None)]
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
    /// Build the post index from Markdown sources
    #[command(alias = "i")]
    Index,

    /// Create a new post
    New {
        /// Title of the new post
        title: String,
    },

    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching or live reload)
        #[arg(long)]
        r#static: bool,
    },

    /// List indexed content
    List {
        /// Type of content to list (post, tag, archive)
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
        "inkpress=debug,info"
    } else {
        "inkpress=info"
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
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Index => {
            let app = inkpress::Inkpress::new(&base_dir)?;
            tracing::info!("Building post index...");
            let index = app.build_index()?;
            println!("Indexed {} posts.", index.len());
        }

        Commands::New { title } => {
            let app = inkpress::Inkpress::new(&base_dir)?;
            tracing::info!("Creating new post: {}", title);
            app.new_post(&title)?;
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let app = inkpress::Inkpress::new(&base_dir)?;

            // Build the index first if it does not exist yet
            let index_path = app.posts_dir.join(&app.config.index_file);
            if !index_path.exists() {
                tracing::info!("No index found, building...");
                app.build_index()?;
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            inkpress::server::start(&app, &ip, port, !r#static, open).await?;
        }

        Commands::List { r#type } => {
            let app = inkpress::Inkpress::new(&base_dir)?;
            inkpress::commands::list::run(&app, &r#type)?;
        }

        Commands::Version => {
            println!("inkpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
