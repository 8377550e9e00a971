mod catalog;
mod export;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catfeed")]
#[command(about = "Paginated catalog feed export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export one page of family heads as JSON
    Export {
        /// Shopkey of the shop to export
        #[arg(long)]
        shop: String,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Page size; defaults to CATFEED_DEFAULT_PAGE_SIZE
        #[arg(long)]
        count: Option<usize>,
    },
    /// Export every page of the catalog, several pages at a time
    ExportAll {
        #[arg(long)]
        shop: String,

        #[arg(long)]
        count: Option<usize>,
    },
    /// Show the record of one product, or why it is left out of the feed
    Debug {
        #[arg(long)]
        shop: String,

        /// Id of the product or of any of its variants
        #[arg(long)]
        product: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = catfeed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            shop,
            offset,
            count,
        } => export::run_export(&config, &shop, offset, count).await,
        Commands::ExportAll { shop, count } => export::run_export_all(&config, &shop, count).await,
        Commands::Debug { shop, product } => export::run_debug(&config, &shop, &product).await,
    }
}

#[cfg(test)]
mod tests;
