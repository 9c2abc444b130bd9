use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pinechat_application::{ChatSession, InsightsService};
use pinechat_core::config::AppConfig;
use pinechat_core::merchant::MerchantContext;
use pinechat_interaction::HttpBackend;

mod render;
mod repl;

#[derive(Parser)]
#[command(name = "pinechat")]
#[command(about = "Pinechat - merchant assistant chat and insights", long_about = None)]
struct Cli {
    /// Override the config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant about a merchant account
    Chat(MerchantArgs),
    /// Show the insights panel for a merchant
    Insights(MerchantArgs),
    /// Show the weekly insights feed
    Weekly,
    /// Show the business insights feed across all merchants
    Feed,
}

#[derive(Args)]
struct MerchantArgs {
    /// Merchant name
    #[arg(short, long, conflicts_with = "page_url")]
    merchant: Option<String>,

    /// Dashboard page URL carrying a `merchant` query parameter
    #[arg(long)]
    page_url: Option<String>,
}

impl MerchantArgs {
    fn resolve(&self, config: &AppConfig) -> Result<MerchantContext> {
        let default = &config.merchant.default_name;
        match (&self.merchant, &self.page_url) {
            (Some(name), _) if !name.trim().is_empty() => Ok(MerchantContext::new(name.clone())),
            (_, Some(url)) => Ok(MerchantContext::from_page_url(url, default)?),
            _ => Ok(MerchantContext::new(default.clone())),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let backend = Arc::new(HttpBackend::from_config(&config));
    tracing::info!(base_url = backend.base_url(), "Using backend");

    match cli.command {
        Commands::Chat(args) => {
            let merchant = args.resolve(&config)?;
            let session = Arc::new(ChatSession::new(backend.clone(), merchant));
            let insights = InsightsService::new(backend);
            let result = repl::run(session.clone(), insights).await;
            session.shutdown();
            result?;
        }
        Commands::Insights(args) => {
            let merchant = args.resolve(&config)?;
            let insights = InsightsService::new(backend);
            println!("{}", render::panel(&insights.cached_panel(&merchant).await));
            let panel = insights.load_panel(&merchant).await;
            println!("{}", render::panel(&panel));
        }
        Commands::Weekly => {
            let insights = InsightsService::new(backend);
            println!("{}", render::weekly(&insights.weekly_insights().await));
        }
        Commands::Feed => {
            let insights = InsightsService::new(backend);
            println!("{}", render::feed(&insights.business_insights_feed().await));
        }
    }

    Ok(())
}
