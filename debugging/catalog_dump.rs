//! Run one catalog operation against live TMDB and print the adapted content.
//! Usage:
//!   cargo run --bin catalog_dump -- <trending|movies|series|cartoons|documentaries|featured|all>
//!   cargo run --bin catalog_dump -- search <query...>
//!   cargo run --bin catalog_dump -- details <movie|tv> <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use serde_json::Value;
use std::env;
use std::sync::Arc;
use streamyeebs::catalog::Catalog;
use streamyeebs::config::Config;
use streamyeebs::content::MediaKind;
use streamyeebs::tmdb::TmdbClient;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --bin catalog_dump -- <trending|movies|series|cartoons|documentaries|featured|all>"
    );
    eprintln!("       cargo run --bin catalog_dump -- search <query...>");
    eprintln!("       cargo run --bin catalog_dump -- details <movie|tv> <tmdb_id>");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else { usage() };

    let config = Config::from_env()?;
    let api_key = config.api_key.clone().context("TMDB_API_KEY not set")?;
    let client = TmdbClient::with_base_url(api_key, config.tmdb_base_url.clone())?;
    let catalog = Catalog::new(Arc::new(client));

    let output: Value = match command.as_str() {
        "trending" => serde_json::to_value(catalog.trending().await)?,
        "movies" => serde_json::to_value(catalog.popular_movies().await)?,
        "series" => serde_json::to_value(catalog.popular_shows().await)?,
        "cartoons" => serde_json::to_value(catalog.animated().await)?,
        "documentaries" => serde_json::to_value(catalog.documentaries().await)?,
        "featured" => serde_json::to_value(catalog.featured().await)?,
        "all" => serde_json::to_value(catalog.load_all().await)?,
        "search" => {
            let query = args[1..].join(" ");
            serde_json::to_value(catalog.search(&query).await)?
        }
        "details" => {
            let media = args
                .get(1)
                .and_then(|m| MediaKind::parse(m))
                .ok_or_else(|| anyhow!("details needs 'movie' or 'tv'"))?;
            let id = args.get(2).ok_or_else(|| anyhow!("details needs a tmdb id"))?;
            serde_json::to_value(catalog.details(id, media).await)?
        }
        _ => usage(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
