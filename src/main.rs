//! Wicket - account authentication and session-token service

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wicket::{config::Args, db::MongoClient, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wicket={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Wicket - accounts and session tokens");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} / {}", args.mongo.mongodb_uri, args.mongo.mongodb_db);
    info!("Token lifetime: {} minutes", args.token_expiry_minutes);
    match args.cors_origin_list() {
        Some(origins) => info!("CORS origins: {}", origins.join(", ")),
        None => info!("CORS origins: local network"),
    }
    info!("======================================");

    let codec = args.token_codec()?;
    if args.dev_mode && args.auth_secret_key.is_none() && args.auth_secret_file.is_none() {
        warn!("Using built-in development token secret");
    }

    // MongoDB is optional in dev mode
    let state = match MongoClient::new(&args.mongo.mongodb_uri, &args.mongo.mongodb_db).await {
        Ok(mongo) => server::AppState::with_mongo(args.clone(), codec, &mongo).await?,
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory stores): {}", e);
                server::AppState::in_memory(args.clone(), codec)
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
