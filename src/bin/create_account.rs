//! Wicket account bootstrap
//!
//! Creates an account directly in MongoDB, without going through the admin
//! gate. This is how the first admin account is made.
//!
//! Usage:
//!   wicket-create-account --mongodb-uri mongodb://localhost:27017
//!
//! Environment variables:
//!   MONGODB_URI - MongoDB connection URI (default: mongodb://localhost:27017)
//!   MONGODB_DB - MongoDB database name (default: wicket)

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wicket::config::MongoArgs;
use wicket::db::{MongoClient, MongoCredentialStore};
use wicket::services::AccountAdmin;

#[derive(Parser, Debug)]
#[command(name = "wicket-create-account")]
#[command(about = "Create a wicket account directly in the database")]
#[command(version)]
struct Args {
    #[command(flatten)]
    mongo: MongoArgs,
}

fn prompt(lines: &mut impl BufRead, label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    lines.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let stdin = io::stdin();
    let mut lines = stdin.lock();

    println!("등록하시게요?");
    let username = prompt(&mut lines, "사용자명 입력 > ")?;
    let password = prompt(&mut lines, "비밀번호 입력 > ")?;
    let is_admin = !prompt(&mut lines, "관리자 여부 입력(비워 두면 관리자 아님) > ")?.is_empty();

    let mongo = MongoClient::new(&args.mongo.mongodb_uri, &args.mongo.mongodb_db)
        .await
        .context("MongoDB connection failed")?;
    let store = MongoCredentialStore::new(&mongo).await?;
    let admin = AccountAdmin::new(Arc::new(store));

    let password = Some(password.as_str()).filter(|p| !p.is_empty());
    if let Err(e) = admin.provision(&username, password, is_admin).await {
        eprintln!("{}", e.detail());
        std::process::exit(1);
    }

    println!("완료");
    Ok(())
}
