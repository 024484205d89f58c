//! Standalone schema migrator: connects to the store and returns. Schema
//! application is idempotent and already happens inside
//! `StoreClient::connect`, so this binary's only job is to exercise that
//! path outside of a running job, e.g. from a deploy step.

use anyhow::Context;
use clap::Parser;
use imagec_infra_store::StoreClient;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "imagec-migrator", about = "Applies the store schema and exits")]
struct Args {
    #[arg(long)]
    db_path: Option<String>,

    #[arg(long)]
    auth_token: Option<String>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    imagec_telemetry::init_tracing("imagec_migrator");

    let args = Args::parse();
    let db_path = args
        .db_path
        .or_else(|| std::env::var("IMAGEC_DB_PATH").ok())
        .context("missing --db-path or IMAGEC_DB_PATH")?;
    let auth_token = args.auth_token.or_else(|| std::env::var("IMAGEC_DB_AUTH_TOKEN").ok());

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(StoreClient::connect(&db_path, auth_token)).context("applying schema")?;

    info!(db_path, "schema applied");
    Ok(())
}
