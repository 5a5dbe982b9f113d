// src/main.rs
use std::env;
use dotenvy::dotenv;
use personal_planner::{backend, config::AppConfig, database, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config.log_filter);

    let pool = database::db::connection::get_db_pool(&config).await?;
    database::db::migrate::run_migrations(&pool).await?;

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("migrate") => {
            info!("Migrations applied to {}", config.database_url);
        }
        None | Some("server") => {
            info!("Starting backend server...");
            backend::run_server(pool, config).await?;
        }
        Some(other) => {
            anyhow::bail!("unknown command '{other}' (expected 'server' or 'migrate')");
        }
    }
    Ok(())
}
