//! reading-log server entry point.

use clap::Parser;
use reading_log::{
    AppError,
    config::{Cli, Command, Config},
    db::Database,
    export, server,
};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reading_log=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let mut config = if let Some(ref path) = config_path {
        tracing::debug!(path = %path.display(), "Loading config");
        Config::load(path)?
    } else {
        Config::default()
    };

    if let Some(key) = cli.api_key.filter(|k| !k.is_empty()) {
        config.covers.api_key = Some(key);
    }

    // Handle command
    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::Export { output }) => cmd_export(&config, output),
        Some(Command::Serve { bind, database }) => cmd_serve(config, bind, database).await,
        None => {
            // Default: start server
            cmd_serve(config, None, None).await
        }
    }
}

/// Initialize config and database.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    // Write default config
    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    // Initialize database
    let config = Config::default();
    let _db = Database::open(&config.database.path)?;
    println!("Initialized database: {}", config.database.path.display());

    println!("\nEdit config.toml to configure your server.");
    println!("Then run: reading-log serve");

    Ok(())
}

/// Write the CSV export to a file.
fn cmd_export(config: &Config, output: Option<PathBuf>) -> anyhow::Result<()> {
    let db = Database::open(&config.database.path)?;

    let export = match export::export_library(&db) {
        Ok(export) => export,
        Err(AppError::NoData) => anyhow::bail!("No books to export"),
        Err(e) => return Err(e.into()),
    };

    let path = output.unwrap_or_else(|| PathBuf::from(&export.filename));
    std::fs::write(&path, &export.data)?;
    println!("Exported {} books to {}", export.rows, path.display());

    Ok(())
}

/// Start the server.
async fn cmd_serve(
    mut config: Config,
    bind: Option<std::net::SocketAddr>,
    database: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Override config from CLI
    if let Some(addr) = bind {
        config.server.bind = addr;
    }
    if let Some(path) = database {
        config.database.path = path;
    }

    // Open database
    let db = Database::open(&config.database.path)?;

    tracing::info!(
        bind = %config.server.bind,
        database = %config.database.path.display(),
        books = db.count_books()?,
        covers = config.covers.enabled,
        "Starting reading-log server"
    );

    let bind_addr = config.server.bind;
    let state = server::AppState::new(config, db);
    let app = server::create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(address = %bind_addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
