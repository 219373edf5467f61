use std::sync::Arc;

use tracing::{error, info, warn};

use marknote::web::{AppState, WebServer};
use marknote::{Config, Database, UploadStorage};

#[tokio::main]
async fn main() {
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = marknote::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        marknote::logging::init_console_only(&config.logging.level);
    }

    info!("marknote starting");

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> marknote::Result<()> {
    config.validate()?;

    let db = Arc::new(Database::open(&config.database.path).await?);
    info!("Database opened at {}", config.database.path);

    let mut state = AppState::load(db).await?;
    match UploadStorage::from_config(&config.uploads) {
        Ok(storage) => {
            info!("Upload storage at {}", config.uploads.storage_path);
            state = state.with_uploads(storage);
        }
        Err(e) => {
            warn!("Failed to initialize upload storage: {}. Uploads disabled.", e);
        }
    }

    let server = WebServer::new(&config.server, Arc::new(state))?;
    info!("Server configured on {}", server.addr());
    server.run().await
}
