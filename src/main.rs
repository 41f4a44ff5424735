use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;

use log::{info, initialize_logger};
use sangrah::config::Settings;
use sangrah::environment::{Config, Environment};
use sangrah::routes;
use sangrah::store::LocalStore;
use sangrah::sync::HttpSync;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    #[cfg(feature = "env_logging")]
    let _guard = log::install_global(&logger);

    let settings = Settings::from_env()?;

    info!(logger, "Starting...";
        "main_port" => settings.port,
        "admin_port" => settings.admin_port,
        "storage" => %settings.storage,
        "sync_url" => %settings.sync_url);

    let store = LocalStore::open(logger.clone(), settings.storage, &settings.storage_dir)?;
    let sync = Arc::new(HttpSync::new(settings.sync_url.clone(), settings.sync_timeout)?);

    let logger = Arc::new(logger);
    let environment = Environment::new(
        logger.clone(),
        store,
        sync,
        Config::new(settings.display_offset),
    );

    let should_terminate = {
        let logger = logger.clone();

        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!(logger, "Failed to listen for Ctrl-C"; "error" => %e);
                futures::future::pending::<()>().await;
            }

            info!(logger, "Received Ctrl-C; shutting down...");
        }
        .shared()
    };

    let (_, main_server) = {
        let should_terminate = should_terminate.clone();

        warp::serve(routes::make_routes(environment)).try_bind_with_graceful_shutdown(
            ([0, 0, 0, 0], settings.port),
            async move {
                should_terminate.await;
            },
        )?
    };

    let (_, admin_server) = warp::serve(routes::admin::make_healthz_route())
        .try_bind_with_graceful_shutdown(([0, 0, 0, 0], settings.admin_port), async move {
            should_terminate.await;
        })?;

    tokio::join!(main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
