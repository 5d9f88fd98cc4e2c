use dotenvy::dotenv;
use snafu::ResultExt;

use portfolio_api::api;
use portfolio_api::config::Config;
use portfolio_api::error::*;
use portfolio_api::logging;
use portfolio_api::service::database::Backend;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    logging::init();

    let database = Backend::connect(&config.surreal)
        .await
        .context(ConnectDatabaseSnafu)?;

    let app = api::create_app(database, &config);
    let router = api::create_router(app, &config);

    let listener = tokio::net::TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu {
            address: config.host,
        })?;

    tracing::info!("listening on {}", config.host);

    axum::serve(listener, router).await.context(WebServerSnafu)
}
