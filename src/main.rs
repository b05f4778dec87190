use std::io;
use std::time::Duration;

use dotenvy::dotenv;
use storefront_service::config::AppConfig;
use storefront_service::seed::seed_data;
use storefront_service::user_directory::UserDirectoryClient;
use storefront_service::{build_server, create_pool, run_migrations, AppState};

const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let directory = UserDirectoryClient::new(&config.user_directory_url, DIRECTORY_TIMEOUT)
        .map_err(io::Error::other)?;
    let state = AppState::with_pool(pool, directory);

    if config.seed_data {
        seed_data(&state).map_err(io::Error::other)?;
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
