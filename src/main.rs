use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use gold_pawnshop::config::ServerConfig;
use gold_pawnshop::routes;
use gold_pawnshop::services::gold::YahooGoldSource;
use gold_pawnshop::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server = ServerConfig::from_env()?;

    // Initialize the logger; RUST_LOG still wins when set
    let default_filter = if server.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
    info!("Logger initialized. Starting the application...");
    info!("Using PORT: {}, data dir: {}", server.port, server.data_dir.display());

    let source = YahooGoldSource::new()?;
    let state = Arc::new(AppState::from_server_config(&server, Arc::new(source)).await);

    let addr: SocketAddr = ([0, 0, 0, 0], server.port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
