use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use sbir_search::{
    config::Config,
    routes::create_router,
    search::{AgencyTable, ResultNormalizer, SearchClient},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // A missing FBOPEN_API_KEY for the flat backend stops us here.
    let config = Config::from_env().inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Configuration loaded: {:?}", config.server);
    info!("Upstream: {:?}", config.upstream);

    let normalizer = ResultNormalizer::new(AgencyTable::default());
    let client = SearchClient::from_config(&config.upstream, normalizer)?;

    let state = sbir_search::AppState {
        config: config.clone(),
        search: Arc::new(client),
    };

    let app = create_router(state);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
