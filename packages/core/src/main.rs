use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;

use market_data_proxy::{
    api,
    cli::Cli,
    config::Config,
    error::AppError,
    logging::init_logging,
    metrics::AppMetrics,
    proxy::{ProxyCache, UpstreamSource},
    services::coingecko::CoinGeckoClient,
    sweeper::run_cache_sweeper,
    valuation::ValuationService,
};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env()
        .and_then(|config| config.with_cli(&cli))
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    tracing::info!("Service starting with config: {:?}", config);

    if config.api_key.is_none() {
        tracing::warn!(
            "COINGECKO_API_KEY is not set; /proxy will answer 500 until it is configured"
        );
    }

    let client = CoinGeckoClient::from_config(&config).unwrap_or_else(|err| {
        tracing::error!("{}", err);
        std::process::exit(1);
    });
    let upstream: Arc<dyn UpstreamSource + Send + Sync> = Arc::new(client);

    let app_metrics = Arc::new(AppMetrics::new().unwrap_or_else(|err| {
        tracing::error!("Failed to register metrics: {}", err);
        std::process::exit(1);
    }));

    let proxy_cache = Arc::new(
        ProxyCache::new(upstream, config.cache_ttl()).with_metrics(app_metrics.clone()),
    );
    let valuation_service = Arc::new(ValuationService::new(
        proxy_cache.clone(),
        config.comparison_coins.clone(),
    ));

    if let Some(interval) = config.sweep_interval_seconds {
        tokio::spawn(run_cache_sweeper(proxy_cache.clone(), interval));
    }

    let app = api::create_router(proxy_cache, valuation_service, app_metrics);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.unwrap_or_else(|err| {
        tracing::error!("Failed to bind {}: {}", addr, err);
        std::process::exit(1);
    });
    tracing::info!("Market data proxy listening on {}", addr);

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }

    tracing::info!("Server stopped cleanly");
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
