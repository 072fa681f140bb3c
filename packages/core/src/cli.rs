use clap::Parser;

/// Market data proxy CLI arguments. Each flag overrides its env variable.
#[derive(Debug, Parser)]
#[command(
    name = "market-data-proxy",
    version,
    about = "Caching CoinGecko proxy with MVRV valuation endpoints"
)]
pub struct Cli {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Upstream API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Cache entry lifetime in seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Expired-entry sweep interval in seconds (0 disables the sweeper)
    #[arg(long)]
    pub sweep_interval: Option<u64>,
}
