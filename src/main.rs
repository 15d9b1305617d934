use dotenv::dotenv;
use solmate_wallet_mcp::config;
use solmate_wallet_mcp::format::ResponseFormatter;
use solmate_wallet_mcp::jupiter::JupiterClient;
use solmate_wallet_mcp::llm::OpenAiCompatClient;
use solmate_wallet_mcp::market::{CoinGeckoFeed, PriceCache};
use solmate_wallet_mcp::ports::{ConfirmPolicy, PriceFeed, ToolContext};
use solmate_wallet_mcp::rpc::SolanaRpcClient;
use solmate_wallet_mcp::server;
use solmate_wallet_mcp::tracker::{self, PriceTracker};
use solmate_wallet_mcp::wallet::LocalKeypairSigner;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting SolMate wallet assistant server...");

    let config = config::Config::from_env()?;

    let rpc = Arc::new(SolanaRpcClient::new(&config.rpc_url)?);
    let prices: Arc<dyn PriceFeed> = Arc::new(CoinGeckoFeed::new(&config.price_api_url));
    let aggregator = Arc::new(JupiterClient::new(&config.jupiter_url));
    let wallet = Arc::new(LocalKeypairSigner::from_base58(&config.wallet_keypair)?);
    let llm = Arc::new(OpenAiCompatClient::new(
        &config.llm_api_url,
        &config.llm_api_key,
        &config.llm_model,
    ));

    let (price_tracker, mut alerts) = PriceTracker::new(prices.clone(), tracker::POLL_INTERVAL);

    // Alerts go to the log until a push channel to the UI exists.
    tokio::spawn(async move {
        while let Some(alert) = alerts.recv().await {
            info!(alert = ?alert, "price alert");
        }
    });

    let ctx = ToolContext {
        rpc,
        prices,
        aggregator,
        wallet,
        tracker: Arc::new(price_tracker),
        price_cache: Arc::new(PriceCache::default()),
        network: config.network.clone(),
        confirm: ConfirmPolicy::default(),
    };
    let formatter = ResponseFormatter::new(llm);

    server::run(ctx, formatter).await?;

    Ok(())
}
