use anyhow::Context;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    pub network: String,
    pub wallet_keypair: String,
    pub jupiter_url: String,
    pub price_api_url: String,
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let rpc_url = env::var("SOLANA_RPC_URL").context("SOLANA_RPC_URL must be set")?;
        let wallet_keypair = env::var("WALLET_KEYPAIR").context("WALLET_KEYPAIR must be set")?;
        let llm_api_key = env::var("LLM_API_KEY").context("LLM_API_KEY must be set")?;

        let network = env::var("SOLANA_NETWORK").unwrap_or_else(|_| "mainnet-beta".into());
        let jupiter_url =
            env::var("JUPITER_API_URL").unwrap_or_else(|_| "https://quote-api.jup.ag/v6".into());
        let price_api_url = env::var("PRICE_API_URL")
            .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".into());
        let llm_api_url =
            env::var("LLM_API_URL").unwrap_or_else(|_| "https://api.openai.com".into());
        let llm_model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

        Ok(Self {
            rpc_url,
            network,
            wallet_keypair,
            jupiter_url,
            price_api_url,
            llm_api_url,
            llm_api_key,
            llm_model,
        })
    }
}
