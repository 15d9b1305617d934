use crate::error::ToolError;
use crate::ports::WalletSigner;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::{Transaction, VersionedTransaction};

/// Headless signer backed by a local keypair, for running the server without
/// an interactive wallet frontend. Transactions are signed immediately, so
/// this signer never declines.
pub struct LocalKeypairSigner {
    keypair: Keypair,
}

impl LocalKeypairSigner {
    pub fn from_base58(encoded: &str) -> anyhow::Result<Self> {
        let bytes = solana_sdk::bs58::decode(encoded)
            .into_vec()
            .map_err(|e| anyhow::anyhow!("WALLET_KEYPAIR is not valid base58: {}", e))?;
        let keypair = Keypair::from_bytes(&bytes)
            .map_err(|e| anyhow::anyhow!("WALLET_KEYPAIR is not a valid keypair: {}", e))?;
        Ok(Self { keypair })
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait::async_trait]
impl WalletSigner for LocalKeypairSigner {
    async fn connect(&self) -> Result<Pubkey, ToolError> {
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, ToolError> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| ToolError::Upstream(format!("signing failed: {}", e)))?;
        Ok(tx)
    }

    async fn sign_versioned_transaction(
        &self,
        tx: VersionedTransaction,
    ) -> Result<VersionedTransaction, ToolError> {
        VersionedTransaction::try_new(tx.message, &[&self.keypair])
            .map_err(|e| ToolError::Upstream(format!("signing failed: {}", e)))
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, ToolError> {
        Ok(self.keypair.sign_message(message).as_ref().to_vec())
    }
}
