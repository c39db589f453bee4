use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{transaction::eip2718::TypedTransaction, Address, TransactionRequest, H256, U256},
};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::error::{AppError, Result};

/// Closed set of chain failures the transfer flow reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Insufficient funds. Please ensure you have enough ETH to cover the amount and gas fees.")]
    InsufficientFunds,

    #[error("Transaction was cancelled")]
    UserRejected,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Transaction was dropped before inclusion")]
    Dropped,

    #[error("{0}")]
    Rpc(String),
}

impl ChainError {
    /// Maps provider/signer error text onto a kind. Only this adapter looks
    /// at node messages; callers match on the enum.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("insufficient funds") {
            ChainError::InsufficientFunds
        } else if lower.contains("user rejected") || lower.contains("user denied") {
            ChainError::UserRejected
        } else if lower.contains("invalid address") {
            ChainError::InvalidAddress(message.to_string())
        } else {
            ChainError::Rpc(message.to_string())
        }
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        AppError::BlockchainRPC(err.to_string())
    }
}

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Raw ERC-20 balance plus the token's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeData {
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
}

impl FeeData {
    /// Legacy gas price when the node reports one, otherwise the EIP-1559 cap.
    pub fn effective_price(&self) -> U256 {
        self.gas_price
            .filter(|price| !price.is_zero())
            .or(self.max_fee_per_gas)
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signer, if this client can send.
    fn sender(&self) -> Option<Address>;

    async fn native_balance(&self, owner: Address) -> ChainResult<U256>;

    async fn token_balance(&self, token: Address, owner: Address) -> ChainResult<TokenAmount>;

    async fn block_number(&self) -> ChainResult<u64>;

    async fn fee_data(&self) -> ChainResult<FeeData>;

    async fn estimate_transfer_gas(&self, from: Address, to: Address, value: U256)
        -> ChainResult<U256>;

    /// Signs and submits a native transfer, then waits for inclusion.
    async fn send_native(&self, to: Address, value: U256) -> ChainResult<H256>;
}

pub struct EthersChainClient {
    provider: Arc<Provider<Http>>,
    signer: Option<SignerMiddleware<Arc<Provider<Http>>, LocalWallet>>,
}

impl EthersChainClient {
    pub fn new(rpc_url: &str, chain_id: u64, private_key: Option<&str>) -> Result<Self> {
        let url = Url::parse(rpc_url)
            .map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;
        let provider = Arc::new(Provider::new(Http::new(url)));

        let signer = match private_key {
            Some(key) => {
                let wallet = key
                    .trim()
                    .parse::<LocalWallet>()
                    .map_err(|e| AppError::Config(format!("Invalid private key: {}", e)))?
                    .with_chain_id(chain_id);
                Some(SignerMiddleware::new(provider.clone(), wallet))
            }
            None => None,
        };

        Ok(Self { provider, signer })
    }
}

#[async_trait::async_trait]
impl ChainClient for EthersChainClient {
    fn sender(&self) -> Option<Address> {
        self.signer.as_ref().map(|client| client.address())
    }

    async fn native_balance(&self, owner: Address) -> ChainResult<U256> {
        self.provider
            .get_balance(owner, None)
            .await
            .map_err(|e| ChainError::classify(&e.to_string()))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> ChainResult<TokenAmount> {
        let erc20 = Erc20::new(token, self.provider.clone());
        let raw = erc20
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| ChainError::classify(&e.to_string()))?;
        let decimals = erc20.decimals().call().await.unwrap_or(18);
        Ok(TokenAmount {
            raw,
            decimals: decimals as u32,
        })
    }

    async fn block_number(&self) -> ChainResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map(|n| n.as_u64())
            .map_err(|e| ChainError::classify(&e.to_string()))
    }

    async fn fee_data(&self) -> ChainResult<FeeData> {
        let gas_price = match self.provider.get_gas_price().await {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::warn!("eth_gasPrice failed: {}", err);
                None
            }
        };
        let max_fee_per_gas = match self.provider.estimate_eip1559_fees(None).await {
            Ok((max_fee, _priority)) => Some(max_fee),
            Err(err) => {
                tracing::debug!("EIP-1559 fee estimate unavailable: {}", err);
                None
            }
        };
        if gas_price.is_none() && max_fee_per_gas.is_none() {
            return Err(ChainError::Rpc("Fee data unavailable".to_string()));
        }
        Ok(FeeData {
            gas_price,
            max_fee_per_gas,
        })
    }

    async fn estimate_transfer_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> ChainResult<U256> {
        let tx: TypedTransaction = TransactionRequest::new()
            .from(from)
            .to(to)
            .value(value)
            .into();
        self.provider
            .estimate_gas(&tx, None)
            .await
            .map_err(|e| ChainError::classify(&e.to_string()))
    }

    async fn send_native(&self, to: Address, value: U256) -> ChainResult<H256> {
        let client = self
            .signer
            .as_ref()
            .ok_or_else(|| ChainError::Rpc("No signer configured".to_string()))?;
        let tx = TransactionRequest::new()
            .from(client.address())
            .to(to)
            .value(value);

        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| ChainError::classify(&e.to_string()))?;
        let tx_hash = pending.tx_hash();
        tracing::info!("Submitted transfer {:#x}, waiting for inclusion", tx_hash);

        let receipt = pending
            .await
            .map_err(|e| ChainError::classify(&e.to_string()))?;
        match receipt {
            Some(receipt) => {
                tracing::info!(
                    "Transfer {:#x} included in block {:?}",
                    tx_hash,
                    receipt.block_number
                );
                Ok(tx_hash)
            }
            None => Err(ChainError::Dropped),
        }
    }
}

ethers::contract::abigen!(
    Erc20,
    r#"[
        function balanceOf(address) view returns (uint256)
        function decimals() view returns (uint8)
    ]"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_known_messages() {
        assert_eq!(
            ChainError::classify("(code: -32000, message: insufficient funds for gas * price + value)"),
            ChainError::InsufficientFunds
        );
        assert_eq!(
            ChainError::classify("User rejected the request"),
            ChainError::UserRejected
        );
        assert_eq!(
            ChainError::classify("invalid address: 0x1234"),
            ChainError::InvalidAddress("invalid address: 0x1234".to_string())
        );
        assert_eq!(
            ChainError::classify("nonce too low"),
            ChainError::Rpc("nonce too low".to_string())
        );
    }

    #[test]
    fn friendly_messages() {
        assert_eq!(
            ChainError::InsufficientFunds.to_string(),
            "Insufficient funds. Please ensure you have enough ETH to cover the amount and gas fees."
        );
        assert_eq!(ChainError::UserRejected.to_string(), "Transaction was cancelled");
        assert_eq!(
            ChainError::InvalidAddress("0x12".into()).to_string(),
            "Invalid address: 0x12"
        );
        assert_eq!(ChainError::Rpc("boom".into()).to_string(), "boom");
    }

    #[test]
    fn effective_price_prefers_legacy_gas_price() {
        let fees = FeeData {
            gas_price: Some(U256::from(30)),
            max_fee_per_gas: Some(U256::from(50)),
        };
        assert_eq!(fees.effective_price(), U256::from(30));

        let eip1559_only = FeeData {
            gas_price: Some(U256::zero()),
            max_fee_per_gas: Some(U256::from(50)),
        };
        assert_eq!(eip1559_only.effective_price(), U256::from(50));
        assert_eq!(FeeData::default().effective_price(), U256::zero());
    }

    #[test]
    fn client_rejects_bad_inputs() {
        assert!(EthersChainClient::new("not a url", 1, None).is_err());
        assert!(EthersChainClient::new("http://localhost:8545", 1, Some("0xnothex")).is_err());
    }

    #[test]
    fn signer_address_is_derived_from_key() {
        let client = EthersChainClient::new(
            "http://localhost:8545",
            1,
            Some("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
        )
        .unwrap();
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(client.sender(), Some(expected));
        assert!(EthersChainClient::new("http://localhost:8545", 1, None)
            .unwrap()
            .sender()
            .is_none());
    }
}
