use ethers::types::{Address, H256, U256};
use ethers::utils::parse_ether;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config::Config,
    constants::NATIVE_DECIMALS,
    models::{DepositAddress, Timeframe, TransactionResult},
    utils::{addresses_equal, is_valid_evm_address, units_to_f64},
};

use super::cache::ChartCache;
use super::onchain::{ChainClient, ChainError};
use super::price_chart_service::chart_cache_key;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("{0}")]
    Config(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid recipient address")]
    InvalidRecipient,

    #[error("Cannot withdraw to the same wallet address")]
    SelfTransfer,

    #[error("Deposit funding wallet is not configured")]
    FundingWalletMissing,

    #[error("Deposit funding wallet must differ from the dashboard wallet")]
    FundingWalletIsTarget,

    #[error("Insufficient balance. Available: {available} ETH, requested: {requested} ETH")]
    InsufficientBalance { available: String, requested: String },

    #[error("Insufficient balance. Available: {available} ETH, required: {required} ETH (amount + gas)")]
    InsufficientForGas { available: String, required: String },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

type TransferResult<T> = std::result::Result<T, TransferError>;

fn format_eth6(wei: U256) -> String {
    format!("{:.6}", units_to_f64(wei, NATIVE_DECIMALS))
}

fn parse_amount(amount: &str) -> TransferResult<U256> {
    let trimmed = amount.trim();
    if trimmed.starts_with('-') {
        return Err(TransferError::InvalidAmount(trimmed.to_string()));
    }
    let wei = parse_ether(trimmed).map_err(|_| TransferError::InvalidAmount(trimmed.to_string()))?;
    if wei.is_zero() {
        return Err(TransferError::InvalidAmount(trimmed.to_string()));
    }
    Ok(wei)
}

/// ETH movements into and out of the dashboard wallet. Each call is a single
/// attempt; outcomes are reported as [`TransactionResult`], never as errors.
pub struct TransferService {
    config: Config,
    wallet: Arc<dyn ChainClient>,
    funding: Option<Arc<dyn ChainClient>>,
    cache: Arc<ChartCache>,
}

impl TransferService {
    pub fn new(
        config: Config,
        wallet: Arc<dyn ChainClient>,
        funding: Option<Arc<dyn ChainClient>>,
        cache: Arc<ChartCache>,
    ) -> Self {
        Self {
            config,
            wallet,
            funding,
            cache,
        }
    }

    pub fn deposit_address(&self) -> DepositAddress {
        match self.config.validate() {
            Ok(()) => DepositAddress {
                success: true,
                deposit_address: self.config.wallet_public_key.clone(),
                error: String::new(),
            },
            Err(err) => {
                tracing::error!("Error getting deposit address: {}", err);
                DepositAddress {
                    success: false,
                    deposit_address: String::new(),
                    error: err.to_string(),
                }
            }
        }
    }

    pub async fn withdraw(&self, amount: &str, recipient: &str) -> TransactionResult {
        tracing::info!("Withdraw requested: {} ETH to {}", amount.trim(), recipient.trim());
        let outcome = self.try_withdraw(amount, recipient).await;
        self.finish("withdraw", outcome).await
    }

    pub async fn deposit(&self, amount: &str) -> TransactionResult {
        tracing::info!("Deposit requested: {} ETH", amount.trim());
        let outcome = self.try_deposit(amount).await;
        self.finish("deposit", outcome).await
    }

    async fn try_withdraw(&self, amount: &str, recipient: &str) -> TransferResult<H256> {
        let wallet = self.validated_wallet()?;
        let value = parse_amount(amount)?;

        let recipient = recipient.trim();
        if !is_valid_evm_address(recipient) {
            return Err(TransferError::InvalidRecipient);
        }
        if addresses_equal(recipient, &self.config.wallet_public_key) {
            return Err(TransferError::SelfTransfer);
        }
        let to: Address = recipient
            .parse()
            .map_err(|_| TransferError::InvalidRecipient)?;

        send_checked(self.wallet.as_ref(), wallet, to, value, amount.trim()).await
    }

    async fn try_deposit(&self, amount: &str) -> TransferResult<H256> {
        let wallet = self.validated_wallet()?;
        let funding = self
            .funding
            .as_ref()
            .ok_or(TransferError::FundingWalletMissing)?;
        let from = funding.sender().ok_or(TransferError::FundingWalletMissing)?;
        if from == wallet {
            return Err(TransferError::FundingWalletIsTarget);
        }
        let value = parse_amount(amount)?;

        send_checked(funding.as_ref(), from, wallet, value, amount.trim()).await
    }

    fn validated_wallet(&self) -> TransferResult<Address> {
        self.config
            .validate()
            .map_err(|e| TransferError::Config(e.to_string()))?;
        self.config
            .wallet_public_key
            .trim()
            .parse()
            .map_err(|_| TransferError::Config("WALLET_PUBLIC_KEY is not a valid address".to_string()))
    }

    async fn finish(&self, action: &str, outcome: TransferResult<H256>) -> TransactionResult {
        match outcome {
            Ok(tx_hash) => {
                tracing::info!("{} confirmed: {:#x}", action, tx_hash);
                self.invalidate_charts().await;
                TransactionResult::confirmed(format!("{:#x}", tx_hash))
            }
            Err(err) => {
                tracing::error!("Error during {}: {}", action, err);
                TransactionResult::failed(err.to_string())
            }
        }
    }

    async fn invalidate_charts(&self) {
        let wallet = self.config.wallet_public_key.as_str();
        for timeframe in Timeframe::ALL {
            self.cache.clear(&chart_cache_key(timeframe), wallet).await;
        }
    }
}

/// Balance, fee and gas checks in order, then submit and wait.
async fn send_checked(
    client: &dyn ChainClient,
    from: Address,
    to: Address,
    value: U256,
    requested: &str,
) -> TransferResult<H256> {
    let balance = client.native_balance(from).await?;
    if balance < value {
        return Err(TransferError::InsufficientBalance {
            available: format_eth6(balance),
            requested: requested.to_string(),
        });
    }

    let fees = client.fee_data().await?;
    let gas = client.estimate_transfer_gas(from, to, value).await?;
    let required = value.saturating_add(gas.saturating_mul(fees.effective_price()));
    if balance < required {
        return Err(TransferError::InsufficientForGas {
            available: format_eth6(balance),
            required: format_eth6(required),
        });
    }

    Ok(client.send_native(to, value).await?)
}
