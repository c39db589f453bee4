// Fakes for the chain/market seams and a throwaway HTTP server.

use axum::Router;
use ethers::types::{Address, H256, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::{
    error::{AppError, Result},
    models::{ExplorerTransaction, PriceQuote},
};

use super::market_data::MarketData;
use super::onchain::{ChainClient, ChainError, ChainResult, FeeData, TokenAmount};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

pub fn eth(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(18)
}

pub fn address(value: &str) -> Address {
    value.parse().expect("valid test address")
}

pub struct FakeChain {
    pub sender: Option<Address>,
    pub balance: U256,
    pub token_balances: HashMap<Address, TokenAmount>,
    pub block: u64,
    pub fees: FeeData,
    pub gas: U256,
    pub fail_reads: bool,
    pub send_error: Option<ChainError>,
    pub sent: Mutex<Vec<(Address, U256)>>,
}

impl FakeChain {
    pub fn new(sender: Option<Address>) -> Self {
        Self {
            sender,
            balance: U256::zero(),
            token_balances: HashMap::new(),
            block: 20_000_000,
            fees: FeeData {
                gas_price: Some(U256::from(10_000_000_000u64)),
                max_fee_per_gas: None,
            },
            gas: U256::from(21_000),
            fail_reads: false,
            send_error: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(Address, U256)> {
        self.sent.lock().expect("sent lock").clone()
    }

    fn read_guard(&self) -> ChainResult<()> {
        if self.fail_reads {
            Err(ChainError::Rpc("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn native_balance(&self, _owner: Address) -> ChainResult<U256> {
        self.read_guard()?;
        Ok(self.balance)
    }

    async fn token_balance(&self, token: Address, _owner: Address) -> ChainResult<TokenAmount> {
        self.read_guard()?;
        self.token_balances
            .get(&token)
            .copied()
            .ok_or_else(|| ChainError::Rpc("execution reverted".to_string()))
    }

    async fn block_number(&self) -> ChainResult<u64> {
        self.read_guard()?;
        Ok(self.block)
    }

    async fn fee_data(&self) -> ChainResult<FeeData> {
        self.read_guard()?;
        Ok(self.fees)
    }

    async fn estimate_transfer_gas(
        &self,
        _from: Address,
        _to: Address,
        _value: U256,
    ) -> ChainResult<U256> {
        self.read_guard()?;
        Ok(self.gas)
    }

    async fn send_native(&self, to: Address, value: U256) -> ChainResult<H256> {
        if let Some(err) = &self.send_error {
            return Err(err.clone());
        }
        self.sent.lock().expect("sent lock").push((to, value));
        Ok(H256::from_low_u64_be(0xbeef))
    }
}

pub struct FakeMarket {
    pub native: Option<PriceQuote>,
    pub tokens: HashMap<String, PriceQuote>,
    pub fail_tokens: bool,
    pub transactions: Option<Vec<ExplorerTransaction>>,
    pub transaction_calls: AtomicU32,
    pub last_start_block: Mutex<Option<u64>>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self {
            native: Some(PriceQuote::default()),
            tokens: HashMap::new(),
            fail_tokens: false,
            transactions: Some(Vec::new()),
            transaction_calls: AtomicU32::new(0),
            last_start_block: Mutex::new(None),
        }
    }

    pub fn with_token(mut self, contract: &str, quote: PriceQuote) -> Self {
        self.tokens.insert(contract.to_ascii_lowercase(), quote);
        self
    }

    pub fn transaction_calls(&self) -> u32 {
        self.transaction_calls.load(Ordering::SeqCst)
    }

    pub fn last_start_block(&self) -> Option<u64> {
        *self.last_start_block.lock().expect("start block lock")
    }
}

#[async_trait::async_trait]
impl MarketData for FakeMarket {
    async fn native_price(&self) -> Result<PriceQuote> {
        self.native
            .ok_or_else(|| AppError::ExternalAPI("price feed down".to_string()))
    }

    async fn token_price(&self, contract: &str) -> Result<PriceQuote> {
        if self.fail_tokens {
            return Err(AppError::ExternalAPI("rate limited".to_string()));
        }
        Ok(self
            .tokens
            .get(&contract.to_ascii_lowercase())
            .copied()
            .unwrap_or_default())
    }

    async fn transactions(&self, _address: &str, start_block: u64) -> Result<Vec<ExplorerTransaction>> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_start_block.lock().expect("start block lock") = Some(start_block);
        self.transactions
            .clone()
            .ok_or_else(|| AppError::ExternalAPI("explorer down".to_string()))
    }
}
