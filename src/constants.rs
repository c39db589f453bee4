/// Application constants

// Token addresses (Ethereum mainnet)
pub const USDT_CONTRACT_ADDRESS: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

// Native asset
pub const NATIVE_DECIMALS: u32 = 18;
pub const COINGECKO_NATIVE_ID: &str = "ethereum";
pub const COINGECKO_PLATFORM: &str = "ethereum";

// Networks
pub const CHAIN_ID_MAINNET: u64 = 1;
pub const CHAIN_ID_SEPOLIA: u64 = 11_155_111;
pub const DEFAULT_RPC_URL_MAINNET: &str = "https://ethereum.publicnode.com";
pub const DEFAULT_RPC_URL_SEPOLIA: &str = "https://rpc.sepolia.org";

// External APIs
pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";
pub const EXPLORER_END_BLOCK: u64 = 99_999_999;
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 15;

// Retry configuration
pub const HTTP_MAX_RETRIES: u32 = 3;
pub const HTTP_RETRY_BASE_DELAY_MS: u64 = 1000;

// Chart configuration
pub const CHART_CACHE_TTL_SECS: u64 = 60;
pub const CHART_CACHE_PREFIX: &str = "chart";
pub const SECONDS_PER_BLOCK: u64 = 12;
pub const MOCK_CHART_POINTS: usize = 20;
pub const MOCK_VALUE_MIN: f64 = 200.0;
pub const MOCK_VALUE_SPAN: f64 = 1000.0;

// API version
pub const API_VERSION: &str = "v1";
