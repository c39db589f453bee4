// Formatting and parsing helpers shared by the services

use ethers::types::U256;
use ethers::utils::format_units;

/// Formats a raw integer amount with `decimals` places and trims trailing
/// zeros, keeping one fractional digit (`1.5`, `0.0`).
pub fn format_units_trimmed(value: U256, decimals: u32) -> String {
    let formatted = format_units(value, decimals).unwrap_or_else(|_| "0.0".to_string());
    trim_fraction(&formatted)
}

fn trim_fraction(value: &str) -> String {
    if !value.contains('.') {
        return format!("{}.0", value);
    }
    let trimmed = value.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

pub fn units_to_f64(value: U256, decimals: u32) -> f64 {
    format_units_trimmed(value, decimals)
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Parses an explorer wei string (decimal) into whole ETH.
pub fn wei_str_to_eth(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    U256::from_dec_str(trimmed)
        .map(|wei| units_to_f64(wei, crate::constants::NATIVE_DECIMALS))
        .unwrap_or(0.0)
}

/// `+$12.34` for gains, `$-1.20` / `$0.00` otherwise.
pub fn format_usd_change(amount: f64) -> String {
    if amount > 0.0 {
        format!("+${:.2}", amount)
    } else {
        format!("${:.2}", amount)
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_fixed2(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "0.00".to_string()
    }
}

pub fn is_valid_evm_address(value: &str) -> bool {
    let normalized = value.trim();
    normalized.starts_with("0x")
        && normalized.len() == 42
        && normalized[2..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn addresses_equal(a: &str, b: &str) -> bool {
    let a = a.trim();
    let b = b.trim();
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}
