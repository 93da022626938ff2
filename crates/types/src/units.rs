//! Unit conversion and hex formatting helpers.
//!
//! Contract values arrive as integer base units (wei for RAMA, micro-USD for
//! dollar figures). These helpers turn them into display decimals and into the
//! `0x`-prefixed quantities JSON-RPC expects.

use std::str::FromStr;

use alloy_primitives::{utils, Address, U256};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Raw timestamps at or above this value are treated as milliseconds.
const MILLIS_THRESHOLD: u64 = 1_000_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid hex quantity: {0}")]
    InvalidQuantity(String),

    #[error("value does not fit in 64 bits: {0}")]
    Overflow(U256),

    #[error("cannot scale by {0} decimals")]
    Decimals(u8),
}

/// Exact decimal rendering of `value` scaled down by `10^decimals`.
///
/// Trailing fractional zeros are trimmed, keeping at least one digit.
pub fn format_units(value: U256, decimals: u8) -> Result<String, UnitsError> {
    let full =
        utils::format_units(value, decimals).map_err(|_| UnitsError::Decimals(decimals))?;
    let Some((whole, frac)) = full.split_once('.') else {
        return Ok(format!("{full}.0"));
    };
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        Ok(format!("{whole}.0"))
    } else {
        Ok(format!("{whole}.{frac}"))
    }
}

/// Lossy `f64` view of `value / 10^decimals`.
pub fn to_decimal(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals)
        .ok()
        .and_then(|text| text.parse().ok())
        .unwrap_or_default()
}

/// Fixed-point rendering with `places` fractional digits.
pub fn format_fixed(value: U256, decimals: u8, places: usize) -> String {
    format!("{:.*}", places, to_decimal(value, decimals))
}

/// Minimal `0x`-prefixed hex quantity.
pub fn to_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

/// Parse a JSON-RPC hex quantity.
pub fn parse_quantity(raw: &str) -> Result<U256, UnitsError> {
    let invalid = || UnitsError::InvalidQuantity(raw.to_string());
    match raw.strip_prefix("0x") {
        Some("") => Ok(U256::ZERO),
        Some(_) => U256::from_str(raw).map_err(|_| invalid()),
        None => Err(invalid()),
    }
}

/// Narrow a contract integer to `u64`.
pub fn to_u64(value: U256) -> Result<u64, UnitsError> {
    u64::try_from(value).map_err(|_| UnitsError::Overflow(value))
}

/// Whether `raw` is `0x` followed by exactly 40 hex digits.
pub fn is_hex_address(raw: &str) -> bool {
    match raw.strip_prefix("0x") {
        Some(digits) => digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Lower-case `0x` rendering of an address.
pub fn lower_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// `0x1234...abcd` style abbreviation.
pub fn shorten_address(address: &Address, left: usize, right: usize) -> String {
    let full = lower_hex(address);
    if full.len() <= left + right {
        return full;
    }
    format!("{}...{}", &full[..left], &full[full.len() - right..])
}

/// Convert a contract timestamp into a UTC datetime.
///
/// Contracts usually store seconds; values of 1e12 and above are taken as
/// milliseconds.
pub fn timestamp_to_datetime(raw: u64) -> Option<DateTime<Utc>> {
    if raw < MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp(i64::try_from(raw).ok()?, 0)
    } else {
        DateTime::<Utc>::from_timestamp_millis(i64::try_from(raw).ok()?)
    }
}
