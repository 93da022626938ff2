//! Small constructors for test data.

use alloy_primitives::{Address, U256};
use bigbang_types::{OrbitIncomeRow, TeamEntry};

/// Deterministic non-zero address for `seed` (1..=255).
pub fn address(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

/// Whole RAMA expressed in wei.
pub fn rama(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10u64).pow(U256::from(18u64))
}

/// Whole dollars expressed in micro-USD.
pub fn micro_usd(amount: u64) -> U256 {
    U256::from(amount) * U256::from(1_000_000u64)
}

/// Team entry earning `usd` whole dollars.
pub fn team_entry(seed: u8, usd: u64) -> TeamEntry {
    TeamEntry {
        wallet_address: address(seed),
        income_earned: micro_usd(usd),
        registration_time: 1_700_000_000 + u64::from(seed),
    }
}

/// Orbit payment of `amount` RAMA from `level`.
pub fn income_row(level: u64, amount: u64) -> OrbitIncomeRow {
    OrbitIncomeRow {
        coin: "RAMA".to_string(),
        amount_native: rama(amount),
        amount_usd: micro_usd(amount),
        level,
        timestamp_seconds: 1_700_000_000 + level,
    }
}
