//! Core types for the BigBang orbit client
//!
//! This crate provides the shared vocabulary used by the chain client, the
//! synchronization store and the command-line front end: account snapshots,
//! team and orbit records, transaction descriptors and user-facing notices.

pub mod notice;
pub mod units;

use alloy_primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use notice::{Notice, NoticeSeverity, Notifier, TracingNotifier};

/// Number of referral levels reported by the contract.
pub const MAX_LEVEL: u8 = 9;

/// Number of X-slots in a single orbit.
pub const ORBIT_SLOTS: u8 = 10;

/// Decimals of the native RAMA token.
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimals of USD-denominated contract values (micro-USD).
pub const USD_DECIMALS: u8 = 6;

/// Sentinel address the contract returns for "no such user".
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// On-chain account state at a point in time.
///
/// A snapshot is rebuilt from scratch on every fetch; for unregistered
/// accounts every earning and orbit field is zero and `sponsor` /
/// `registration_time` are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    /// Native balance formatted with four fractional digits
    pub balance_native: String,
    /// Account address
    pub address: Address,
    /// Numeric user ID (0 = unregistered)
    pub user_id: u64,
    /// Whether the account joined BigBang
    pub is_registered: bool,
    /// Registration time
    pub registration_time: Option<DateTime<Utc>>,
    /// Upline address
    pub sponsor: Option<Address>,
    /// Total earnings in USD
    pub total_earnings_usd: f64,
    /// Total earnings in RAMA (not populated by the contract yet)
    pub total_earnings_native: f64,
    /// Number of repurchases
    pub repurchase_count: u64,
    /// Filled X-slots of the current orbit (0..=10)
    pub current_orbit_slot: u8,
    /// Number of orbits entered
    pub orbit_count: u64,
    /// Platform user count (placeholder)
    pub total_users: u64,
}

impl UserSnapshot {
    /// Minimal snapshot for a wallet that has not registered.
    pub fn unregistered(address: Address, balance_native: String) -> Self {
        Self {
            balance_native,
            address,
            user_id: 0,
            is_registered: false,
            registration_time: None,
            sponsor: None,
            total_earnings_usd: 0.0,
            total_earnings_native: 0.0,
            repurchase_count: 0,
            current_orbit_slot: 0,
            orbit_count: 0,
            total_users: 0,
        }
    }
}

/// Current cost of registering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequirement {
    /// Join amount in RAMA
    pub required_native: f64,
    /// Join amount in USD (same figure as `required_native`, no price feed)
    pub required_usd: f64,
}

/// Aggregated earnings for one referral level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelIncomeRow {
    /// Level (1..=9)
    pub level: u8,
    /// Earnings in USD
    pub amount_usd: f64,
    /// Earnings in RAMA (not populated)
    pub amount_native: f64,
}

impl LevelIncomeRow {
    /// Row reporting no earnings for `level`.
    pub fn zero(level: u8) -> Self {
        Self {
            level,
            amount_usd: 0.0,
            amount_native: 0.0,
        }
    }
}

/// Team entry as returned by `getTeamAtLevel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub wallet_address: Address,
    /// Income in micro-USD
    pub income_earned: U256,
    /// Unix seconds
    pub registration_time: u64,
}

/// Downline member at a queried level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Member wallet
    pub wallet_address: Address,
    /// Income in micro-USD
    pub income_earned: U256,
    /// Unix seconds
    pub registration_time: u64,
    /// Level the member was queried at
    pub level: u8,
}

impl TeamMember {
    /// Annotate a raw contract entry with the level it was fetched for.
    pub fn from_entry(entry: TeamEntry, level: u8) -> Self {
        Self {
            wallet_address: entry.wallet_address,
            income_earned: entry.income_earned,
            registration_time: entry.registration_time,
            level,
        }
    }

    /// Member income in USD.
    pub fn income_usd(&self) -> f64 {
        units::to_decimal(self.income_earned, USD_DECIMALS)
    }
}

/// Members of one level together with their combined income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLevelSummary {
    pub level: u8,
    pub members: Vec<TeamMember>,
    pub total_income_usd: f64,
}

/// One payment received inside an orbit, as returned by `getFullOrbitIncome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitIncomeRow {
    /// Coin label
    pub coin: String,
    /// Amount in wei
    pub amount_native: U256,
    /// Amount in micro-USD
    pub amount_usd: U256,
    /// Referral level the payment came from
    pub level: u64,
    /// Unix seconds
    pub timestamp_seconds: u64,
}

/// One of a user's sequential orbit cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitRecord {
    /// 0-based orbit index
    pub orbit_id: u64,
    /// Filled slots (0..=10)
    pub completed_slots: u8,
    /// Payments received in this orbit
    pub income_rows: Vec<OrbitIncomeRow>,
}

impl OrbitRecord {
    /// Whether all slots of the orbit are filled.
    pub fn is_closed(&self) -> bool {
        self.completed_slots >= ORBIT_SLOTS
    }
}

/// Result of a per-orbit payment history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayHistory {
    pub total_orbit_count: u64,
    pub income_rows: Vec<OrbitIncomeRow>,
}

/// Completed slot count of `orbit_id` given the user's live counters.
///
/// Orbits before the current one are closed. The current orbit reports the
/// live X-slot counter. If the live counter already reached 10 the last
/// listed orbit is closed as well.
pub fn completed_slots(orbit_id: u64, orbit_count: u64, current_orbit_slot: u8) -> u8 {
    let current = current_orbit_slot.min(ORBIT_SLOTS);
    let last_open = if current < ORBIT_SLOTS {
        orbit_count.saturating_sub(1)
    } else {
        orbit_count
    };
    if orbit_id < last_open {
        ORBIT_SLOTS
    } else {
        current
    }
}

/// Call parameters for `eth_call` / `eth_estimateGas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
}

/// Unsigned transaction handed to the wallet layer for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    /// Hex quantity, wei
    pub value: String,
    /// Hex quantity
    pub gas: String,
    /// Hex quantity, wei
    pub gas_price: String,
}

/// Execution outcome recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Mined transaction receipt (subset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
    pub status: ReceiptStatus,
}
