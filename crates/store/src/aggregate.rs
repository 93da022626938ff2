//! Team, level income and orbit aggregation.
//!
//! These reads are not staleness-guarded: every call returns its own result
//! and nothing is committed to the store.

use alloy_primitives::{Address, U256};
use bigbang_chain_client::{BigBangChain, ChainClientError};
use bigbang_types::units::{to_decimal, to_u64};
use bigbang_types::{
    completed_slots, LevelIncomeRow, Notice, Notifier, OrbitRecord, PayHistory, TeamLevelSummary,
    TeamMember, MAX_LEVEL, ORBIT_SLOTS, USD_DECIMALS,
};
use tracing::{debug, warn};

use crate::error::AggregateError;

/// Members of `address`'s downline at `level`.
///
/// An empty list is a valid answer. The level is forwarded to the contract
/// as given.
pub async fn team_at_level(
    chain: &dyn BigBangChain,
    address: Address,
    level: u8,
) -> Result<Vec<TeamMember>, AggregateError> {
    let entries = chain.team_at_level(address, level).await?;
    debug!(address = %address, level, members = entries.len(), "Fetched team level");
    Ok(entries
        .into_iter()
        .map(|entry| TeamMember::from_entry(entry, level))
        .collect())
}

/// Members at `level` together with their combined income.
pub async fn team_level_summary(
    chain: &dyn BigBangChain,
    address: Address,
    level: u8,
) -> Result<TeamLevelSummary, AggregateError> {
    let members = team_at_level(chain, address, level).await?;
    let total = members
        .iter()
        .fold(U256::ZERO, |sum, member| sum.saturating_add(member.income_earned));
    Ok(TeamLevelSummary {
        level,
        total_income_usd: to_decimal(total, USD_DECIMALS),
        members,
    })
}

/// Progress of the level income scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Still querying the contract.
    Scanning,
    /// A level came back empty; remaining levels are reported as zero.
    Zeroed,
}

/// Income per referral level, levels 1 through 9 in order.
///
/// Scanning stops at the first level without members: that level and every
/// deeper one are reported as zero without further chain queries, even if
/// deeper levels would have members.
pub async fn all_level_income(
    chain: &dyn BigBangChain,
    address: Address,
) -> Result<[LevelIncomeRow; MAX_LEVEL as usize], AggregateError> {
    let mut rows = [LevelIncomeRow::zero(0); MAX_LEVEL as usize];
    let mut state = ScanState::Scanning;

    for (index, row) in rows.iter_mut().enumerate() {
        let level = index as u8 + 1;
        *row = LevelIncomeRow::zero(level);

        if state == ScanState::Zeroed {
            continue;
        }

        let members = chain.team_at_level(address, level).await?;
        if members.is_empty() {
            debug!(address = %address, level, "First empty level, zeroing the rest");
            state = ScanState::Zeroed;
            continue;
        }

        let total = members
            .iter()
            .fold(U256::ZERO, |sum, member| sum.saturating_add(member.income_earned));
        row.amount_usd = to_decimal(total, USD_DECIMALS);
    }

    Ok(rows)
}

/// Payments received in orbit `orbit_id`.
///
/// The index is checked against `getOrbitCount` first; an out-of-range
/// orbit raises an "Invalid Orbit" notice and never reaches
/// `getFullOrbitIncome`. Chain failures raise an "Error" notice.
pub async fn pay_history(
    chain: &dyn BigBangChain,
    notifier: &dyn Notifier,
    address: Address,
    orbit_id: u64,
) -> Result<PayHistory, AggregateError> {
    let result = fetch_pay_history(chain, notifier, address, orbit_id).await;
    if let Err(AggregateError::Chain(err)) = &result {
        warn!(address = %address, orbit_id, error = %err, "Pay history fetch failed");
        notifier.notify(Notice::error("Error", err.to_string()));
    }
    result
}

async fn fetch_pay_history(
    chain: &dyn BigBangChain,
    notifier: &dyn Notifier,
    address: Address,
    orbit_id: u64,
) -> Result<PayHistory, AggregateError> {
    let orbit_count = to_u64(chain.orbit_count(address).await?).map_err(ChainClientError::from)?;

    if orbit_id >= orbit_count {
        notifier.notify(Notice::warning(
            "Invalid Orbit",
            format!("Orbit {orbit_id} does not exist. Total orbits: {orbit_count}."),
        ));
        return Err(AggregateError::InvalidOrbit {
            orbit_id,
            orbit_count,
        });
    }

    let income_rows = chain.full_orbit_income(address, orbit_id).await?;
    debug!(address = %address, orbit_id, rows = income_rows.len(), "Fetched orbit income");
    Ok(PayHistory {
        total_orbit_count: orbit_count,
        income_rows,
    })
}

/// One record per orbit with slot progress; income rows are left empty.
pub async fn orbit_overview(
    chain: &dyn BigBangChain,
    address: Address,
) -> Result<Vec<OrbitRecord>, AggregateError> {
    let (count, current) = tokio::try_join!(
        chain.orbit_count(address),
        chain.current_orbit_x(address)
    )?;
    let orbit_count = to_u64(count).map_err(ChainClientError::from)?;
    let current_slot = slot_counter(current);

    Ok((0..orbit_count)
        .map(|orbit_id| OrbitRecord {
            orbit_id,
            completed_slots: completed_slots(orbit_id, orbit_count, current_slot),
            income_rows: Vec::new(),
        })
        .collect())
}

/// A single orbit with its payments loaded.
pub async fn load_orbit(
    chain: &dyn BigBangChain,
    notifier: &dyn Notifier,
    address: Address,
    orbit_id: u64,
) -> Result<OrbitRecord, AggregateError> {
    let history = pay_history(chain, notifier, address, orbit_id).await?;
    let current = chain.current_orbit_x(address).await?;

    let current_slot = slot_counter(current);

    Ok(OrbitRecord {
        orbit_id,
        completed_slots: completed_slots(orbit_id, history.total_orbit_count, current_slot),
        income_rows: history.income_rows,
    })
}

/// Live X-slot counter clamped to the orbit size.
pub(crate) fn slot_counter(raw: U256) -> u8 {
    u8::try_from(raw).map_or(ORBIT_SLOTS, |slot| slot.min(ORBIT_SLOTS))
}
