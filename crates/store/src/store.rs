//! Shared account state and the operations that feed it.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use alloy_primitives::{Address, B256};
use bigbang_chain_client::{BigBangChain, ChainClientError, NetworkConfig};
use bigbang_types::units::{format_fixed, to_decimal, to_u64, timestamp_to_datetime};
use bigbang_types::{
    ActivationRequirement, LevelIncomeRow, Notifier, OrbitRecord, PayHistory, TeamLevelSummary,
    TeamMember, TxReceipt, UnsignedTransaction, UserSnapshot, MAX_LEVEL, NATIVE_DECIMALS,
    USD_DECIMALS,
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::aggregate::{self, slot_counter};
use crate::error::StoreResult;
use crate::guard::{FetchGuard, FetchToken};
use crate::metrics::StoreMetrics;
use crate::registration::{self, ReceiptWatcher};
use crate::sponsor;

#[derive(Debug, Default)]
struct StoreState {
    snapshot: Option<UserSnapshot>,
    requirement: ActivationRequirement,
    last_fetched_at: Option<DateTime<Utc>>,
}

/// Client-side cache of BigBang account state.
///
/// Snapshot loads may overlap; only the most recently started load commits
/// its result. All other operations are pass-through reads that return their
/// results without touching the cached state.
#[derive(Clone)]
pub struct Store {
    chain: Arc<dyn BigBangChain>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<StoreState>>,
    guard: Arc<FetchGuard>,
    metrics: Option<StoreMetrics>,
}

impl Store {
    pub fn new(chain: Arc<dyn BigBangChain>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            chain,
            notifier,
            state: Arc::new(RwLock::new(StoreState::default())),
            guard: Arc::new(FetchGuard::new()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: StoreMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn chain(&self) -> &dyn BigBangChain {
        self.chain.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Latest committed snapshot.
    pub async fn snapshot(&self) -> Option<UserSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    /// Latest committed activation requirement.
    pub async fn requirement(&self) -> ActivationRequirement {
        self.state.read().await.requirement
    }

    /// When the committed snapshot was fetched.
    pub async fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_fetched_at
    }

    /// Fetch the account bundle for `address`.
    ///
    /// The snapshot is always returned. It replaces the cached one only if no
    /// newer load was started in the meantime.
    pub async fn load_user_snapshot(&self, address: Address) -> StoreResult<UserSnapshot> {
        let token = self.guard.issue();
        debug!(address = %address, token = token.value(), "Loading user snapshot");

        let snapshot = self.observe("snapshot", fetch_snapshot(self.chain(), address)).await?;
        self.commit(token, &snapshot).await;
        Ok(snapshot)
    }

    async fn commit(&self, token: FetchToken, snapshot: &UserSnapshot) {
        let mut state = self.state.write().await;
        if !self.guard.is_current(token) {
            debug!(
                address = %snapshot.address,
                token = token.value(),
                latest = self.guard.latest(),
                "Discarding stale snapshot"
            );
            if let Some(metrics) = &self.metrics {
                metrics.stale_discards_total.inc();
            }
            return;
        }
        state.snapshot = Some(snapshot.clone());
        state.last_fetched_at = Some(Utc::now());
        info!(
            address = %snapshot.address,
            registered = snapshot.is_registered,
            user_id = snapshot.user_id,
            "Snapshot committed"
        );
    }

    /// Read the join amount and cache it.
    pub async fn fetch_activation_requirement(&self) -> StoreResult<ActivationRequirement> {
        let join_amount = self
            .observe("activation", async { self.chain.join_amount().await })
            .await?;
        let native = to_decimal(join_amount, NATIVE_DECIMALS);
        let requirement = ActivationRequirement {
            required_native: native,
            required_usd: native,
        };
        self.state.write().await.requirement = requirement;
        debug!(required = native, "Activation requirement updated");
        Ok(requirement)
    }

    pub async fn resolve_sponsor(&self, input: &str) -> StoreResult<Address> {
        Ok(self
            .observe("resolve_sponsor", sponsor::resolve_sponsor(self.chain(), input))
            .await?)
    }

    pub async fn lookup_user_id(&self, address: Address) -> StoreResult<u64> {
        Ok(self
            .observe("lookup_user_id", sponsor::lookup_user_id(self.chain(), address))
            .await?)
    }

    pub async fn lookup_user_address(&self, user_id: u64) -> StoreResult<Address> {
        Ok(self
            .observe(
                "lookup_user_address",
                sponsor::lookup_user_address(self.chain(), user_id),
            )
            .await?)
    }

    pub async fn is_registered(&self, address: Address) -> StoreResult<bool> {
        Ok(self
            .observe("is_registered", sponsor::is_registered(self.chain(), address))
            .await?)
    }

    pub async fn build_registration_tx(
        &self,
        user_address: &str,
        sponsor: &str,
    ) -> StoreResult<UnsignedTransaction> {
        let prepared = registration::build_registration_tx(
            self.chain(),
            self.notifier(),
            user_address,
            sponsor,
        );
        Ok(self.observe("registration", prepared).await?)
    }

    /// Follow a broadcast transaction until it is mined.
    pub async fn wait_for_receipt(
        &self,
        config: &NetworkConfig,
        tx_hash: B256,
    ) -> StoreResult<TxReceipt> {
        let watcher = ReceiptWatcher::from_config(self.chain(), self.notifier(), config);
        Ok(self.observe("receipt", watcher.wait(tx_hash)).await?)
    }

    pub async fn team_at_level(&self, address: Address, level: u8) -> StoreResult<Vec<TeamMember>> {
        Ok(self
            .observe("team", aggregate::team_at_level(self.chain(), address, level))
            .await?)
    }

    pub async fn team_level_summary(
        &self,
        address: Address,
        level: u8,
    ) -> StoreResult<TeamLevelSummary> {
        Ok(self
            .observe(
                "team_summary",
                aggregate::team_level_summary(self.chain(), address, level),
            )
            .await?)
    }

    pub async fn all_level_income(
        &self,
        address: Address,
    ) -> StoreResult<[LevelIncomeRow; MAX_LEVEL as usize]> {
        Ok(self
            .observe("level_income", aggregate::all_level_income(self.chain(), address))
            .await?)
    }

    pub async fn pay_history(&self, address: Address, orbit_id: u64) -> StoreResult<PayHistory> {
        let history = aggregate::pay_history(self.chain(), self.notifier(), address, orbit_id);
        Ok(self.observe("pay_history", history).await?)
    }

    pub async fn orbit_overview(&self, address: Address) -> StoreResult<Vec<OrbitRecord>> {
        Ok(self
            .observe("orbits", aggregate::orbit_overview(self.chain(), address))
            .await?)
    }

    pub async fn load_orbit(&self, address: Address, orbit_id: u64) -> StoreResult<OrbitRecord> {
        let orbit = aggregate::load_orbit(self.chain(), self.notifier(), address, orbit_id);
        Ok(self.observe("orbit", orbit).await?)
    }

    async fn observe<T, E>(
        &self,
        operation: &'static str,
        fetch: impl Future<Output = Result<T, E>>,
    ) -> Result<T, E> {
        let started = Instant::now();
        let result = fetch.await;
        if let Some(metrics) = &self.metrics {
            metrics.observe(operation, started.elapsed().as_secs_f64(), result.is_err());
        }
        result
    }
}

async fn fetch_snapshot(
    chain: &dyn BigBangChain,
    address: Address,
) -> Result<UserSnapshot, ChainClientError> {
    let (balance, registered) =
        tokio::try_join!(chain.balance(address), chain.is_registered(address))?;
    let balance_native = format_fixed(balance, NATIVE_DECIMALS, 4);

    if !registered {
        return Ok(UserSnapshot::unregistered(address, balance_native));
    }

    let (user_id, registered_at, upline, earnings, current_orbit_x, orbit_count, repurchases) =
        tokio::try_join!(
            chain.user_id(address),
            chain.registration_time(address),
            chain.upline(address),
            chain.total_earnings(address),
            chain.current_orbit_x(address),
            chain.orbit_count(address),
            chain.repurchase_count(address),
        )?;

    let registered_at = to_u64(registered_at)?;

    Ok(UserSnapshot {
        balance_native,
        address,
        user_id: to_u64(user_id)?,
        is_registered: true,
        registration_time: if registered_at == 0 {
            None
        } else {
            timestamp_to_datetime(registered_at)
        },
        sponsor: Some(upline),
        total_earnings_usd: to_decimal(earnings, USD_DECIMALS),
        total_earnings_native: 0.0,
        repurchase_count: to_u64(repurchases)?,
        current_orbit_slot: slot_counter(current_orbit_x),
        orbit_count: to_u64(orbit_count)?,
        total_users: 0,
    })
}
