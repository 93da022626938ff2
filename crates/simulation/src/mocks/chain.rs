//! Mock BigBang contract for testing chain interactions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use bigbang_chain_client::{BigBangChain, ChainClientError, ChainResult};
use bigbang_types::{CallRequest, OrbitIncomeRow, TeamEntry, TxReceipt};

const MOCK_CONTRACT: Address = Address::repeat_byte(0xbb);

/// A recorded contract or node call, for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    Balance(Address),
    GasPrice,
    EstimateGas { from: Option<Address>, value: Option<U256> },
    TransactionReceipt(B256),
    UserId(Address),
    UserById(u64),
    IsRegistered(Address),
    RegistrationTime(Address),
    Upline(Address),
    TotalEarnings(Address),
    CurrentOrbitX(Address),
    OrbitCount(Address),
    RepurchaseCount(Address),
    JoinAmount,
    FullOrbitIncome { account: Address, orbit_id: u64 },
    TeamAtLevel { account: Address, level: u8 },
}

/// Registered account as the contract stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAccount {
    pub user_id: u64,
    pub registration_time: U256,
    pub upline: Address,
    pub total_earnings: U256,
    pub current_orbit_x: U256,
    pub orbit_count: U256,
    pub repurchase_count: U256,
}

impl MockAccount {
    /// Freshly registered account in its first orbit.
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            registration_time: U256::from(1_700_000_000u64),
            upline: Address::ZERO,
            total_earnings: U256::ZERO,
            current_orbit_x: U256::ZERO,
            orbit_count: U256::from(1u64),
            repurchase_count: U256::ZERO,
        }
    }

    pub fn with_upline(mut self, upline: Address) -> Self {
        self.upline = upline;
        self
    }

    pub fn with_earnings(mut self, micro_usd: U256) -> Self {
        self.total_earnings = micro_usd;
        self
    }

    pub fn with_orbits(mut self, orbit_count: u64, current_orbit_x: u64) -> Self {
        self.orbit_count = U256::from(orbit_count);
        self.current_orbit_x = U256::from(current_orbit_x);
        self
    }

    pub fn with_repurchases(mut self, count: u64) -> Self {
        self.repurchase_count = U256::from(count);
        self
    }

    pub fn with_registration_time(mut self, raw: u64) -> Self {
        self.registration_time = U256::from(raw);
        self
    }
}

/// Mock contract state.
#[derive(Debug, Clone, Default)]
pub struct MockChainState {
    /// Native balances in wei
    pub balances: HashMap<Address, U256>,
    /// Registered accounts
    pub accounts: HashMap<Address, MockAccount>,
    /// Team listings per (account, level)
    pub teams: HashMap<(Address, u8), Vec<TeamEntry>>,
    /// Orbit payments per (account, orbit)
    pub orbit_income: HashMap<(Address, u64), Vec<OrbitIncomeRow>>,
    /// `getJoinAmountInRAMA` in wei
    pub join_amount: U256,
    /// `eth_gasPrice` in wei
    pub gas_price: U256,
    /// `eth_estimateGas` result
    pub gas_estimate: U256,
    /// Mined receipts
    pub receipts: HashMap<B256, TxReceipt>,
    /// Number of receipt polls answered with "pending" before the receipt shows
    pub pending_receipt_polls: u32,
}

/// Scripted [`BigBangChain`] implementation.
///
/// Provides state seeding, call recording and fault injection.
///
/// # Example
///
/// ```rust,ignore
/// use bigbang_simulation::{fixtures, MockChain};
///
/// let chain = MockChain::new().with_failure("estimate_gas");
///
/// // ... exercise code under test ...
///
/// assert_eq!(chain.count(|call| matches!(call, ChainCall::GasPrice)), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockChain {
    state: Mutex<MockChainState>,
    calls: Mutex<Vec<ChainCall>>,
    balance_script: Mutex<VecDeque<(Duration, U256)>>,
    failures: Mutex<HashSet<&'static str>>,
}

impl MockChain {
    /// Create a mock with sensible gas defaults and no accounts.
    pub fn new() -> Self {
        let state = MockChainState {
            gas_price: U256::from(1_000_000_000u64),
            gas_estimate: U256::from(250_000u64),
            ..MockChainState::default()
        };
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn with_balance(self, account: Address, wei: U256) -> Self {
        self.set_balance(account, wei);
        self
    }

    /// Register `account` and index it by its user id.
    pub fn with_user(self, account: Address, details: MockAccount) -> Self {
        self.lock_state().accounts.insert(account, details);
        self
    }

    pub fn with_team(self, account: Address, level: u8, members: Vec<TeamEntry>) -> Self {
        self.lock_state().teams.insert((account, level), members);
        self
    }

    pub fn with_orbit_income(self, account: Address, orbit_id: u64, rows: Vec<OrbitIncomeRow>) -> Self {
        self.lock_state().orbit_income.insert((account, orbit_id), rows);
        self
    }

    pub fn with_join_amount(self, wei: U256) -> Self {
        self.lock_state().join_amount = wei;
        self
    }

    pub fn with_gas(self, estimate: U256, price: U256) -> Self {
        {
            let mut state = self.lock_state();
            state.gas_estimate = estimate;
            state.gas_price = price;
        }
        self
    }

    /// Make receipt `tx_hash` visible after `pending_polls` empty answers.
    pub fn with_receipt(self, receipt: TxReceipt, pending_polls: u32) -> Self {
        {
            let mut state = self.lock_state();
            state.receipts.insert(receipt.transaction_hash, receipt);
            state.pending_receipt_polls = pending_polls;
        }
        self
    }

    /// Fail every call to the named trait method.
    pub fn with_failure(self, method: &'static str) -> Self {
        self.lock_failures().insert(method);
        self
    }

    pub fn set_balance(&self, account: Address, wei: U256) {
        self.lock_state().balances.insert(account, wei);
    }

    /// Queue a balance answer delivered after `delay`.
    ///
    /// Scripted answers are consumed in call order before falling back to
    /// the seeded balances.
    pub fn script_balance(&self, delay: Duration, wei: U256) {
        self.balance_script
            .lock()
            .expect("mock script lock poisoned")
            .push_back((delay, wei));
    }

    /// Register `account` after construction, as an out-of-band join would.
    pub fn set_registered(&self, account: Address, details: MockAccount) {
        self.lock_state().accounts.insert(account, details);
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<ChainCall> {
        self.calls.lock().expect("mock calls lock poisoned").clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ChainCall) -> bool) -> usize {
        self.calls
            .lock()
            .expect("mock calls lock poisoned")
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().expect("mock calls lock poisoned").clear();
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MockChainState> {
        self.state.lock().expect("mock state lock poisoned")
    }

    fn lock_failures(&self) -> std::sync::MutexGuard<'_, HashSet<&'static str>> {
        self.failures.lock().expect("mock failure lock poisoned")
    }

    fn record(&self, method: &'static str, call: ChainCall) -> ChainResult<()> {
        self.calls.lock().expect("mock calls lock poisoned").push(call);
        if self.lock_failures().contains(method) {
            return Err(ChainClientError::Rpc {
                code: -32000,
                message: format!("mock failure: {method}"),
            });
        }
        Ok(())
    }

    fn account(&self, account: Address) -> Option<MockAccount> {
        self.lock_state().accounts.get(&account).cloned()
    }
}

#[async_trait]
impl BigBangChain for MockChain {
    fn contract_address(&self) -> Address {
        MOCK_CONTRACT
    }

    async fn balance(&self, account: Address) -> ChainResult<U256> {
        self.record("balance", ChainCall::Balance(account))?;
        let scripted = self
            .balance_script
            .lock()
            .expect("mock script lock poisoned")
            .pop_front();
        if let Some((delay, wei)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(wei);
        }
        Ok(self
            .lock_state()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn gas_price(&self) -> ChainResult<U256> {
        self.record("gas_price", ChainCall::GasPrice)?;
        Ok(self.lock_state().gas_price)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> ChainResult<U256> {
        self.record(
            "estimate_gas",
            ChainCall::EstimateGas {
                from: request.from,
                value: request.value,
            },
        )?;
        Ok(self.lock_state().gas_estimate)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<Option<TxReceipt>> {
        self.record("transaction_receipt", ChainCall::TransactionReceipt(tx_hash))?;
        let mut state = self.lock_state();
        if state.pending_receipt_polls > 0 {
            state.pending_receipt_polls -= 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }

    async fn user_id(&self, account: Address) -> ChainResult<U256> {
        self.record("user_id", ChainCall::UserId(account))?;
        Ok(self
            .account(account)
            .map(|details| U256::from(details.user_id))
            .unwrap_or_default())
    }

    async fn user_by_id(&self, user_id: u64) -> ChainResult<Address> {
        self.record("user_by_id", ChainCall::UserById(user_id))?;
        Ok(self
            .lock_state()
            .accounts
            .iter()
            .find(|(_, details)| details.user_id == user_id)
            .map(|(address, _)| *address)
            .unwrap_or(Address::ZERO))
    }

    async fn is_registered(&self, account: Address) -> ChainResult<bool> {
        self.record("is_registered", ChainCall::IsRegistered(account))?;
        Ok(self.account(account).is_some())
    }

    async fn registration_time(&self, account: Address) -> ChainResult<U256> {
        self.record("registration_time", ChainCall::RegistrationTime(account))?;
        Ok(self
            .account(account)
            .map(|details| details.registration_time)
            .unwrap_or_default())
    }

    async fn upline(&self, account: Address) -> ChainResult<Address> {
        self.record("upline", ChainCall::Upline(account))?;
        Ok(self
            .account(account)
            .map(|details| details.upline)
            .unwrap_or(Address::ZERO))
    }

    async fn total_earnings(&self, account: Address) -> ChainResult<U256> {
        self.record("total_earnings", ChainCall::TotalEarnings(account))?;
        Ok(self
            .account(account)
            .map(|details| details.total_earnings)
            .unwrap_or_default())
    }

    async fn current_orbit_x(&self, account: Address) -> ChainResult<U256> {
        self.record("current_orbit_x", ChainCall::CurrentOrbitX(account))?;
        Ok(self
            .account(account)
            .map(|details| details.current_orbit_x)
            .unwrap_or_default())
    }

    async fn orbit_count(&self, account: Address) -> ChainResult<U256> {
        self.record("orbit_count", ChainCall::OrbitCount(account))?;
        Ok(self
            .account(account)
            .map(|details| details.orbit_count)
            .unwrap_or_default())
    }

    async fn repurchase_count(&self, account: Address) -> ChainResult<U256> {
        self.record("repurchase_count", ChainCall::RepurchaseCount(account))?;
        Ok(self
            .account(account)
            .map(|details| details.repurchase_count)
            .unwrap_or_default())
    }

    async fn join_amount(&self) -> ChainResult<U256> {
        self.record("join_amount", ChainCall::JoinAmount)?;
        Ok(self.lock_state().join_amount)
    }

    async fn full_orbit_income(
        &self,
        account: Address,
        orbit_id: u64,
    ) -> ChainResult<Vec<OrbitIncomeRow>> {
        self.record(
            "full_orbit_income",
            ChainCall::FullOrbitIncome { account, orbit_id },
        )?;
        Ok(self
            .lock_state()
            .orbit_income
            .get(&(account, orbit_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn team_at_level(&self, account: Address, level: u8) -> ChainResult<Vec<TeamEntry>> {
        self.record("team_at_level", ChainCall::TeamAtLevel { account, level })?;
        Ok(self
            .lock_state()
            .teams
            .get(&(account, level))
            .cloned()
            .unwrap_or_default())
    }
}
