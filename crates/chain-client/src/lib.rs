//! Chain client for the BigBang orbit contract.
//!
//! Provides a JSON-RPC transport for the Ramestta chain, Solidity bindings for
//! the BigBang contract and the [`BigBangChain`] trait the synchronization
//! store is written against. [`RpcBigBangChain`] implements the trait on top
//! of HTTP JSON-RPC; tests substitute a scripted mock.

pub mod abi;
pub mod config;
mod contract;
mod rpc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use bigbang_types::units::UnitsError;
use bigbang_types::{CallRequest, OrbitIncomeRow, TeamEntry, TxReceipt};
use thiserror::Error;

pub use config::NetworkConfig;
pub use contract::RpcBigBangChain;
pub use rpc::RpcClient;

/// Errors returned by the chain client.
#[derive(Debug, Error)]
pub enum ChainClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("ABI decode error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Units error: {0}")]
    Units(#[from] UnitsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No RPC endpoints configured")]
    NoEndpoints,
}

/// Result type alias for chain operations.
pub type ChainResult<T> = Result<T, ChainClientError>;

/// Read/write surface of the BigBang contract plus the node queries the
/// client needs.
///
/// Numeric contract values are returned raw; callers normalize units.
#[async_trait]
pub trait BigBangChain: Send + Sync {
    /// Address transactions are sent to.
    fn contract_address(&self) -> Address;

    /// Native balance in wei (`eth_getBalance`).
    async fn balance(&self, account: Address) -> ChainResult<U256>;

    /// Current gas price in wei (`eth_gasPrice`).
    async fn gas_price(&self) -> ChainResult<U256>;

    /// Gas estimate for a call (`eth_estimateGas`).
    async fn estimate_gas(&self, request: &CallRequest) -> ChainResult<U256>;

    /// Receipt for a mined transaction, `None` while pending.
    async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<Option<TxReceipt>>;

    /// `getUserId(address)`; zero when unknown.
    async fn user_id(&self, account: Address) -> ChainResult<U256>;

    /// `getUserById(uint256)`; zero address when unknown.
    async fn user_by_id(&self, user_id: u64) -> ChainResult<Address>;

    /// `isRegistered(address)`.
    async fn is_registered(&self, account: Address) -> ChainResult<bool>;

    /// `registrationTime(address)`.
    async fn registration_time(&self, account: Address) -> ChainResult<U256>;

    /// `upline(address)`.
    async fn upline(&self, account: Address) -> ChainResult<Address>;

    /// `getTotalEarnings(address)`, micro-USD.
    async fn total_earnings(&self, account: Address) -> ChainResult<U256>;

    /// `getCurrentOrbitX(address)`.
    async fn current_orbit_x(&self, account: Address) -> ChainResult<U256>;

    /// `getOrbitCount(address)`.
    async fn orbit_count(&self, account: Address) -> ChainResult<U256>;

    /// `getRepurchaseCount(address)`.
    async fn repurchase_count(&self, account: Address) -> ChainResult<U256>;

    /// `getJoinAmountInRAMA()`, wei.
    async fn join_amount(&self) -> ChainResult<U256>;

    /// `getFullOrbitIncome(address, orbitId)`.
    async fn full_orbit_income(
        &self,
        account: Address,
        orbit_id: u64,
    ) -> ChainResult<Vec<OrbitIncomeRow>>;

    /// `getTeamAtLevel(address, level)`.
    async fn team_at_level(&self, account: Address, level: u8) -> ChainResult<Vec<TeamEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainClientError::Rpc {
            code: -32000,
            message: "execution reverted".to_string(),
        };
        assert!(err.to_string().contains("-32000"));
        assert!(err.to_string().contains("execution reverted"));
    }

    #[test]
    fn test_error_conversion() {
        let units_err = UnitsError::InvalidQuantity("zz".to_string());
        let err: ChainClientError = units_err.into();
        assert!(matches!(err, ChainClientError::Units(_)));
    }
}
