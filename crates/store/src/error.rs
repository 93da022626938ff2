//! Error types for the synchronization store.
//!
//! Every error maps onto an [`ErrorCategory`] so front ends can decide how
//! to present a failure without matching on individual variants.

use std::time::Duration;

use alloy_primitives::{Address, B256};
use bigbang_chain_client::ChainClientError;
use thiserror::Error;

/// Coarse classification of store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input, rejected before any network call.
    Validation,
    /// The chain answered but the referenced entity does not exist.
    NotFound,
    /// Transport, RPC or decoding failure.
    Network,
    /// The wallet cannot cover the registration cost.
    InsufficientFunds,
}

/// Top-level error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainClientError),

    #[error("sponsor error: {0}")]
    Sponsor(#[from] SponsorError),

    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl StoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Chain(_) => ErrorCategory::Network,
            Self::Sponsor(err) => err.category(),
            Self::Registration(err) => err.category(),
            Self::Aggregate(err) => err.category(),
            Self::Session(err) => err.category(),
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors resolving a sponsor reference or looking up a user.
#[derive(Debug, Error)]
pub enum SponsorError {
    /// The zero address was given as sponsor.
    #[error("invalid sponsor address")]
    InvalidSponsor,

    /// Well-formed address without a user ID.
    #[error("sponsor {0} is not registered")]
    SponsorNotRegistered(Address),

    /// Numeric input that is zero or out of range.
    #[error("invalid sponsor ID: {0}")]
    InvalidSponsorId(String),

    /// No account is stored under the sponsor ID.
    #[error("no sponsor with ID {0}")]
    SponsorNotFound(u64),

    /// Neither an address nor a user ID.
    #[error("unrecognized sponsor reference: {0:?}")]
    UnrecognizedFormat(String),

    /// No account is stored under the user ID.
    #[error("no user with ID {0}")]
    UserNotFound(u64),

    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

impl SponsorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSponsor | Self::InvalidSponsorId(_) | Self::UnrecognizedFormat(_) => {
                ErrorCategory::Validation
            }
            Self::SponsorNotRegistered(_) | Self::SponsorNotFound(_) | Self::UserNotFound(_) => {
                ErrorCategory::NotFound
            }
            Self::Chain(_) => ErrorCategory::Network,
        }
    }
}

/// Errors preparing or tracking the registration transaction.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Registering wallet is not a `0x` + 40 hex address.
    #[error("invalid wallet address: {0:?}")]
    InvalidAddress(String),

    #[error(transparent)]
    Sponsor(#[from] SponsorError),

    /// Balance below the join amount.
    #[error("insufficient balance: have {balance} RAMA, need {required} RAMA")]
    InsufficientFunds { balance: String, required: String },

    /// `eth_estimateGas` rejected the call.
    #[error("gas estimation failed: {0}")]
    GasEstimationFailed(ChainClientError),

    /// No receipt appeared in time.
    #[error("no receipt for {tx_hash} after {waited:?}")]
    ReceiptTimeout { tx_hash: B256, waited: Duration },

    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

impl RegistrationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAddress(_) => ErrorCategory::Validation,
            Self::Sponsor(err) => err.category(),
            Self::InsufficientFunds { .. } => ErrorCategory::InsufficientFunds,
            Self::GasEstimationFailed(_) | Self::ReceiptTimeout { .. } | Self::Chain(_) => {
                ErrorCategory::Network
            }
        }
    }
}

/// Errors from team, level income and orbit aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Orbit index outside `0..orbit_count`.
    #[error("orbit {orbit_id} does not exist ({orbit_count} orbits)")]
    InvalidOrbit { orbit_id: u64, orbit_count: u64 },

    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

impl AggregateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidOrbit { .. } => ErrorCategory::Validation,
            Self::Chain(_) => ErrorCategory::Network,
        }
    }
}

/// Errors reading or writing the local session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed session file: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound => ErrorCategory::NotFound,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sponsor_categories() {
        assert_eq!(SponsorError::InvalidSponsor.category(), ErrorCategory::Validation);
        assert_eq!(SponsorError::SponsorNotFound(4).category(), ErrorCategory::NotFound);
        assert_eq!(
            SponsorError::Chain(ChainClientError::NoEndpoints).category(),
            ErrorCategory::Network
        );
    }

    #[test]
    fn test_nested_category_passes_through() {
        let err: StoreError = RegistrationError::from(SponsorError::UnrecognizedFormat("x".into())).into();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: StoreError = RegistrationError::InsufficientFunds {
            balance: "10.0000".into(),
            required: "25.0000".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::InsufficientFunds);
    }

    #[test]
    fn test_invalid_orbit_message() {
        let err = AggregateError::InvalidOrbit {
            orbit_id: 5,
            orbit_count: 3,
        };
        assert_eq!(err.to_string(), "orbit 5 does not exist (3 orbits)");
    }
}
