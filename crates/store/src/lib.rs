//! # BigBang Store
//!
//! Client-side synchronization layer for the BigBang orbit contract.
//!
//! ## Responsibilities
//!
//! - **Snapshots**: load a consistent account bundle and cache it, dropping
//!   results of loads that were overtaken by a newer one
//! - **Sponsors**: resolve a sponsor given as address or user ID
//! - **Registration**: prepare the unsigned `registerAndActivate` transaction
//!   and follow its receipt
//! - **Aggregation**: team listings, per-level income and orbit history
//! - **Session**: remember the connected wallet and viewed profile on disk
//!
//! All chain access goes through [`BigBangChain`](bigbang_chain_client::BigBangChain),
//! all user-facing messages through [`Notifier`](bigbang_types::Notifier).

pub mod aggregate;
pub mod error;
pub mod guard;
pub mod metrics;
pub mod referral;
pub mod registration;
pub mod session;
pub mod sponsor;
mod store;

pub use error::{
    AggregateError, ErrorCategory, RegistrationError, SessionError, SponsorError, StoreError,
    StoreResult,
};
pub use guard::{FetchGuard, FetchToken};
pub use metrics::StoreMetrics;
pub use registration::{build_registration_tx, ReceiptWatcher};
pub use session::{SessionData, SessionFile};
pub use sponsor::{resolve_sponsor, SponsorRef};
pub use store::Store;
