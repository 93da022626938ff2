//! # BigBang Simulation Crate
//!
//! In-memory stand-ins for the BigBang contract and the notice sink so the
//! synchronization store can be exercised without a node.
//!
//! ## Features
//!
//! - **Scripted contract state**: registered users, teams per level, orbit
//!   income, balances, join amount and gas parameters
//! - **Call recording**: every [`BigBangChain`](bigbang_chain_client::BigBangChain)
//!   invocation is logged as a [`ChainCall`] for later assertions
//! - **Response scripting**: queued balance responses with per-call delays to
//!   reproduce out-of-order network replies under `tokio::time::pause()`
//! - **Fault injection**: named methods can be made to fail
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bigbang_simulation::{fixtures, MockAccount, MockChain};
//!
//! let alice = fixtures::address(1);
//! let chain = MockChain::new()
//!     .with_balance(alice, fixtures::rama(30))
//!     .with_user(alice, MockAccount::new(1));
//!
//! assert!(chain.is_registered(alice).await?);
//! ```

pub mod fixtures;
pub mod mocks;

pub use mocks::{ChainCall, MockAccount, MockChain, MockChainState, RecordingNotifier};
