//! Reusable mock implementations for the BigBang client.

pub mod chain;
pub mod notifier;

pub use chain::{ChainCall, MockAccount, MockChain, MockChainState};
pub use notifier::RecordingNotifier;
