//! Registration transaction preparation and receipt tracking.
//!
//! The library never signs. [`build_registration_tx`] validates the wallet,
//! resolves the sponsor, checks the balance against the join amount and
//! returns an [`UnsignedTransaction`] for the wallet layer to sign and
//! broadcast. [`ReceiptWatcher`] then follows the broadcast hash until it is
//! mined.

use std::time::Duration;

use alloy_primitives::{Address, B256};
use bigbang_chain_client::abi::register_and_activate_calldata;
use bigbang_chain_client::{BigBangChain, NetworkConfig};
use bigbang_types::units::{format_fixed, is_hex_address, to_quantity};
use bigbang_types::{
    CallRequest, Notice, Notifier, ReceiptStatus, TxReceipt, UnsignedTransaction, NATIVE_DECIMALS,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::RegistrationError;
use crate::sponsor::resolve_sponsor;

/// Prepare the `registerAndActivate(sponsor)` transaction for `user_address`.
///
/// Failures after the address check also raise a "Registration error"
/// notice. Nothing in the store is modified.
pub async fn build_registration_tx(
    chain: &dyn BigBangChain,
    notifier: &dyn Notifier,
    user_address: &str,
    sponsor_input: &str,
) -> Result<UnsignedTransaction, RegistrationError> {
    let trimmed = user_address.trim();
    if !is_hex_address(trimmed) {
        return Err(RegistrationError::InvalidAddress(trimmed.to_string()));
    }
    let from: Address = trimmed
        .parse()
        .map_err(|_| RegistrationError::InvalidAddress(trimmed.to_string()))?;

    match prepare(chain, notifier, from, sponsor_input).await {
        Ok(tx) => {
            info!(from = %from, gas = %tx.gas, "Registration transaction prepared");
            Ok(tx)
        }
        Err(err) => {
            warn!(from = %from, error = %err, "Registration preparation failed");
            notifier.notify(Notice::error("Registration error", err.to_string()));
            Err(err)
        }
    }
}

async fn prepare(
    chain: &dyn BigBangChain,
    notifier: &dyn Notifier,
    from: Address,
    sponsor_input: &str,
) -> Result<UnsignedTransaction, RegistrationError> {
    let sponsor = resolve_sponsor(chain, sponsor_input).await?;

    let (balance, required) = tokio::try_join!(chain.balance(from), chain.join_amount())?;
    debug!(from = %from, %balance, %required, "Checking registration balance");

    if balance < required {
        let balance = format_fixed(balance, NATIVE_DECIMALS, 4);
        let required = format_fixed(required, NATIVE_DECIMALS, 4);
        notifier.notify(Notice::warning(
            "Insufficient Balance",
            format!("You need {required} RAMA to register but the wallet holds {balance} RAMA."),
        ));
        return Err(RegistrationError::InsufficientFunds { balance, required });
    }

    let data = register_and_activate_calldata(sponsor);
    let to = chain.contract_address();
    let request = CallRequest {
        from: Some(from),
        to,
        data: data.clone(),
        value: Some(required),
    };

    let gas = match chain.estimate_gas(&request).await {
        Ok(gas) => gas,
        Err(err) => {
            notifier.notify(Notice::error("Gas estimation failed", err.to_string()));
            return Err(RegistrationError::GasEstimationFailed(err));
        }
    };
    let gas_price = chain.gas_price().await?;

    Ok(UnsignedTransaction {
        from,
        to,
        data,
        value: to_quantity(required),
        gas: to_quantity(gas),
        gas_price: to_quantity(gas_price),
    })
}

/// Polls for a transaction receipt.
pub struct ReceiptWatcher<'a> {
    chain: &'a dyn BigBangChain,
    notifier: &'a dyn Notifier,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> ReceiptWatcher<'a> {
    pub fn new(chain: &'a dyn BigBangChain, notifier: &'a dyn Notifier) -> Self {
        let defaults = NetworkConfig::default();
        Self {
            chain,
            notifier,
            poll_interval: defaults.receipt_poll_interval,
            timeout: defaults.receipt_timeout,
        }
    }

    pub fn from_config(
        chain: &'a dyn BigBangChain,
        notifier: &'a dyn Notifier,
        config: &NetworkConfig,
    ) -> Self {
        Self::new(chain, notifier)
            .with_poll_interval(config.receipt_poll_interval)
            .with_timeout(config.receipt_timeout)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait until `tx_hash` is mined.
    ///
    /// A reverted transaction is still returned as a receipt; the outcome is
    /// reported through the notifier.
    pub async fn wait(&self, tx_hash: B256) -> Result<TxReceipt, RegistrationError> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.chain.transaction_receipt(tx_hash).await? {
                self.report(&receipt);
                return Ok(receipt);
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                warn!(tx_hash = %tx_hash, ?waited, "Gave up waiting for receipt");
                return Err(RegistrationError::ReceiptTimeout { tx_hash, waited });
            }
            debug!(tx_hash = %tx_hash, "Receipt pending");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn report(&self, receipt: &TxReceipt) {
        match receipt.status {
            ReceiptStatus::Success => {
                info!(tx_hash = %receipt.transaction_hash, block = receipt.block_number, "Transaction mined");
                self.notifier.notify(Notice::success(
                    "Transaction success",
                    format!("Included in block {}.", receipt.block_number),
                ));
            }
            ReceiptStatus::Reverted => {
                warn!(tx_hash = %receipt.transaction_hash, block = receipt.block_number, "Transaction reverted");
                self.notifier.notify(Notice::error(
                    "Transaction Failed",
                    format!("Reverted in block {}.", receipt.block_number),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use bigbang_simulation::fixtures::{address, rama};
    use bigbang_simulation::{ChainCall, MockAccount, MockChain, RecordingNotifier};
    use bigbang_types::units::lower_hex;

    fn funded_chain() -> MockChain {
        MockChain::new()
            .with_user(address(2), MockAccount::new(1))
            .with_balance(address(1), rama(30))
            .with_join_amount(rama(25))
    }

    #[tokio::test]
    async fn test_builds_descriptor() {
        let chain = funded_chain().with_gas(U256::from(210_000u64), U256::from(1_000_000_000u64));
        let notifier = RecordingNotifier::new();

        let tx = build_registration_tx(&chain, &notifier, &lower_hex(&address(1)), "1")
            .await
            .unwrap();

        assert_eq!(tx.from, address(1));
        assert_eq!(tx.to, chain.contract_address());
        assert_eq!(tx.data, register_and_activate_calldata(address(2)));
        assert_eq!(tx.value, "0x15af1d78b58c40000");
        assert_eq!(tx.gas, "0x33450");
        assert_eq!(tx.gas_price, "0x3b9aca00");
        assert!(notifier.is_empty());

        assert!(chain.calls().contains(&ChainCall::EstimateGas {
            from: Some(address(1)),
            value: Some(rama(25)),
        }));
    }

    #[tokio::test]
    async fn test_invalid_address_makes_no_calls() {
        let chain = funded_chain();
        let notifier = RecordingNotifier::new();

        let result = build_registration_tx(&chain, &notifier, "0xnothex", "1").await;
        assert!(matches!(result, Err(RegistrationError::InvalidAddress(_))));
        assert!(chain.calls().is_empty());
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_sponsor_failure_is_reported() {
        let chain = funded_chain();
        let notifier = RecordingNotifier::new();

        let result = build_registration_tx(&chain, &notifier, &lower_hex(&address(1)), "77").await;
        assert!(matches!(result, Err(RegistrationError::Sponsor(_))));
        assert_eq!(notifier.titles(), vec!["Registration error".to_string()]);
    }

    #[tokio::test]
    async fn test_gas_estimation_failure() {
        let chain = funded_chain().with_failure("estimate_gas");
        let notifier = RecordingNotifier::new();

        let result = build_registration_tx(&chain, &notifier, &lower_hex(&address(1)), "1").await;
        assert!(matches!(result, Err(RegistrationError::GasEstimationFailed(_))));
        assert_eq!(
            notifier.titles(),
            vec!["Gas estimation failed".to_string(), "Registration error".to_string()]
        );
        assert_eq!(chain.count(|call| matches!(call, ChainCall::GasPrice)), 0);
    }

    fn receipt(status: ReceiptStatus) -> TxReceipt {
        TxReceipt {
            transaction_hash: B256::repeat_byte(0xaa),
            block_number: 42,
            gas_used: U256::from(180_000u64),
            status,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_polls_until_mined() {
        let chain = MockChain::new().with_receipt(receipt(ReceiptStatus::Success), 2);
        let notifier = RecordingNotifier::new();
        let watcher = ReceiptWatcher::new(&chain, &notifier).with_poll_interval(Duration::from_secs(1));

        let mined = watcher.wait(B256::repeat_byte(0xaa)).await.unwrap();
        assert_eq!(mined.block_number, 42);
        assert_eq!(
            chain.count(|call| matches!(call, ChainCall::TransactionReceipt(_))),
            3
        );
        assert_eq!(notifier.titles(), vec!["Transaction success".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_reports_revert() {
        let chain = MockChain::new().with_receipt(receipt(ReceiptStatus::Reverted), 0);
        let notifier = RecordingNotifier::new();

        let mined = ReceiptWatcher::new(&chain, &notifier)
            .wait(B256::repeat_byte(0xaa))
            .await
            .unwrap();
        assert_eq!(mined.status, ReceiptStatus::Reverted);
        assert_eq!(notifier.titles(), vec!["Transaction Failed".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watcher_times_out() {
        let chain = MockChain::new();
        let notifier = RecordingNotifier::new();
        let watcher = ReceiptWatcher::new(&chain, &notifier)
            .with_poll_interval(Duration::from_secs(2))
            .with_timeout(Duration::from_secs(5));

        let result = watcher.wait(B256::repeat_byte(0x01)).await;
        assert!(matches!(result, Err(RegistrationError::ReceiptTimeout { .. })));
        assert!(notifier.is_empty());
    }
}
