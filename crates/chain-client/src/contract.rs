//! [`BigBangChain`] over HTTP JSON-RPC.

use crate::abi::IBigBang;
use crate::rpc::RpcClient;
use crate::{BigBangChain, ChainResult, NetworkConfig};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use bigbang_types::units::to_u64;
use bigbang_types::{CallRequest, OrbitIncomeRow, TeamEntry, TxReceipt};
use tracing::debug;

/// Contract reads and node queries against a live chain.
#[derive(Debug)]
pub struct RpcBigBangChain {
    rpc: RpcClient,
    contract: Address,
}

impl RpcBigBangChain {
    pub fn new(rpc: RpcClient, contract: Address) -> Self {
        Self { rpc, contract }
    }

    /// Build a client from network configuration.
    pub fn from_config(config: &NetworkConfig) -> ChainResult<Self> {
        config.validate()?;
        Ok(Self::new(
            RpcClient::from_config(config)?,
            config.contract_address,
        ))
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    async fn read<C>(&self, call: C) -> ChainResult<C::Return>
    where
        C: SolCall + Send + Sync,
    {
        debug!(function = C::SIGNATURE, "Contract read");
        let request = CallRequest {
            from: None,
            to: self.contract,
            data: call.abi_encode().into(),
            value: None,
        };
        let output = self.rpc.call(&request).await?;
        Ok(C::abi_decode_returns(&output[..], true)?)
    }
}

#[async_trait]
impl BigBangChain for RpcBigBangChain {
    fn contract_address(&self) -> Address {
        self.contract
    }

    async fn balance(&self, account: Address) -> ChainResult<U256> {
        self.rpc.get_balance(account).await
    }

    async fn gas_price(&self) -> ChainResult<U256> {
        self.rpc.gas_price().await
    }

    async fn estimate_gas(&self, request: &CallRequest) -> ChainResult<U256> {
        self.rpc.estimate_gas(request).await
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<Option<TxReceipt>> {
        self.rpc.transaction_receipt(tx_hash).await
    }

    async fn user_id(&self, account: Address) -> ChainResult<U256> {
        Ok(self.read(IBigBang::getUserIdCall { user: account }).await?._0)
    }

    async fn user_by_id(&self, user_id: u64) -> ChainResult<Address> {
        let call = IBigBang::getUserByIdCall {
            userId: U256::from(user_id),
        };
        Ok(self.read(call).await?._0)
    }

    async fn is_registered(&self, account: Address) -> ChainResult<bool> {
        Ok(self.read(IBigBang::isRegisteredCall { user: account }).await?._0)
    }

    async fn registration_time(&self, account: Address) -> ChainResult<U256> {
        Ok(self
            .read(IBigBang::registrationTimeCall { user: account })
            .await?
            ._0)
    }

    async fn upline(&self, account: Address) -> ChainResult<Address> {
        Ok(self.read(IBigBang::uplineCall { user: account }).await?._0)
    }

    async fn total_earnings(&self, account: Address) -> ChainResult<U256> {
        Ok(self
            .read(IBigBang::getTotalEarningsCall { user: account })
            .await?
            ._0)
    }

    async fn current_orbit_x(&self, account: Address) -> ChainResult<U256> {
        Ok(self
            .read(IBigBang::getCurrentOrbitXCall { user: account })
            .await?
            ._0)
    }

    async fn orbit_count(&self, account: Address) -> ChainResult<U256> {
        Ok(self
            .read(IBigBang::getOrbitCountCall { user: account })
            .await?
            ._0)
    }

    async fn repurchase_count(&self, account: Address) -> ChainResult<U256> {
        Ok(self
            .read(IBigBang::getRepurchaseCountCall { user: account })
            .await?
            ._0)
    }

    async fn join_amount(&self) -> ChainResult<U256> {
        Ok(self.read(IBigBang::getJoinAmountInRAMACall {}).await?._0)
    }

    async fn full_orbit_income(
        &self,
        account: Address,
        orbit_id: u64,
    ) -> ChainResult<Vec<OrbitIncomeRow>> {
        let call = IBigBang::getFullOrbitIncomeCall {
            user: account,
            orbitId: U256::from(orbit_id),
        };
        self.read(call)
            .await?
            ._0
            .into_iter()
            .map(|row| -> ChainResult<OrbitIncomeRow> {
                Ok(OrbitIncomeRow {
                    coin: row.coin,
                    amount_native: row.amount,
                    amount_usd: row.usd,
                    level: to_u64(row.level)?,
                    timestamp_seconds: to_u64(row.timestamp)?,
                })
            })
            .collect()
    }

    async fn team_at_level(&self, account: Address, level: u8) -> ChainResult<Vec<TeamEntry>> {
        let call = IBigBang::getTeamAtLevelCall {
            user: account,
            level: U256::from(level),
        };
        self.read(call)
            .await?
            ._0
            .into_iter()
            .map(|member| -> ChainResult<TeamEntry> {
                Ok(TeamEntry {
                    wallet_address: member.walletAddress,
                    income_earned: member.incomeEarned,
                    registration_time: to_u64(member.registrationTime)?,
                })
            })
            .collect()
    }
}
