use crate::{ChainClientError, ChainResult, NetworkConfig};
use alloy_primitives::{Address, Bytes, B256, U256};
use bigbang_types::units::{lower_hex, parse_quantity, to_quantity};
use bigbang_types::{CallRequest, ReceiptStatus, TxReceipt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP JSON-RPC client with ordered endpoint failover.
///
/// Transport failures move on to the next endpoint; JSON-RPC error objects
/// are returned immediately since every node would answer the same.
#[derive(Debug)]
pub struct RpcClient {
    endpoints: Vec<String>,
    client: Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: B256,
    block_number: Option<String>,
    gas_used: String,
    status: Option<String>,
}

impl RpcClient {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> ChainResult<Self> {
        let endpoints: Vec<String> = endpoints
            .into_iter()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if endpoints.is_empty() {
            return Err(ChainClientError::NoEndpoints);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoints,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &NetworkConfig) -> ChainResult<Self> {
        Self::new(config.rpc_urls.clone(), config.request_timeout)
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Issue a JSON-RPC request and deserialize its `result`.
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> ChainResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut last_error = ChainClientError::NoEndpoints;
        for endpoint in &self.endpoints {
            debug!(method, id, endpoint = %endpoint, "Sending RPC request");
            let response = match self.send(endpoint, &body).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(method, endpoint = %endpoint, error = %err, "RPC transport failed");
                    last_error = err.into();
                    continue;
                }
            };

            if let Some(error) = response.error {
                return Err(ChainClientError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }

            let result = response.result.unwrap_or(Value::Null);
            return serde_json::from_value(result)
                .map_err(|e| ChainClientError::InvalidResponse(format!("{method}: {e}")));
        }

        Err(last_error)
    }

    async fn send(&self, endpoint: &str, body: &Value) -> Result<RpcResponse, reqwest::Error> {
        self.client
            .post(endpoint)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, request: &CallRequest) -> ChainResult<Bytes> {
        let raw: String = self
            .request("eth_call", json!([call_object(request), "latest"]))
            .await?;
        decode_hex_data(&raw)
    }

    pub async fn get_balance(&self, account: Address) -> ChainResult<U256> {
        let raw: String = self
            .request("eth_getBalance", json!([lower_hex(&account), "latest"]))
            .await?;
        Ok(parse_quantity(&raw)?)
    }

    pub async fn estimate_gas(&self, request: &CallRequest) -> ChainResult<U256> {
        let raw: String = self
            .request("eth_estimateGas", json!([call_object(request)]))
            .await?;
        Ok(parse_quantity(&raw)?)
    }

    pub async fn gas_price(&self) -> ChainResult<U256> {
        let raw: String = self.request("eth_gasPrice", json!([])).await?;
        Ok(parse_quantity(&raw)?)
    }

    pub async fn transaction_receipt(&self, tx_hash: B256) -> ChainResult<Option<TxReceipt>> {
        let hash = format!("0x{}", hex::encode(tx_hash.as_slice()));
        let raw: Option<RawReceipt> = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        raw.map(receipt_from_raw).transpose()
    }
}

fn call_object(request: &CallRequest) -> Value {
    let mut object = Map::new();
    if let Some(from) = &request.from {
        object.insert("from".to_string(), Value::String(lower_hex(from)));
    }
    object.insert("to".to_string(), Value::String(lower_hex(&request.to)));
    object.insert(
        "data".to_string(),
        Value::String(format!("0x{}", hex::encode(&request.data))),
    );
    if let Some(value) = request.value {
        object.insert("value".to_string(), Value::String(to_quantity(value)));
    }
    Value::Object(object)
}

fn decode_hex_data(raw: &str) -> ChainResult<Bytes> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| ChainClientError::InvalidResponse(format!("call data is not hex: {e}")))
}

fn receipt_from_raw(raw: RawReceipt) -> ChainResult<TxReceipt> {
    let block_number = match raw.block_number.as_deref() {
        Some(number) => bigbang_types::units::to_u64(parse_quantity(number)?)?,
        None => 0,
    };
    // Pre-Byzantium receipts carry no status; treat them as successful.
    let status = match raw.status.as_deref().map(parse_quantity).transpose()? {
        Some(status) if status.is_zero() => ReceiptStatus::Reverted,
        _ => ReceiptStatus::Success,
    };
    Ok(TxReceipt {
        transaction_hash: raw.transaction_hash,
        block_number,
        gas_used: parse_quantity(&raw.gas_used)?,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        let client = RpcClient::new(
            vec![
                "https://blockchain.ramestta.com/".to_string(),
                "  ".to_string(),
                "https://blockchain2.ramestta.com".to_string(),
            ],
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoints(),
            &[
                "https://blockchain.ramestta.com".to_string(),
                "https://blockchain2.ramestta.com".to_string()
            ]
        );
    }

    #[test]
    fn test_no_endpoints_rejected() {
        let result = RpcClient::new(Vec::new(), Duration::from_secs(5));
        assert!(matches!(result, Err(ChainClientError::NoEndpoints)));
    }

    #[test]
    fn test_call_object_includes_optional_fields() {
        let request = CallRequest {
            from: Some(Address::repeat_byte(0x01)),
            to: Address::repeat_byte(0x02),
            data: Bytes::from(vec![0xde, 0xad]),
            value: Some(U256::from(16u64)),
        };
        let object = call_object(&request);
        assert_eq!(object["from"], format!("0x{}", "01".repeat(20)));
        assert_eq!(object["to"], format!("0x{}", "02".repeat(20)));
        assert_eq!(object["data"], "0xdead");
        assert_eq!(object["value"], "0x10");

        let read_only = CallRequest {
            from: None,
            value: None,
            ..request
        };
        let object = call_object(&read_only);
        assert!(object.get("from").is_none());
        assert!(object.get("value").is_none());
    }

    #[test]
    fn test_decode_hex_data() {
        assert_eq!(decode_hex_data("0x0102").unwrap().to_vec(), vec![1u8, 2u8]);
        assert!(decode_hex_data("0x").unwrap().is_empty());
        assert!(decode_hex_data("0xzz").is_err());
    }

    #[test]
    fn test_response_with_error_object() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "execution reverted"}
        }))
        .unwrap();
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "execution reverted");
    }

    #[test]
    fn test_receipt_status_mapping() {
        let raw: RawReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "status": "0x0"
        }))
        .unwrap();
        let receipt = receipt_from_raw(raw).unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Reverted);
        assert_eq!(receipt.block_number, 16);
        assert_eq!(receipt.gas_used, U256::from(21_000u64));

        let raw: RawReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x11",
            "gasUsed": "0x5208",
            "status": "0x1"
        }))
        .unwrap();
        assert_eq!(receipt_from_raw(raw).unwrap().status, ReceiptStatus::Success);
    }
}
