//! JSON-RPC payloads and response decoding.
//!
//! A response body is either `{"result": ...}` or `{"error": {"code", "message"}}`.
//! Anything else is a malformed response.

use crate::models::{parse_hex_u64, to_hex_quantity, Block};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

const BLOCK_NUMBER_ID: u64 = 1;
const GET_BLOCK_ID: u64 = 2304;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("block not available")]
    BlockUnavailable,

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `eth_blockNumber`
pub fn block_number_payload() -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "eth_blockNumber",
        "params": [],
        "id": BLOCK_NUMBER_ID,
    })
    .to_string()
}

/// `eth_getBlockByNumber` with full transaction objects.
pub fn get_block_payload(height: u64) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "eth_getBlockByNumber",
        "params": [to_hex_quantity(height), true],
        "id": GET_BLOCK_ID,
    })
    .to_string()
}

/// Extract the `result` member, or turn an `error` member into `DecodeError::Remote`.
/// `Ok(None)` means the node answered with `"result": null`.
fn decode_result(data: &[u8]) -> Result<Option<Value>, DecodeError> {
    let mut envelope: Value = serde_json::from_slice(data)
        .map_err(|e| DecodeError::MalformedResponse(e.to_string()))?;

    let object = envelope
        .as_object_mut()
        .ok_or_else(|| DecodeError::MalformedResponse("response is not a JSON object".into()))?;

    if let Some(error) = object.remove("error").filter(|e| !e.is_null()) {
        let error: RpcErrorObject = serde_json::from_value(error)
            .map_err(|e| DecodeError::MalformedResponse(format!("bad error object: {}", e)))?;
        return Err(DecodeError::Remote {
            code: error.code,
            message: error.message,
        });
    }

    match object.remove("result") {
        Some(Value::Null) => Ok(None),
        Some(result) => Ok(Some(result)),
        None => Err(DecodeError::MalformedResponse(
            "neither result nor error present".into(),
        )),
    }
}

pub fn decode_block_number(data: &[u8]) -> Result<u64, DecodeError> {
    let result = decode_result(data)?
        .ok_or_else(|| DecodeError::MalformedResponse("null block number".into()))?;

    result
        .as_str()
        .and_then(parse_hex_u64)
        .ok_or_else(|| DecodeError::MalformedResponse(format!("bad block number: {}", result)))
}

pub fn decode_block(data: &[u8]) -> Result<Block, DecodeError> {
    let result = decode_result(data)?.ok_or(DecodeError::BlockUnavailable)?;
    serde_json::from_value(result).map_err(|e| DecodeError::MalformedResponse(e.to_string()))
}
