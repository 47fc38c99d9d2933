// Transaction and block shapes as returned by eth_getBlockByNumber(height, true).
// Quantities travel as 0x-prefixed hex strings on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One on-chain transaction. Fields the service does not interpret
/// (gas, nonce, input, signature, fee fields, access list) stay in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(with = "hex_u64")]
    pub block_number: u64,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// True when `address` is the sender or the recipient.
    pub fn involves(&self, address: &str) -> bool {
        self.from.eq_ignore_ascii_case(address)
            || self
                .to
                .as_deref()
                .is_some_and(|to| to.eq_ignore_ascii_case(address))
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Transaction {}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(with = "hex_u64")]
    pub number: u64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Parse a hex quantity, with or without the `0x` prefix.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

pub fn to_hex_quantity(n: u64) -> String {
    format!("0x{:x}", n)
}

pub mod hex_u64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex_quantity(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex_u64(&s)
            .ok_or_else(|| de::Error::custom(format!("invalid hex quantity: {}", s)))
    }
}
