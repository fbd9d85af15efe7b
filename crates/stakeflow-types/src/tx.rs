//! Unsigned transaction descriptor produced by decoding a build payload.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Serialize, Serializer};

/// A non-negative integer carried as text (decimal or 0x-hex) that fits in 256 bits.
///
/// The original text is preserved so re-encoding a descriptor yields the same
/// strings the remote service produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerString {
    raw: String,
    value: U256,
}

impl IntegerString {
    pub fn parse(text: &str) -> Result<Self, String> {
        let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(digits) => {
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(format!("`{}` is not a hex integer", text));
                }
                U256::from_str_radix(digits, 16)
            }
            None => {
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(format!("`{}` is not a non-negative integer", text));
                }
                U256::from_str_radix(text, 10)
            }
        };
        let value = parsed.map_err(|_| format!("`{}` does not fit in 256 bits", text))?;
        Ok(Self {
            raw: text.to_string(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> U256 {
        self.value
    }
}

impl From<U256> for IntegerString {
    fn from(value: U256) -> Self {
        Self {
            raw: value.to_string(),
            value,
        }
    }
}

impl From<u64> for IntegerString {
    fn from(value: u64) -> Self {
        U256::from(value).into()
    }
}

impl Serialize for IntegerString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// A not-yet-signed EIP-1559 transaction as described by the staking API.
///
/// Field names on the wire: `to, from, value, data, nonce, gas, maxFeePerGas,
/// maxPriorityFeePerGas, chainId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub to: Address,
    pub from: Address,
    /// Wei.
    pub value: IntegerString,
    pub data: Bytes,
    pub nonce: u64,
    pub gas: IntegerString,
    pub max_fee_per_gas: IntegerString,
    pub max_priority_fee_per_gas: IntegerString,
    pub chain_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_string_parse() {
        let n = IntegerString::parse("5000000000000000").unwrap();
        assert_eq!(n.value(), U256::from(5_000_000_000_000_000u64));
        assert_eq!(n.as_str(), "5000000000000000");

        let h = IntegerString::parse("0x11c37937e08000").unwrap();
        assert_eq!(h.value(), U256::from(5_000_000_000_000_000u64));
        assert_eq!(h.as_str(), "0x11c37937e08000");

        // Beyond u64 / u128.
        let big = "340282366920938463463374607431768211456";
        assert_eq!(IntegerString::parse(big).unwrap().value().to_string(), big);

        for bad in ["", "-1", "+1", "1.5", "0x", "0xzz", " 1", "1_000"] {
            assert!(IntegerString::parse(bad).is_err(), "`{}` should be rejected", bad);
        }
        let overflow = format!("0x1{}", "0".repeat(64));
        assert!(IntegerString::parse(&overflow).is_err());
    }

    #[test]
    fn test_integer_string_serializes_original_text() {
        let n = IntegerString::parse("0x0a").unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"0x0a\"");
        assert_eq!(serde_json::to_string(&IntegerString::from(10u64)).unwrap(), "\"10\"");
    }
}
