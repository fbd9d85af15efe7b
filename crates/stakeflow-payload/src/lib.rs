//! Unsigned transaction payload codec.
//!
//! Format: hex( utf8( json ) ), where the JSON object carries
//!   { to, from, value, data, nonce, gas, maxFeePerGas, maxPriorityFeePerGas, chainId }
//!
//! Decoding stages map 1:1 onto `DecodeError` variants:
//! 1. hex        → InvalidHex
//! 2. utf-8      → InvalidEncoding
//! 3. json       → InvalidFormat
//! 4. fields     → MissingField / InvalidValue

use serde_json::{Map, Value};
use stakeflow_types::{
    hex_to_bytes, parse_address, Address, Bytes, DecodeError, IntegerString, UnsignedTransaction,
};

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode a hex payload (optional 0x prefix) into a validated descriptor.
pub fn decode_hex(payload: &str) -> Result<UnsignedTransaction> {
    let bytes = hex_to_bytes(payload.trim())?;
    decode(&bytes)
}

/// Decode raw payload bytes (UTF-8 JSON) into a validated descriptor.
pub fn decode(data: &[u8]) -> Result<UnsignedTransaction> {
    let text =
        std::str::from_utf8(data).map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;
    let doc: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidFormat(e.to_string()))?;
    let obj = doc.as_object().ok_or_else(|| {
        DecodeError::InvalidFormat(format!("expected a JSON object, got {}", kind(&doc)))
    })?;

    let tx = UnsignedTransaction {
        to: address_field(obj, "to")?,
        from: address_field(obj, "from")?,
        value: integer_field(obj, "value")?,
        data: bytes_field(obj, "data")?,
        nonce: u64_field(obj, "nonce")?,
        gas: integer_field(obj, "gas")?,
        max_fee_per_gas: integer_field(obj, "maxFeePerGas")?,
        max_priority_fee_per_gas: integer_field(obj, "maxPriorityFeePerGas")?,
        chain_id: u64_field(obj, "chainId")?,
    };

    tracing::debug!(
        to = %tx.to,
        chain_id = tx.chain_id,
        nonce = tx.nonce,
        value = tx.value.as_str(),
        "decoded unsigned transaction"
    );
    Ok(tx)
}

/// Encode a descriptor back into the hex payload format (no 0x prefix).
pub fn encode_hex(tx: &UnsignedTransaction) -> String {
    // A struct of strings and integers always serializes.
    let json = serde_json::to_vec(tx).unwrap_or_default();
    hex::encode(json)
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(name.to_string())),
        Some(v) => Ok(v),
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    let v = field(obj, name)?;
    v.as_str()
        .ok_or_else(|| DecodeError::invalid_value(name, format!("expected a string, got {}", kind(v))))
}

fn address_field(obj: &Map<String, Value>, name: &str) -> Result<Address> {
    parse_address(str_field(obj, name)?).map_err(|reason| DecodeError::invalid_value(name, reason))
}

fn integer_field(obj: &Map<String, Value>, name: &str) -> Result<IntegerString> {
    IntegerString::parse(str_field(obj, name)?)
        .map_err(|reason| DecodeError::invalid_value(name, reason))
}

fn bytes_field(obj: &Map<String, Value>, name: &str) -> Result<Bytes> {
    let text = str_field(obj, name)?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| DecodeError::invalid_value(name, "expected 0x-prefixed hex"))?;
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| DecodeError::invalid_value(name, e.to_string()))
}

fn u64_field(obj: &Map<String, Value>, name: &str) -> Result<u64> {
    let v = field(obj, name)?;
    v.as_u64().ok_or_else(|| {
        DecodeError::invalid_value(name, format!("expected an unsigned 64-bit integer, got {}", v))
    })
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
