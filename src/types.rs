use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;

use crate::error::Error;

/// A 32-byte on-chain account address, rendered as base58.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s).into_vec().map_err(|e| Error::Parse {
            reason: format!("invalid base58 public key {s}: {e}"),
        })?;
        let array: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| Error::Parse {
            reason: format!("public key {s} decodes to {} bytes, expected 32", b.len()),
        })?;
        Ok(Self(array))
    }
}

#[cfg(feature = "native")]
impl From<solana_pubkey::Pubkey> for PublicKey {
    fn from(pubkey: solana_pubkey::Pubkey) -> Self {
        Self(pubkey.to_bytes())
    }
}

/// A decoded event value as handed over by the upstream IDL decoder.
///
/// The variant set is closed: every node the on-chain schema can produce maps
/// onto exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEventValue {
    Null,
    Bool(bool),
    String(String),
    /// A value that is already a plain JSON number. Passed through untouched.
    Number(serde_json::Number),
    /// A decoded on-chain integer (`u64`, `u128`, `i64`, ...).
    Integer(BigInt),
    /// An unbounded integer literal whose safe range is unknown; always rendered
    /// as a decimal string.
    IntegerLiteral(BigInt),
    PublicKey(PublicKey),
    Array(Vec<RawEventValue>),
    /// Struct fields in schema order.
    Record(Vec<(String, RawEventValue)>),
}

impl RawEventValue {
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, RawEventValue)>,
        K: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::IntegerLiteral(_) => "integer_literal",
            Self::PublicKey(_) => "public_key",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
        }
    }

    pub fn get(&self, field: &str) -> Option<&RawEventValue> {
        match self {
            Self::Record(fields) => fields.iter().find(|(k, _)| k == field).map(|(_, v)| v),
            _ => None,
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for RawEventValue {
                fn from(value: $t) -> Self {
                    Self::Integer(BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl From<BigInt> for RawEventValue {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for RawEventValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for RawEventValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for RawEventValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<PublicKey> for RawEventValue {
    fn from(value: PublicKey) -> Self {
        Self::PublicKey(value)
    }
}

#[cfg(feature = "native")]
impl From<solana_pubkey::Pubkey> for RawEventValue {
    fn from(value: solana_pubkey::Pubkey) -> Self {
        Self::PublicKey(value.into())
    }
}

impl<T: Into<RawEventValue>> From<Vec<T>> for RawEventValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawEventValue>> From<Option<T>> for RawEventValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Lifts already-normalized JSON back into the input model. Numbers stay
/// native, so re-normalizing a normalized tree is a no-op.
impl From<serde_json::Value> for RawEventValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Record(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// One event as delivered by the subscription layer.
#[derive(Debug, Clone)]
pub struct EventDelivery {
    /// Program (or other emitter) the event came from; attached verbatim.
    pub source_id: String,
    /// IDL event name (e.g. `"depositVaultEvent"`).
    pub event_name: String,
    /// Decoded event payload.
    pub data: RawEventValue,
    /// Slot in which the event was observed.
    pub slot: u64,
    /// Transaction signature (base58), when the feed provides one.
    pub signature: Option<String>,
}
