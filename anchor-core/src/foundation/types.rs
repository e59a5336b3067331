use crate::foundation::util::encoding::parse_hex_32bytes;
use crate::foundation::BridgeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

pub type Hash32 = [u8; 32];

/// String newtype for names and addresses that travel as-is.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

/// 32-byte value shown and serialised as lowercase hex; parsing accepts `0x`.
macro_rules! hash_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
        pub struct $name(Hash32);

        impl $name {
            pub fn as_hash(&self) -> &Hash32 {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn ct_eq(&self, other: &Self) -> bool {
                use subtle::ConstantTimeEq;
                bool::from(self.0[..].ct_eq(&other.0[..]))
            }
        }

        impl From<Hash32> for $name {
            fn from(value: Hash32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::LowerHex::fmt(self, f)
            }
        }

        impl fmt::LowerHex for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let prefix = if f.alternate() { "0x" } else { "" };
                write!(f, "{}{}", prefix, self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = BridgeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_32bytes(s).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer)?.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_id!(
    /// `0x` + hex of a 33-byte compressed secp256k1 public key.
    ValidatorAddress
);
string_id!(
    /// Address of a bridge or oracle contract on its chain.
    ContractAddress
);
string_id!(
    /// Unique on-chain identifier of an oracle contract instance; bound into every digest.
    ContractId
);
string_id!(TxId);
string_id!(ChainName);

hash_id!(StateRoot);
hash_id!(Digest);

impl ValidatorAddress {
    /// Lowercased form with a `0x` prefix, used for roster comparison.
    pub fn normalized(&self) -> ValidatorAddress {
        let trimmed = self.0.trim();
        let body = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed);
        ValidatorAddress(format!("0x{}", body.to_ascii_lowercase()))
    }

    pub fn matches(&self, other: &ValidatorAddress) -> bool {
        self.normalized() == other.normalized()
    }
}
