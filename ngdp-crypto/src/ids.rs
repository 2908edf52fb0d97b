//! Content/encoded key newtypes.
//!
//! Both keys are 16-byte MD5 digests; the newtypes exist so callers can't
//! accidentally pass a content key where an encoded key is expected (or vice
//! versa) since both are otherwise indistinguishable `[u8; 16]`s.

use std::fmt;
use std::str::FromStr;

use crate::error::CryptoError;

fn parse_hex16(s: &str) -> Result<[u8; 16], CryptoError> {
    if s.len() != 32 {
        return Err(CryptoError::InvalidKeyFormat(format!(
            "expected 32 hex characters, got {}",
            s.len()
        )));
    }

    let mut out = [0u8; 16];
    for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
        let byte_str = std::str::from_utf8(chunk)
            .map_err(|_| CryptoError::InvalidKeyFormat(s.to_string()))?;
        out[i] = u8::from_str_radix(byte_str, 16)
            .map_err(|_| CryptoError::InvalidKeyFormat(s.to_string()))?;
    }
    Ok(out)
}

macro_rules! hex_key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; 16]);

        impl $name {
            /// Build from raw bytes.
            pub fn new(bytes: [u8; 16]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = CryptoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex16(s).map(Self)
            }
        }

        impl From<[u8; 16]> for $name {
            fn from(bytes: [u8; 16]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; 16] {
            fn from(key: $name) -> Self {
                key.0
            }
        }
    };
}

hex_key_newtype!(ContentKey);
hex_key_newtype!(EncodedKey);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hex = "abcd1234abcd1234abcd1234abcd1234";
        // 33 chars, deliberately invalid length to check the error path
        assert!(ContentKey::from_str(hex).is_err());

        let hex = "abcd1234abcd1234abcd1234abcd1234"[..32].to_string();
        let key = ContentKey::from_str(&hex).unwrap();
        assert_eq!(key.to_string(), hex);
    }

    #[test]
    fn test_distinct_types() {
        let bytes = [0xAAu8; 16];
        let ckey = ContentKey::new(bytes);
        let ekey = EncodedKey::new(bytes);
        assert_eq!(ckey.as_bytes(), ekey.as_bytes());
        // but they're not interchangeable at the type level — no From<ContentKey> for EncodedKey
    }
}
