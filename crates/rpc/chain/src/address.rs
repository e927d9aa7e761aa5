//! Bech32 account addresses.
//!
//! Native responses show accounts as bech32 strings under a network prefix
//! (`one1...`). Requests accept either bech32 or `0x` hex.

use alloy_primitives::Address;
use bech32::{Bech32, Hrp};

use crate::error::{ChainError, ChainResult};

/// Human-readable prefix used when none is configured.
pub const DEFAULT_HRP: &str = "one";

/// Converts between 20-byte addresses and their bech32 form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCodec {
    hrp: Hrp,
}

impl AddressCodec {
    pub fn new(hrp: &str) -> ChainResult<Self> {
        let hrp = Hrp::parse(hrp).map_err(|e| ChainError::InvalidAddress {
            address: hrp.to_string(),
            reason: format!("bad prefix: {e}"),
        })?;
        Ok(Self { hrp })
    }

    pub fn hrp(&self) -> &str {
        self.hrp.as_str()
    }

    pub fn encode(&self, address: &Address) -> ChainResult<String> {
        bech32::encode::<Bech32>(self.hrp, address.as_slice()).map_err(|e| {
            ChainError::InvalidAddress {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Parse a bech32 address under this codec's prefix, or a `0x` hex
    /// address.
    pub fn decode(&self, input: &str) -> ChainResult<Address> {
        let invalid = |reason: String| ChainError::InvalidAddress {
            address: input.to_string(),
            reason,
        };

        if input.starts_with("0x") || input.starts_with("0X") {
            return input.parse::<Address>().map_err(|e| invalid(e.to_string()));
        }

        let (hrp, data) = bech32::decode(input).map_err(|e| invalid(e.to_string()))?;
        if hrp != self.hrp {
            return Err(invalid(format!(
                "prefix {} does not match {}",
                hrp.as_str(),
                self.hrp.as_str()
            )));
        }
        if data.len() != 20 {
            return Err(invalid(format!("expected 20 bytes, got {}", data.len())));
        }
        Ok(Address::from_slice(&data))
    }
}

impl Default for AddressCodec {
    fn default() -> Self {
        Self {
            hrp: Hrp::parse_unchecked(DEFAULT_HRP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bech32_round_trip() {
        let codec = AddressCodec::default();
        let address = Address::repeat_byte(0x42);
        let encoded = codec.encode(&address).unwrap();
        assert!(encoded.starts_with("one1"));
        assert_eq!(codec.decode(&encoded).unwrap(), address);
    }

    #[test]
    fn test_hex_accepted() {
        let codec = AddressCodec::default();
        let address = Address::repeat_byte(0x07);
        assert_eq!(codec.decode(&address.to_string()).unwrap(), address);
    }

    #[test]
    fn test_foreign_prefix_rejected() {
        let other = AddressCodec::new("two").unwrap();
        let encoded = other.encode(&Address::ZERO).unwrap();
        let err = AddressCodec::default().decode(&encoded).unwrap_err();
        assert!(matches!(err, ChainError::InvalidAddress { .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = AddressCodec::default();
        assert!(codec.decode("not-an-address").is_err());
        assert!(codec.decode("0x1234").is_err());
    }
}
