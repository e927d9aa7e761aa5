//! Numeric encodings.
//!
//! Legacy and Ethereum-compatible responses carry integers as `0x`-prefixed
//! hex strings; the structured API carries plain JSON numbers.

use alloy_primitives::{U256, U64};
use serde::{Deserialize, Serialize, Serializer};

/// Scale of [`FixedDecimal`] values (18 fractional digits).
pub const DECIMAL_PRECISION: usize = 18;

/// A 64-bit integer in one of the two wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    /// Plain JSON number.
    Plain(u64),
    /// Hex string (`"0x64"`).
    Hex(U64),
}

impl Quantity {
    pub fn hex(value: u64) -> Self {
        Quantity::Hex(U64::from(value))
    }

    pub fn plain(value: u64) -> Self {
        Quantity::Plain(value)
    }

    /// Numeric value regardless of encoding.
    pub fn as_u64(&self) -> u64 {
        match self {
            Quantity::Plain(n) => *n,
            Quantity::Hex(n) => n.to::<u64>(),
        }
    }
}

/// A 256-bit amount (balances, gas prices, transfer values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// Plain JSON number, or a decimal string when it does not fit in 128 bits.
    Plain(U256),
    /// Hex string.
    Hex(U256),
}

impl Amount {
    pub fn value(&self) -> U256 {
        match self {
            Amount::Plain(v) | Amount::Hex(v) => *v,
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Amount::Hex(v) => v.serialize(serializer),
            Amount::Plain(v) => {
                if let Ok(small) = u64::try_from(*v) {
                    serializer.serialize_u64(small)
                } else if let Ok(wide) = u128::try_from(*v) {
                    serializer.serialize_u128(wide)
                } else {
                    serializer.serialize_str(&v.to_string())
                }
            }
        }
    }
}

/// Fixed-point decimal with 18 fractional digits, stored as scaled integer.
///
/// Used for supply figures and ratios. Serializes as a decimal string such as
/// `"12.500000000000000000"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FixedDecimal(pub U256);

impl FixedDecimal {
    /// Build from a whole number of units.
    pub fn from_units(units: u64) -> Self {
        FixedDecimal(U256::from(units) * U256::from(10u64).pow(U256::from(DECIMAL_PRECISION)))
    }
}

impl std::fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        if digits.len() > DECIMAL_PRECISION {
            let (int, frac) = digits.split_at(digits.len() - DECIMAL_PRECISION);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{digits:0>DECIMAL_PRECISION$}")
        }
    }
}

impl Serialize for FixedDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quantity_encodings() {
        assert_eq!(serde_json::to_value(Quantity::hex(100)).unwrap(), json!("0x64"));
        assert_eq!(serde_json::to_value(Quantity::plain(100)).unwrap(), json!(100));
        assert_eq!(Quantity::hex(42).as_u64(), Quantity::plain(42).as_u64());
    }

    #[test]
    fn test_amount_plain_falls_back_to_string() {
        assert_eq!(
            serde_json::to_value(Amount::Plain(U256::from(7u64))).unwrap(),
            json!(7)
        );
        assert_eq!(
            serde_json::to_value(Amount::Hex(U256::from(255u64))).unwrap(),
            json!("0xff")
        );
        let huge = U256::MAX;
        assert_eq!(
            serde_json::to_value(Amount::Plain(huge)).unwrap(),
            json!(huge.to_string())
        );
    }

    #[test]
    fn test_fixed_decimal_display() {
        assert_eq!(FixedDecimal::from_units(12).to_string(), "12.000000000000000000");
        assert_eq!(
            FixedDecimal(U256::from(5u64) * U256::from(10u64).pow(U256::from(17u64))).to_string(),
            "0.500000000000000000"
        );
        assert_eq!(FixedDecimal(U256::ZERO).to_string(), "0.000000000000000000");
    }
}
