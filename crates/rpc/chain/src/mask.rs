//! Per-block signature bitmask.
//!
//! Bit `i` of the bitmap marks the `i`-th key of the mask's key list as having
//! signed: `bitmap[i >> 3] & (1 << (i & 7))`.

use std::collections::HashMap;

use alloy_primitives::hex;

use crate::error::{ChainError, ChainResult};
use crate::types::BlsPublicKey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureMask {
    publics: Vec<BlsPublicKey>,
    /// Position of each key in `publics`. A repeated key maps to its first
    /// position.
    index: HashMap<BlsPublicKey, usize>,
    bitmap: Vec<u8>,
}

fn index_keys(publics: &[BlsPublicKey]) -> HashMap<BlsPublicKey, usize> {
    let mut index = HashMap::with_capacity(publics.len());
    for (i, key) in publics.iter().enumerate() {
        index.entry(*key).or_insert(i);
    }
    index
}

impl SignatureMask {
    /// Build a mask over `publics`. The bitmap must hold exactly one bit per
    /// key, rounded up to whole bytes.
    pub fn new(publics: Vec<BlsPublicKey>, bitmap: Vec<u8>) -> ChainResult<Self> {
        let expected = publics.len().div_ceil(8);
        if bitmap.len() != expected {
            return Err(ChainError::MalformedMask {
                expected,
                actual: bitmap.len(),
            });
        }
        Ok(Self {
            index: index_keys(&publics),
            publics,
            bitmap,
        })
    }

    /// Build a mask with the given key indices enabled.
    pub fn with_enabled(publics: Vec<BlsPublicKey>, enabled: &[usize]) -> Self {
        let mut bitmap = vec![0u8; publics.len().div_ceil(8)];
        for &i in enabled {
            if let Some(byte) = bitmap.get_mut(i >> 3) {
                *byte |= 1 << (i & 7);
            }
        }
        Self {
            index: index_keys(&publics),
            publics,
            bitmap,
        }
    }

    pub fn publics(&self) -> &[BlsPublicKey] {
        &self.publics
    }

    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    fn index_enabled(&self, index: usize) -> bool {
        self.bitmap
            .get(index >> 3)
            .is_some_and(|byte| byte & (1 << (index & 7)) != 0)
    }

    /// Whether `key` signed. Fails if the key is not part of the mask.
    pub fn key_enabled(&self, key: &BlsPublicKey) -> ChainResult<bool> {
        let index = self
            .index
            .get(key)
            .ok_or_else(|| ChainError::KeyNotInMask(hex::encode(key)))?;
        Ok(self.index_enabled(*index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: u8) -> Vec<BlsPublicKey> {
        (0..n).map(BlsPublicKey::repeat_byte).collect()
    }

    #[test]
    fn test_bit_layout() {
        // Bits 0 and 9 set: byte 0 = 0b0000_0001, byte 1 = 0b0000_0010.
        let mask = SignatureMask::new(keys(10), vec![0x01, 0x02]).unwrap();
        let publics = mask.publics().to_vec();
        assert!(mask.key_enabled(&publics[0]).unwrap());
        assert!(!mask.key_enabled(&publics[1]).unwrap());
        assert!(!mask.key_enabled(&publics[8]).unwrap());
        assert!(mask.key_enabled(&publics[9]).unwrap());
    }

    #[test]
    fn test_with_enabled_matches_layout() {
        let mask = SignatureMask::with_enabled(keys(10), &[0, 9]);
        assert_eq!(mask.bitmap(), &[0x01, 0x02]);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let mask = SignatureMask::with_enabled(keys(3), &[0]);
        let stranger = BlsPublicKey::repeat_byte(0xee);
        assert!(matches!(
            mask.key_enabled(&stranger),
            Err(ChainError::KeyNotInMask(_))
        ));
    }

    #[test]
    fn test_large_committee_lookup() {
        let publics: Vec<BlsPublicKey> = (0..1000u64)
            .map(|i| BlsPublicKey::left_padding_from(&i.to_be_bytes()))
            .collect();
        let mask = SignatureMask::with_enabled(publics.clone(), &[3, 512, 999]);
        let enabled: Vec<usize> = publics
            .iter()
            .enumerate()
            .filter(|(_, key)| mask.key_enabled(key).unwrap())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(enabled, vec![3, 512, 999]);
    }

    #[test]
    fn test_repeated_key_uses_first_position() {
        let key = BlsPublicKey::repeat_byte(7);
        let mask = SignatureMask::with_enabled(vec![key, key], &[1]);
        assert!(!mask.key_enabled(&key).unwrap());
    }

    #[test]
    fn test_bitmap_length_checked() {
        let err = SignatureMask::new(keys(9), vec![0xff]).unwrap_err();
        assert_eq!(
            err,
            ChainError::MalformedMask {
                expected: 2,
                actual: 1
            }
        );
    }
}
