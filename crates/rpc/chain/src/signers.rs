//! Reconstruction of a block's signer set.
//!
//! A block records only a bitmap over the epoch committee's BLS keys. Turning
//! that into addresses takes the block's epoch (from its header), the roster
//! for that epoch and the mask itself.

use alloy_primitives::hex;
use tracing::debug;

use crate::address::AddressCodec;
use crate::backend::ChainBackend;
use crate::error::{ChainError, ChainResult};
use crate::mask::SignatureMask;
use crate::types::Slot;

/// Signers of one block.
///
/// `signer_addresses[i]` and `signer_bls_keys[i]` always describe the same
/// committee slot; both lists follow roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerData {
    /// Bech32 addresses of the signing validators.
    pub signer_addresses: Vec<String>,
    /// Hex-encoded BLS keys of the signing validators.
    pub signer_bls_keys: Vec<String>,
    /// Full committee roster of the block's epoch.
    pub committee_slots: Vec<Slot>,
    pub signature_mask: SignatureMask,
}

impl SignerData {
    /// Cross-reference `slots` against `mask`.
    ///
    /// Fails if any slot's key cannot be evaluated against the mask.
    pub fn from_roster(
        slots: Vec<Slot>,
        mask: SignatureMask,
        codec: &AddressCodec,
    ) -> ChainResult<Self> {
        let mut signer_addresses = Vec::new();
        let mut signer_bls_keys = Vec::new();
        for slot in &slots {
            if mask.key_enabled(&slot.bls_public_key)? {
                signer_addresses.push(codec.encode(&slot.address)?);
                signer_bls_keys.push(hex::encode(slot.bls_public_key));
            }
        }
        Ok(Self {
            signer_addresses,
            signer_bls_keys,
            committee_slots: slots,
            signature_mask: mask,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.signer_addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signer_addresses.len()
    }

    /// Whether `address` (bech32) is among the signers.
    pub fn contains(&self, address: &str) -> bool {
        self.signer_addresses.iter().any(|a| a == address)
    }
}

/// Resolves signer sets through a [`ChainBackend`], against a head the
/// caller has already read.
pub struct SignerResolver<'a, B> {
    backend: &'a B,
    codec: &'a AddressCodec,
    head: u64,
}

impl<'a, B: ChainBackend> SignerResolver<'a, B> {
    pub fn new(backend: &'a B, codec: &'a AddressCodec, head: u64) -> Self {
        Self {
            backend,
            codec,
            head,
        }
    }

    /// Signers of block `number`.
    ///
    /// Empty for the genesis block and for the head (or anything past it), as
    /// no committee snapshot covers them yet.
    pub async fn resolve(&self, number: u64) -> ChainResult<SignerData> {
        if number == 0 || number >= self.head {
            return Ok(SignerData::default());
        }
        let header = self
            .backend
            .header_by_number(number)
            .await?
            .ok_or(ChainError::HeaderNotFound(number))?;
        let slots = self
            .backend
            .committee_roster_for_epoch(header.epoch)
            .await?;
        let mask = self.backend.signature_mask_for_block(number).await?;
        debug!(
            block = number,
            epoch = header.epoch,
            committee = slots.len(),
            "resolving block signers"
        );
        SignerData::from_roster(slots, mask, self.codec)
    }
}
