// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Null AEAD used before the crypto handshake completes.
//!
//! No key material exists yet, so packets travel in the clear with a
//! 96-bit truncated FNV1a-128 integrity tag over `aad ‖ plaintext`.
//! Unlike the real AEADs, the tag precedes the payload on the wire:
//! `tag12 ‖ plaintext`.

use super::fnv1a::compute_aead_hash_fnv1a_128;
use super::{CryptoError, CryptoResult, AEAD_MAC_SIZE};

/// Pre-handshake null encryption with FNV1a-128 tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFnv1a128;

impl NullFnv1a128 {
    pub fn new() -> NullFnv1a128 {
        NullFnv1a128
    }

    fn tag(aad: &[u8], plaintext: &[u8]) -> [u8; AEAD_MAC_SIZE] {
        let (high, low) = compute_aead_hash_fnv1a_128(aad, plaintext);
        let mut tag = [0u8; AEAD_MAC_SIZE];
        tag[..8].copy_from_slice(&low.to_le_bytes());
        tag[8..].copy_from_slice(&(high as u32).to_le_bytes());
        tag
    }

    pub fn seal(&self, out: &mut [u8], aad: &[u8], plaintext: &[u8]) -> CryptoResult<usize> {
        let total = plaintext.len() + AEAD_MAC_SIZE;
        if out.len() < total {
            return Err(CryptoError::BufferTooSmall);
        }
        out[..AEAD_MAC_SIZE].copy_from_slice(&Self::tag(aad, plaintext));
        out[AEAD_MAC_SIZE..total].copy_from_slice(plaintext);
        Ok(total)
    }

    pub fn open(&self, out: &mut [u8], aad: &[u8], ciphertext: &[u8]) -> CryptoResult<usize> {
        if ciphertext.len() < AEAD_MAC_SIZE {
            return Err(CryptoError::ShortCiphertext);
        }
        let (tag, body) = ciphertext.split_at(AEAD_MAC_SIZE);
        if out.len() < body.len() {
            return Err(CryptoError::BufferTooSmall);
        }
        let expected = Self::tag(aad, body);
        let mut diff = 0u8;
        for (a, b) in tag.iter().zip(&expected) {
            diff |= a ^ b;
        }
        if diff != 0 {
            return Err(CryptoError::AuthenticationFailure);
        }
        out[..body.len()].copy_from_slice(body);
        Ok(body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AAD: &[u8] = b"All human beings are born free and equal in dignity and rights.";
    const PLAINTEXT: &[u8] = b"They are endowed with reason and conscience and should act \
towards one another in a spirit of brotherhood.";
    const TAG: [u8; 12] = [
        0x98, 0x9b, 0x33, 0x3f, 0xe8, 0xde, 0x32, 0x5c, 0xa6, 0x7f, 0x9c, 0xf7,
    ];

    #[test]
    fn test_seal_reference_vector() {
        let aead = NullFnv1a128::new();
        let mut out = vec![0u8; PLAINTEXT.len() + AEAD_MAC_SIZE];
        let written = aead.seal(&mut out, AAD, PLAINTEXT).expect("seal should succeed");
        assert_eq!(written, out.len());
        assert_eq!(&out[..12], &TAG);
        assert_eq!(&out[12..], PLAINTEXT);
    }

    #[test]
    fn test_open_reference_vector() {
        let aead = NullFnv1a128::new();
        let mut sealed = TAG.to_vec();
        sealed.extend_from_slice(PLAINTEXT);
        let mut out = vec![0u8; PLAINTEXT.len()];
        let written = aead.open(&mut out, AAD, &sealed).expect("open should succeed");
        assert_eq!(written, PLAINTEXT.len());
        assert_eq!(out, PLAINTEXT);
    }

    #[test]
    fn test_open_rejects_corruption() {
        let aead = NullFnv1a128::new();
        let mut sealed = TAG.to_vec();
        sealed.extend_from_slice(PLAINTEXT);
        let mut out = vec![0u8; PLAINTEXT.len()];

        for i in 0..sealed.len() {
            let mut corrupt = sealed.clone();
            corrupt[i] ^= 0x01;
            assert_eq!(
                aead.open(&mut out, AAD, &corrupt).unwrap_err(),
                CryptoError::AuthenticationFailure,
                "byte {}",
                i
            );
        }
        assert!(aead.open(&mut out, b"different aad", &sealed).is_err());
    }

    #[test]
    fn test_short_ciphertext_rejected() {
        let aead = NullFnv1a128::new();
        let mut out = [0u8; 16];
        assert_eq!(
            aead.open(&mut out, b"", &[0u8; 11]).unwrap_err(),
            CryptoError::ShortCiphertext
        );
    }

    #[test]
    fn test_empty_plaintext() {
        let aead = NullFnv1a128::new();
        let mut sealed = [0u8; AEAD_MAC_SIZE];
        aead.seal(&mut sealed, b"aad only", b"").expect("seal should succeed");
        let mut out = [0u8; 0];
        assert_eq!(
            aead.open(&mut out, b"aad only", &sealed).expect("open should succeed"),
            0
        );
    }
}
