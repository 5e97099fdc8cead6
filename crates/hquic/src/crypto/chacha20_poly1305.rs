// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ChaCha20-Poly1305 AEAD with a 12-byte tag.
//!
//! The RFC 7539 construction, keyed per packet: block 0 of the ChaCha20
//! keystream for `nonce = prefix ‖ seqnum` is the Poly1305 one-time key,
//! blocks 1.. encrypt the payload. The 16-byte Poly1305 tag is truncated
//! to 12 bytes on the wire.

use super::chacha20::ChaCha20;
use super::poly1305::Poly1305;
use super::{CryptoError, CryptoResult, AEAD_MAC_SIZE};

/// ChaCha20-Poly1305-12 bound to a 4-byte nonce prefix.
#[derive(Debug)]
pub struct ChaCha20Poly1305 {
    key: [u8; 32],
    nonce_prefix: [u8; 4],
}

impl ChaCha20Poly1305 {
    pub fn new(key: &[u8], nonce_prefix: &[u8]) -> CryptoResult<ChaCha20Poly1305> {
        if key.len() < 32 {
            return Err(CryptoError::InvalidKey);
        }
        if nonce_prefix.len() < 4 {
            return Err(CryptoError::InvalidNoncePrefix);
        }
        let mut aead = ChaCha20Poly1305 { key: [0; 32], nonce_prefix: [0; 4] };
        aead.key.copy_from_slice(&key[..32]);
        aead.nonce_prefix.copy_from_slice(&nonce_prefix[..4]);
        Ok(aead)
    }

    /// Cipher positioned at block 1 plus the packet's one-time MAC key
    /// from block 0.
    fn keyed_for(&self, seq_num: u64) -> (ChaCha20, Poly1305) {
        let mut nonce = [0u8; 12];
        nonce[..4].copy_from_slice(&self.nonce_prefix);
        nonce[4..].copy_from_slice(&seq_num.to_le_bytes());
        let mut cipher =
            ChaCha20::new(&self.key, &nonce, 0).expect("key and nonce lengths are fixed");
        let mut block0 = [0u8; 64];
        cipher.next_keystream(&mut block0);
        let poly = Poly1305::new(&block0[..32]).expect("32-byte one-time key");
        (cipher, poly)
    }

    pub fn seal(
        &self,
        seq_num: u64,
        out: &mut [u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> CryptoResult<usize> {
        let total = plaintext.len() + AEAD_MAC_SIZE;
        if out.len() < total {
            return Err(CryptoError::BufferTooSmall);
        }
        let (mut cipher, poly) = self.keyed_for(seq_num);
        let (body, rest) = out.split_at_mut(plaintext.len());
        cipher.xor_stream(body, plaintext);
        let tag = poly.compute_aead_tag(aad, body);
        rest[..AEAD_MAC_SIZE].copy_from_slice(&tag[..AEAD_MAC_SIZE]);
        Ok(total)
    }

    pub fn open(
        &self,
        seq_num: u64,
        out: &mut [u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> CryptoResult<usize> {
        if ciphertext.len() < AEAD_MAC_SIZE {
            return Err(CryptoError::ShortCiphertext);
        }
        let body_len = ciphertext.len() - AEAD_MAC_SIZE;
        if out.len() < body_len {
            return Err(CryptoError::BufferTooSmall);
        }
        let (body, tag) = ciphertext.split_at(body_len);

        let (mut cipher, poly) = self.keyed_for(seq_num);
        let expected = poly.compute_aead_tag(aad, body);
        let mut diff = 0u8;
        for (a, b) in tag.iter().zip(&expected[..AEAD_MAC_SIZE]) {
            diff |= a ^ b;
        }
        if diff != 0 {
            return Err(CryptoError::AuthenticationFailure);
        }

        cipher.xor_stream(&mut out[..body_len], body);
        Ok(body_len)
    }
}
