// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HKDF key schedule (RFC 5869, HMAC-SHA-256).
//!
//! Both endpoints run extract-then-expand over the ECDH shared secret and
//! slice the output keying material into the four AEAD inputs, in this
//! fixed order:
//!
//! ```text
//! okm = client write key ‖ client write nonce prefix
//!     ‖ server write key ‖ server write nonce prefix
//! ```
//!
//! A missing salt means 32 zero bytes (the HMAC-SHA-256 block-sized
//! default). Key material is scrubbed on drop.

use ring::hmac;
use zeroize::Zeroize;

/// Output keying material for both directions of a connection.
pub struct KeyMaterial {
    client_write_key: Vec<u8>,
    client_write_nonce: Vec<u8>,
    server_write_key: Vec<u8>,
    server_write_nonce: Vec<u8>,
}

impl KeyMaterial {
    /// Derive `2 * key_size + 2 * nonce_size` bytes of keying material.
    ///
    /// `key_size` is 16 for AES-128-GCM-12 or 32 for ChaCha20-Poly1305;
    /// `nonce_size` is the 4-byte nonce-prefix length.
    pub fn derive(
        salt: Option<&[u8]>,
        ikm: &[u8],
        info: &[u8],
        key_size: usize,
        nonce_size: usize,
    ) -> KeyMaterial {
        let zero_salt = [0u8; 32];
        let salt = salt.unwrap_or(&zero_salt);

        // Extract
        let prk = hmac::sign(&hmac::Key::new(hmac::HMAC_SHA256, salt), ikm);
        let expand_key = hmac::Key::new(hmac::HMAC_SHA256, prk.as_ref());

        // Expand: T(n) = HMAC(PRK, T(n-1) | info | n)
        let need = 2 * key_size + 2 * nonce_size;
        let mut okm = Vec::with_capacity(need.div_ceil(32) * 32);
        let mut t = Vec::new();
        let mut counter = 1u8;
        while okm.len() < need {
            let mut ctx = hmac::Context::with_key(&expand_key);
            ctx.update(&t);
            ctx.update(info);
            ctx.update(&[counter]);
            t = ctx.sign().as_ref().to_vec();
            okm.extend_from_slice(&t);
            counter += 1;
        }
        t.zeroize();
        okm.truncate(need);

        let material = KeyMaterial {
            client_write_key: okm[..key_size].to_vec(),
            client_write_nonce: okm[key_size..key_size + nonce_size].to_vec(),
            server_write_key: okm[key_size + nonce_size..2 * key_size + nonce_size].to_vec(),
            server_write_nonce: okm[2 * key_size + nonce_size..].to_vec(),
        };
        okm.zeroize();
        material
    }

    /// Key the client uses to seal outbound packets.
    pub fn client_write_key(&self) -> &[u8] {
        &self.client_write_key
    }

    /// Nonce prefix the client uses to seal outbound packets.
    pub fn client_write_nonce(&self) -> &[u8] {
        &self.client_write_nonce
    }

    /// Key the server uses to seal outbound packets.
    pub fn server_write_key(&self) -> &[u8] {
        &self.server_write_key
    }

    /// Nonce prefix the server uses to seal outbound packets.
    pub fn server_write_nonce(&self) -> &[u8] {
        &self.server_write_nonce
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.client_write_key.zeroize();
        self.client_write_nonce.zeroize();
        self.server_write_key.zeroize();
        self.server_write_nonce.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc5869_case_1_split() {
        // RFC 5869 A.1, L = 42 split as 16 + 5 + 16 + 5.
        let ikm = [0x0b; 22];
        let salt: Vec<u8> = (0..=0x0c).collect();
        let info: Vec<u8> = (0xf0..=0xf9).collect();

        let material = KeyMaterial::derive(Some(&salt), &ikm, &info, 16, 5);
        assert_eq!(
            material.client_write_key(),
            [
                0x3c, 0xb2, 0x5f, 0x25, 0xfa, 0xac, 0xd5, 0x7a, 0x90, 0x43, 0x4f, 0x64, 0xd0,
                0x36, 0x2f, 0x2a,
            ]
        );
        assert_eq!(material.client_write_nonce(), [0x2d, 0x2d, 0x0a, 0x90, 0xcf]);
        assert_eq!(
            material.server_write_key(),
            [
                0x1a, 0x5a, 0x4c, 0x5d, 0xb0, 0x2d, 0x56, 0xec, 0xc4, 0xc5, 0xbf, 0x34, 0x00,
                0x72, 0x08, 0xd5,
            ]
        );
        assert_eq!(material.server_write_nonce(), [0xb8, 0x87, 0x18, 0x58, 0x65]);
    }

    #[test]
    fn test_nil_salt_matches_zero_salt() {
        let a = KeyMaterial::derive(None, b"shared secret", b"hquic info", 16, 4);
        let b = KeyMaterial::derive(Some(&[0u8; 32]), b"shared secret", b"hquic info", 16, 4);
        assert_eq!(a.client_write_key(), b.client_write_key());
        assert_eq!(a.server_write_nonce(), b.server_write_nonce());
    }

    #[test]
    fn test_sizes_for_both_suites() {
        for (key_size, nonce_size) in [(16, 4), (32, 4)] {
            let material =
                KeyMaterial::derive(None, b"ikm", b"info", key_size, nonce_size);
            assert_eq!(material.client_write_key().len(), key_size);
            assert_eq!(material.client_write_nonce().len(), nonce_size);
            assert_eq!(material.server_write_key().len(), key_size);
            assert_eq!(material.server_write_nonce().len(), nonce_size);
        }
    }

    #[test]
    fn test_directions_differ() {
        let material = KeyMaterial::derive(None, b"ikm", b"info", 16, 4);
        assert_ne!(material.client_write_key(), material.server_write_key());
        assert_ne!(material.client_write_nonce(), material.server_write_nonce());
    }
}
