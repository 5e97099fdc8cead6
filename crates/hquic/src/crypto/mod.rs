// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Packet protection: AEAD suites and key schedule
//!
//! Three AEAD suites share one contract, all producing a 12-byte tag
//! bound to the packet sequence number:
//!
//! | Suite | Key | Tag position | Negotiated by |
//! |-------|-----|--------------|---------------|
//! | [`Aes128Gcm12`] | 16 bytes | after ciphertext | `AESG` |
//! | [`ChaCha20Poly1305`] | 32 bytes | after ciphertext | `S20P` |
//! | [`NullFnv1a128`] | none | **before** payload | `NULL` |
//!
//! The nonce is always `nonce_prefix(4) ‖ seqnum_le(8)`; the AAD is the
//! packet's public header exactly as on the wire. [`Aead`] is the enum
//! facade the packet assembler dispatches on — the suite set is fixed at
//! compile time, so enum dispatch beats a trait object here.
//!
//! An `Aead` instance serves exactly one direction of one connection and
//! must not be shared between tasks.

pub mod aes_gcm;
pub mod chacha20;
pub mod chacha20_poly1305;
pub mod fnv1a;
pub mod hkdf;
pub mod key_exchange;
pub mod null_fnv1a;
pub mod poly1305;

pub use aes_gcm::Aes128Gcm12;
pub use chacha20::ChaCha20;
pub use chacha20_poly1305::ChaCha20Poly1305;
pub use hkdf::KeyMaterial;
pub use key_exchange::KeyExchange;
pub use null_fnv1a::NullFnv1a128;
pub use poly1305::Poly1305;

use crate::handshake::tags::{TAG_AESG, TAG_NULL, TAG_S20P};
use crate::handshake::MessageTag;
use std::fmt;

/// Tag length shared by every suite.
pub const AEAD_MAC_SIZE: usize = 12;

/// Errors raised by the crypto layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Key shorter than the suite requires.
    InvalidKey,
    /// Nonce prefix shorter than 4 bytes.
    InvalidNoncePrefix,
    /// Caller-supplied output buffer is insufficient.
    BufferTooSmall,
    /// Ciphertext shorter than the 12-byte tag.
    ShortCiphertext,
    /// Tag mismatch. Returned before any plaintext is written.
    AuthenticationFailure,
    /// Algorithm identifier not recognized.
    Unsupported(&'static str),
    /// Ephemeral key generation or ECDH agreement failed.
    AgreementFailure,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "key too short for AEAD algorithm"),
            Self::InvalidNoncePrefix => write!(f, "nonce prefix must be at least 4 bytes"),
            Self::BufferTooSmall => write!(f, "output buffer too small"),
            Self::ShortCiphertext => write!(f, "ciphertext shorter than the AEAD tag"),
            Self::AuthenticationFailure => write!(f, "authentication failure"),
            Self::Unsupported(what) => write!(f, "unsupported {}", what),
            Self::AgreementFailure => write!(f, "key agreement failure"),
        }
    }
}

impl std::error::Error for CryptoError {}

pub type CryptoResult<T> = Result<T, CryptoError>;

/// AEAD suite facade: one seal/open contract over the three algorithms.
#[derive(Debug)]
pub enum Aead {
    Aes128Gcm12(Aes128Gcm12),
    ChaCha20Poly1305(ChaCha20Poly1305),
    NullFnv1a128(NullFnv1a128),
}

impl Aead {
    pub fn aes_128_gcm_12(key: &[u8], nonce_prefix: &[u8]) -> CryptoResult<Aead> {
        Ok(Aead::Aes128Gcm12(Aes128Gcm12::new(key, nonce_prefix)?))
    }

    pub fn chacha20_poly1305(key: &[u8], nonce_prefix: &[u8]) -> CryptoResult<Aead> {
        Ok(Aead::ChaCha20Poly1305(ChaCha20Poly1305::new(key, nonce_prefix)?))
    }

    /// The pre-handshake null suite; needs no key material.
    pub fn null_fnv1a_128() -> Aead {
        Aead::NullFnv1a128(NullFnv1a128::new())
    }

    /// Select a suite from the negotiated `AEAD` handshake tag.
    pub fn from_tag(aead: MessageTag, key: &[u8], nonce_prefix: &[u8]) -> CryptoResult<Aead> {
        if aead == TAG_AESG {
            Aead::aes_128_gcm_12(key, nonce_prefix)
        } else if aead == TAG_S20P {
            Aead::chacha20_poly1305(key, nonce_prefix)
        } else if aead == TAG_NULL {
            Ok(Aead::null_fnv1a_128())
        } else {
            Err(CryptoError::Unsupported("AEAD algorithm tag"))
        }
    }

    /// Protect `plaintext`, writing `ciphertext ‖ tag12` (tag-first for
    /// the null suite) into `out`. Returns the written byte count.
    pub fn seal(
        &self,
        seq_num: u64,
        out: &mut [u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> CryptoResult<usize> {
        match self {
            Aead::Aes128Gcm12(aead) => aead.seal(seq_num, out, aad, plaintext),
            Aead::ChaCha20Poly1305(aead) => aead.seal(seq_num, out, aad, plaintext),
            Aead::NullFnv1a128(aead) => aead.seal(out, aad, plaintext),
        }
    }

    /// Verify and unprotect `ciphertext` into `out`. Returns the
    /// plaintext byte count; on any mismatch no plaintext is written.
    pub fn open(
        &self,
        seq_num: u64,
        out: &mut [u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> CryptoResult<usize> {
        match self {
            Aead::Aes128Gcm12(aead) => aead.open(seq_num, out, aad, ciphertext),
            Aead::ChaCha20Poly1305(aead) => aead.open(seq_num, out, aad, ciphertext),
            Aead::NullFnv1a128(aead) => aead.open(out, aad, ciphertext),
        }
    }

    pub fn mac_size(&self) -> usize {
        AEAD_MAC_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suites() -> Vec<Aead> {
        vec![
            Aead::aes_128_gcm_12(&[0x11; 16], &[1, 2, 3, 4]).expect("valid key"),
            Aead::chacha20_poly1305(&[0x22; 32], &[1, 2, 3, 4]).expect("valid key"),
            Aead::null_fnv1a_128(),
        ]
    }

    #[test]
    fn test_seal_open_roundtrip_all_suites() {
        let aad = b"public header bytes";
        let plaintext = b"private header and frames";
        for (i, aead) in suites().iter().enumerate() {
            let mut sealed = vec![0u8; plaintext.len() + aead.mac_size()];
            let written = aead
                .seal(42, &mut sealed, aad, plaintext)
                .unwrap_or_else(|e| panic!("suite {}: {}", i, e));
            assert_eq!(written, sealed.len(), "suite {}", i);

            let mut opened = vec![0u8; plaintext.len()];
            let read = aead
                .open(42, &mut opened, aad, &sealed)
                .unwrap_or_else(|e| panic!("suite {}: {}", i, e));
            assert_eq!(read, plaintext.len(), "suite {}", i);
            assert_eq!(opened, plaintext, "suite {}", i);
        }
    }

    #[test]
    fn test_tamper_matrix_all_suites() {
        let aad = b"aad";
        let plaintext = b"payload";
        for (i, aead) in suites().iter().enumerate() {
            let mut sealed = vec![0u8; plaintext.len() + aead.mac_size()];
            aead.seal(7, &mut sealed, aad, plaintext).expect("seal should succeed");
            let mut out = vec![0u8; plaintext.len()];
            for byte in 0..sealed.len() {
                let mut corrupt = sealed.clone();
                corrupt[byte] ^= 0x40;
                assert_eq!(
                    aead.open(7, &mut out, aad, &corrupt).unwrap_err(),
                    CryptoError::AuthenticationFailure,
                    "suite {} byte {}",
                    i,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_mac_size_constant() {
        for aead in suites() {
            assert_eq!(aead.mac_size(), 12);
        }
    }

    #[test]
    fn test_from_tag_selection() {
        assert!(matches!(
            Aead::from_tag(TAG_AESG, &[0; 16], &[0; 4]).expect("AESG"),
            Aead::Aes128Gcm12(_)
        ));
        assert!(matches!(
            Aead::from_tag(TAG_S20P, &[0; 32], &[0; 4]).expect("S20P"),
            Aead::ChaCha20Poly1305(_)
        ));
        assert!(matches!(
            Aead::from_tag(TAG_NULL, &[], &[]).expect("NULL"),
            Aead::NullFnv1a128(_)
        ));
        assert!(matches!(
            Aead::from_tag(crate::handshake::tags::TAG_KEXS, &[0; 32], &[0; 4]).unwrap_err(),
            CryptoError::Unsupported(_)
        ));
    }

    #[test]
    fn test_sequence_number_binding() {
        for (i, aead) in suites().iter().enumerate() {
            let mut sealed = vec![0u8; 4 + aead.mac_size()];
            aead.seal(1, &mut sealed, b"", b"data").expect("seal should succeed");
            let mut out = vec![0u8; 4];
            // The null suite ignores the sequence number by construction.
            if matches!(aead, Aead::NullFnv1a128(_)) {
                assert!(aead.open(2, &mut out, b"", &sealed).is_ok(), "suite {}", i);
            } else {
                assert_eq!(
                    aead.open(2, &mut out, b"", &sealed).unwrap_err(),
                    CryptoError::AuthenticationFailure,
                    "suite {}",
                    i
                );
            }
        }
    }
}
