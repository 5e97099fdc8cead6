// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ECDH key exchange selected by handshake tag.
//!
//! The `KEXS` negotiation names the curve: `C255` (Curve25519) or `P256`
//! (NIST P-256). Keys are ephemeral; the raw shared secret must go
//! through [`crate::crypto::KeyMaterial`] before keying an AEAD.

use super::{CryptoError, CryptoResult};
use crate::handshake::tags::{TAG_C255, TAG_P256};
use crate::handshake::MessageTag;
use ring::agreement::{agree_ephemeral, Algorithm, EphemeralPrivateKey, UnparsedPublicKey};
use ring::rand::SystemRandom;

/// One side of an ephemeral ECDH exchange.
#[derive(Debug)]
pub struct KeyExchange {
    algorithm: &'static Algorithm,
    private_key: EphemeralPrivateKey,
    public_key: Vec<u8>,
}

impl KeyExchange {
    /// Create a fresh keypair for the negotiated curve tag.
    pub fn new(kexs: MessageTag) -> CryptoResult<KeyExchange> {
        let algorithm: &'static Algorithm = if kexs == TAG_C255 {
            &ring::agreement::X25519
        } else if kexs == TAG_P256 {
            &ring::agreement::ECDH_P256
        } else {
            return Err(CryptoError::Unsupported("key exchange algorithm tag"));
        };
        let rng = SystemRandom::new();
        let private_key = EphemeralPrivateKey::generate(algorithm, &rng)
            .map_err(|_| CryptoError::AgreementFailure)?;
        let public_key = private_key
            .compute_public_key()
            .map_err(|_| CryptoError::AgreementFailure)?
            .as_ref()
            .to_vec();
        Ok(KeyExchange { algorithm, private_key, public_key })
    }

    /// Local public key to send to the peer (32 bytes for Curve25519,
    /// 65-byte uncompressed point for P-256).
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Derive the shared secret from the peer's public key. Consumes the
    /// exchange: the ephemeral private key is single-use.
    pub fn compute_shared_key(self, peer_public: &[u8]) -> CryptoResult<Vec<u8>> {
        let peer = UnparsedPublicKey::new(self.algorithm, peer_public);
        agree_ephemeral(self.private_key, &peer, |shared| shared.to_vec())
            .map_err(|_| CryptoError::AgreementFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve25519_agreement() {
        let alice = KeyExchange::new(TAG_C255).expect("keypair");
        let bob = KeyExchange::new(TAG_C255).expect("keypair");
        assert_eq!(alice.public_key().len(), 32);

        let alice_pub = alice.public_key().to_vec();
        let bob_pub = bob.public_key().to_vec();
        let alice_secret = alice.compute_shared_key(&bob_pub).expect("agreement");
        let bob_secret = bob.compute_shared_key(&alice_pub).expect("agreement");
        assert_eq!(alice_secret, bob_secret);
        assert_eq!(alice_secret.len(), 32);
    }

    #[test]
    fn test_p256_agreement() {
        let alice = KeyExchange::new(TAG_P256).expect("keypair");
        let bob = KeyExchange::new(TAG_P256).expect("keypair");
        // Uncompressed point: 0x04 || X || Y.
        assert_eq!(alice.public_key().len(), 65);
        assert_eq!(alice.public_key()[0], 0x04);

        let alice_pub = alice.public_key().to_vec();
        let bob_pub = bob.public_key().to_vec();
        let alice_secret = alice.compute_shared_key(&bob_pub).expect("agreement");
        let bob_secret = bob.compute_shared_key(&alice_pub).expect("agreement");
        assert_eq!(alice_secret, bob_secret);
        assert_eq!(alice_secret.len(), 32);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(matches!(
            KeyExchange::new(crate::handshake::tags::TAG_AESG).unwrap_err(),
            CryptoError::Unsupported(_)
        ));
    }

    #[test]
    fn test_invalid_peer_public_rejected() {
        let ours = KeyExchange::new(TAG_P256).expect("keypair");
        assert!(matches!(
            ours.compute_shared_key(&[0x42; 16]).unwrap_err(),
            CryptoError::AgreementFailure
        ));
    }

    #[test]
    fn test_keypairs_are_ephemeral() {
        let a = KeyExchange::new(TAG_C255).expect("keypair");
        let b = KeyExchange::new(TAG_C255).expect("keypair");
        assert_ne!(a.public_key(), b.public_key());
    }
}
