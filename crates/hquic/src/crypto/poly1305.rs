// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Poly1305 one-time authenticator (RFC 7539).
//!
//! The 130-bit accumulator is split into 44+44+42-bit limbs so every
//! partial product of `h * r` is a single `u64 x u64 -> u128` multiply and
//! the reduction mod 2^130-5 folds the high limb back with a multiply by
//! 5 (the precomputed `s1 = r1*20`, `s2 = r2*20` absorb the limb shift).
//!
//! The key is one-time: the AEAD layer derives a fresh `r ‖ s` from
//! ChaCha20 block 0 of every packet nonce.

use super::{CryptoError, CryptoResult};

const MASK_44: u64 = 0xFFF_FFFF_FFFF;
const MASK_42: u64 = 0x3FF_FFFF_FFFF;

/// Poly1305 keyed state: clamped `r` limbs plus the final `s` addend.
#[derive(Debug)]
pub struct Poly1305 {
    r0: u64,
    r1: u64,
    r2: u64,
    s_lo: u64,
    s_hi: u64,
    // 5 << 2 times the high limbs, for the mod 2^130-5 wraparound.
    s1: u64,
    s2: u64,
}

impl Poly1305 {
    /// Build from a 32-byte one-time key: low 16 bytes `r` (clamped with
    /// `0x0ffffffc0ffffffc0ffffffc0fffffff`), high 16 bytes `s`.
    pub fn new(key: &[u8]) -> CryptoResult<Poly1305> {
        if key.len() < 32 {
            return Err(CryptoError::InvalidKey);
        }
        let t0 = u64::from_le_bytes(key[0..8].try_into().expect("8-byte slice"));
        let t1 = u64::from_le_bytes(key[8..16].try_into().expect("8-byte slice"));

        let r0 = t0 & 0xFFC_0FFF_FFFF;
        let r1 = ((t0 >> 44) | (t1 << 20)) & 0xFFF_FFC0_FFFF;
        let r2 = (t1 >> 24) & 0x00F_FFFF_FC0F;

        Ok(Poly1305 {
            r0,
            r1,
            r2,
            s_lo: u64::from_le_bytes(key[16..24].try_into().expect("8-byte slice")),
            s_hi: u64::from_le_bytes(key[24..32].try_into().expect("8-byte slice")),
            s1: r1 * (5 << 2),
            s2: r2 * (5 << 2),
        })
    }

    /// MAC over `data`, returned as `(high, low)` little-endian halves.
    pub fn compute_mac(&self, data: &[u8]) -> (u64, u64) {
        let mut h0 = 0u64;
        let mut h1 = 0u64;
        let mut h2 = 0u64;

        for chunk in data.chunks(16) {
            // Chunk as a 130-bit little-endian value with the 0x01 pad
            // byte appended at position len(chunk).
            let mut block = [0u8; 17];
            block[..chunk.len()].copy_from_slice(chunk);
            block[chunk.len()] = 1;
            let t0 = u64::from_le_bytes(block[0..8].try_into().expect("8-byte slice"));
            let t1 = u64::from_le_bytes(block[8..16].try_into().expect("8-byte slice"));
            let t2 = u64::from(block[16]);

            h0 += t0 & MASK_44;
            h1 += ((t0 >> 44) | (t1 << 20)) & MASK_44;
            h2 += ((t1 >> 24) | (t2 << 40)) & MASK_42;

            // h = (h * r) mod 2^130-5, partially reduced.
            let d0 = u128::from(h0) * u128::from(self.r0)
                + u128::from(h1) * u128::from(self.s2)
                + u128::from(h2) * u128::from(self.s1);
            let mut d1 = u128::from(h0) * u128::from(self.r1)
                + u128::from(h1) * u128::from(self.r0)
                + u128::from(h2) * u128::from(self.s2);
            let mut d2 = u128::from(h0) * u128::from(self.r2)
                + u128::from(h1) * u128::from(self.r1)
                + u128::from(h2) * u128::from(self.r0);

            let mut carry = d0 >> 44;
            h0 = (d0 as u64) & MASK_44;
            d1 += carry;
            carry = d1 >> 44;
            h1 = (d1 as u64) & MASK_44;
            d2 += carry;
            carry = d2 >> 42;
            h2 = (d2 as u64) & MASK_42;
            h0 += (carry as u64) * 5;
            let carry = h0 >> 44;
            h0 &= MASK_44;
            h1 += carry;
        }

        // Fully propagate carries.
        let mut c = h1 >> 44;
        h1 &= MASK_44;
        h2 += c;
        c = h2 >> 42;
        h2 &= MASK_42;
        h0 += c * 5;
        c = h0 >> 44;
        h0 &= MASK_44;
        h1 += c;
        c = h1 >> 44;
        h1 &= MASK_44;
        h2 += c;
        c = h2 >> 42;
        h2 &= MASK_42;
        h0 += c * 5;
        c = h0 >> 44;
        h0 &= MASK_44;
        h1 += c;

        // Conditionally subtract 2^130-5: compute g = h + 5 - 2^130 and
        // keep it iff it did not borrow.
        let mut g0 = h0 + 5;
        c = g0 >> 44;
        g0 &= MASK_44;
        let mut g1 = h1 + c;
        c = g1 >> 44;
        g1 &= MASK_44;
        let g2 = h2.wrapping_add(c).wrapping_sub(1 << 42);

        let keep_g = (g2 >> 63).wrapping_sub(1); // all-ones iff no borrow
        h0 = (h0 & !keep_g) | (g0 & keep_g);
        h1 = (h1 & !keep_g) | (g1 & keep_g);
        h2 = (h2 & !keep_g) | (g2 & keep_g);

        // h = (h + s) mod 2^128.
        h0 += self.s_lo & MASK_44;
        c = h0 >> 44;
        h0 &= MASK_44;
        h1 += (((self.s_lo >> 44) | (self.s_hi << 20)) & MASK_44) + c;
        c = h1 >> 44;
        h1 &= MASK_44;
        h2 += ((self.s_hi >> 24) & MASK_42) + c;
        h2 &= MASK_42;

        let low = h0 | (h1 << 44);
        let high = (h1 >> 20) | (h2 << 24);
        (high, low)
    }

    /// MAC of the RFC 7539 AEAD construction:
    /// `aad ‖ pad16 ‖ ciphertext ‖ pad16 ‖ len(aad) ‖ len(ciphertext)`.
    pub fn compute_aead_mac(&self, aad: &[u8], ciphertext: &[u8]) -> (u64, u64) {
        fn padded_len(len: usize) -> usize {
            len.div_ceil(16) * 16
        }
        let mut message =
            Vec::with_capacity(padded_len(aad.len()) + padded_len(ciphertext.len()) + 16);
        message.extend_from_slice(aad);
        message.resize(padded_len(aad.len()), 0);
        message.extend_from_slice(ciphertext);
        message.resize(padded_len(aad.len()) + padded_len(ciphertext.len()), 0);
        message.extend_from_slice(&(aad.len() as u64).to_le_bytes());
        message.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
        self.compute_mac(&message)
    }

    /// 16-byte tag form of [`Poly1305::compute_aead_mac`].
    pub fn compute_aead_tag(&self, aad: &[u8], ciphertext: &[u8]) -> [u8; 16] {
        let (high, low) = self.compute_aead_mac(aad, ciphertext);
        let mut tag = [0u8; 16];
        tag[..8].copy_from_slice(&low.to_le_bytes());
        tag[8..].copy_from_slice(&high.to_le_bytes());
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac_bytes(mac: (u64, u64)) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&mac.1.to_le_bytes());
        out[8..].copy_from_slice(&mac.0.to_le_bytes());
        out
    }

    #[test]
    fn test_rfc7539_vector() {
        // RFC 7539 Sec.2.5.2
        let key = [
            0x85, 0xd6, 0xbe, 0x78, 0x57, 0x55, 0x6d, 0x33, 0x7f, 0x44, 0x52, 0xfe, 0x42, 0xd5,
            0x06, 0xa8, 0x01, 0x03, 0x80, 0x8a, 0xfb, 0x0d, 0xb2, 0xfd, 0x4a, 0xbf, 0xf6, 0xaf,
            0x41, 0x49, 0xf5, 0x1b,
        ];
        let poly = Poly1305::new(&key).expect("valid key");
        let mac = poly.compute_mac(b"Cryptographic Forum Research Group");
        assert_eq!(
            mac_bytes(mac),
            [
                0xa8, 0x06, 0x1d, 0xc1, 0x30, 0x51, 0x36, 0xc6, 0xc2, 0x2b, 0x8b, 0xaf, 0x0c,
                0x01, 0x27, 0xa9,
            ]
        );
    }

    #[test]
    fn test_zero_key_zero_mac() {
        let poly = Poly1305::new(&[0u8; 32]).expect("valid key");
        assert_eq!(poly.compute_mac(b"anything at all"), (0, 0));
    }

    #[test]
    fn test_nacl_vector() {
        // r = 2, s = 0, data = 0xFF * 16: the padded chunk is 2^129 - 1,
        // so h = (2^129 - 1) * 2 mod (2^130 - 5) = 3, exercising the
        // conditional final subtraction.
        let mut key = [0u8; 32];
        key[0] = 2;
        let poly = Poly1305::new(&key).expect("valid key");
        let mac = poly.compute_mac(&[0xFF; 16]);
        assert_eq!(
            mac_bytes(mac),
            [
                0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_empty_message() {
        let mut key = [0u8; 32];
        key[16..].copy_from_slice(&[0xAB; 16]);
        let poly = Poly1305::new(&key).expect("valid key");
        // h stays 0 over no chunks, so the MAC is exactly s.
        assert_eq!(mac_bytes(poly.compute_mac(b"")), [0xAB; 16]);
    }

    #[test]
    fn test_aead_mac_construction() {
        let key = [0x42u8; 32];
        let poly = Poly1305::new(&key).expect("valid key");

        let aad = b"header bytes";
        let ct = b"ciphertext payload longer than a block";
        let expected = {
            let mut m = Vec::new();
            m.extend_from_slice(aad);
            while m.len() % 16 != 0 {
                m.push(0);
            }
            m.extend_from_slice(ct);
            while m.len() % 16 != 0 {
                m.push(0);
            }
            m.extend_from_slice(&(aad.len() as u64).to_le_bytes());
            m.extend_from_slice(&(ct.len() as u64).to_le_bytes());
            poly.compute_mac(&m)
        };
        assert_eq!(poly.compute_aead_mac(aad, ct), expected);
    }

    #[test]
    fn test_aead_mac_block_aligned_inputs_not_padded() {
        let key = [0x17u8; 32];
        let poly = Poly1305::new(&key).expect("valid key");
        let aad = [0x01u8; 16];
        let ct = [0x02u8; 32];
        let mut m = Vec::new();
        m.extend_from_slice(&aad);
        m.extend_from_slice(&ct);
        m.extend_from_slice(&16u64.to_le_bytes());
        m.extend_from_slice(&32u64.to_le_bytes());
        assert_eq!(poly.compute_aead_mac(&aad, &ct), poly.compute_mac(&m));
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(
            Poly1305::new(&[0u8; 31]).unwrap_err(),
            CryptoError::InvalidKey
        ));
    }
}
