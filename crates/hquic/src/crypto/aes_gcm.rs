// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AES-128-GCM with a 12-byte tag.
//!
//! The 12-byte truncated tag and the sequence-number-derived nonce put
//! this outside every off-the-shelf GCM API, so the mode is implemented
//! here: GHASH as shift-and-conditional-XOR multiplication in GF(2^128)
//! (reduction polynomial `x^128 + x^7 + x^2 + x + 1`, i.e. `0xE1 << 120`)
//! over two u64 halves, and CTR keystream with the big-endian counter of
//! NIST SP 800-38D. Only the raw AES-128 block transform comes from the
//! `aes` crate.
//!
//! ```text
//! H   = AES(key, 0^128)
//! Y0  = nonce ‖ 00000001          (tag keystream)
//! Yi  = nonce ‖ i+1, i >= 1       (payload keystream, counter starts at 2)
//! tag = truncate_12(GHASH(H, aad, ct) ^ AES(key, Y0))
//! ```

use super::{CryptoError, CryptoResult, AEAD_MAC_SIZE};
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

const R_HI: u64 = 0xE100_0000_0000_0000;

/// AES-128-GCM-12 bound to a 4-byte nonce prefix.
#[derive(Debug)]
pub struct Aes128Gcm12 {
    cipher: Aes128,
    /// GHASH key `H = AES(key, 0^128)` as big-endian (high, low) halves.
    h_hi: u64,
    h_lo: u64,
    nonce_prefix: [u8; 4],
}

impl Aes128Gcm12 {
    pub fn new(key: &[u8], nonce_prefix: &[u8]) -> CryptoResult<Aes128Gcm12> {
        if key.len() < 16 {
            return Err(CryptoError::InvalidKey);
        }
        if nonce_prefix.len() < 4 {
            return Err(CryptoError::InvalidNoncePrefix);
        }
        let cipher = Aes128::new(GenericArray::from_slice(&key[..16]));

        let mut h = [0u8; 16];
        encrypt_block(&cipher, &mut h);
        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&nonce_prefix[..4]);
        Ok(Aes128Gcm12 {
            cipher,
            h_hi: u64::from_be_bytes(h[..8].try_into().expect("8-byte slice")),
            h_lo: u64::from_be_bytes(h[8..].try_into().expect("8-byte slice")),
            nonce_prefix: prefix,
        })
    }

    fn nonce(&self, seq_num: u64) -> [u8; 12] {
        let mut nonce = [0u8; 12];
        nonce[..4].copy_from_slice(&self.nonce_prefix);
        nonce[4..].copy_from_slice(&seq_num.to_le_bytes());
        nonce
    }

    /// Multiply `x` by `H` in GF(2^128).
    fn mult_h(&self, x_hi: u64, x_lo: u64) -> (u64, u64) {
        let mut z_hi = 0u64;
        let mut z_lo = 0u64;
        let mut v_hi = x_hi;
        let mut v_lo = x_lo;
        for i in 0..128 {
            let y_bit = if i < 64 {
                self.h_hi & (1 << (63 - i))
            } else {
                self.h_lo & (1 << (127 - i))
            };
            if y_bit != 0 {
                z_hi ^= v_hi;
                z_lo ^= v_lo;
            }
            let carry = v_lo & 1;
            v_lo = (v_lo >> 1) | (v_hi << 63);
            v_hi >>= 1;
            if carry != 0 {
                v_hi ^= R_HI;
            }
        }
        (z_hi, z_lo)
    }

    fn ghash_fold(&self, x: (u64, u64), data: &[u8]) -> (u64, u64) {
        let mut x = x;
        for chunk in data.chunks(16) {
            let mut block = [0u8; 16];
            block[..chunk.len()].copy_from_slice(chunk);
            let b_hi = u64::from_be_bytes(block[..8].try_into().expect("8-byte slice"));
            let b_lo = u64::from_be_bytes(block[8..].try_into().expect("8-byte slice"));
            x = self.mult_h(x.0 ^ b_hi, x.1 ^ b_lo);
        }
        x
    }

    /// GHASH over zero-padded `aad`, zero-padded `ciphertext`, then the
    /// bit-length block.
    fn ghash(&self, aad: &[u8], ciphertext: &[u8]) -> [u8; 16] {
        let x = self.ghash_fold((0, 0), aad);
        let x = self.ghash_fold(x, ciphertext);
        let aad_bits = (aad.len() as u64) << 3;
        let ct_bits = (ciphertext.len() as u64) << 3;
        let (hi, lo) = self.mult_h(x.0 ^ aad_bits, x.1 ^ ct_bits);

        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&hi.to_be_bytes());
        out[8..].copy_from_slice(&lo.to_be_bytes());
        out
    }

    /// Tag keystream block `AES(key, nonce ‖ 00000001)`.
    fn tag_mask(&self, nonce: &[u8; 12]) -> [u8; 16] {
        let mut y0 = [0u8; 16];
        y0[..12].copy_from_slice(nonce);
        y0[15] = 1;
        encrypt_block(&self.cipher, &mut y0);
        y0
    }

    /// CTR transform with the payload counter starting at 2.
    fn ctr_xor(&self, nonce: &[u8; 12], output: &mut [u8], input: &[u8]) {
        let mut counter = 2u32;
        let mut block = [0u8; 16];
        for (out_chunk, in_chunk) in output.chunks_mut(16).zip(input.chunks(16)) {
            block[..12].copy_from_slice(nonce);
            block[12..].copy_from_slice(&counter.to_be_bytes());
            encrypt_block(&self.cipher, &mut block);
            for ((o, i), k) in out_chunk.iter_mut().zip(in_chunk).zip(&block) {
                *o = i ^ k;
            }
            counter += 1;
        }
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
        let nonce = self.nonce(seq_num);
        let (body, rest) = out.split_at_mut(plaintext.len());
        self.ctr_xor(&nonce, body, plaintext);

        let ghash = self.ghash(aad, body);
        let mask = self.tag_mask(&nonce);
        for (slot, (g, m)) in rest[..AEAD_MAC_SIZE].iter_mut().zip(ghash.iter().zip(&mask)) {
            *slot = g ^ m;
        }
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

        let nonce = self.nonce(seq_num);
        let ghash = self.ghash(aad, body);
        let mask = self.tag_mask(&nonce);
        let mut diff = 0u8;
        for (slot, (g, m)) in tag.iter().zip(ghash.iter().zip(&mask)) {
            diff |= slot ^ g ^ m;
        }
        if diff != 0 {
            return Err(CryptoError::AuthenticationFailure);
        }

        self.ctr_xor(&nonce, &mut out[..body_len], body);
        Ok(body_len)
    }
}

fn encrypt_block(cipher: &Aes128, block: &mut [u8; 16]) {
    let ga = GenericArray::from_mut_slice(block);
    cipher.encrypt_block(ga);
}
