// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ChaCha20 keystream generator (RFC 7539).
//!
//! State is a 4x4 grid of 32-bit words:
//!
//! ```text
//! +------------+------------+------------+------------+
//! | 0x61707865 | 0x3320646e | 0x79622d32 | 0x6b206574 |  constants
//! +------------+------------+------------+------------+
//! | key        | key        | key        | key        |
//! +------------+------------+------------+------------+
//! | key        | key        | key        | key        |
//! +------------+------------+------------+------------+
//! | counter    | nonce      | nonce      | nonce      |
//! +------------+------------+------------+------------+
//! ```
//!
//! The block counter is caller-settable so the AEAD layer can pin block 0
//! to Poly1305 one-time-key derivation and start payload keystream at
//! block 1. `set_sequence_number` rebinds the nonce to a packet: word 13
//! stays the 4-byte nonce prefix, words 14-15 take the 64-bit sequence
//! number.

use super::{CryptoError, CryptoResult};

const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646E, 0x7962_2D32, 0x6B20_6574];

/// Column then diagonal index quadruples for one double round.
const QUARTER_ROUNDS: [(usize, usize, usize, usize); 8] = [
    (0, 4, 8, 12),
    (1, 5, 9, 13),
    (2, 6, 10, 14),
    (3, 7, 11, 15),
    (0, 5, 10, 15),
    (1, 6, 11, 12),
    (2, 7, 8, 13),
    (3, 4, 9, 14),
];

#[inline]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}

/// ChaCha20 block function with explicit counter control.
#[derive(Debug)]
pub struct ChaCha20 {
    grid: [u32; 16],
}

impl ChaCha20 {
    /// Initialize from a 256-bit key, 96-bit nonce and starting counter.
    pub fn new(key: &[u8], nonce: &[u8], counter: u32) -> CryptoResult<ChaCha20> {
        if key.len() < 32 {
            return Err(CryptoError::InvalidKey);
        }
        if nonce.len() < 12 {
            return Err(CryptoError::InvalidNoncePrefix);
        }
        let mut grid = [0u32; 16];
        grid[..4].copy_from_slice(&SIGMA);
        for (i, chunk) in key[..32].chunks_exact(4).enumerate() {
            grid[4 + i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        grid[12] = counter;
        for (i, chunk) in nonce[..12].chunks_exact(4).enumerate() {
            grid[13 + i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(ChaCha20 { grid })
    }

    /// Rebind the nonce to a packet sequence number and rewind the block
    /// counter to 0 (block 0 feeds the Poly1305 one-time key).
    pub fn set_sequence_number(&mut self, seq_num: u64) {
        self.grid[12] = 0;
        self.grid[14] = seq_num as u32;
        self.grid[15] = (seq_num >> 32) as u32;
    }

    pub fn set_block_counter(&mut self, counter: u32) {
        self.grid[12] = counter;
    }

    /// Produce the next 64-byte keystream block and advance the counter.
    pub fn next_keystream(&mut self, keystream: &mut [u8; 64]) {
        let mut x = self.grid;
        for _ in 0..10 {
            for &(a, b, c, d) in &QUARTER_ROUNDS {
                quarter_round(&mut x, a, b, c, d);
            }
        }
        for (word, initial) in x.iter_mut().zip(&self.grid) {
            *word = word.wrapping_add(*initial);
        }
        for (chunk, word) in keystream.chunks_exact_mut(4).zip(&x) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        self.grid[12] = self.grid[12].wrapping_add(1);
    }

    /// XOR `input` with the keystream into `output`, consuming whole
    /// blocks and the required prefix of the final one.
    pub fn xor_stream(&mut self, output: &mut [u8], input: &[u8]) {
        let mut keystream = [0u8; 64];
        for (out_block, in_block) in output.chunks_mut(64).zip(input.chunks(64)) {
            self.next_keystream(&mut keystream);
            for ((o, i), k) in out_block.iter_mut().zip(in_block).zip(&keystream) {
                *o = i ^ k;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7539 Sec.2.3.2 key setup test vector.
    const RFC_KEY: [u8; 32] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
        0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b,
        0x1c, 0x1d, 0x1e, 0x1f,
    ];

    #[test]
    fn test_block_function_rfc7539() {
        let nonce = [
            0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x4a, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut cipher = ChaCha20::new(&RFC_KEY, &nonce, 1).expect("valid key and nonce");
        let mut keystream = [0u8; 64];
        cipher.next_keystream(&mut keystream);
        let expected = [
            0x10, 0xf1, 0xe7, 0xe4, 0xd1, 0x3b, 0x59, 0x15, 0x50, 0x0f, 0xdd, 0x1f, 0xa3, 0x20,
            0x71, 0xc4, 0xc7, 0xd1, 0xf4, 0xc7, 0x33, 0xc0, 0x68, 0x03, 0x04, 0x22, 0xaa, 0x9a,
            0xc3, 0xd4, 0x6c, 0x4e, 0xd2, 0x82, 0x64, 0x46, 0x07, 0x9f, 0xaa, 0x09, 0x14, 0xc2,
            0xd7, 0x05, 0xd9, 0x8b, 0x02, 0xa2, 0xb5, 0x12, 0x9c, 0xd1, 0xde, 0x16, 0x4e, 0xb9,
            0xcb, 0xd0, 0x83, 0xe8, 0xa2, 0x50, 0x3c, 0x4e,
        ];
        assert_eq!(keystream, expected);
    }

    #[test]
    fn test_encrypt_rfc7539_sunscreen() {
        let nonce = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x4a, 0x00, 0x00, 0x00, 0x00,
        ];
        let plaintext: &[u8] = b"Ladies and Gentlemen of the class of '99: \
If I could offer you only one tip for the future, sunscreen would be it.";
        let mut cipher = ChaCha20::new(&RFC_KEY, &nonce, 1).expect("valid key and nonce");
        let mut ciphertext = vec![0u8; plaintext.len()];
        cipher.xor_stream(&mut ciphertext, plaintext);
        assert_eq!(
            &ciphertext[..16],
            &[
                0x6e, 0x2e, 0x35, 0x9a, 0x25, 0x68, 0xf9, 0x80, 0x41, 0xba, 0x07, 0x28, 0xdd,
                0x0d, 0x69, 0x81,
            ]
        );
        assert_eq!(
            &ciphertext[plaintext.len() - 8..],
            &[0x8e, 0xed, 0xf2, 0x78, 0x5e, 0x42, 0x87, 0x4d]
        );

        // Decryption is the same XOR with a rewound counter.
        let mut cipher = ChaCha20::new(&RFC_KEY, &nonce, 1).expect("valid key and nonce");
        let mut recovered = vec![0u8; ciphertext.len()];
        cipher.xor_stream(&mut recovered, &ciphertext);
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_poly1305_key_generation_vectors() {
        // RFC 7539 Sec.2.6.2 test vectors: block 0 keystream prefix.
        struct KeyGenVector {
            key: [u8; 32],
            nonce: [u8; 12],
            one_time_key: [u8; 32],
        }
        let vectors = [
            KeyGenVector {
                key: [0u8; 32],
                nonce: [0u8; 12],
                one_time_key: [
                    0x76, 0xb8, 0xe0, 0xad, 0xa0, 0xf1, 0x3d, 0x90, 0x40, 0x5d, 0x6a, 0xe5,
                    0x53, 0x86, 0xbd, 0x28, 0xbd, 0xd2, 0x19, 0xb8, 0xa0, 0x8d, 0xed, 0x1a,
                    0xa8, 0x36, 0xef, 0xcc, 0x8b, 0x77, 0x0d, 0xc7,
                ],
            },
            KeyGenVector {
                key: {
                    let mut key = [0u8; 32];
                    key[31] = 1;
                    key
                },
                nonce: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
                one_time_key: [
                    0xec, 0xfa, 0x25, 0x4f, 0x84, 0x5f, 0x64, 0x74, 0x73, 0xd3, 0xcb, 0x14,
                    0x0d, 0xa9, 0xe8, 0x76, 0x06, 0xcb, 0x33, 0x06, 0x6c, 0x44, 0x7b, 0x87,
                    0xbc, 0x26, 0x66, 0xdd, 0xe3, 0xfb, 0xb7, 0x39,
                ],
            },
            KeyGenVector {
                key: [
                    0x1c, 0x92, 0x40, 0xa5, 0xeb, 0x55, 0xd3, 0x8a, 0xf3, 0x33, 0x88, 0x86,
                    0x04, 0xf6, 0xb5, 0xf0, 0x47, 0x39, 0x17, 0xc1, 0x40, 0x2b, 0x80, 0x09,
                    0x9d, 0xca, 0x5c, 0xbc, 0x20, 0x70, 0x75, 0xc0,
                ],
                nonce: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
                one_time_key: [
                    0x96, 0x5e, 0x3b, 0xc6, 0xf9, 0xec, 0x7e, 0xd9, 0x56, 0x08, 0x08, 0xf4,
                    0xd2, 0x29, 0xf9, 0x4b, 0x13, 0x7f, 0xf2, 0x75, 0xca, 0x9b, 0x3f, 0xcb,
                    0xdd, 0x59, 0xde, 0xaa, 0xd2, 0x33, 0x10, 0xae,
                ],
            },
        ];
        for (i, v) in vectors.iter().enumerate() {
            let mut cipher = ChaCha20::new(&v.key, &v.nonce, 0).expect("valid key and nonce");
            let mut keystream = [0u8; 64];
            cipher.next_keystream(&mut keystream);
            assert_eq!(&keystream[..32], &v.one_time_key, "vector {}", i);
        }
    }

    #[test]
    fn test_set_sequence_number_rewinds_counter() {
        let nonce_prefix = [0x07, 0x00, 0x00, 0x4a, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut a = ChaCha20::new(&RFC_KEY, &nonce_prefix, 5).expect("valid key and nonce");
        a.set_sequence_number(0x1122334455667788);

        let mut nonce = [0u8; 12];
        nonce[..4].copy_from_slice(&nonce_prefix[..4]);
        nonce[4..].copy_from_slice(&0x1122334455667788u64.to_le_bytes());
        let mut b = ChaCha20::new(&RFC_KEY, &nonce, 0).expect("valid key and nonce");

        let mut ka = [0u8; 64];
        let mut kb = [0u8; 64];
        a.next_keystream(&mut ka);
        b.next_keystream(&mut kb);
        assert_eq!(ka, kb);

        // Counter advanced identically on both.
        a.next_keystream(&mut ka);
        b.next_keystream(&mut kb);
        assert_eq!(ka, kb);
    }

    #[test]
    fn test_short_key_or_nonce_rejected() {
        assert!(matches!(
            ChaCha20::new(&[0u8; 31], &[0u8; 12], 0).unwrap_err(),
            CryptoError::InvalidKey
        ));
        assert!(matches!(
            ChaCha20::new(&[0u8; 32], &[0u8; 11], 0).unwrap_err(),
            CryptoError::InvalidNoncePrefix
        ));
    }
}
