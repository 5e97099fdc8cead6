// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FNV1a hashes backing the pre-handshake null AEAD.
//!
//! FNV1a is not cryptographic; before the key agreement completes there is
//! no key material, and the 96-bit truncated FNV1a-128 tag only guards
//! against accidental corruption, exactly like the original protocol.

/// 64-bit FNV1a over an octet stream.
pub fn hash_fnv1a_64(data: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
    const PRIME: u64 = 0x100_0000_01B3;

    let mut hash = OFFSET_BASIS;
    for &byte in data {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

// offset_basis = 144066263297769815596495629667062367629
const OFFSET_BASIS_128: u128 = 0x6C62272E_07BB0142_62B82175_6295C58D;
// fnv_prime = 2^88 + 0x13B = 309485009821345068724781371
const PRIME_128: u128 = (1 << 88) + 0x13B;

/// 128-bit FNV1a, returned as `(high, low)` 64-bit halves.
pub fn hash_fnv1a_128(data: &[u8]) -> (u64, u64) {
    let hash = fold_fnv1a_128(OFFSET_BASIS_128, data);
    ((hash >> 64) as u64, hash as u64)
}

fn fold_fnv1a_128(mut hash: u128, data: &[u8]) -> u128 {
    for &byte in data {
        hash ^= u128::from(byte);
        hash = hash.wrapping_mul(PRIME_128);
    }
    hash
}

/// FNV1a-128 of `aad ‖ payload` without materializing the concatenation.
///
/// The null AEAD truncates the result to 96 bits at the call site by
/// taking `(low, low32(high))`.
pub fn compute_aead_hash_fnv1a_128(aad: &[u8], payload: &[u8]) -> (u64, u64) {
    let hash = fold_fnv1a_128(fold_fnv1a_128(OFFSET_BASIS_128, aad), payload);
    ((hash >> 64) as u64, hash as u64)
}
