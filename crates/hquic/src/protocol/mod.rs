// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # QUIC wire protocol: headers, frames, packets
//!
//! This module contains the bidirectional codec for the QUIC packet format:
//! public and private headers with flag-encoded variable-width fields, the
//! frame taxonomy, the FEC redundancy payload, the public-reset packet, the
//! per-direction entropy-hash ring, and the packet assembler tying them to
//! the AEAD layer.
//!
//! Layout invariants live here; cryptographic transforms live in
//! [`crate::crypto`]. Codec routines are synchronous, operate on
//! caller-provided buffers, and never panic on wire input.
//!
//! # Packet demultiplexing
//!
//! ```text
//! public flags ─┬─ PublicReset ──> PRST tag-value body
//!               └─ otherwise ───> AEAD open ──> private flags
//!                                               ├─ FecPacket ──> redundancy
//!                                               └─ otherwise ──> frame sequence
//! ```

pub mod entropy;
pub mod fec;
pub mod frame;
pub mod packet;
pub mod private_header;
pub mod public_header;
pub mod public_reset;

pub use entropy::EntropyRing;
pub use fec::FecPacket;
pub use frame::{AckFrame, AckTimestamp, Frame, MissingRange, StopWaitingFrame, StreamFrame};
pub use packet::{Packet, PacketPayload};
pub use private_header::PrivateHeader;
pub use public_header::PublicHeader;
pub use public_reset::PublicResetPacket;

use crate::core::ser::SerError;
use crate::crypto::CryptoError;
use std::fmt;

/// Connection identifier: opaque 64-bit token, {0, 8, 32, 64}-bit on the wire.
pub type ConnectionId = u64;

/// Packet sequence number: monotonically increasing per direction,
/// {8, 16, 32, 48}-bit on the wire.
pub type SequenceNumber = u64;

/// Protocol version, present only when the version flag is set.
pub type Version = u32;

/// Stream identifier (32-bit).
pub type StreamId = u32;

/// Absolute byte offset within a stream (64-bit).
pub type ByteOffset = u64;

/// Wire error code carried by RST_STREAM / CONNECTION_CLOSE / GOAWAY.
pub type ErrorCode = u32;

/// FEC group offset: distance from the first packet of the group.
pub type FecGroupOffset = u8;

/// One byte of cumulative entropy-hash state. Callers interpret the
/// low bit; intermediate values are bit-positional XORs.
pub type EntropyHash = u8;

// Public flags byte. Bits 7-6 are reserved and must be zero.
pub(crate) const FLAG_VERSION: u8 = 0x01;
pub(crate) const FLAG_PUBLIC_RESET: u8 = 0x02;
pub(crate) const FLAG_CONN_ID_64BIT: u8 = 0x0C;
pub(crate) const MASK_RESERVED: u8 = 0xC0;

// Private flags byte. Bits 7-3 are reserved and must be zero.
pub(crate) const FLAG_ENTROPY: u8 = 0x01;
pub(crate) const FLAG_FEC_GROUP: u8 = 0x02;
pub(crate) const FLAG_FEC_PACKET: u8 = 0x04;
pub(crate) const MASK_PRIVATE_RESERVED: u8 = 0xF8;

/// Errors raised by the protocol codec layer.
///
/// Every codec primitive returns a structured error and never panics on
/// input. `OutOfRange` and `RingFull` indicate higher-layer bugs
/// (ack processing or missing backpressure), not wire corruption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Malformed wire bytes: reserved bits set, length inconsistencies,
    /// invalid widths, bad tags, or parameter-range violations.
    InvalidInput(&'static str),
    /// Input truncated mid-field.
    ShortInput(&'static str),
    /// Caller-supplied output buffer is insufficient.
    BufferTooSmall(&'static str),
    /// Entropy-ring query outside `[largest_known, next)`.
    OutOfRange(&'static str),
    /// Entropy ring cannot accept another packet until acks advance it.
    RingFull,
    /// Version or algorithm identifier not recognized.
    Unsupported(&'static str),
    /// AEAD failure bubbled from the crypto layer.
    Crypto(CryptoError),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(what) => write!(f, "invalid input: {}", what),
            Self::ShortInput(what) => write!(f, "short input: {}", what),
            Self::BufferTooSmall(what) => write!(f, "buffer too small: {}", what),
            Self::OutOfRange(what) => write!(f, "out of range: {}", what),
            Self::RingFull => write!(f, "entropy ring full"),
            Self::Unsupported(what) => write!(f, "unsupported: {}", what),
            Self::Crypto(err) => write!(f, "crypto: {}", err),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<SerError> for ProtocolError {
    fn from(err: SerError) -> Self {
        match err {
            SerError::UnexpectedEnd { .. } => ProtocolError::ShortInput("truncated field"),
            SerError::Overflow { .. } => ProtocolError::BufferTooSmall("serialized data"),
        }
    }
}

impl From<CryptoError> for ProtocolError {
    fn from(err: CryptoError) -> Self {
        ProtocolError::Crypto(err)
    }
}

impl From<crate::handshake::HandshakeError> for ProtocolError {
    fn from(err: crate::handshake::HandshakeError) -> Self {
        use crate::handshake::HandshakeError;
        match err {
            HandshakeError::ShortInput(what) => ProtocolError::ShortInput(what),
            HandshakeError::BufferTooSmall(what) => ProtocolError::BufferTooSmall(what),
            HandshakeError::InvalidInput(what) => ProtocolError::InvalidInput(what),
            _ => ProtocolError::InvalidInput("malformed handshake message"),
        }
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
