// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HQUIC - QUIC transport endpoint core
//!
//! A pure Rust implementation of the core of a QUIC transport endpoint:
//! the packet codec, the embedded frame layer, and the AEAD machinery
//! binding packet protection to sequence numbers. QUIC merges the roles
//! of TLS and TCP into one protocol over UDP; this crate is the
//! user-space wire state machine that makes that work.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                    Session Layer (out of scope)                     |
//! |   accept/dial | stream buffers | congestion | retransmission        |
//! +---------------------------------------------------------------------+
//! |                           Packet Layer                              |
//! |   Packet assembler | Public/Private headers | Frames | FEC | Reset  |
//! +---------------------------------------------------------------------+
//! |                          Protection Layer                           |
//! |   AES-128-GCM-12 | ChaCha20-Poly1305-12 | Null-FNV1a | HKDF | ECDH  |
//! +---------------------------------------------------------------------+
//! |                          Byte Codec Layer                           |
//! |   LE cursors | variable-width integers | tag-value messages         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Packet`] | Assembles/demultiplexes packets, drives the AEAD |
//! | [`Frame`] | STREAM, ACK and control frames inside a packet |
//! | [`Aead`] | Seal/open facade over the three cipher suites |
//! | [`EntropyRing`] | Per-direction entropy bits for unforgeable ACKs |
//! | [`Message`] | Tag-value handshake message codec |
//! | [`MessageParser`] | Chunked streaming parser for handshake bytes |
//!
//! ## Concurrency model
//!
//! The core is single-threaded cooperative per connection: every stateful
//! object (AEAD instance, entropy ring, message parser) serves exactly
//! one direction of one connection and is never locked. Connections may
//! run in parallel; they share nothing but configuration.
//!
//! All codec routines are synchronous, operate on caller-provided
//! buffers, and return structured errors instead of panicking on wire
//! input.

/// Core serialization primitives (little-endian cursors).
pub mod core;
/// AEAD suites, hashes, HKDF key schedule and ECDH key exchange.
pub mod crypto;
/// Handshake tag alphabet, tag-value messages, streaming parser.
pub mod handshake;
/// Wire protocol: headers, frames, packets, FEC, entropy ring.
pub mod protocol;

pub use crypto::{Aead, CryptoError, KeyExchange, KeyMaterial, AEAD_MAC_SIZE};
pub use handshake::{HandshakeError, Message, MessageParser, MessageTag};
pub use protocol::{
    ConnectionId, EntropyRing, FecPacket, Frame, Packet, PacketPayload, PrivateHeader,
    ProtocolError, PublicHeader, PublicResetPacket, SequenceNumber, StreamId, Version,
};
pub use protocol::packet::MAX_PACKET_SIZE;

/// HQUIC version string.
pub const VERSION: &str = "0.3.0";
