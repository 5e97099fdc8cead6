// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Handshake message layer
//!
//! Crypto-handshake messages (`CHLO`, `REJ`, `SHLO`, `SCUP`) and the
//! public-reset body (`PRST`) share one wire structure: an ordered
//! tag-value map with a cumulative end-offset index.
//!
//! ```text
//! msgTag (u32 LE)
//! numEntries (u16 LE)  padding (u16 LE = 0)
//! tag_0 (u32 LE)  endOffset_0 (u32 LE)
//! ...
//! tag_N-1         endOffset_N-1
//! value_0 .. value_N-1  (concatenated, endOffset_i = cumulative length)
//! ```
//!
//! [`Message`] is the map plus its one-shot codec; [`MessageParser`] is
//! the restartable push parser used when messages arrive as arbitrary
//! stream chunks.

pub mod message;
pub mod parser;
pub mod tags;

pub use message::Message;
pub use parser::MessageParser;
pub use tags::MessageTag;

use std::fmt;

/// Maximum number of tag-value entries in a message.
pub const MAX_NUM_ENTRIES: usize = 128;

/// Errors raised by the handshake message codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// Malformed wire bytes: non-zero padding, decreasing end offsets.
    InvalidInput(&'static str),
    /// Input truncated mid-field.
    ShortInput(&'static str),
    /// Caller-supplied output buffer is insufficient.
    BufferTooSmall(&'static str),
    /// More than [`MAX_NUM_ENTRIES`] entries declared or added.
    TooManyEntries,
    /// `add_tag_value` on a tag already present.
    DuplicateTag(MessageTag),
    /// `update_tag_value` on a tag not present.
    UnknownTag(MessageTag),
    /// Message discriminator outside `CHLO`/`REJ`/`SHLO`/`SCUP`/`PRST`.
    UnknownMessageTag(MessageTag),
    /// The streaming parser saw a poisonous message and halted.
    Poisoned,
    /// The streaming parser is stopped.
    Stopped,
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(what) => write!(f, "invalid input: {}", what),
            Self::ShortInput(what) => write!(f, "short input: {}", what),
            Self::BufferTooSmall(what) => write!(f, "buffer too small: {}", what),
            Self::TooManyEntries => {
                write!(f, "message exceeds {} tag-value entries", MAX_NUM_ENTRIES)
            }
            Self::DuplicateTag(tag) => write!(f, "duplicate tag {}", tag),
            Self::UnknownTag(tag) => write!(f, "unknown tag {}", tag),
            Self::UnknownMessageTag(tag) => write!(f, "unknown message tag {}", tag),
            Self::Poisoned => write!(f, "parser poisoned by invalid message"),
            Self::Stopped => write!(f, "parser stopped"),
        }
    }
}

impl std::error::Error for HandshakeError {}

pub type HandshakeResult<T> = Result<T, HandshakeError>;
