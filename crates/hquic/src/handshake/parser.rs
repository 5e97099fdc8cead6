// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming handshake message parser.
//!
//! Handshake bytes arrive as arbitrary stream chunks; this parser
//! reassembles complete [`Message`]s across chunk boundaries. It is a
//! four-state push machine — the single suspension point of the core:
//! between `feed` calls it simply holds its buffered bytes.
//!
//! ```text
//! ReadMsgTag -> ReadNumEntries -> ReadTagsAndOffsets -> ReadValues -+
//!     ^                                                             |
//!     +------------------------- message emitted ------------------+
//! ```
//!
//! A message declaring more than [`MAX_NUM_ENTRIES`] entries (or any other
//! structural violation) poisons the parser: message framing is derived
//! from the corrupted header, so nothing after it can be trusted.

use super::message::Message;
use super::tags::MessageTag;
use super::{HandshakeError, HandshakeResult, MAX_NUM_ENTRIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ReadMsgTag,
    ReadNumEntries,
    ReadTagsAndOffsets,
    ReadValues,
}

/// Push parser turning a chunked byte stream into handshake messages.
///
/// Single-owner, like every other per-direction object: one parser per
/// receive direction of a connection.
pub struct MessageParser {
    state: ParserState,
    buf: Vec<u8>,
    pos: usize,
    running: bool,
    poisoned: bool,
    // In-flight message being assembled.
    msg_tag: MessageTag,
    num_entries: usize,
    entries: Vec<(MessageTag, u32)>,
    values_len: usize,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageParser {
    /// A new parser is stopped; call [`MessageParser::start`] before
    /// feeding.
    pub fn new() -> Self {
        MessageParser {
            state: ParserState::ReadMsgTag,
            buf: Vec::new(),
            pos: 0,
            running: false,
            poisoned: false,
            msg_tag: MessageTag::from_u32(0),
            num_entries: 0,
            entries: Vec::new(),
            values_len: 0,
        }
    }

    /// Start the parser. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop the parser, discarding buffered unconsumed bytes and any
    /// in-flight partial message. Decoded state survives only at message
    /// boundaries. Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.buf.clear();
        self.pos = 0;
        self.reset_assembly();
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn reset_assembly(&mut self) {
        self.state = ParserState::ReadMsgTag;
        self.num_entries = 0;
        self.entries.clear();
        self.values_len = 0;
    }

    /// Bytes buffered but not yet consumed by a state transition.
    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take4(&mut self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        bytes
    }

    fn take_vec(&mut self, count: usize) -> Vec<u8> {
        let value = self.buf[self.pos..self.pos + count].to_vec();
        self.pos += count;
        value
    }

    fn poison(&mut self, err: HandshakeError) -> HandshakeError {
        self.poisoned = true;
        self.buf.clear();
        self.pos = 0;
        self.reset_assembly();
        err
    }

    /// Feed one chunk, returning every message completed by it.
    ///
    /// The emitted message sequence is identical for every partition of
    /// the same byte stream into chunks.
    pub fn feed(&mut self, chunk: &[u8]) -> HandshakeResult<Vec<Message>> {
        if self.poisoned {
            return Err(HandshakeError::Poisoned);
        }
        if !self.running {
            return Err(HandshakeError::Stopped);
        }
        self.buf.extend_from_slice(chunk);

        let mut messages = Vec::new();
        loop {
            match self.state {
                ParserState::ReadMsgTag => {
                    if self.available() < 4 {
                        break;
                    }
                    let bytes = self.take4();
                    self.msg_tag = MessageTag::new(bytes);
                    self.state = ParserState::ReadNumEntries;
                }
                ParserState::ReadNumEntries => {
                    if self.available() < 4 {
                        break;
                    }
                    let bytes = self.take4();
                    let num_entries = usize::from(u16::from_le_bytes([bytes[0], bytes[1]]));
                    if num_entries > MAX_NUM_ENTRIES {
                        return Err(self.poison(HandshakeError::TooManyEntries));
                    }
                    if bytes[2] != 0 || bytes[3] != 0 {
                        return Err(
                            self.poison(HandshakeError::InvalidInput("non-zero header padding"))
                        );
                    }
                    self.num_entries = num_entries;
                    self.state = ParserState::ReadTagsAndOffsets;
                }
                ParserState::ReadTagsAndOffsets => {
                    if self.available() < 8 * self.num_entries {
                        break;
                    }
                    let mut previous_end = 0u32;
                    for _ in 0..self.num_entries {
                        let tag = MessageTag::new(self.take4());
                        let end_offset = u32::from_le_bytes(self.take4());
                        if end_offset < previous_end {
                            self.entries.clear();
                            return Err(self.poison(HandshakeError::InvalidInput(
                                "decreasing end offset",
                            )));
                        }
                        self.entries.push((tag, end_offset - previous_end));
                        previous_end = end_offset;
                    }
                    self.values_len = previous_end as usize;
                    self.state = ParserState::ReadValues;
                }
                ParserState::ReadValues => {
                    if self.available() < self.values_len {
                        break;
                    }
                    let mut message = match Message::new(self.msg_tag) {
                        Ok(message) => message,
                        Err(err) => return Err(self.poison(err)),
                    };
                    let entries = std::mem::take(&mut self.entries);
                    for (tag, len) in &entries {
                        let value = self.take_vec(*len as usize);
                        if let Err(err) = message.add_tag_value(*tag, &value) {
                            return Err(self.poison(err));
                        }
                    }
                    messages.push(message);
                    self.reset_assembly();
                }
            }
        }

        // Compact consumed bytes so the buffer never grows unboundedly.
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        Ok(messages)
    }
}
