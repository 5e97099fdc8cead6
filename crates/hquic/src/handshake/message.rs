// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag-value message codec.
//!
//! Values are stored owned: the parse buffer may be a reused datagram
//! buffer, so aliasing into it would tie the message lifetime to the
//! socket loop. Zero-copy slices exist only transiently inside `parse`.

use super::tags::{TAG_CHLO, TAG_PRST, TAG_REJ, TAG_SCUP, TAG_SHLO};
use super::{HandshakeError, HandshakeResult, MessageTag, MAX_NUM_ENTRIES};
use crate::core::ser::{Cursor, CursorMut};

/// Ordered tag-value map with a message discriminator.
///
/// Entries keep insertion order; lookup is a linear scan (messages are
/// small and parsed once). Serialization emits entries in insertion order
/// with cumulative end offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    msg_tag: MessageTag,
    tags: Vec<MessageTag>,
    values: Vec<Vec<u8>>,
}

impl Message {
    /// Create an empty message. Only the five known discriminators are
    /// accepted.
    pub fn new(msg_tag: MessageTag) -> HandshakeResult<Message> {
        match msg_tag {
            t if t == TAG_CHLO || t == TAG_REJ || t == TAG_SHLO || t == TAG_SCUP
                || t == TAG_PRST =>
            {
                Ok(Message { msg_tag: t, tags: Vec::new(), values: Vec::new() })
            }
            other => Err(HandshakeError::UnknownMessageTag(other)),
        }
    }

    pub fn message_tag(&self) -> MessageTag {
        self.msg_tag
    }

    pub fn is_message_tag(&self, tag: MessageTag) -> bool {
        self.msg_tag == tag
    }

    pub fn num_entries(&self) -> u16 {
        self.tags.len() as u16
    }

    /// Value bound to `tag`, if present.
    pub fn contains_tag(&self, tag: MessageTag) -> Option<&[u8]> {
        self.tags
            .iter()
            .position(|&t| t == tag)
            .map(|i| self.values[i].as_slice())
    }

    /// Append a new tag-value pair. Duplicates are rejected.
    pub fn add_tag_value(&mut self, tag: MessageTag, value: &[u8]) -> HandshakeResult<()> {
        if self.tags.contains(&tag) {
            return Err(HandshakeError::DuplicateTag(tag));
        }
        if self.tags.len() >= MAX_NUM_ENTRIES {
            return Err(HandshakeError::TooManyEntries);
        }
        self.tags.push(tag);
        self.values.push(value.to_vec());
        Ok(())
    }

    /// Replace the value of an existing tag.
    pub fn update_tag_value(&mut self, tag: MessageTag, value: &[u8]) -> HandshakeResult<()> {
        match self.tags.iter().position(|&t| t == tag) {
            Some(i) => {
                self.values[i] = value.to_vec();
                Ok(())
            }
            None => Err(HandshakeError::UnknownTag(tag)),
        }
    }

    fn values_len(&self) -> usize {
        self.values.iter().map(Vec::len).sum()
    }

    /// Wire size: 8-byte header, 8 bytes per entry, then the values.
    pub fn serialized_size(&self) -> usize {
        8 + 8 * self.tags.len() + self.values_len()
    }

    /// Serialize into `out`, returning the written byte count.
    pub fn serialize(&self, out: &mut [u8]) -> HandshakeResult<usize> {
        let size = self.serialized_size();
        if out.len() < size {
            return Err(HandshakeError::BufferTooSmall("serialized message"));
        }
        let mut cursor = CursorMut::new(&mut out[..size]);
        let write = |r: Result<(), crate::core::ser::SerError>| {
            r.map_err(|_| HandshakeError::BufferTooSmall("serialized message"))
        };
        write(cursor.write_u32_le(self.msg_tag.as_u32()))?;
        write(cursor.write_u16_le(self.tags.len() as u16))?;
        write(cursor.write_u16_le(0))?;
        let mut end_offset = 0u32;
        for (tag, value) in self.tags.iter().zip(&self.values) {
            end_offset += value.len() as u32;
            write(cursor.write_u32_le(tag.as_u32()))?;
            write(cursor.write_u32_le(end_offset))?;
        }
        for value in &self.values {
            write(cursor.write_bytes(value))?;
        }
        Ok(size)
    }

    pub fn serialize_to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.serialized_size()];
        self.serialize(&mut out).expect("sized buffer");
        out
    }

    /// One-shot parse of a complete message from the head of `data`.
    /// Returns the message and consumed byte count.
    pub fn parse(data: &[u8]) -> HandshakeResult<(Message, usize)> {
        let mut cursor = Cursor::new(data);
        let read_err = |_: crate::core::ser::SerError| HandshakeError::ShortInput("message header");

        let msg_tag = MessageTag::from_u32(cursor.read_u32_le().map_err(read_err)?);
        let mut message = Message::new(msg_tag)?;
        let num_entries = cursor.read_u16_le().map_err(read_err)? as usize;
        if num_entries > MAX_NUM_ENTRIES {
            return Err(HandshakeError::TooManyEntries);
        }
        let padding = cursor.read_u16_le().map_err(read_err)?;
        if padding != 0 {
            return Err(HandshakeError::InvalidInput("non-zero header padding"));
        }

        let mut entries = Vec::with_capacity(num_entries);
        let mut previous_end = 0u32;
        for _ in 0..num_entries {
            let tag = MessageTag::from_u32(
                cursor
                    .read_u32_le()
                    .map_err(|_| HandshakeError::ShortInput("tag-offset index"))?,
            );
            let end_offset = cursor
                .read_u32_le()
                .map_err(|_| HandshakeError::ShortInput("tag-offset index"))?;
            if end_offset < previous_end {
                return Err(HandshakeError::InvalidInput("decreasing end offset"));
            }
            entries.push((tag, end_offset - previous_end));
            previous_end = end_offset;
        }
        for (tag, len) in entries {
            let value = cursor
                .read_bytes(len as usize)
                .map_err(|_| HandshakeError::ShortInput("message values"))?;
            message.add_tag_value(tag, value)?;
        }
        Ok((message, cursor.offset()))
    }
}
