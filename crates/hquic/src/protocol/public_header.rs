// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Public header codec.
//!
//! ```text
//!      0        1        2        3        4            8
//! +--------+--------+--------+--------+--------+---    ---+
//! | Public |    Connection ID (0, 8, 32, or 64)    ...    | ->
//! |Flags(8)|      (variable length)                       |
//! +--------+--------+--------+--------+--------+---    ---+
//!
//!      9       10       11        12
//! +--------+--------+--------+--------+
//! |      Quic Version (32)            | ->
//! |         (optional)                |
//! +--------+--------+--------+--------+
//!
//!     13      14       15        16        17       18
//! +--------+--------+--------+--------+--------+--------+
//! |         Sequence Number (8, 16, 32, or 48)          |
//! |                         (variable length)           |
//! +--------+--------+--------+--------+--------+--------+
//!
//! Public flags:
//! +---+---+---+---+---+---+---+---+
//! | 0 | 0 | SeqNum| ConnID|Rst|Ver|
//! +---+---+---+---+---+---+---+---+
//! ```
//!
//! A set PublicReset bit overrides everything else: the header is then
//! exactly 9 bytes (flags + 64-bit connection ID) and the rest of the
//! packet is the unauthenticated PRST body.

use super::{
    ConnectionId, ProtocolError, ProtocolResult, SequenceNumber, Version, FLAG_CONN_ID_64BIT,
    FLAG_PUBLIC_RESET, FLAG_VERSION, MASK_RESERVED,
};
use crate::core::ser::{Cursor, CursorMut};

fn conn_id_width_from_code(code: u8) -> usize {
    match code & 0x3 {
        0 => 0,
        1 => 1,
        2 => 4,
        _ => 8,
    }
}

fn conn_id_code_from_width(width: usize) -> u8 {
    match width {
        0 => 0,
        1 => 1,
        4 => 2,
        _ => 3,
    }
}

fn seq_num_width_from_code(code: u8) -> usize {
    match code & 0x3 {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => 6,
    }
}

fn seq_num_code_from_width(width: usize) -> u8 {
    match width {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}

/// Parsed or to-be-serialized public header.
///
/// Field widths are explicit state so a parse/serialize round trip
/// reproduces the encoder's exact byte choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicHeader {
    version_flag: bool,
    public_reset_flag: bool,
    conn_id: ConnectionId,
    conn_id_width: usize,
    version: Version,
    seq_num: SequenceNumber,
    seq_num_width: usize,
}

impl Default for PublicHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicHeader {
    pub fn new() -> Self {
        PublicHeader {
            version_flag: false,
            public_reset_flag: false,
            conn_id: 0,
            conn_id_width: 8,
            version: 0,
            seq_num: 0,
            seq_num_width: 1,
        }
    }

    /// Parse a public header, returning the header and consumed byte count.
    pub fn parse(data: &[u8]) -> ProtocolResult<(PublicHeader, usize)> {
        if data.len() < 2 {
            return Err(ProtocolError::ShortInput("public header needs 2 bytes minimum"));
        }
        let pf = data[0];
        if pf & MASK_RESERVED != 0 {
            return Err(ProtocolError::InvalidInput("public flags reserved bits set"));
        }
        let mut header = PublicHeader::new();

        if pf & FLAG_PUBLIC_RESET != 0 {
            // Public reset always carries a 64-bit connection ID and stops
            // after it; the PRST body is parsed by the packet layer.
            if data.len() < 9 {
                return Err(ProtocolError::ShortInput("public reset header needs 9 bytes"));
            }
            let mut cursor = Cursor::new(&data[1..9]);
            header.public_reset_flag = true;
            header.conn_id_width = 8;
            header.conn_id = cursor.read_u64_le()?;
            return Ok((header, 9));
        }

        header.version_flag = pf & FLAG_VERSION != 0;
        header.conn_id_width = conn_id_width_from_code(pf >> 2);
        header.seq_num_width = seq_num_width_from_code(pf >> 4);

        let mut cursor = Cursor::new(&data[1..]);
        header.conn_id = cursor.read_uint_le(header.conn_id_width)?;
        if header.version_flag {
            header.version = cursor.read_u32_le()?;
        }
        header.seq_num = cursor.read_uint_le(header.seq_num_width)?;
        Ok((header, 1 + cursor.offset()))
    }

    pub fn serialized_size(&self) -> usize {
        if self.public_reset_flag {
            return 9;
        }
        let mut size = 1 + self.conn_id_width + self.seq_num_width;
        if self.version_flag {
            size += 4;
        }
        size
    }

    /// Serialize into `out`, returning the written byte count.
    pub fn serialize(&self, out: &mut [u8]) -> ProtocolResult<usize> {
        if self.public_reset_flag {
            if out.len() < 9 {
                return Err(ProtocolError::BufferTooSmall("public reset header"));
            }
            out[0] = FLAG_PUBLIC_RESET | FLAG_CONN_ID_64BIT;
            let mut cursor = CursorMut::new(&mut out[1..9]);
            cursor.write_u64_le(self.conn_id)?;
            return Ok(9);
        }

        let size = self.serialized_size();
        if out.len() < size {
            return Err(ProtocolError::BufferTooSmall("public header"));
        }
        let mut pf = conn_id_code_from_width(self.conn_id_width) << 2;
        pf |= seq_num_code_from_width(self.seq_num_width) << 4;
        if self.version_flag {
            pf |= FLAG_VERSION;
        }
        out[0] = pf;

        let mut cursor = CursorMut::new(&mut out[1..size]);
        cursor.write_uint_le(self.conn_id_width, self.conn_id)?;
        if self.version_flag {
            cursor.write_u32_le(self.version)?;
        }
        cursor.write_uint_le(self.seq_num_width, self.seq_num)?;
        Ok(size)
    }

    pub fn version_flag(&self) -> bool {
        self.version_flag
    }

    pub fn set_version_flag(&mut self, state: bool) {
        self.version_flag = state;
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn public_reset_flag(&self) -> bool {
        self.public_reset_flag
    }

    pub fn set_public_reset_flag(&mut self, state: bool) {
        self.public_reset_flag = state;
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }

    pub fn set_connection_id(&mut self, conn_id: ConnectionId) {
        self.conn_id = conn_id;
    }

    pub fn connection_id_width(&self) -> usize {
        self.conn_id_width
    }

    pub fn set_connection_id_width(&mut self, width: usize) -> ProtocolResult<()> {
        match width {
            0 | 1 | 4 | 8 => {
                self.conn_id_width = width;
                Ok(())
            }
            _ => Err(ProtocolError::InvalidInput("connection ID width must be 0, 1, 4 or 8")),
        }
    }

    pub fn sequence_number(&self) -> SequenceNumber {
        self.seq_num
    }

    pub fn set_sequence_number(&mut self, seq_num: SequenceNumber) {
        self.seq_num = seq_num;
    }

    pub fn sequence_number_width(&self) -> usize {
        self.seq_num_width
    }

    pub fn set_sequence_number_width(&mut self, width: usize) -> ProtocolResult<()> {
        match width {
            1 | 2 | 4 | 6 => {
                self.seq_num_width = width;
                Ok(())
            }
            _ => Err(ProtocolError::InvalidInput("sequence number width must be 1, 2, 4 or 6")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HeaderVector {
        data: &'static [u8],
        version_flag: bool,
        version: Version,
        conn_id: ConnectionId,
        seq_num: SequenceNumber,
    }

    // Flag bytes spelled out: conn ID code in bits 3-2, seqnum code in
    // bits 5-4, version bit 0.
    const VECTORS: &[HeaderVector] = &[
        HeaderVector {
            data: &[0x00, 0x0d],
            version_flag: false,
            version: 0,
            conn_id: 0,
            seq_num: 0x0d,
        },
        HeaderVector {
            data: &[0x04, 0x88, 0x0d],
            version_flag: false,
            version: 0,
            conn_id: 0x88,
            seq_num: 0x0d,
        },
        HeaderVector {
            data: &[0x08, 0x88, 0x77, 0x66, 0x55, 0x0d],
            version_flag: false,
            version: 0,
            conn_id: 0x55667788,
            seq_num: 0x0d,
        },
        HeaderVector {
            data: &[0x0c, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x0d],
            version_flag: false,
            version: 0,
            conn_id: 0x1122334455667788,
            seq_num: 0x0d,
        },
        HeaderVector {
            data: &[0x10, 0x0d, 0x0c],
            version_flag: false,
            version: 0,
            conn_id: 0,
            seq_num: 0x0c0d,
        },
        HeaderVector {
            data: &[0x20, 0x0d, 0x0c, 0x0b, 0x0a],
            version_flag: false,
            version: 0,
            conn_id: 0,
            seq_num: 0x0a0b0c0d,
        },
        HeaderVector {
            data: &[0x30, 0x0d, 0x0c, 0x0b, 0x0a, 0xdd, 0xcc],
            version_flag: false,
            version: 0,
            conn_id: 0,
            seq_num: 0xccdd0a0b0c0d,
        },
        HeaderVector {
            data: &[0x01, 0x04, 0x03, 0x02, 0x01, 0x0d],
            version_flag: true,
            version: 0x01020304,
            conn_id: 0,
            seq_num: 0x0d,
        },
        HeaderVector {
            data: &[
                0x39, 0x88, 0x77, 0x66, 0x55, 0x04, 0x03, 0x02, 0x01, 0x0d, 0x0c, 0x0b, 0x0a,
                0xdd, 0xcc,
            ],
            version_flag: true,
            version: 0x01020304,
            conn_id: 0x55667788,
            seq_num: 0xccdd0a0b0c0d,
        },
    ];

    #[test]
    fn test_parse_vectors() {
        for (i, v) in VECTORS.iter().enumerate() {
            let (header, consumed) =
                PublicHeader::parse(v.data).unwrap_or_else(|e| panic!("vector {}: {}", i, e));
            assert_eq!(consumed, v.data.len(), "vector {}: consumed", i);
            assert_eq!(header.version_flag(), v.version_flag, "vector {}: version flag", i);
            if v.version_flag {
                assert_eq!(header.version(), v.version, "vector {}: version", i);
            }
            assert_eq!(header.connection_id(), v.conn_id, "vector {}: conn id", i);
            assert_eq!(header.sequence_number(), v.seq_num, "vector {}: seq num", i);
            assert!(!header.public_reset_flag());
        }
    }

    #[test]
    fn test_serialize_vectors_byte_exact() {
        let mut buf = [0u8; 19];
        for (i, v) in VECTORS.iter().enumerate() {
            let (header, _) = PublicHeader::parse(v.data).expect("parse should succeed");
            let written = header
                .serialize(&mut buf)
                .unwrap_or_else(|e| panic!("vector {}: {}", i, e));
            assert_eq!(&buf[..written], v.data, "vector {}: bytes", i);
        }
    }

    #[test]
    fn test_reserved_bits_rejected() {
        assert_eq!(
            PublicHeader::parse(&[0x66, 0x00]).unwrap_err(),
            ProtocolError::InvalidInput("public flags reserved bits set")
        );
        assert_eq!(
            PublicHeader::parse(&[0xC0, 0x00]).unwrap_err(),
            ProtocolError::InvalidInput("public flags reserved bits set")
        );
    }

    #[test]
    fn test_short_input_rejected() {
        assert!(matches!(
            PublicHeader::parse(&[]).unwrap_err(),
            ProtocolError::ShortInput(_)
        ));
        assert!(matches!(
            PublicHeader::parse(&[0x0c]).unwrap_err(),
            ProtocolError::ShortInput(_)
        ));
        // 48-bit seqnum announced, 4 bytes present.
        assert!(matches!(
            PublicHeader::parse(&[0x30, 0x0d, 0x0c, 0x0b, 0x0a]).unwrap_err(),
            ProtocolError::ShortInput(_)
        ));
    }

    #[test]
    fn test_public_reset_header_overrides_widths() {
        let data = [
            0x02, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0xFF, 0xFF,
        ];
        let (header, consumed) = PublicHeader::parse(&data).expect("parse should succeed");
        assert_eq!(consumed, 9);
        assert!(header.public_reset_flag());
        assert_eq!(header.connection_id(), 0x1122334455667788);
        assert_eq!(header.connection_id_width(), 8);
    }

    #[test]
    fn test_public_reset_header_serialize() {
        let mut header = PublicHeader::new();
        header.set_public_reset_flag(true);
        header.set_connection_id(0x1122334455667788);
        let mut buf = [0u8; 9];
        let written = header.serialize(&mut buf).expect("serialize should succeed");
        assert_eq!(written, 9);
        assert_eq!(
            buf,
            [0x0E, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
        );
    }

    #[test]
    fn test_public_reset_needs_nine_bytes() {
        assert!(matches!(
            PublicHeader::parse(&[0x02, 0x88, 0x77]).unwrap_err(),
            ProtocolError::ShortInput(_)
        ));
    }

    #[test]
    fn test_invalid_width_setters() {
        let mut header = PublicHeader::new();
        assert!(header.set_connection_id_width(2).is_err());
        assert!(header.set_sequence_number_width(3).is_err());
        assert!(header.set_connection_id_width(4).is_ok());
        assert!(header.set_sequence_number_width(6).is_ok());
    }

    #[test]
    fn test_serialize_buffer_too_small() {
        let mut header = PublicHeader::new();
        header.set_connection_id_width(8).expect("valid width");
        let mut buf = [0u8; 4];
        assert!(matches!(
            header.serialize(&mut buf).unwrap_err(),
            ProtocolError::BufferTooSmall(_)
        ));
    }
}
