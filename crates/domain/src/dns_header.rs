use crate::{DomainError, ResponseCode};
use std::fmt;

/// Length of the fixed DNS message header (RFC 1035 §4.1.1).
pub const HEADER_LEN: usize = 12;

/// Decoded fixed header of a DNS message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub id: u16,
    pub is_response: bool,
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub z: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
    response_code: ResponseCode,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl MessageHeader {
    /// Empty header with the given id: query, opcode 0, no flags, no records.
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self, DomainError> {
        if buf.len() < HEADER_LEN {
            return Err(DomainError::truncated(0, HEADER_LEN, buf.len()));
        }

        let flags_hi = buf[2];
        let flags_lo = buf[3];

        Ok(Self {
            id: u16::from_be_bytes([buf[0], buf[1]]),
            is_response: flags_hi & 0x80 != 0,
            opcode: (flags_hi >> 3) & 0x0F,
            authoritative: flags_hi & 0x04 != 0,
            truncated: flags_hi & 0x02 != 0,
            recursion_desired: flags_hi & 0x01 != 0,
            recursion_available: flags_lo & 0x80 != 0,
            z: flags_lo & 0x40 != 0,
            authentic_data: flags_lo & 0x20 != 0,
            checking_disabled: flags_lo & 0x10 != 0,
            response_code: ResponseCode::from_u8(flags_lo & 0x0F),
            question_count: u16::from_be_bytes([buf[4], buf[5]]),
            answer_count: u16::from_be_bytes([buf[6], buf[7]]),
            authority_count: u16::from_be_bytes([buf[8], buf[9]]),
            additional_count: u16::from_be_bytes([buf[10], buf[11]]),
        })
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut flags_hi = (self.opcode & 0x0F) << 3;
        if self.is_response {
            flags_hi |= 0x80;
        }
        if self.authoritative {
            flags_hi |= 0x04;
        }
        if self.truncated {
            flags_hi |= 0x02;
        }
        if self.recursion_desired {
            flags_hi |= 0x01;
        }

        let mut flags_lo = self.response_code.to_u8();
        if self.recursion_available {
            flags_lo |= 0x80;
        }
        if self.z {
            flags_lo |= 0x40;
        }
        if self.authentic_data {
            flags_lo |= 0x20;
        }
        if self.checking_disabled {
            flags_lo |= 0x10;
        }

        let mut out = [0u8; HEADER_LEN];
        out[0..2].copy_from_slice(&self.id.to_be_bytes());
        out[2] = flags_hi;
        out[3] = flags_lo;
        out[4..6].copy_from_slice(&self.question_count.to_be_bytes());
        out[6..8].copy_from_slice(&self.answer_count.to_be_bytes());
        out[8..10].copy_from_slice(&self.authority_count.to_be_bytes());
        out[10..12].copy_from_slice(&self.additional_count.to_be_bytes());
        out
    }

    pub fn response_code(&self) -> ResponseCode {
        self.response_code
    }

    pub fn set_response_code(&mut self, code: ResponseCode) {
        self.response_code = code;
    }

    /// Header for a reply to this message: same id, opcode and RD bit, QR set,
    /// every other flag cleared and all section counts zeroed.
    pub fn reply_template(&self) -> Self {
        Self {
            id: self.id,
            is_response: true,
            opcode: self.opcode,
            recursion_desired: self.recursion_desired,
            response_code: self.response_code,
            ..Self::default()
        }
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} qr={} opcode={} aa={} tc={} rd={} ra={} rcode={} qd={} an={} ns={} ar={}",
            self.id,
            self.is_response as u8,
            self.opcode,
            self.authoritative as u8,
            self.truncated as u8,
            self.recursion_desired as u8,
            self.recursion_available as u8,
            self.response_code,
            self.question_count,
            self.answer_count,
            self.authority_count,
            self.additional_count,
        )
    }
}
