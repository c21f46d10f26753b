use super::name::{push_escaped_label, MAX_NAME_LEN};
use quarry_dns_domain::DomainError;

/// Bounds-checked reader over a received DNS message.
///
/// Every read either returns data that lies entirely inside the buffer or
/// fails with [`DomainError::TruncatedMessage`]; the position only advances
/// on success.
#[derive(Debug, Clone)]
pub struct WireCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Cursor positioned at `pos`. A position past the end is allowed; the
    /// first read from it fails.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes from the current position to the end of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        self.buf.get(self.pos..).unwrap_or_default()
    }

    fn check(&self, at: usize, needed: usize) -> Result<(), DomainError> {
        match at.checked_add(needed) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(DomainError::truncated(at, needed, self.buf.len())),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, DomainError> {
        self.check(self.pos, 1)?;
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16, DomainError> {
        self.check(self.pos, 2)?;
        let value = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32, DomainError> {
        self.check(self.pos, 4)?;
        let b = &self.buf[self.pos..self.pos + 4];
        let value = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], DomainError> {
        self.check(self.pos, len)?;
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Decodes a possibly compressed domain name (RFC 1035 §4.1.4).
    ///
    /// Labels are joined with `.` and the root label is dropped, so the root
    /// name decodes to `""`. Letter case is preserved. Dots, backslashes and
    /// bytes outside printable ASCII inside a label are escaped (`\.`, `\\`,
    /// `\DDD`), so [`encode_name`](super::encode_name) restores the exact
    /// wire bytes. Afterwards the cursor
    /// sits just past the name as it appears at the starting position (after
    /// the first compression pointer, if any).
    ///
    /// Every pointer must target an offset before the start of the run of
    /// labels it terminates, so pointer chains strictly move backwards and
    /// always end.
    pub fn read_name(&mut self) -> Result<String, DomainError> {
        let mut name = String::new();
        let mut pos = self.pos;
        let mut segment_start = self.pos;
        let mut resume_at: Option<usize> = None;
        let mut wire_len = 1usize;

        loop {
            self.check(pos, 1)?;
            let len_byte = self.buf[pos];

            match len_byte & 0xC0 {
                0x00 => {
                    let label_len = len_byte as usize;
                    if label_len == 0 {
                        pos += 1;
                        break;
                    }
                    self.check(pos + 1, label_len)?;

                    wire_len += label_len + 1;
                    if wire_len > MAX_NAME_LEN {
                        return Err(DomainError::InvalidLabel {
                            offset: pos,
                            reason: "name exceeds 255 bytes",
                        });
                    }

                    if !name.is_empty() {
                        name.push('.');
                    }
                    push_escaped_label(&mut name, &self.buf[pos + 1..pos + 1 + label_len]);
                    pos += 1 + label_len;
                }
                0xC0 => {
                    self.check(pos, 2)?;
                    let target = (((len_byte & 0x3F) as usize) << 8) | self.buf[pos + 1] as usize;
                    if target >= segment_start {
                        return Err(DomainError::CompressionLoop { offset: pos });
                    }
                    if resume_at.is_none() {
                        resume_at = Some(pos + 2);
                    }
                    segment_start = target;
                    pos = target;
                }
                _ => {
                    return Err(DomainError::InvalidLabel {
                        offset: pos,
                        reason: "extended label types are not supported",
                    });
                }
            }
        }

        self.pos = resume_at.unwrap_or(pos);
        Ok(name)
    }
}
