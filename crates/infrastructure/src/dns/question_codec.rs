//! Question section codec (RFC 1035 §4.1.2).
//!
//! ```text
//!   0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
//! +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
//! /                     QNAME                     /
//! +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
//! |                     QTYPE                     |
//! +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
//! |                     QCLASS                    |
//! +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
//! ```

use super::wire::{encode_name, WireCursor};
use bytes::{BufMut, BytesMut};
use quarry_dns_domain::{DomainError, QuestionRecord, RecordType};

/// Smallest possible question: root name (1) + QTYPE (2) + QCLASS (2).
const MIN_QUESTION_LEN: usize = 5;

/// Parses `count` questions starting at `start`, each one beginning where the
/// previous ended.
///
/// Returns the questions in wire order together with the offset just past the
/// last one.
pub fn parse_questions(
    buf: &[u8],
    count: u16,
    start: usize,
) -> Result<(Vec<QuestionRecord>, usize), DomainError> {
    let mut cursor = WireCursor::at(buf, start);
    let capacity = (count as usize).min(cursor.remaining() / MIN_QUESTION_LEN);
    let mut questions = Vec::with_capacity(capacity);

    for _ in 0..count {
        let name = cursor.read_name()?;
        let qtype = cursor.read_u16()?;
        let qclass = cursor.read_u16()?;
        questions.push(QuestionRecord::new(name, RecordType::from_u16(qtype), qclass));
    }

    Ok((questions, cursor.position()))
}

/// Encodes `questions` back to wire form, in order, without name compression.
pub fn serialize_questions(questions: &[QuestionRecord]) -> Result<Vec<u8>, DomainError> {
    let mut out = BytesMut::with_capacity(questions.len() * 32);
    for question in questions {
        encode_name(question.name(), &mut out)?;
        out.put_u16(question.record_type().to_u16());
        out.put_u16(question.qclass());
    }
    Ok(out.to_vec())
}
