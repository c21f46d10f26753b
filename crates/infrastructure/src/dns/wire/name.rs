use bytes::{BufMut, BytesMut};
use quarry_dns_domain::DomainError;

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_LEN: usize = 255;

/// Appends `name` in uncompressed wire form. A trailing dot is optional and
/// `""` or `"."` encode the root name.
///
/// Labels are written in presentation form: `\.` and `\\` stand for a literal
/// dot and backslash inside a label, and `\DDD` for any byte by its decimal
/// value.
pub fn encode_name(name: &str, out: &mut BytesMut) -> Result<(), DomainError> {
    let labels = split_labels(name)?;

    let mut wire_len = 1usize;
    for label in &labels {
        if label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "label longer than {} bytes in {:?}",
                MAX_LABEL_LEN, name
            )));
        }
        wire_len += label.len() + 1;
        if wire_len > MAX_NAME_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "name longer than {} bytes: {:?}",
                MAX_NAME_LEN, name
            )));
        }
    }

    for label in &labels {
        out.put_u8(label.len() as u8);
        out.put_slice(label);
    }
    out.put_u8(0);
    Ok(())
}

/// Appends one raw wire label to `name` in presentation form, the inverse of
/// the unescaping done by [`encode_name`].
pub fn push_escaped_label(name: &mut String, label: &[u8]) {
    for &byte in label {
        match byte {
            b'.' | b'\\' => {
                name.push('\\');
                name.push(byte as char);
            }
            0x21..=0x7E => name.push(byte as char),
            _ => {
                name.push('\\');
                name.push_str(&format!("{:03}", byte));
            }
        }
    }
}

fn split_labels(name: &str) -> Result<Vec<Vec<u8>>, DomainError> {
    if name == "." {
        return Ok(Vec::new());
    }

    let bytes = name.as_bytes();
    let mut labels = Vec::new();
    let mut label = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                if label.is_empty() {
                    return Err(DomainError::InvalidDomainName(format!(
                        "empty label in {:?}",
                        name
                    )));
                }
                labels.push(std::mem::take(&mut label));
                i += 1;
            }
            b'\\' => {
                let (byte, used) = unescape(&bytes[i + 1..]).ok_or_else(|| {
                    DomainError::InvalidDomainName(format!("bad escape in {:?}", name))
                })?;
                label.push(byte);
                i += 1 + used;
            }
            byte => {
                label.push(byte);
                i += 1;
            }
        }
    }

    if !label.is_empty() {
        labels.push(label);
    }
    Ok(labels)
}

/// Decodes the text after a backslash: `DDD` (decimal, at most 255) or a
/// single literal byte. Returns the byte and how many input bytes it used.
fn unescape(rest: &[u8]) -> Option<(u8, usize)> {
    match rest {
        [a, b, c, ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            let value = (a - b'0') as u16 * 100 + (b - b'0') as u16 * 10 + (c - b'0') as u16;
            u8::try_from(value).ok().map(|byte| (byte, 3))
        }
        [byte, ..] => Some((*byte, 1)),
        [] => None,
    }
}
