use crate::RecordType;
use std::fmt;
use std::sync::Arc;

/// Both top bits of QCLASS set marks a multicast-DNS "QU" question
/// (unicast reply requested). A lone top bit does not count.
pub const QU_MASK: u16 = 0xC000;

/// One entry of a message's question section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    name: Arc<str>,
    record_type: RecordType,
    qclass: u16,
    qu: bool,
}

impl QuestionRecord {
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType, qclass: u16) -> Self {
        Self {
            name: name.into(),
            record_type,
            qclass,
            qu: qclass & QU_MASK == QU_MASK,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Raw 16-bit class value, including any mDNS flag bits.
    pub fn qclass(&self) -> u16 {
        self.qclass
    }

    pub fn is_qu(&self) -> bool {
        self.qu
    }
}

impl fmt::Display for QuestionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {} Type: {} Class: {}",
            self.name, self.record_type, self.qclass
        )
    }
}
