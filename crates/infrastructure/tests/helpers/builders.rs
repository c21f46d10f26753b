#![allow(dead_code)]

/// Builds raw DNS request datagrams.
pub struct QueryBuilder {
    id: u16,
    flags: u16,
    questions: Vec<(String, u16, u16)>,
    additional: Vec<u8>,
    additional_count: u16,
    question_count: Option<u16>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            id: 0x1234,
            flags: 0x0100,
            questions: Vec::new(),
            additional: Vec::new(),
            additional_count: 0,
            question_count: None,
        }
    }

    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn question(mut self, name: &str, qtype: u16, qclass: u16) -> Self {
        self.questions.push((name.to_string(), qtype, qclass));
        self
    }

    pub fn a_query(self, name: &str) -> Self {
        self.question(name, 1, 1)
    }

    /// Overrides QDCOUNT independently of the questions actually written.
    pub fn question_count(mut self, count: u16) -> Self {
        self.question_count = Some(count);
        self
    }

    /// OPT record with a 4096 byte payload size and the given options.
    pub fn opt(mut self, options: &[(u16, &[u8])]) -> Self {
        append_opt_record(&mut self.additional, 4096, options);
        self.additional_count += 1;
        self
    }

    pub fn cookie(self, cookie: &[u8]) -> Self {
        self.opt(&[(10, cookie)])
    }

    /// Raw bytes appended to the additional section, counted as `records`.
    pub fn raw_additional(mut self, bytes: &[u8], records: u16) -> Self {
        self.additional.extend_from_slice(bytes);
        self.additional_count += records;
        self
    }

    pub fn additional_count(mut self, count: u16) -> Self {
        self.additional_count = count;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let qdcount = self
            .question_count
            .unwrap_or(self.questions.len() as u16);

        let mut buf = Vec::with_capacity(512);
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        buf.extend_from_slice(&qdcount.to_be_bytes());
        buf.extend_from_slice(&[0x00, 0x00]); // ANCOUNT
        buf.extend_from_slice(&[0x00, 0x00]); // NSCOUNT
        buf.extend_from_slice(&self.additional_count.to_be_bytes());

        for (name, qtype, qclass) in &self.questions {
            append_name(&mut buf, name);
            buf.extend_from_slice(&qtype.to_be_bytes());
            buf.extend_from_slice(&qclass.to_be_bytes());
        }

        buf.extend_from_slice(&self.additional);
        buf
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn append_name(buf: &mut Vec<u8>, name: &str) {
    for label in name.split('.').filter(|l| !l.is_empty()) {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0x00); // root label
}

pub fn append_opt_record(buf: &mut Vec<u8>, payload_size: u16, options: &[(u16, &[u8])]) {
    let mut rdata = Vec::new();
    for (code, data) in options {
        rdata.extend_from_slice(&code.to_be_bytes());
        rdata.extend_from_slice(&(data.len() as u16).to_be_bytes());
        rdata.extend_from_slice(data);
    }

    buf.push(0x00); // NAME = root
    buf.extend_from_slice(&[0x00, 41]); // TYPE = OPT
    buf.extend_from_slice(&payload_size.to_be_bytes()); // CLASS = UDP payload size
    buf.push(0x00); // extended RCODE
    buf.push(0x00); // version
    buf.extend_from_slice(&[0x00, 0x00]); // flags
    buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    buf.extend_from_slice(&rdata);
}

/// Splits the COOKIE option out of a reply's OPT record, if there is one.
pub fn reply_cookie(reply: &[u8], opt_start: usize) -> Option<Vec<u8>> {
    let rdlen = u16::from_be_bytes([reply[opt_start + 9], reply[opt_start + 10]]) as usize;
    let rdata = &reply[opt_start + 11..opt_start + 11 + rdlen];
    let mut pos = 0;
    while pos + 4 <= rdata.len() {
        let code = u16::from_be_bytes([rdata[pos], rdata[pos + 1]]);
        let len = u16::from_be_bytes([rdata[pos + 2], rdata[pos + 3]]) as usize;
        if code == 10 {
            return Some(rdata[pos + 4..pos + 4 + len].to_vec());
        }
        pos += 4 + len;
    }
    None
}

pub const CLIENT_COOKIE: [u8; 8] = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02, 0x03, 0x04];
