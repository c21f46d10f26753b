use super::edns::{CookieNegotiator, OptRecord};
use super::question_codec::{parse_questions, serialize_questions};
use quarry_dns_domain::{DomainError, MessageHeader, QuestionRecord, ResponseCode, HEADER_LEN};
use std::fmt;
use std::net::IpAddr;

/// A received request, parsed once from the datagram that carried it.
#[derive(Debug, Clone)]
pub struct Query {
    header: MessageHeader,
    buffer: Vec<u8>,
    questions: Vec<QuestionRecord>,
    opt: Option<OptRecord>,
}

impl Query {
    /// Parses the header and question section of `buffer`, then runs cookie
    /// processing over the additional section when a negotiator is given.
    ///
    /// Without a negotiator the additional section is not looked at, so
    /// COOKIE options are ignored entirely.
    pub fn parse(
        buffer: Vec<u8>,
        client_ip: IpAddr,
        negotiator: Option<&CookieNegotiator>,
    ) -> Result<Self, DomainError> {
        let mut header = MessageHeader::decode(&buffer)?;
        // RCODE means nothing in a request; the field is reused for the reply.
        header.set_response_code(ResponseCode::NoError);
        let (questions, question_end) =
            parse_questions(&buffer, header.question_count, HEADER_LEN)?;

        let opt = match negotiator {
            Some(negotiator) => {
                let additional_count = header.additional_count;
                negotiator.process(
                    &mut header,
                    additional_count,
                    &buffer[question_end..],
                    client_ip,
                )?
            }
            None => None,
        };

        Ok(Self {
            header,
            buffer,
            questions,
            opt,
        })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn opt(&self) -> Option<&OptRecord> {
        self.opt.as_ref()
    }

    /// An empty question section with a usable COOKIE option: the RFC 7873
    /// §5.4 cookie-only query.
    pub fn is_cookie_only(&self) -> bool {
        self.questions.is_empty()
            && self
                .opt
                .as_ref()
                .is_some_and(|opt| opt.response_cookie().is_some())
    }

    /// Question section for the reply, mirroring the request.
    pub fn build_response_questions(&self) -> Result<Vec<u8>, DomainError> {
        serialize_questions(&self.questions)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        for question in &self.questions {
            write!(f, "\n{}", question)?;
        }
        Ok(())
    }
}
