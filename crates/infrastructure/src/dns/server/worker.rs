use crate::dns::edns::CookieNegotiator;
use crate::dns::query::Query;
use async_trait::async_trait;
use quarry_dns_domain::config::DnsConfig;
use quarry_dns_domain::{DomainError, MalformedPolicy, MessageHeader, ResponseCode, HEADER_LEN};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::debug;

const DEFAULT_UDP_PAYLOAD: u16 = 512;

/// Processes one received datagram and sends whatever reply it produces.
#[async_trait]
pub trait RequestWorker: Send + Sync + 'static {
    async fn process(
        &self,
        datagram: Vec<u8>,
        peer: SocketAddr,
        socket: Arc<UdpSocket>,
    ) -> Result<(), DomainError>;
}

/// Parses the request, negotiates DNS cookies and answers with the header,
/// the mirrored question section and, when present, the OPT record.
#[derive(Debug, Clone)]
pub struct QueryWorker {
    negotiator: Option<CookieNegotiator>,
    malformed_policy: MalformedPolicy,
    udp_payload_size: u16,
}

impl QueryWorker {
    pub fn new(negotiator: Option<CookieNegotiator>, malformed_policy: MalformedPolicy) -> Self {
        Self {
            negotiator,
            malformed_policy,
            udp_payload_size: DEFAULT_UDP_PAYLOAD,
        }
    }

    pub fn from_config(config: &DnsConfig) -> Result<Self, DomainError> {
        let negotiator = if config.cookies_enabled {
            Some(CookieNegotiator::generate()?)
        } else {
            None
        };
        Ok(Self::new(negotiator, config.malformed_policy))
    }

    /// UDP payload size advertised in reply OPT records.
    pub fn with_udp_payload_size(mut self, size: u16) -> Self {
        self.udp_payload_size = size.max(DEFAULT_UDP_PAYLOAD);
        self
    }

    /// Builds the reply for `datagram`, or `None` when nothing should be sent.
    pub fn respond(
        &self,
        datagram: Vec<u8>,
        client_ip: IpAddr,
    ) -> Result<Option<Vec<u8>>, DomainError> {
        if datagram.get(2).is_some_and(|flags| flags & 0x80 != 0) {
            debug!(client = %client_ip, "Ignoring datagram with QR bit set");
            return Ok(None);
        }

        let mut request_start = [0u8; HEADER_LEN];
        let prefix_len = datagram.len().min(HEADER_LEN);
        request_start[..prefix_len].copy_from_slice(&datagram[..prefix_len]);

        match Query::parse(datagram, client_ip, self.negotiator.as_ref()) {
            Ok(query) => self.build_reply(&query).map(Some),
            Err(e) if e.is_malformed_input() => {
                debug!(
                    client = %client_ip,
                    error = %e,
                    policy = self.malformed_policy.as_str(),
                    "Malformed request"
                );
                Ok(match self.malformed_policy {
                    MalformedPolicy::Drop => None,
                    MalformedPolicy::FormErr => formerr_reply(&request_start[..prefix_len]),
                })
            }
            Err(e) => Err(e),
        }
    }

    fn build_reply(&self, query: &Query) -> Result<Vec<u8>, DomainError> {
        let mut header = query.header().reply_template();

        if query.is_cookie_only() {
            // Cookie-only queries (RFC 7873 §5.4) are not supported.
            debug!(id = header.id, "Cookie-only query, answering NOTIMP");
            header.set_response_code(ResponseCode::NotImp);
        }

        let questions = query.build_response_questions()?;
        let opt = query
            .opt()
            .map(|opt| opt.encode_reply(self.udp_payload_size));

        header.question_count = query.questions().len() as u16;
        header.additional_count = opt.is_some() as u16;

        let limit = query
            .opt()
            .map_or(DEFAULT_UDP_PAYLOAD, |opt| opt.udp_payload_size()) as usize;
        let reply_len = HEADER_LEN + questions.len() + opt.as_ref().map_or(0, Vec::len);

        if reply_len > limit {
            header.truncated = true;
            header.question_count = 0;
            header.additional_count = 0;
            return Ok(header.encode().to_vec());
        }

        let mut reply = Vec::with_capacity(reply_len);
        reply.extend_from_slice(&header.encode());
        reply.extend_from_slice(&questions);
        if let Some(opt) = opt {
            reply.extend_from_slice(&opt);
        }
        Ok(reply)
    }
}

#[async_trait]
impl RequestWorker for QueryWorker {
    async fn process(
        &self,
        datagram: Vec<u8>,
        peer: SocketAddr,
        socket: Arc<UdpSocket>,
    ) -> Result<(), DomainError> {
        if let Some(reply) = self.respond(datagram, peer.ip())? {
            socket.send_to(&reply, peer).await?;
        }
        Ok(())
    }
}

/// Header-only FORMERR reply. Needs at least the request id.
fn formerr_reply(request_start: &[u8]) -> Option<Vec<u8>> {
    let mut header = match MessageHeader::decode(request_start) {
        Ok(request) => request.reply_template(),
        Err(_) if request_start.len() >= 2 => {
            let mut header =
                MessageHeader::new(u16::from_be_bytes([request_start[0], request_start[1]]));
            header.is_response = true;
            header
        }
        Err(_) => return None,
    };
    header.set_response_code(ResponseCode::FormErr);
    Some(header.encode().to_vec())
}
