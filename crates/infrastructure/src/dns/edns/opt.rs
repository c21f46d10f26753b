//! EDNS(0) OPT pseudo-record (RFC 6891 §6.1.2).

use super::cookie::{CookieSecret, CookieStatus, ServerCookie};
use crate::dns::wire::WireCursor;
use bytes::{BufMut, BytesMut};
use quarry_dns_domain::{DomainError, MessageHeader};
use std::net::IpAddr;
use tracing::trace;

pub const OPT_RECORD_TYPE: u16 = 41;
pub const COOKIE_OPTION_CODE: u16 = 10;
pub const CLIENT_COOKIE_LEN: usize = 8;

const MIN_SERVER_COOKIE_LEN: usize = 8;
const MAX_SERVER_COOKIE_LEN: usize = 32;
const MIN_UDP_PAYLOAD: u16 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CookieField {
    Absent,
    Malformed,
    Present {
        client: [u8; CLIENT_COOKIE_LEN],
        server: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone)]
pub struct OptRecord {
    udp_payload_size: u16,
    extended_rcode: u8,
    version: u8,
    dnssec_ok: bool,
    /// Every option except COOKIE, in wire order.
    options: Vec<EdnsOption>,
    cookie: CookieField,
    response_cookie: Option<ServerCookie>,
    cookie_status: Option<CookieStatus>,
}

impl OptRecord {
    /// Decodes a single OPT record from the start of `buf`.
    ///
    /// Fails when the record is cut short, when it is some other record type,
    /// or when its option list is not well framed. A COOKIE option with a bad
    /// length is not an error here; see [`OptRecord::has_form_err`].
    pub fn decode(buf: &[u8]) -> Result<Self, DomainError> {
        let mut cursor = WireCursor::new(buf);

        if cursor.read_u8()? != 0 {
            return Err(DomainError::InvalidOptRecord(
                "owner name must be the root".into(),
            ));
        }
        let rr_type = cursor.read_u16()?;
        if rr_type != OPT_RECORD_TYPE {
            return Err(DomainError::InvalidOptRecord(format!(
                "expected type {}, found {}",
                OPT_RECORD_TYPE, rr_type
            )));
        }
        let udp_payload_size = cursor.read_u16()?;
        let extended_rcode = cursor.read_u8()?;
        let version = cursor.read_u8()?;
        let flags = cursor.read_u16()?;
        let rdlen = cursor.read_u16()? as usize;
        let rdata = cursor.read_slice(rdlen)?;

        let mut options = Vec::new();
        let mut cookie = CookieField::Absent;
        let mut rdata = WireCursor::new(rdata);

        while !rdata.is_empty() {
            let (code, data) = read_option(&mut rdata)?;
            if code == COOKIE_OPTION_CODE {
                cookie = match cookie {
                    CookieField::Absent => parse_cookie(data),
                    _ => CookieField::Malformed,
                };
            } else {
                options.push(EdnsOption {
                    code,
                    data: data.to_vec(),
                });
            }
        }

        Ok(Self {
            udp_payload_size,
            extended_rcode,
            version,
            dnssec_ok: flags & 0x8000 != 0,
            options,
            cookie,
            response_cookie: None,
            cookie_status: None,
        })
    }

    /// Advertised UDP payload size, never below 512.
    pub fn udp_payload_size(&self) -> u16 {
        self.udp_payload_size.max(MIN_UDP_PAYLOAD)
    }

    pub fn extended_rcode(&self) -> u8 {
        self.extended_rcode
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn dnssec_ok(&self) -> bool {
        self.dnssec_ok
    }

    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    /// True when a COOKIE option was present, well formed or not.
    pub fn has_cookie(&self) -> bool {
        !matches!(self.cookie, CookieField::Absent)
    }

    /// True when the COOKIE option is present but structurally invalid
    /// (RFC 7873 §5.2.2), or appears more than once.
    pub fn has_form_err(&self) -> bool {
        matches!(self.cookie, CookieField::Malformed)
    }

    pub fn client_cookie(&self) -> Option<&[u8; CLIENT_COOKIE_LEN]> {
        match &self.cookie {
            CookieField::Present { client, .. } => Some(client),
            _ => None,
        }
    }

    pub fn server_cookie(&self) -> Option<&[u8]> {
        match &self.cookie {
            CookieField::Present {
                server: Some(server),
                ..
            } => Some(server),
            _ => None,
        }
    }

    /// Server cookie to send back, once one has been created.
    pub fn response_cookie(&self) -> Option<&ServerCookie> {
        self.response_cookie.as_ref()
    }

    pub fn cookie_status(&self) -> Option<CookieStatus> {
        self.cookie_status
    }

    /// Checks any server cookie the client echoed and attaches a fresh one
    /// bound to `client_ip`. Does nothing without a well-formed COOKIE option.
    pub fn create_server_cookie(
        &mut self,
        secret: &CookieSecret,
        client_ip: IpAddr,
        header: &MessageHeader,
        now: u32,
    ) -> Option<&ServerCookie> {
        let client = *self.client_cookie()?;

        let status = match self.server_cookie() {
            Some(server) => secret.verify(&client, server, client_ip, now),
            None => CookieStatus::ClientOnly,
        };
        trace!(id = header.id, client = %client_ip, ?status, "Server cookie checked");

        self.cookie_status = Some(status);
        self.response_cookie = Some(secret.derive(&client, client_ip, now));
        self.response_cookie.as_ref()
    }

    /// OPT record for the reply: version 0, no flags, and a COOKIE option
    /// when a server cookie was created.
    pub fn encode_reply(&self, udp_payload_size: u16) -> Vec<u8> {
        let mut rdata = BytesMut::new();
        if let (Some(client), Some(server)) = (self.client_cookie(), &self.response_cookie) {
            let server = server.as_bytes();
            rdata.put_u16(COOKIE_OPTION_CODE);
            rdata.put_u16((client.len() + server.len()) as u16);
            rdata.put_slice(client);
            rdata.put_slice(server);
        }

        let mut out = BytesMut::with_capacity(11 + rdata.len());
        out.put_u8(0);
        out.put_u16(OPT_RECORD_TYPE);
        out.put_u16(udp_payload_size.max(MIN_UDP_PAYLOAD));
        out.put_u8(0);
        out.put_u8(0);
        out.put_u16(0);
        out.put_u16(rdata.len() as u16);
        out.put_slice(&rdata);
        out.to_vec()
    }
}

fn read_option<'a>(rdata: &mut WireCursor<'a>) -> Result<(u16, &'a [u8]), DomainError> {
    let framed = |_| DomainError::InvalidOptRecord("option runs past the record data".into());
    let code = rdata.read_u16().map_err(framed)?;
    let len = rdata.read_u16().map_err(framed)? as usize;
    let data = rdata.read_slice(len).map_err(framed)?;
    Ok((code, data))
}

fn parse_cookie(data: &[u8]) -> CookieField {
    let server_len = data.len().saturating_sub(CLIENT_COOKIE_LEN);
    let well_formed = data.len() == CLIENT_COOKIE_LEN
        || (MIN_SERVER_COOKIE_LEN..=MAX_SERVER_COOKIE_LEN).contains(&server_len);
    if !well_formed {
        return CookieField::Malformed;
    }

    let mut client = [0u8; CLIENT_COOKIE_LEN];
    client.copy_from_slice(&data[..CLIENT_COOKIE_LEN]);
    let server = (data.len() > CLIENT_COOKIE_LEN).then(|| data[CLIENT_COOKIE_LEN..].to_vec());
    CookieField::Present { client, server }
}
