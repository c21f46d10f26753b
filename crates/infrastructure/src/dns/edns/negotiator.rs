use super::cookie::CookieSecret;
use super::opt::OptRecord;
use quarry_dns_domain::{DomainError, MessageHeader, ResponseCode};
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Applies DNS Cookie processing (RFC 7873) to the additional section of a
/// request.
///
/// | Additional section                          | Result                               |
/// |---------------------------------------------|--------------------------------------|
/// | empty                                       | `Ok(None)`, header untouched         |
/// | more than one record                        | `Err(MultipleOptRecords)`            |
/// | one record that is not a valid OPT          | `Err(InvalidOptRecord)` / truncation |
/// | OPT without COOKIE, or with a malformed one | `Ok(Some(opt))`, RCODE = FORMERR     |
/// | OPT with a well-formed COOKIE               | `Ok(Some(opt))` with a server cookie |
#[derive(Debug, Clone)]
pub struct CookieNegotiator {
    secret: CookieSecret,
}

impl CookieNegotiator {
    pub fn new(secret: CookieSecret) -> Self {
        Self { secret }
    }

    pub fn generate() -> Result<Self, DomainError> {
        Ok(Self::new(CookieSecret::generate()?))
    }

    pub fn secret(&self) -> &CookieSecret {
        &self.secret
    }

    pub fn process(
        &self,
        header: &mut MessageHeader,
        additional_count: u16,
        remaining: &[u8],
        client_ip: IpAddr,
    ) -> Result<Option<OptRecord>, DomainError> {
        self.process_at(header, additional_count, remaining, client_ip, unix_now())
    }

    /// [`CookieNegotiator::process`] with an explicit clock, in seconds since
    /// the Unix epoch.
    pub fn process_at(
        &self,
        header: &mut MessageHeader,
        additional_count: u16,
        remaining: &[u8],
        client_ip: IpAddr,
        now: u32,
    ) -> Result<Option<OptRecord>, DomainError> {
        match additional_count {
            0 => return Ok(None),
            1 => {}
            n => return Err(DomainError::MultipleOptRecords(n)),
        }

        let mut opt = OptRecord::decode(remaining)?;

        if !opt.has_cookie() || opt.has_form_err() {
            debug!(
                id = header.id,
                client = %client_ip,
                has_cookie = opt.has_cookie(),
                "Missing or malformed COOKIE option, answering FORMERR"
            );
            header.set_response_code(ResponseCode::FormErr);
        } else {
            opt.create_server_cookie(&self.secret, client_ip, header, now);
        }

        Ok(Some(opt))
    }
}

fn unix_now() -> u32 {
    unix_seconds(SystemTime::now())
}

/// Saturates at `u32::MAX`; times before the epoch map to 0.
fn unix_seconds(time: SystemTime) -> u32 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or_default()
}
