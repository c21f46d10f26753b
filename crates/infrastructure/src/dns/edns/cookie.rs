//! Server cookie derivation (RFC 7873 §4.2, layout from RFC 9018 §4).
//!
//! ```text
//!  0               1               2               3
//! +---------------+-----------------------------------------------+
//! |    Version    |                   Reserved                    |
//! +---------------+-----------------------------------------------+
//! |                           Timestamp                           |
//! +---------------------------------------------------------------+
//! |                             Hash                              |
//! |                                                               |
//! +---------------------------------------------------------------+
//! ```
//!
//! Hash = first 8 bytes of HMAC-SHA256(secret, client cookie | version |
//! reserved | timestamp | client IP).

use quarry_dns_domain::DomainError;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use std::net::IpAddr;
use subtle::ConstantTimeEq;

pub const SERVER_COOKIE_LEN: usize = 16;

const COOKIE_VERSION: u8 = 1;
const SECRET_LEN: usize = 32;
const MAX_COOKIE_AGE_SECS: u32 = 3600;
const MAX_CLOCK_SKEW_SECS: u32 = 300;

/// Outcome of checking the server cookie a client sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieStatus {
    /// Only a client cookie was present.
    ClientOnly,
    /// The server cookie was issued by this server for this client and is fresh.
    Valid,
    /// A server cookie was present but does not verify.
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerCookie([u8; SERVER_COOKIE_LEN]);

impl ServerCookie {
    pub fn as_bytes(&self) -> &[u8; SERVER_COOKIE_LEN] {
        &self.0
    }

    pub fn version(&self) -> u8 {
        self.0[0]
    }

    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[4], self.0[5], self.0[6], self.0[7]])
    }
}

#[derive(Clone)]
pub struct CookieSecret {
    key: hmac::Key,
}

impl CookieSecret {
    /// Random secret from the system CSPRNG.
    pub fn generate() -> Result<Self, DomainError> {
        let mut secret = [0u8; SECRET_LEN];
        SystemRandom::new()
            .fill(&mut secret)
            .map_err(|_| DomainError::ConfigError("failed to generate cookie secret".into()))?;
        Ok(Self::from_bytes(&secret))
    }

    pub fn from_bytes(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    pub fn derive(
        &self,
        client_cookie: &[u8; 8],
        client_ip: IpAddr,
        timestamp: u32,
    ) -> ServerCookie {
        let mut cookie = [0u8; SERVER_COOKIE_LEN];
        cookie[0] = COOKIE_VERSION;
        cookie[4..8].copy_from_slice(&timestamp.to_be_bytes());

        let mut ctx = hmac::Context::with_key(&self.key);
        ctx.update(client_cookie);
        ctx.update(&cookie[..8]);
        match client_ip {
            IpAddr::V4(v4) => ctx.update(&v4.octets()),
            IpAddr::V6(v6) => ctx.update(&v6.octets()),
        }
        let tag = ctx.sign();
        cookie[8..].copy_from_slice(&tag.as_ref()[..8]);

        ServerCookie(cookie)
    }

    pub fn verify(
        &self,
        client_cookie: &[u8; 8],
        server_cookie: &[u8],
        client_ip: IpAddr,
        now: u32,
    ) -> CookieStatus {
        if server_cookie.len() != SERVER_COOKIE_LEN || server_cookie[0] != COOKIE_VERSION {
            return CookieStatus::Invalid;
        }

        let timestamp = u32::from_be_bytes([
            server_cookie[4],
            server_cookie[5],
            server_cookie[6],
            server_cookie[7],
        ]);
        if timestamp > now.saturating_add(MAX_CLOCK_SKEW_SECS)
            || now > timestamp.saturating_add(MAX_COOKIE_AGE_SECS)
        {
            return CookieStatus::Invalid;
        }

        let expected = self.derive(client_cookie, client_ip, timestamp);
        if bool::from(expected.as_bytes()[..].ct_eq(server_cookie)) {
            CookieStatus::Valid
        } else {
            CookieStatus::Invalid
        }
    }
}

impl fmt::Debug for CookieSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CookieSecret(..)")
    }
}
