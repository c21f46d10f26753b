use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// When false, COOKIE options are ignored and the server answers as if
    /// none had been sent.
    #[serde(default = "default_true")]
    pub cookies_enabled: bool,

    #[serde(default)]
    pub malformed_policy: MalformedPolicy,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            cookies_enabled: true,
            malformed_policy: MalformedPolicy::default(),
        }
    }
}

/// What to send back when a datagram cannot be parsed.
///
/// Cookie validation failures are not covered here: those always produce a
/// FORMERR reply.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// No reply at all.
    #[default]
    Drop,

    /// A header-only FORMERR reply echoing the request id.
    FormErr,
}

impl MalformedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::FormErr => "formerr",
        }
    }
}

fn default_true() -> bool {
    true
}
