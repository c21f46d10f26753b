mod cookie;
mod negotiator;
mod opt;

pub use cookie::{CookieSecret, CookieStatus, ServerCookie, SERVER_COOKIE_LEN};
pub use negotiator::CookieNegotiator;
pub use opt::{EdnsOption, OptRecord, CLIENT_COOKIE_LEN, COOKIE_OPTION_CODE, OPT_RECORD_TYPE};
