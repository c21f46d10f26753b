pub mod edns;
pub mod query;
pub mod question_codec;
pub mod server;
pub mod wire;

pub use edns::{CookieNegotiator, CookieSecret, CookieStatus, OptRecord, ServerCookie};
pub use query::Query;
pub use question_codec::{parse_questions, serialize_questions};
pub use server::{DispatchOutcome, QueryWorker, RequestDispatcher, RequestWorker};
pub use wire::WireCursor;
