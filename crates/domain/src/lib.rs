//! Quarry DNS Domain Layer
pub mod config;
pub mod dns_header;
pub mod dns_question;
pub mod dns_record;
pub mod errors;
pub mod response_code;

pub use config::{CliOverrides, Config, DispatcherConfig, ListenerKind, MalformedPolicy};
pub use dns_header::{MessageHeader, HEADER_LEN};
pub use dns_question::{QuestionRecord, QU_MASK};
pub use dns_record::RecordType;
pub use errors::DomainError;
pub use response_code::ResponseCode;
