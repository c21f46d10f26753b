mod cursor;
mod name;

pub use cursor::WireCursor;
pub use name::{encode_name, push_escaped_label, MAX_LABEL_LEN, MAX_NAME_LEN};
