mod dispatcher;
mod socket;
mod worker;

pub use dispatcher::{DispatchOutcome, RequestDispatcher};
pub use socket::create_udp_socket;
pub use worker::{QueryWorker, RequestWorker};
