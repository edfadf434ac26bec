pub mod decorated;
pub mod error;
pub mod req_consumer;
pub mod request;
pub mod response;
