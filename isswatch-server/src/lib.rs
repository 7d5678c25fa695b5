pub mod config;
pub mod connection;
pub mod enricher;
pub mod error;
pub mod http;
pub mod logging;
pub mod server;
pub mod snapshot;
pub mod stream;
pub mod upstream;

pub use error::TrackerError;
