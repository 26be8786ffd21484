pub mod config;
pub mod framing;
pub mod logging;
pub mod mailbox;
pub mod protocol;
pub mod server;
