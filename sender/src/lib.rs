pub mod config;
pub mod estimator;
pub mod logging;
pub mod receive;
pub mod shared;
pub mod supervisor;
pub mod transmit;
pub mod transport;
