pub mod cmd;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod routing;
