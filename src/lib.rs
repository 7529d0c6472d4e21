pub mod assignment;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod server;
pub mod shutdown;
