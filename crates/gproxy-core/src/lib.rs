pub mod admission;
pub mod bootstrap;
pub mod catalog;
pub mod metering;
pub mod proxy_engine;
pub mod session;
pub mod state;
pub mod upstream_client;
