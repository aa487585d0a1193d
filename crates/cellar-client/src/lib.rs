// cellar-client: async HTTP client for the cellar accounts and bottles API

pub mod action;
pub mod client;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod model;
pub mod transport;

pub use action::Action;
pub use client::CellarClient;
pub use config::ConnectionConfig;
pub use descriptor::{HttpMethod, OverrideConfig, RequestDescriptor, ResponseFormat};
pub use error::{CellarError, Result};
pub use transport::{ApiResponse, ReqwestTransport, Transport};
