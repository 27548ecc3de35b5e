//! HTTP surface: one automation run per request.

pub mod error;
pub mod perform;
pub mod request;
pub mod response;
pub mod server;

pub use {
    error::GatewayError,
    perform::PerformService,
    request::AutomationRequest,
    response::AutomationResponse,
    server::{router, serve},
};
