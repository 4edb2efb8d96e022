// Hato image gateway library
//
// Fetches an image from LINE, Chatwork or a direct URL, normalizes it and
// returns it as a JPEG data URI inside a uniform JSON response.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod image_optimizer;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use config::{Config, Secrets};
pub use error::GatewayError;
pub use pipeline::Gateway;
pub use request::ImageRequest;
pub use response::GatewayResponse;
