pub mod cli;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod services;
pub mod utils;
pub mod validation;

pub use config::{Environment, GatewayConfig};
pub use domain::callback::{CallbackPayload, CallbackRecord};
pub use domain::order::OrderData;
pub use error::GatewayError;
pub use services::{EncryptedPayload, RequestEncoder, ResponseDecoder};
