pub mod decoder;
pub mod encoder;

pub use decoder::ResponseDecoder;
pub use encoder::{EncryptedPayload, RequestEncoder};
