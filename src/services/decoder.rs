use crate::config::{Environment, GatewayConfig};
use crate::crypto::{constant_time_eq, sha256_base64, GatewayCipher};
use crate::domain::callback::{CallbackPayload, CallbackRecord};
use crate::error::GatewayError;

/// Verifies and decrypts gateway callbacks for one merchant.
#[derive(Clone)]
pub struct ResponseDecoder {
    merchant_id: String,
    encryption_key: String,
    cipher: GatewayCipher,
}

impl ResponseDecoder {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let cipher = GatewayCipher::from_base64_key(&config.encryption_key)?;

        Ok(Self {
            merchant_id: config.merchant_id.clone(),
            encryption_key: config.encryption_key.clone(),
            cipher,
        })
    }

    pub fn decode_with(
        payload: &CallbackPayload,
        merchant_id: &str,
        encryption_key: &str,
    ) -> Result<CallbackRecord, GatewayError> {
        let config = GatewayConfig::new(merchant_id, encryption_key, Environment::default());
        Self::new(&config)?.decode(payload)
    }

    /// `base64(sha256(merchant_id + encrypted_response + encryption_key))`.
    ///
    /// Plain concatenation hashed to raw bytes. This is not the scheme used
    /// for outbound requests and the two must stay separate.
    pub fn expected_hash(&self, encrypted_response: &str) -> String {
        sha256_base64(&format!(
            "{}{}{}",
            self.merchant_id, encrypted_response, self.encryption_key
        ))
    }

    /// Checks the hash before anything is decrypted. A mismatch stops
    /// processing; the response must not be trusted.
    pub fn decode(&self, payload: &CallbackPayload) -> Result<CallbackRecord, GatewayError> {
        let encrypted_response = required(payload.encrypted_response.as_deref(), "encrypted_response")?;
        let hash = required(payload.hash.as_deref(), "hash")?;

        let expected = self.expected_hash(encrypted_response);
        if !constant_time_eq(expected.as_bytes(), hash.trim().as_bytes()) {
            tracing::warn!("callback hash mismatch, discarding response");
            return Err(GatewayError::HashMismatch);
        }

        let plaintext = self.cipher.decrypt_from_base64(encrypted_response).map_err(|err| {
            tracing::warn!(error = %err, "verified callback could not be decrypted");
            err
        })?;

        let record = CallbackRecord::from_plaintext(&plaintext);
        tracing::info!(
            order_no = %record.order_no,
            status = %record.status,
            "decoded gateway callback"
        );

        Ok(record)
    }
}

impl std::fmt::Debug for ResponseDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseDecoder")
            .field("merchant_id", &crate::utils::sanitize::mask_value(&self.merchant_id))
            .field("cipher", &self.cipher)
            .finish()
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, GatewayError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => {
            tracing::warn!(field, "callback is missing a required field");
            Err(GatewayError::MalformedCallback(format!("missing {}", field)))
        }
    }
}
