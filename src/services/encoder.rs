use serde::{Deserialize, Serialize};

use crate::config::{Environment, GatewayConfig};
use crate::crypto::{sha256_hex, GatewayCipher};
use crate::domain::order::OrderData;
use crate::error::GatewayError;
use crate::validation::{validate_no_delimiters, validate_required};

/// The three form fields posted to the gateway, plus where to post them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub merchant_id: String,
    pub encrypted_request: String,
    pub encrypted_hash: String,
    pub post_url: String,
}

impl EncryptedPayload {
    /// Field names expected by the gateway's checkout form.
    pub fn form_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("me_id", self.merchant_id.as_str()),
            ("merchant_request", self.encrypted_request.as_str()),
            ("hash", self.encrypted_hash.as_str()),
        ]
    }
}

/// Builds encrypted checkout requests for one merchant.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    merchant_id: String,
    cipher: GatewayCipher,
    environment: Environment,
    post_url: String,
}

impl RequestEncoder {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let cipher = GatewayCipher::from_base64_key(&config.encryption_key)?;
        // the merchant id lands in both the message and the hash input
        validate_required("merchant_id", &config.merchant_id)?;
        validate_no_delimiters("merchant_id", &config.merchant_id)?;

        Ok(Self {
            merchant_id: config.merchant_id.clone(),
            cipher,
            environment: config.environment,
            post_url: config.post_url().to_string(),
        })
    }

    /// One-shot form for callers that hold the credentials per request.
    pub fn encode_with(
        order: &OrderData,
        merchant_id: &str,
        encryption_key: &str,
        environment: Environment,
    ) -> Result<EncryptedPayload, GatewayError> {
        let config = GatewayConfig::new(merchant_id, encryption_key, environment);
        Self::new(&config)?.encode(order)
    }

    /// Validates the order, then encrypts the full message and the request hash.
    /// Either a complete payload is returned or nothing.
    pub fn encode(&self, order: &OrderData) -> Result<EncryptedPayload, GatewayError> {
        if let Err(err) = order.validate() {
            tracing::debug!(field = err.field, "rejected order before encoding");
            return Err(err.into());
        }

        let encrypted_request = self
            .cipher
            .encrypt_to_base64(&order.to_message(&self.merchant_id));
        let encrypted_hash = self.encrypt_request_hash(order);

        tracing::info!(
            order_no = order.transaction.order_no(),
            environment = %self.environment,
            "encoded payment request"
        );

        Ok(EncryptedPayload {
            merchant_id: self.merchant_id.clone(),
            encrypted_request,
            encrypted_hash,
            post_url: self.post_url.clone(),
        })
    }

    /// AES of the lowercase SHA-256 hex of `merchant_id~order_no~amount~country~currency`.
    /// The hex text is encrypted, not the raw digest.
    fn encrypt_request_hash(&self, order: &OrderData) -> String {
        let digest = sha256_hex(&order.hash_input(&self.merchant_id));
        self.cipher.encrypt_to_base64(&digest)
    }

    /// Reverses `encrypted_request` or `encrypted_hash` with this merchant's key.
    pub fn decrypt_field(&self, encrypted: &str) -> Result<String, GatewayError> {
        self.cipher.decrypt_from_base64(encrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TEST_POST_URL;
    use crate::domain::order::{CustomerDetails, TransactionDetails};
    use base64::{engine::general_purpose, Engine};

    fn key() -> String {
        general_purpose::STANDARD.encode([0x42u8; 32])
    }

    fn order() -> OrderData {
        OrderData {
            transaction: TransactionDetails {
                order_no: "RIDE_1000".to_string(),
                amount: "670".to_string(),
                success_url: "https://x/s".to_string(),
                failure_url: "https://x/f".to_string(),
                ..Default::default()
            },
            customer: CustomerDetails {
                cust_name: "A B".to_string(),
                email_id: "a@b.com".to_string(),
                mobile_no: "0911111111".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn encoder() -> RequestEncoder {
        RequestEncoder::new(&GatewayConfig::new("M1", key(), Environment::Test)).unwrap()
    }

    #[test]
    fn merchant_id_with_delimiters_is_rejected() {
        for merchant_id in ["M~1", "M|1", " "] {
            let config = GatewayConfig::new(merchant_id, key(), Environment::Test);
            match RequestEncoder::new(&config) {
                Err(GatewayError::Validation(err)) => assert_eq!(err.field, "merchant_id"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn encode_returns_complete_payload() {
        let payload = encoder().encode(&order()).unwrap();

        assert_eq!(payload.merchant_id, "M1");
        assert_eq!(payload.post_url, TEST_POST_URL);
        assert!(general_purpose::STANDARD.decode(&payload.encrypted_request).is_ok());
        assert!(general_purpose::STANDARD.decode(&payload.encrypted_hash).is_ok());
    }

    #[test]
    fn encrypted_hash_decrypts_to_sha256_hex() {
        let encoder = encoder();
        let payload = encoder.encode(&order()).unwrap();

        assert_eq!(
            encoder.decrypt_field(&payload.encrypted_hash).unwrap(),
            sha256_hex("M1~RIDE_1000~670~ETH~ETB")
        );
    }

    #[test]
    fn form_fields_use_gateway_names() {
        let payload = encoder().encode(&order()).unwrap();
        let names: Vec<_> = payload.form_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["me_id", "merchant_request", "hash"]);
        assert_eq!(payload.form_fields()[0].1, "M1");
    }

    #[test]
    fn invalid_key_fails_construction() {
        let short = general_purpose::STANDARD.encode([1u8; 24]);
        let err = RequestEncoder::new(&GatewayConfig::new("M1", short, Environment::Test))
            .unwrap_err();
        assert!(matches!(err, GatewayError::KeyFormat(_)));
    }

    #[test]
    fn encode_with_rejects_zero_amount() {
        let mut bad = order();
        bad.transaction.amount = "0".to_string();

        let err = RequestEncoder::encode_with(&bad, "M1", &key(), Environment::Test).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref v) if v.field == "amount"));
    }

    #[test]
    fn encoder_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequestEncoder>();
    }
}
