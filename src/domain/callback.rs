use serde::{Deserialize, Serialize};

use crate::domain::order::FIELD_DELIMITER;

/// Raw callback fields as posted (or redirected) back by the gateway.
///
/// Both fields stay optional here so that an incomplete callback surfaces as
/// a malformed-callback error from the decoder instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    #[serde(default, alias = "merchant_response")]
    pub encrypted_response: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

impl CallbackPayload {
    pub fn new(encrypted_response: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            encrypted_response: Some(encrypted_response.into()),
            hash: Some(hash.into()),
        }
    }

    /// Reads the payload from an `application/x-www-form-urlencoded` body or a
    /// redirect query string. A leading `?` is ignored.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut payload = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "encrypted_response" | "merchant_response" => {
                    payload.encrypted_response = Some(value.into_owned());
                }
                "hash" => payload.hash = Some(value.into_owned()),
                _ => {}
            }
        }

        payload
    }
}

/// Decrypted, verified gateway response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackRecord {
    pub status: String,
    pub order_no: String,
    pub amount: String,
    pub txn_id: String,
    pub bank_ref_no: String,
    pub response_code: String,
    pub response_message: String,
    pub payment_mode: String,
    pub card_type: String,
    pub masked_card_no: String,
    pub udf_1: String,
    pub udf_2: String,
    pub udf_3: String,
    pub udf_4: String,
    pub udf_5: String,
}

impl CallbackRecord {
    /// Maps the `|`-delimited plaintext onto the fixed positions. Positions
    /// past the fifteenth are ignored and missing ones become `""`.
    pub fn from_plaintext(plaintext: &str) -> Self {
        let mut parts = plaintext.split(FIELD_DELIMITER);
        let mut next = || parts.next().unwrap_or_default().to_string();

        Self {
            status: next(),
            order_no: next(),
            amount: next(),
            txn_id: next(),
            bank_ref_no: next(),
            response_code: next(),
            response_message: next(),
            payment_mode: next(),
            card_type: next(),
            masked_card_no: next(),
            udf_1: next(),
            udf_2: next(),
            udf_3: next(),
            udf_4: next(),
            udf_5: next(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("success")
    }
}
