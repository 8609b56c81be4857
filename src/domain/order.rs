//! Order data for the outbound payment request.
//!
//! Each section of the gateway message is a fixed-shape struct. A section's
//! [`Section::entries`] lists its fields in wire order, so the order is
//! checked at compile time instead of depending on map key order.

use chrono::Utc;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::utils::sanitize::{mask_tail, mask_value};
use crate::validation::{
    validate_no_delimiters, validate_positive_amount, validate_required, ValidationResult,
};

pub const AGGREGATOR_ID: &str = "yagout";
pub const DEFAULT_COUNTRY: &str = "ETH";
pub const DEFAULT_CURRENCY: &str = "ETB";
pub const DEFAULT_TXN_TYPE: &str = "SALE";
pub const DEFAULT_CHANNEL: &str = "WEB";
pub const DEFAULT_IS_LOGGED_IN: &str = "Y";

pub const FIELD_DELIMITER: &str = "|";
pub const SECTION_DELIMITER: &str = "~";
pub const SECTION_COUNT: usize = 9;

/// One `|`-delimited section of the request message.
pub trait Section {
    /// Field names and values in wire order. Absent values are `""`.
    fn entries(&self) -> Vec<(&'static str, &str)>;

    fn render(&self) -> String {
        self.entries()
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>()
            .join(FIELD_DELIMITER)
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDetails {
    pub order_no: String,
    #[serde(deserialize_with = "amount_from_str_or_number")]
    pub amount: String,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub txn_type: Option<String>,
    pub success_url: String,
    pub failure_url: String,
    pub channel: Option<String>,
}

impl TransactionDetails {
    pub fn country(&self) -> &str {
        or_default(&self.country, DEFAULT_COUNTRY)
    }

    pub fn currency(&self) -> &str {
        or_default(&self.currency, DEFAULT_CURRENCY)
    }

    pub fn txn_type(&self) -> &str {
        or_default(&self.txn_type, DEFAULT_TXN_TYPE)
    }

    pub fn channel(&self) -> &str {
        or_default(&self.channel, DEFAULT_CHANNEL)
    }

    pub fn order_no(&self) -> &str {
        self.order_no.trim()
    }

    pub fn amount(&self) -> &str {
        self.amount.trim()
    }
}

/// The transaction section also carries the aggregator and merchant ids,
/// which come from configuration rather than the order.
pub struct TransactionSection<'a> {
    pub merchant_id: &'a str,
    pub details: &'a TransactionDetails,
}

impl Section for TransactionSection<'_> {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        let d = self.details;
        vec![
            ("ag_id", AGGREGATOR_ID),
            ("me_id", self.merchant_id),
            ("order_no", d.order_no()),
            ("amount", d.amount()),
            ("country", d.country()),
            ("currency", d.currency()),
            ("txn_type", d.txn_type()),
            ("success_url", d.success_url.as_str()),
            ("failure_url", d.failure_url.as_str()),
            ("channel", d.channel()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayDetails {
    pub pg_id: String,
    pub paymode: String,
    pub scheme: String,
    pub wallet_type: String,
}

impl Section for GatewayDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("pg_id", self.pg_id.as_str()),
            ("paymode", self.paymode.as_str()),
            ("scheme", self.scheme.as_str()),
            ("wallet_type", self.wallet_type.as_str()),
        ]
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    pub card_no: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvv: String,
    pub card_name: String,
}

impl Section for CardDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("card_no", self.card_no.as_str()),
            ("exp_month", self.exp_month.as_str()),
            ("exp_year", self.exp_year.as_str()),
            ("cvv", self.cvv.as_str()),
            ("card_name", self.card_name.as_str()),
        ]
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_no", &mask_tail(&self.card_no))
            .field("exp_month", &mask_value(&self.exp_month))
            .field("exp_year", &mask_value(&self.exp_year))
            .field("cvv", &mask_value(&self.cvv))
            .field("card_name", &mask_value(&self.card_name))
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDetails {
    pub cust_name: String,
    pub email_id: String,
    pub mobile_no: String,
    pub unique_id: String,
    pub is_logged_in: Option<String>,
}

impl CustomerDetails {
    pub fn is_logged_in(&self) -> &str {
        or_default(&self.is_logged_in, DEFAULT_IS_LOGGED_IN)
    }
}

impl Section for CustomerDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("cust_name", self.cust_name.as_str()),
            ("email_id", self.email_id.as_str()),
            ("mobile_no", self.mobile_no.as_str()),
            ("unique_id", self.unique_id.as_str()),
            ("is_logged_in", self.is_logged_in()),
        ]
    }
}

impl fmt::Debug for CustomerDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerDetails")
            .field("cust_name", &mask_value(&self.cust_name))
            .field("email_id", &mask_value(&self.email_id))
            .field("mobile_no", &mask_tail(&self.mobile_no))
            .field("unique_id", &self.unique_id)
            .field("is_logged_in", &self.is_logged_in())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingDetails {
    pub bill_address: String,
    pub bill_city: String,
    pub bill_state: String,
    pub bill_country: String,
    pub bill_zip: String,
}

impl Section for BillingDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("bill_address", self.bill_address.as_str()),
            ("bill_city", self.bill_city.as_str()),
            ("bill_state", self.bill_state.as_str()),
            ("bill_country", self.bill_country.as_str()),
            ("bill_zip", self.bill_zip.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingDetails {
    pub ship_address: String,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_country: String,
    pub ship_zip: String,
    pub ship_days: String,
    pub address_count: String,
}

impl Section for ShippingDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("ship_address", self.ship_address.as_str()),
            ("ship_city", self.ship_city.as_str()),
            ("ship_state", self.ship_state.as_str()),
            ("ship_country", self.ship_country.as_str()),
            ("ship_zip", self.ship_zip.as_str()),
            ("ship_days", self.ship_days.as_str()),
            ("address_count", self.address_count.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDetails {
    pub item_count: String,
    pub item_value: String,
    pub item_category: String,
}

impl Section for ItemDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("item_count", self.item_count.as_str()),
            ("item_value", self.item_value.as_str()),
            ("item_category", self.item_category.as_str()),
        ]
    }
}

/// The gateway defines no UPI fields; the section is always empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiDetails {}

impl Section for UpiDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherDetails {
    pub udf_1: String,
    pub udf_2: String,
    pub udf_3: String,
    pub udf_4: String,
    pub udf_5: String,
}

impl Section for OtherDetails {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("udf_1", self.udf_1.as_str()),
            ("udf_2", self.udf_2.as_str()),
            ("udf_3", self.udf_3.as_str()),
            ("udf_4", self.udf_4.as_str()),
            ("udf_5", self.udf_5.as_str()),
        ]
    }
}

/// Everything the gateway needs to know about one checkout.
///
/// Deserializes from a flat JSON object (`{"order_no": ..., "email_id": ...}`);
/// each field is routed to its section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    #[serde(flatten)]
    pub transaction: TransactionDetails,
    #[serde(flatten)]
    pub gateway: GatewayDetails,
    #[serde(flatten)]
    pub card: CardDetails,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    #[serde(flatten)]
    pub billing: BillingDetails,
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    #[serde(flatten)]
    pub item: ItemDetails,
    #[serde(skip)]
    pub upi: UpiDetails,
    #[serde(flatten)]
    pub other: OtherDetails,
}

impl OrderData {
    /// Checks the fields the gateway cannot process without. The first
    /// failure is returned.
    pub fn validate(&self) -> ValidationResult {
        let txn = &self.transaction;
        validate_required("order_no", &txn.order_no)?;
        validate_positive_amount("amount", &txn.amount)?;
        validate_required("success_url", &txn.success_url)?;
        validate_required("failure_url", &txn.failure_url)?;
        validate_required("cust_name", &self.customer.cust_name)?;
        validate_required("email_id", &self.customer.email_id)?;
        validate_required("mobile_no", &self.customer.mobile_no)?;
        self.validate_delimiters()
    }

    fn validate_delimiters(&self) -> ValidationResult {
        // the merchant id is checked once by RequestEncoder::new
        let transaction = TransactionSection {
            merchant_id: "",
            details: &self.transaction,
        };
        let sections = [
            transaction.entries(),
            self.gateway.entries(),
            self.card.entries(),
            self.customer.entries(),
            self.billing.entries(),
            self.shipping.entries(),
            self.item.entries(),
            self.upi.entries(),
            self.other.entries(),
        ];

        sections
            .iter()
            .flatten()
            .try_for_each(|&(field, value)| validate_no_delimiters(field, value))
    }

    /// Renders the nine sections in wire order.
    pub fn sections(&self, merchant_id: &str) -> [String; SECTION_COUNT] {
        [
            TransactionSection {
                merchant_id,
                details: &self.transaction,
            }
            .render(),
            self.gateway.render(),
            self.card.render(),
            self.customer.render(),
            self.billing.render(),
            self.shipping.render(),
            self.item.render(),
            self.upi.render(),
            self.other.render(),
        ]
    }

    /// The `~`-joined plaintext that gets encrypted into `merchant_request`.
    /// Contains PII and must not be logged.
    pub fn to_message(&self, merchant_id: &str) -> String {
        self.sections(merchant_id).join(SECTION_DELIMITER)
    }

    /// `merchant_id~order_no~amount~country~currency`, hashed for `hash`.
    pub fn hash_input(&self, merchant_id: &str) -> String {
        let txn = &self.transaction;
        [
            merchant_id,
            txn.order_no(),
            txn.amount(),
            txn.country(),
            txn.currency(),
        ]
        .join(SECTION_DELIMITER)
    }
}

/// `PREFIX_<unix millis>_<four random digits>`, unique enough for order numbers
/// generated by one merchant.
pub fn generate_order_no(prefix: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Accepts `"670"`, `"670.50"` or a bare JSON number and keeps the decimal
/// text as written.
fn amount_from_str_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl de::Visitor<'_> for AmountVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal amount as a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.trim().to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            if v.is_finite() {
                Ok(v.to_string())
            } else {
                Err(E::custom("amount must be finite"))
            }
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}
