use crate::enums::PurchaseType;
use crate::error::CoreError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the raw dataset: a website session, possibly carrying an order.
///
/// Order-level fields are optional because sessions that did not convert
/// leave them empty in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub website_session_id: i64,
    pub order_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub is_conversion: bool,
    pub price_usd: Option<Decimal>,
    pub refund_amount_usd: Option<Decimal>,
    pub is_refunded: Option<bool>,
    pub items_purchased: Option<i64>,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
}

/// A converted event with every order-level field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub website_session_id: i64,
    pub created_at: NaiveDateTime,
    pub price_usd: Decimal,
    pub refund_amount_usd: Decimal,
    pub is_refunded: bool,
    pub items_purchased: i64,
    pub product_id: i64,
    pub product_name: String,
}

impl Order {
    pub fn purchase_type(&self) -> PurchaseType {
        PurchaseType::from_items(self.items_purchased)
    }
}

impl TryFrom<&Event> for Order {
    type Error = CoreError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        if !event.is_conversion {
            return Err(CoreError::InvalidInput(
                "is_conversion".to_string(),
                format!("session {} did not convert", event.website_session_id),
            ));
        }

        let missing = |field: &str| {
            CoreError::InvalidInput(
                field.to_string(),
                format!(
                    "conversion in session {} has no value",
                    event.website_session_id
                ),
            )
        };

        Ok(Self {
            order_id: event.order_id.ok_or_else(|| missing("order_id"))?,
            website_session_id: event.website_session_id,
            created_at: event.created_at,
            price_usd: event.price_usd.ok_or_else(|| missing("price_usd"))?,
            refund_amount_usd: event
                .refund_amount_usd
                .ok_or_else(|| missing("refund_amount_usd"))?,
            is_refunded: event.is_refunded.ok_or_else(|| missing("is_refunded"))?,
            items_purchased: event
                .items_purchased
                .ok_or_else(|| missing("items_purchased"))?,
            product_id: event.product_id.ok_or_else(|| missing("product_id"))?,
            product_name: event
                .product_name
                .clone()
                .ok_or_else(|| missing("product_name"))?,
        })
    }
}
