//! Checkout payload posted to the backend.
//!
//! Assembled once per submission from the shipping form, the cart and the
//! computed totals, then discarded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderTotals;
use crate::types::{LineItem, PaymentMethod, ProductId, ShippingForm};

/// Body of `POST /api/checkout`.
///
/// Field names are the backend's order columns. Amounts go out as JSON
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub city: String,
    pub region: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub items: Vec<CheckoutItem>,
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    /// Effective quantity.
    pub quantity: u32,
    /// Resolved unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<&LineItem> for CheckoutItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product.id,
            quantity: item.quantity(),
            price: item.unit_price(),
        }
    }
}

impl CheckoutRequest {
    /// Assemble the payload.
    ///
    /// Form fields are copied as entered; the recipient name is not part of
    /// the order record and is not sent.
    #[must_use]
    pub fn assemble(form: &ShippingForm, items: &[LineItem], totals: &OrderTotals) -> Self {
        Self {
            shipping_address: form.address_line.clone(),
            city: form.locality.clone(),
            region: form.region.clone(),
            zip_code: form.postal_code.clone(),
            country: form.country.clone(),
            phone: form.phone.clone(),
            payment_method: form.payment_method,
            subtotal: totals.subtotal,
            shipping: totals.shipping_fee,
            total_amount: totals.total,
            items: items.iter().map(CheckoutItem::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::totals;
    use crate::types::shipping::tests::filled_form;
    use crate::types::{CartProduct, RawPrice};

    #[test]
    fn test_assemble_maps_form_fields() {
        let form = filled_form();
        let request = CheckoutRequest::assemble(&form, &[], &totals(&[]));

        assert_eq!(request.shipping_address, "Av. Providencia 1234");
        assert_eq!(request.city, "Santiago");
        assert_eq!(request.region, "Metropolitana");
        assert_eq!(request.zip_code, "7500000");
        assert_eq!(request.country, "Chile");
        assert_eq!(request.phone, "+56 9 1234 5678");
        assert_eq!(request.payment_method, PaymentMethod::Card);
        assert!(request.items.is_empty());
    }

    #[test]
    fn test_payload_json_shape() {
        let items = vec![LineItem::new(
            CartProduct {
                id: Some(ProductId::new(9)),
                name: "Polerón".to_string(),
                base_price: None,
                price: Some(RawPrice::from(1000)),
            },
            3,
        )];
        let request = CheckoutRequest::assemble(&filled_form(), &items, &totals(&items));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["subtotal"].as_f64(), Some(3000.0));
        assert_eq!(json["shipping"].as_f64(), Some(3000.0));
        assert_eq!(json["total_amount"].as_f64(), Some(6000.0));
        assert_eq!(json["payment_method"], "tarjeta");
        assert_eq!(json["items"][0]["product_id"], 9);
        assert_eq!(json["items"][0]["quantity"], 3);
        assert_eq!(json["items"][0]["price"].as_f64(), Some(1000.0));
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_item_price_uses_resolved_unit_price() {
        let item: LineItem = serde_json::from_str(
            r#"{"product": {"base_price": "1990", "price": 10}, "quantity": null}"#,
        )
        .unwrap();
        let checkout_item = CheckoutItem::from(&item);

        assert_eq!(checkout_item.price, Decimal::new(1990, 0));
        assert_eq!(checkout_item.quantity, 1);
        assert_eq!(checkout_item.product_id, None);
    }
}
