//! Cart line items and unit price resolution.
//!
//! Cart entries arrive as JSON produced by the backend's product serializer,
//! so prices may be JSON numbers or numeric strings, and either of the two
//! price fields may be missing. [`CartProduct::resolve_price`] turns that
//! into an explicit [`PriceResolution`] instead of coercing silently.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;

/// A price exactly as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    /// A JSON number (`1990`, `1990.5`).
    Number(serde_json::Number),
    /// A numeric string (`"1990"`), as SQL decimal columns are often serialized.
    Text(String),
}

impl RawPrice {
    /// Parse the raw value as a decimal amount.
    ///
    /// Returns `None` when the value is not a finite decimal number.
    #[must_use]
    pub fn parse(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| parse_decimal(&n.to_string())),
            Self::Text(s) => parse_decimal(s),
        }
    }
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<Decimal> for RawPrice {
    fn from(amount: Decimal) -> Self {
        Self::Text(amount.to_string())
    }
}

impl From<i64> for RawPrice {
    fn from(amount: i64) -> Self {
        Self::Number(amount.into())
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

/// Which product field a price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    BasePrice,
    Price,
}

impl PriceField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BasePrice => "base_price",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a product's unit price.
///
/// `base_price` wins whenever it is present; `price` is only consulted when
/// `base_price` is absent. A present field that does not parse is reported
/// as [`PriceResolution::Malformed`] rather than falling through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceResolution {
    /// Resolved from `base_price`.
    BasePrice(Decimal),
    /// Resolved from `price` (no `base_price` present).
    Price(Decimal),
    /// Neither field present.
    Missing,
    /// A field was present but is not a number.
    Malformed {
        /// The field that failed to parse.
        field: PriceField,
        /// The raw value, for diagnostics.
        raw: String,
    },
}

impl PriceResolution {
    /// The amount this resolution contributes. Missing and malformed prices are zero.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        match self {
            Self::BasePrice(amount) | Self::Price(amount) => *amount,
            Self::Missing | Self::Malformed { .. } => Decimal::ZERO,
        }
    }

    /// Whether the price came from an actual field value.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::BasePrice(_) | Self::Price(_))
    }
}

/// Product snapshot held in a cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Backend product ID.
    #[serde(default)]
    pub id: Option<ProductId>,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Catalog price; preferred when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<RawPrice>,
    /// Fallback price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<RawPrice>,
}

impl CartProduct {
    /// Resolve the unit price: `base_price`, else `price`, else zero.
    #[must_use]
    pub fn resolve_price(&self) -> PriceResolution {
        let (field, raw) = match (&self.base_price, &self.price) {
            (Some(raw), _) => (PriceField::BasePrice, raw),
            (None, Some(raw)) => (PriceField::Price, raw),
            (None, None) => return PriceResolution::Missing,
        };

        match (raw.parse(), field) {
            (Some(amount), PriceField::BasePrice) => PriceResolution::BasePrice(amount),
            (Some(amount), PriceField::Price) => PriceResolution::Price(amount),
            (None, field) => PriceResolution::Malformed {
                field,
                raw: raw.to_string(),
            },
        }
    }
}

/// One product entry in a cart with its quantity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product snapshot taken when the item was added.
    #[serde(default, deserialize_with = "null_as_default")]
    pub product: CartProduct,
    /// Requested quantity; missing or zero counts as one.
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl LineItem {
    /// Create a line item with an explicit quantity.
    #[must_use]
    pub const fn new(product: CartProduct, quantity: u32) -> Self {
        Self {
            product,
            quantity: Some(quantity),
        }
    }

    /// Effective quantity: the stored quantity when non-zero, else one.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.filter(|&q| q > 0).unwrap_or(1)
    }

    /// Resolved unit price of the product.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.resolve_price().amount()
    }

    /// Unit price times effective quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price()
            .saturating_mul(Decimal::from(self.quantity()))
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(json: &str) -> LineItem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_base_price_string_is_parsed() {
        let line = item(r#"{"product": {"id": 1, "name": "Polera", "base_price": "1990"}, "quantity": 2}"#);
        assert_eq!(
            line.product.resolve_price(),
            PriceResolution::BasePrice(Decimal::new(1990, 0))
        );
        assert_eq!(line.line_total(), Decimal::new(3980, 0));
    }

    #[test]
    fn test_base_price_number_is_parsed() {
        let line = item(r#"{"product": {"id": 1, "name": "Polera", "base_price": 1990.5}}"#);
        assert_eq!(line.unit_price(), Decimal::new(19_905, 1));
    }

    #[test]
    fn test_falls_back_to_price_and_default_quantity() {
        let line = item(r#"{"product": {"id": 2, "name": "Gorro", "price": 500}}"#);
        assert_eq!(
            line.product.resolve_price(),
            PriceResolution::Price(Decimal::new(500, 0))
        );
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.line_total(), Decimal::new(500, 0));
    }

    #[test]
    fn test_null_base_price_falls_back_to_price() {
        let line = item(r#"{"product": {"base_price": null, "price": "750"}, "quantity": 1}"#);
        assert_eq!(line.unit_price(), Decimal::new(750, 0));
    }

    #[test]
    fn test_zero_quantity_counts_as_one() {
        let line = item(r#"{"product": {"price": 800}, "quantity": 0}"#);
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.line_total(), Decimal::new(800, 0));
    }

    #[test]
    fn test_missing_prices_resolve_to_zero() {
        let line = item(r#"{"product": {"id": 3, "name": "Muestra"}}"#);
        assert_eq!(line.product.resolve_price(), PriceResolution::Missing);
        assert_eq!(line.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_null_product_is_tolerated() {
        let line = item(r#"{"product": null, "quantity": 4}"#);
        assert_eq!(line.product, CartProduct::default());
        assert_eq!(line.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_malformed_base_price_does_not_fall_through() {
        let line = item(r#"{"product": {"base_price": "gratis", "price": 500}}"#);
        let resolution = line.product.resolve_price();
        assert!(matches!(
            resolution,
            PriceResolution::Malformed { field: PriceField::BasePrice, ref raw } if raw == "\"gratis\""
        ));
        assert!(!resolution.is_resolved());
        assert_eq!(line.unit_price(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_string_is_malformed() {
        let product = CartProduct {
            price: Some(RawPrice::Text("  ".to_string())),
            ..CartProduct::default()
        };
        assert!(matches!(
            product.resolve_price(),
            PriceResolution::Malformed { field: PriceField::Price, .. }
        ));
    }

    #[test]
    fn test_scientific_notation_string() {
        let raw = RawPrice::Text("1.99e3".to_string());
        assert_eq!(raw.parse(), Some(Decimal::new(1990, 0)));
    }
}
