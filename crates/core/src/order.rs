//! Order summary calculator.
//!
//! Derives subtotal, shipping and total from a cart. The functions here are
//! total: any sequence of line items produces a summary, with missing or
//! malformed prices counting as zero.
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tienda_core::{CartProduct, LineItem, RawPrice, SHIPPING_FEE, totals};
//!
//! let cart = vec![LineItem::new(
//!     CartProduct {
//!         price: Some(RawPrice::from(1000)),
//!         ..CartProduct::default()
//!     },
//!     3,
//! )];
//!
//! let totals = totals(&cart);
//! assert_eq!(totals.subtotal, Decimal::new(3000, 0));
//! assert_eq!(totals.total, totals.subtotal + SHIPPING_FEE);
//! ```

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{LineItem, PriceResolution, ProductId};

/// Flat shipping fee in whole pesos.
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(3000, 0, 0, false, 0);

/// Derived order amounts. Never stored; recomputed from the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    /// Always `subtotal + shipping_fee`.
    pub total: Decimal,
}

impl OrderTotals {
    /// Totals for a given subtotal with the flat shipping fee.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        Self {
            subtotal,
            shipping_fee: SHIPPING_FEE,
            total: subtotal.saturating_add(SHIPPING_FEE),
        }
    }
}

/// One row of the order summary panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub product_id: Option<ProductId>,
    pub name: String,
    /// Effective quantity (missing or zero counts as one).
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    /// How the unit price was obtained.
    pub resolution: PriceResolution,
}

impl SummaryLine {
    fn from_item(item: &LineItem) -> Self {
        let resolution = item.product.resolve_price();
        let quantity = item.quantity();
        let unit_price = resolution.amount();

        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            quantity,
            unit_price,
            line_total: unit_price.saturating_mul(Decimal::from(quantity)),
            resolution,
        }
    }
}

/// Per-line breakdown plus totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub totals: OrderTotals,
}

impl OrderSummary {
    /// Lines whose price could not be parsed.
    pub fn malformed_lines(&self) -> impl Iterator<Item = &SummaryLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line.resolution, PriceResolution::Malformed { .. }))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Build the order summary for a cart.
///
/// Unparseable prices count as zero and are logged at warn level.
#[must_use]
pub fn summarize(items: &[LineItem]) -> OrderSummary {
    let lines: Vec<SummaryLine> = items.iter().map(SummaryLine::from_item).collect();

    for line in &lines {
        if let PriceResolution::Malformed { field, raw } = &line.resolution {
            tracing::warn!(
                product_id = ?line.product_id,
                field = %field,
                raw = %raw,
                "Unparseable price counted as zero"
            );
        }
    }

    let subtotal = lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total));

    OrderSummary {
        lines,
        totals: OrderTotals::from_subtotal(subtotal),
    }
}

/// Compute only the totals for a cart.
#[must_use]
pub fn totals(items: &[LineItem]) -> OrderTotals {
    let subtotal = items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.line_total()));
    OrderTotals::from_subtotal(subtotal)
}

/// Total number of units in a cart, using effective quantities.
#[must_use]
pub fn item_count(items: &[LineItem]) -> u32 {
    items
        .iter()
        .fold(0_u32, |acc, item| acc.saturating_add(item.quantity()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CartProduct, PriceField, RawPrice};

    fn product(id: i32, base_price: Option<RawPrice>, price: Option<RawPrice>) -> CartProduct {
        CartProduct {
            id: Some(ProductId::new(id)),
            name: format!("Producto {id}"),
            base_price,
            price,
        }
    }

    #[test]
    fn test_empty_cart_is_shipping_only() {
        let totals = totals(&[]);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.shipping_fee, SHIPPING_FEE);
        assert_eq!(totals.total, SHIPPING_FEE);
        assert_eq!(SHIPPING_FEE, Decimal::new(3000, 0));
    }

    #[test]
    fn test_string_base_price_times_quantity() {
        let items = vec![LineItem::new(
            product(1, Some(RawPrice::Text("1990".to_string())), None),
            2,
        )];
        assert_eq!(totals(&items).subtotal, Decimal::new(3980, 0));
    }

    #[test]
    fn test_price_fallback_with_default_quantity() {
        let items = vec![LineItem {
            product: product(2, None, Some(RawPrice::from(500))),
            quantity: None,
        }];
        assert_eq!(totals(&items).subtotal, Decimal::new(500, 0));
    }

    #[test]
    fn test_total_is_subtotal_plus_shipping() {
        let carts: Vec<Vec<LineItem>> = vec![
            vec![],
            vec![LineItem::new(product(1, Some(RawPrice::from(1000)), None), 3)],
            vec![
                LineItem::new(product(1, Some(RawPrice::Text("12990.5".to_string())), None), 7),
                LineItem::new(product(2, None, Some(RawPrice::from(250))), 1),
                LineItem::new(product(3, Some(RawPrice::Text("n/a".to_string())), None), 4),
                LineItem::default(),
            ],
        ];

        for cart in &carts {
            let totals = totals(cart);
            assert_eq!(totals.total, totals.subtotal + totals.shipping_fee);

            let expected: Decimal = cart.iter().map(LineItem::line_total).sum();
            assert_eq!(totals.subtotal, expected);
        }
    }

    #[test]
    fn test_summarize_matches_totals() {
        let items = vec![
            LineItem::new(product(1, Some(RawPrice::from(1000)), None), 3),
            LineItem::new(product(2, Some(RawPrice::Text("abc".to_string())), None), 1),
        ];

        let summary = summarize(&items);
        assert_eq!(summary.totals, totals(&items));
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total, Decimal::new(3000, 0));
        assert_eq!(summary.totals.total, Decimal::new(6000, 0));

        let malformed: Vec<_> = summary.malformed_lines().collect();
        assert_eq!(malformed.len(), 1);
        assert!(matches!(
            malformed[0].resolution,
            PriceResolution::Malformed { field: PriceField::BasePrice, .. }
        ));
    }

    #[test]
    fn test_item_count_uses_effective_quantity() {
        let items = vec![
            LineItem::new(product(1, None, None), 2),
            LineItem {
                product: product(2, None, None),
                quantity: None,
            },
        ];
        assert_eq!(item_count(&items), 3);
        assert_eq!(item_count(&[]), 0);
    }
}
