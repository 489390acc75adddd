//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Line items live in the session (see [`SessionCart`]).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tienda_core::{
    CartProduct, LineItem, OrderSummary, PriceResolution, ProductId, RawPrice, format_clp,
    item_count, summarize,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::take_flash;
use crate::models::Flash;
use crate::services::SessionCart;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    /// Position in the cart, used by update/remove forms.
    pub index: usize,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    /// The stored price could not be read and counts as zero.
    pub price_unreadable: bool,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Build the view from line items.
    #[must_use]
    pub fn from_items(items: &[LineItem]) -> Self {
        let summary = summarize(items);
        Self::from_summary(&summary, item_count(items))
    }

    fn from_summary(summary: &OrderSummary, item_count: u32) -> Self {
        let items = summary
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| CartItemView {
                index,
                name: if line.name.is_empty() {
                    "Producto".to_string()
                } else {
                    line.name.clone()
                },
                quantity: line.quantity,
                unit_price: format_clp(line.unit_price),
                line_total: format_clp(line.line_total),
                price_unreadable: matches!(line.resolution, PriceResolution::Malformed { .. }),
            })
            .collect();

        Self {
            items,
            subtotal: format_clp(summary.totals.subtotal),
            shipping: format_clp(summary.totals.shipping_fee),
            total: format_clp(summary.totals.total),
            item_count,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add to cart form data.
///
/// Prices are taken as text and parsed the same way as any stored price.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: Option<i32>,
    #[serde(default)]
    pub name: String,
    pub base_price: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<u32>,
}

impl AddToCartForm {
    fn into_line_item(self) -> LineItem {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        LineItem {
            product: CartProduct {
                id: self.product_id.map(ProductId::new),
                name: self.name.trim().to_string(),
                base_price: non_blank(self.base_price).map(RawPrice::Text),
                price: non_blank(self.price).map(RawPrice::Text),
            },
            quantity: self.quantity,
        }
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line: usize,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line: usize,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub flash: Option<Flash>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<impl IntoResponse> {
    let items = SessionCart(&session).items().await?;

    Ok(CartShowTemplate {
        cart: CartView::from_items(&items),
        flash: take_flash(&session).await,
    })
}

/// Add item to cart (HTMX).
///
/// Returns an HTMX trigger to update the cart count badge.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Result<Response> {
    if form.product_id.is_none() && form.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "product_id or name is required".to_string(),
        ));
    }

    let item = form.into_line_item();
    let product_id = item.product.id.map(|id| id.to_string()).unwrap_or_default();

    let cart = SessionCart(&session);
    cart.add(item).await?;
    let count = item_count(&cart.items().await?);

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Update cart item quantity (HTMX). A quantity of zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let cart = SessionCart(&session);
    if !cart.set_quantity(form.line, form.quantity).await? {
        return Err(AppError::NotFound(format!("cart line {}", form.line)));
    }

    items_fragment(&cart).await
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let cart = SessionCart(&session);
    if !cart.remove(form.line).await? {
        return Err(AppError::NotFound(format!("cart line {}", form.line)));
    }

    items_fragment(&cart).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let items = SessionCart(&session).items().await?;

    Ok(CartCountTemplate {
        count: item_count(&items),
    })
}

async fn items_fragment(cart: &SessionCart<'_>) -> Result<Response> {
    let items = cart.items().await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_items(&items),
        },
    )
        .into_response())
}
