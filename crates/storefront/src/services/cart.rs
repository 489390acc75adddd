//! Session-backed cart.
//!
//! The cart is a list of [`LineItem`]s serialized under
//! [`session_keys::CART`]. Each line keeps the product snapshot it was added
//! with, so the order summary never needs a catalog lookup.

use tienda_core::LineItem;
use tower_sessions::Session;

use crate::checkout::{CartStore, CartStoreError};
use crate::models::session_keys;

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// The shopper's cart stored in the request session.
#[derive(Clone, Copy)]
pub struct SessionCart<'a>(pub &'a Session);

impl SessionCart<'_> {
    /// Current line items. An absent cart is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn items(&self) -> SessionResult<Vec<LineItem>> {
        Ok(self
            .0
            .get::<Vec<LineItem>>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, items: &[LineItem]) -> SessionResult<()> {
        self.0.insert(session_keys::CART, items).await
    }

    /// Add a line. A product already in the cart has its quantity increased.
    ///
    /// Returns the number of lines after the add.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn add(&self, item: LineItem) -> SessionResult<usize> {
        let mut items = self.items().await?;

        let existing = item
            .product
            .id
            .and_then(|id| items.iter_mut().find(|line| line.product.id == Some(id)));

        match existing {
            Some(line) => {
                line.quantity = Some(line.quantity().saturating_add(item.quantity()));
            }
            None => items.push(item),
        }

        self.save(&items).await?;
        Ok(items.len())
    }

    /// Set the quantity of the line at `index`. Zero removes the line.
    ///
    /// Returns `false` if there is no such line.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn set_quantity(&self, index: usize, quantity: u32) -> SessionResult<bool> {
        if quantity == 0 {
            return self.remove(index).await;
        }

        let mut items = self.items().await?;
        let Some(line) = items.get_mut(index) else {
            return Ok(false);
        };
        line.quantity = Some(quantity);

        self.save(&items).await?;
        Ok(true)
    }

    /// Remove the line at `index`.
    ///
    /// Returns `false` if there is no such line.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn remove(&self, index: usize) -> SessionResult<bool> {
        let mut items = self.items().await?;
        if index >= items.len() {
            return Ok(false);
        }
        items.remove(index);

        self.save(&items).await?;
        Ok(true)
    }
}

impl CartStore for SessionCart<'_> {
    async fn line_items(&self) -> Result<Vec<LineItem>, CartStoreError> {
        self.items()
            .await
            .map_err(|e| CartStoreError(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        self.0
            .remove::<Vec<LineItem>>(session_keys::CART)
            .await
            .map(|_| ())
            .map_err(|e| CartStoreError(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tienda_core::{CartProduct, ProductId, RawPrice};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn item(id: i32, price: i64, quantity: u32) -> LineItem {
        LineItem::new(
            CartProduct {
                id: Some(ProductId::new(id)),
                name: format!("Producto {id}"),
                base_price: Some(RawPrice::from(price)),
                price: None,
            },
            quantity,
        )
    }

    #[tokio::test]
    async fn test_empty_session_has_empty_cart() {
        let session = session();
        assert!(SessionCart(&session).items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_merges_same_product() {
        let session = session();
        let cart = SessionCart(&session);

        assert_eq!(cart.add(item(1, 1000, 2)).await.unwrap(), 1);
        assert_eq!(cart.add(item(2, 500, 1)).await.unwrap(), 2);
        assert_eq!(cart.add(item(1, 1000, 3)).await.unwrap(), 2);

        let items = cart.items().await.unwrap();
        assert_eq!(items[0].quantity(), 5);
        assert_eq!(items[1].quantity(), 1);
    }

    #[tokio::test]
    async fn test_products_without_id_are_never_merged() {
        let session = session();
        let cart = SessionCart(&session);
        let anonymous = LineItem::new(CartProduct::default(), 1);

        cart.add(anonymous.clone()).await.unwrap();
        assert_eq!(cart.add(anonymous).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_set_quantity_and_remove() {
        let session = session();
        let cart = SessionCart(&session);
        cart.add(item(1, 1000, 1)).await.unwrap();
        cart.add(item(2, 500, 1)).await.unwrap();

        assert!(cart.set_quantity(1, 4).await.unwrap());
        assert_eq!(cart.items().await.unwrap()[1].quantity(), 4);

        assert!(cart.set_quantity(0, 0).await.unwrap());
        let items = cart.items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, Some(ProductId::new(2)));

        assert!(!cart.remove(5).await.unwrap());
        assert!(!cart.set_quantity(5, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_cart_store_clear() {
        let session = session();
        let cart = SessionCart(&session);
        cart.add(item(1, 1000, 1)).await.unwrap();

        assert_eq!(cart.line_items().await.unwrap().len(), 1);
        cart.clear().await.unwrap();
        assert!(cart.line_items().await.unwrap().is_empty());
    }
}
