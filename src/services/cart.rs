use log::debug;

use crate::error::{Error, Result};
use crate::models::{CartItem, CartQuantity, NewCartItem, Product, QuantityPatch, RecordId};
use crate::pricing::CartSummary;
use crate::services::logged;
use crate::validation;
use crate::Marketplace;

/// Cart lines in `Carrito`
pub struct CartService<'a> {
    market: &'a Marketplace,
}

impl<'a> CartService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    /// Add `quantity` of a product. An existing line for the same product has
    /// its quantity raised instead of getting a duplicate.
    pub async fn add(&self, product: &Product, user_id: &RecordId, quantity: u32) -> Result<()> {
        validation::quantity(quantity)?;

        let existing = self
            .market
            .from(CartItem::TABLE)
            .select("id, cantidad")
            .eq("usuario_id", user_id)
            .eq("id_producto", &product.id)
            .maybe_single::<CartQuantity>()
            .await;

        let result = match logged("reading cart line", existing)? {
            Some(line) => {
                let quantity = line
                    .quantity
                    .unwrap_or(0)
                    .checked_add(quantity)
                    .ok_or_else(|| Error::validation("quantity", "is too large"))?;
                debug!("cart line {} now holds {}", line.id, quantity);
                self.market
                    .from(CartItem::TABLE)
                    .update(QuantityPatch { quantity })
                    .eq("id", &line.id)
                    .execute_no_return()
                    .await
            }
            None => {
                let row = NewCartItem {
                    user_id: user_id.clone(),
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    quantity,
                };
                self.market
                    .from(CartItem::TABLE)
                    .insert(row)
                    .execute_no_return()
                    .await
            }
        };
        logged("adding to cart", result)
    }

    pub async fn for_user(&self, user_id: &RecordId) -> Result<Vec<CartItem>> {
        let result = self
            .market
            .from(CartItem::TABLE)
            .select(CartItem::COLUMNS)
            .eq("usuario_id", user_id)
            .execute()
            .await;
        logged("loading cart", result)
    }

    pub async fn remove(&self, item_id: &RecordId) -> Result<()> {
        let result = self
            .market
            .from(CartItem::TABLE)
            .delete()
            .eq("id", item_id)
            .execute()
            .await;
        logged("removing cart line", result)
    }

    pub async fn set_quantity(&self, item_id: &RecordId, quantity: u32) -> Result<()> {
        validation::quantity(quantity)?;
        let result = self
            .market
            .from(CartItem::TABLE)
            .update(QuantityPatch { quantity })
            .eq("id", item_id)
            .execute_no_return()
            .await;
        logged("changing cart quantity", result)
    }

    /// Remove every line of the user's cart
    pub async fn clear(&self, user_id: &RecordId) -> Result<()> {
        let result = self
            .market
            .from(CartItem::TABLE)
            .delete()
            .eq("usuario_id", user_id)
            .execute()
            .await;
        logged("clearing cart", result)
    }

    /// Totals for the user's cart under the configured pricing rules
    pub async fn summary(&self, user_id: &RecordId) -> Result<CartSummary> {
        let items = self.for_user(user_id).await?;
        Ok(self.market.price_rules().summarize(&items))
    }
}
