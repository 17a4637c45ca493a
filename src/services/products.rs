use chrono::Utc;
use log::info;

use crate::error::{Error, Result};
use crate::models::{NewProduct, Product, ProductDraft, ProductPatch, RecordId};
use crate::postgrest::{contains_pattern, FilterOperator};
use crate::services::logged;
use crate::validation;
use crate::Marketplace;

/// Listings in `Producto`
pub struct ProductService<'a> {
    market: &'a Marketplace,
}

impl<'a> ProductService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    /// Publish a product as the signed-in user
    pub async fn create(&self, draft: ProductDraft) -> Result<Product> {
        validation::require_text("nombre_producto", &draft.name)?;
        validation::price(draft.price)?;

        let owner = match self.market.auth().get_user().await? {
            Some(user) => RecordId::from(user.id),
            None => return Err(Error::auth("sign in to publish a product")),
        };

        let row = NewProduct::from_draft(draft, owner.clone(), Utc::now());
        let result = self
            .market
            .from(Product::TABLE)
            .insert(vec![row])
            .execute_one::<Product>()
            .await;
        let product = logged("creating product", result)?;
        info!("user {} published product {}", owner, product.id);
        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let result = self.market.from(Product::TABLE).select("*").execute().await;
        logged("listing products", result)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<Product>> {
        let result = self
            .market
            .from(Product::TABLE)
            .select("*")
            .eq(Product::ID, id)
            .maybe_single()
            .await;
        logged("fetching product", result)
    }

    pub async fn update(&self, id: &RecordId, patch: &ProductPatch) -> Result<Option<Product>> {
        if let Some(name) = &patch.name {
            validation::require_text("nombre_producto", name)?;
        }
        if let Some(price) = patch.price {
            validation::price(price)?;
        }
        let result = self
            .market
            .from(Product::TABLE)
            .update(patch)
            .eq(Product::ID, id)
            .execute_one()
            .await;
        logged("updating product", result)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let result = self
            .market
            .from(Product::TABLE)
            .delete()
            .eq(Product::ID, id)
            .execute()
            .await;
        logged("deleting product", result)
    }

    pub async fn by_owner(&self, owner: &RecordId) -> Result<Vec<Product>> {
        let result = self
            .market
            .from(Product::TABLE)
            .select("*")
            .eq("Usuario_id", owner)
            .execute()
            .await;
        logged("listing products by owner", result)
    }

    pub async fn by_fair(&self, fair: &RecordId) -> Result<Vec<Product>> {
        let result = self
            .market
            .from(Product::TABLE)
            .select("*")
            .eq("feria_id", fair)
            .execute()
            .await;
        logged("listing products by fair", result)
    }

    /// Server-side case-insensitive search on name or description. A blank
    /// term lists everything.
    pub async fn search_remote(&self, term: &str) -> Result<Vec<Product>> {
        if term.trim().is_empty() {
            return self.list().await;
        }
        let pattern = contains_pattern(term);
        let result = self
            .market
            .from(Product::TABLE)
            .select("*")
            .or(&[
                ("nombre_producto", FilterOperator::ILike, pattern.as_str()),
                ("descripcion_producto", FilterOperator::ILike, pattern.as_str()),
            ])
            .execute()
            .await;
        logged("searching products", result)
    }
}
