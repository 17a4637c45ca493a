use crate::error::Result;
use crate::models::{Category, CategoryPatch, NewCategory, RecordId};
use crate::services::logged;
use crate::validation;
use crate::Marketplace;

pub struct CategoryService<'a> {
    market: &'a Marketplace,
}

impl<'a> CategoryService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    pub async fn create(&self, category: &NewCategory) -> Result<Category> {
        validation::require_text("nombre_categoria", &category.name)?;
        let result = self
            .market
            .from(Category::TABLE)
            .insert(vec![category])
            .execute_one()
            .await;
        logged("creating category", result)
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let result = self.market.from(Category::TABLE).select("*").execute().await;
        logged("listing categories", result)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<Category>> {
        let result = self
            .market
            .from(Category::TABLE)
            .select("*")
            .eq(Category::ID, id)
            .maybe_single()
            .await;
        logged("fetching category", result)
    }

    pub async fn update(&self, id: &RecordId, patch: &CategoryPatch) -> Result<Option<Category>> {
        if let Some(name) = &patch.name {
            validation::require_text("nombre_categoria", name)?;
        }
        let result = self
            .market
            .from(Category::TABLE)
            .update(patch)
            .eq(Category::ID, id)
            .execute_one()
            .await;
        logged("updating category", result)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let result = self
            .market
            .from(Category::TABLE)
            .delete()
            .eq(Category::ID, id)
            .execute()
            .await;
        logged("deleting category", result)
    }
}
