use crate::error::{Error, Result};
use crate::models::{Fair, FairDraft, FairPatch, RecordId};
use crate::postgrest::SortOrder;
use crate::services::logged;
use crate::Marketplace;

/// Ferias, newest first
pub struct FairService<'a> {
    market: &'a Marketplace,
}

impl<'a> FairService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    pub async fn create(&self, draft: FairDraft) -> Result<Fair> {
        let fair = draft.validate()?;
        let result = self
            .market
            .from(Fair::TABLE)
            .insert(vec![fair])
            .execute_one()
            .await;
        logged("creating fair", result)
    }

    /// Ordered by start date, latest first
    pub async fn list(&self) -> Result<Vec<Fair>> {
        let result = self
            .market
            .from(Fair::TABLE)
            .select("*")
            .order("fechaInicio", SortOrder::Desc)
            .execute()
            .await;
        logged("listing fairs", result)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<Fair>> {
        let result = self
            .market
            .from(Fair::TABLE)
            .select("*")
            .eq(Fair::ID, id)
            .maybe_single()
            .await;
        logged("fetching fair", result)
    }

    pub async fn update(&self, id: &RecordId, patch: &FairPatch) -> Result<Option<Fair>> {
        if let (Some(start), Some(end)) = (patch.start_date, patch.end_date) {
            if start > end {
                return Err(Error::validation("end_date", "must not be before the start date"));
            }
        }
        let result = self
            .market
            .from(Fair::TABLE)
            .update(patch)
            .eq(Fair::ID, id)
            .execute_one()
            .await;
        logged("updating fair", result)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let result = self
            .market
            .from(Fair::TABLE)
            .delete()
            .eq(Fair::ID, id)
            .execute()
            .await;
        logged("deleting fair", result)
    }
}
