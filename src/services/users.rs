use crate::error::Result;
use crate::models::{RecordId, User, UserPatch, UserSummary};
use crate::services::logged;
use crate::validation;
use crate::Marketplace;

/// Profiles in `Usuarios`
pub struct UserService<'a> {
    market: &'a Marketplace,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let result = self.market.from(User::TABLE).select("*").execute().await;
        logged("listing users", result)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<User>> {
        let result = self
            .market
            .from(User::TABLE)
            .select("*")
            .eq("id", id)
            .maybe_single()
            .await;
        logged("fetching user", result)
    }

    /// Apply the set fields of `patch`. `None` when no row matched.
    pub async fn update(&self, id: &RecordId, patch: &UserPatch) -> Result<Option<User>> {
        if let Some(name) = &patch.name {
            validation::require_text("nombre", name)?;
        }
        let result = self
            .market
            .from(User::TABLE)
            .update(patch)
            .eq("id", id)
            .execute_one()
            .await;
        logged("updating user", result)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let result = self.market.from(User::TABLE).delete().eq("id", id).execute().await;
        logged("deleting user", result)
    }

    /// Author columns for a set of users, in one request
    pub async fn by_ids(&self, ids: &[RecordId]) -> Result<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.market
            .from(User::TABLE)
            .select(UserSummary::COLUMNS)
            .in_list("id", ids)
            .execute()
            .await
    }
}
