use log::info;

use crate::error::Result;
use crate::models::{NewParticipation, Participation, RecordId};
use crate::services::logged;
use crate::Marketplace;

/// Who takes part in which fair
pub struct ParticipationService<'a> {
    market: &'a Marketplace,
}

impl<'a> ParticipationService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    pub async fn find(&self, fair_id: &RecordId, user_id: &RecordId) -> Result<Option<Participation>> {
        let result = self
            .market
            .from(Participation::TABLE)
            .select("*")
            .eq("feriaID", fair_id)
            .eq("usuarioId", user_id)
            .maybe_single()
            .await;
        logged("checking participation", result)
    }

    /// Register the user in the fair. Joining twice returns the first row.
    pub async fn join(&self, fair_id: &RecordId, user_id: &RecordId) -> Result<Participation> {
        if let Some(existing) = self.find(fair_id, user_id).await? {
            return Ok(existing);
        }

        let row = NewParticipation {
            user_id: user_id.clone(),
            fair_id: fair_id.clone(),
        };
        let result = self
            .market
            .from(Participation::TABLE)
            .insert(vec![row])
            .execute_one()
            .await;
        let participation = logged("joining fair", result)?;
        info!("user {} joined fair {}", user_id, fair_id);
        Ok(participation)
    }

    pub async fn for_user(&self, user_id: &RecordId) -> Result<Vec<Participation>> {
        let result = self
            .market
            .from(Participation::TABLE)
            .select("*")
            .eq("usuarioId", user_id)
            .execute()
            .await;
        logged("listing participations", result)
    }
}
