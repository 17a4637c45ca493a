use serde::{Deserialize, Serialize};

use super::RecordId;

/// A user's registration in a fair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: RecordId,

    #[serde(rename = "usuarioId")]
    pub user_id: RecordId,

    #[serde(rename = "feriaID")]
    pub fair_id: RecordId,
}

impl Participation {
    pub const TABLE: &'static str = "Participacion";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewParticipation {
    #[serde(rename = "usuarioId")]
    pub user_id: RecordId,

    #[serde(rename = "feriaID")]
    pub fair_id: RecordId,
}
