use serde::{Deserialize, Serialize};

use super::{optional_id, RecordId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "id_categoria")]
    pub id: RecordId,

    #[serde(rename = "nombre_categoria", default)]
    pub name: String,

    #[serde(rename = "descripcion_categoria", default)]
    pub description: Option<String>,

    /// Set when the category belongs to a fair
    #[serde(rename = "feria_id", default, deserialize_with = "optional_id")]
    pub fair: Option<RecordId>,
}

impl Category {
    pub const TABLE: &'static str = "Categoria";
    pub const ID: &'static str = "id_categoria";
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    #[serde(rename = "nombre_categoria")]
    pub name: String,

    #[serde(rename = "descripcion_categoria", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "feria_id", skip_serializing_if = "Option::is_none")]
    pub fair: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryPatch {
    #[serde(rename = "nombre_categoria", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "descripcion_categoria", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "feria_id", skip_serializing_if = "Option::is_none")]
    pub fair: Option<RecordId>,
}
