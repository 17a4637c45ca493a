use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_timestamp, optional_id, RecordId, UserSummary};

/// A product comment or a reply to one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: RecordId,

    #[serde(rename = "productoId")]
    pub product_id: RecordId,

    #[serde(rename = "usuarioId", default, deserialize_with = "optional_id")]
    pub user_id: Option<RecordId>,

    /// Absent on top-level comments
    #[serde(rename = "parentId", default, deserialize_with = "optional_id")]
    pub parent_id: Option<RecordId>,

    /// Stars, 1 to 5
    #[serde(rename = "calificacion", default)]
    pub rating: Option<u8>,

    #[serde(rename = "descripcion", default)]
    pub text: String,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub const TABLE: &'static str = "comentarios";

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A comment together with its author's profile, when the lookup worked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,

    #[serde(rename = "usuario", default)]
    pub author: Option<UserSummary>,
}

impl CommentWithAuthor {
    pub fn bare(comment: Comment) -> Self {
        Self {
            comment,
            author: None,
        }
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(UserSummary::display_name)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    #[serde(rename = "productoId")]
    pub product_id: RecordId,

    #[serde(rename = "usuarioId")]
    pub user_id: RecordId,

    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,

    #[serde(rename = "calificacion")]
    pub rating: u8,

    #[serde(rename = "descripcion")]
    pub text: String,
}

/// Edit payload. Only the text and, on top-level comments, the rating change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentPatch {
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "calificacion", skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_reads_parent_and_missing_timestamp() {
        let comment: Comment = serde_json::from_value(json!({
            "id": "c2",
            "productoId": 9,
            "usuarioId": "u1",
            "parentId": "c1",
            "calificacion": 4,
            "descripcion": "¿Sigue disponible?"
        }))
        .unwrap();
        assert!(comment.is_reply());
        assert_eq!(comment.product_id.as_str(), "9");
        assert!(comment.created_at.is_none());
    }

    #[test]
    fn author_is_optional_when_flattened() {
        let with_author: CommentWithAuthor = serde_json::from_value(json!({
            "id": 1,
            "productoId": 9,
            "descripcion": "hola",
            "usuario": { "id": "u1", "nombre": "Ana" }
        }))
        .unwrap();
        assert_eq!(with_author.author_name(), "Ana");
        assert!(with_author.comment.parent_id.is_none());
    }
}
