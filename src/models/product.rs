use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_timestamp, optional_id, RecordId};

/// A listing in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "id_producto")]
    pub id: RecordId,

    #[serde(rename = "Usuario_id", default, deserialize_with = "optional_id")]
    pub owner: Option<RecordId>,

    #[serde(rename = "categoria_id", default, deserialize_with = "optional_id")]
    pub category: Option<RecordId>,

    /// Set when the product is only offered inside a fair
    #[serde(rename = "feria_id", default, deserialize_with = "optional_id")]
    pub fair: Option<RecordId>,

    #[serde(rename = "nombre_producto", default)]
    pub name: String,

    #[serde(rename = "precio", default)]
    pub price: f64,

    #[serde(rename = "descripcion_producto", default)]
    pub description: Option<String>,

    #[serde(rename = "ubicacion_producto", default)]
    pub location: Option<String>,

    #[serde(rename = "foto_producto", default)]
    pub photo: Option<String>,

    #[serde(
        rename = "fecha_Publicacion",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub published_at: Option<DateTime<Utc>>,
}

impl Product {
    pub const TABLE: &'static str = "Producto";
    pub const ID: &'static str = "id_producto";
}

/// Fields a seller fills in. The owner and publication time are stamped by
/// the product service.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub location: Option<String>,
    pub photo: Option<String>,
    pub category: Option<RecordId>,
    pub fair: Option<RecordId>,
}

/// Insert payload for `Producto`
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    #[serde(rename = "Usuario_id")]
    pub owner: RecordId,

    #[serde(rename = "categoria_id")]
    pub category: Option<RecordId>,

    #[serde(rename = "feria_id")]
    pub fair: Option<RecordId>,

    #[serde(rename = "nombre_producto")]
    pub name: String,

    #[serde(rename = "precio")]
    pub price: f64,

    #[serde(rename = "descripcion_producto", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "ubicacion_producto", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "foto_producto", skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(rename = "fecha_Publicacion")]
    pub published_at: DateTime<Utc>,
}

impl NewProduct {
    pub fn from_draft(draft: ProductDraft, owner: RecordId, published_at: DateTime<Utc>) -> Self {
        Self {
            owner,
            category: draft.category,
            fair: draft.fair,
            name: draft.name.trim().to_string(),
            price: draft.price,
            description: draft.description,
            location: draft.location,
            photo: draft.photo,
            published_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(rename = "categoria_id", skip_serializing_if = "Option::is_none")]
    pub category: Option<RecordId>,

    #[serde(rename = "feria_id", skip_serializing_if = "Option::is_none")]
    pub fair: Option<RecordId>,

    #[serde(rename = "nombre_producto", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "precio", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(rename = "descripcion_producto", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "ubicacion_producto", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "foto_producto", skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_tolerates_sparse_rows() {
        let product: Product = serde_json::from_value(json!({
            "id_producto": 12,
            "Usuario_id": "u-1",
            "categoria_id": "",
            "feria_id": null,
            "nombre_producto": "Lámpara",
            "precio": 15.5,
            "fecha_Publicacion": "no es fecha"
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "12");
        assert!(product.category.is_none());
        assert!(product.fair.is_none());
        assert!(product.published_at.is_none());
        assert!(product.description.is_none());
    }

    #[test]
    fn new_product_sends_nullable_fair() {
        let draft = ProductDraft {
            name: "  Libro ".into(),
            price: 8.0,
            ..Default::default()
        };
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let value = serde_json::to_value(NewProduct::from_draft(draft, "u-1".into(), at)).unwrap();
        assert_eq!(value["nombre_producto"], "Libro");
        assert_eq!(value["feria_id"], serde_json::Value::Null);
        assert_eq!(value["Usuario_id"], "u-1");
    }
}
