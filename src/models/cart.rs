use serde::{Deserialize, Serialize};

use super::{optional_id, RecordId};

/// A cart line. Name and price are copied from the product when the line is
/// created, so later product edits do not change the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: RecordId,

    #[serde(rename = "usuario_id", default, deserialize_with = "optional_id")]
    pub user_id: Option<RecordId>,

    #[serde(rename = "id_producto")]
    pub product_id: RecordId,

    #[serde(rename = "nombre_producto", default)]
    pub name: String,

    #[serde(rename = "precio", default)]
    pub price: f64,

    #[serde(rename = "cantidad", default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl CartItem {
    pub const TABLE: &'static str = "Carrito";
    pub const COLUMNS: &'static str = "id, usuario_id, id_producto, nombre_producto, precio, cantidad";

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    #[serde(rename = "usuario_id")]
    pub user_id: RecordId,

    #[serde(rename = "id_producto")]
    pub product_id: RecordId,

    #[serde(rename = "nombre_producto")]
    pub name: String,

    #[serde(rename = "precio")]
    pub price: f64,

    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

/// The two columns read when merging an add into an existing line
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CartQuantity {
    pub id: RecordId,

    #[serde(rename = "cantidad", default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QuantityPatch {
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}
