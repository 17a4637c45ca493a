//! One service per marketplace table, plus accounts and photo storage.
//!
//! Services borrow the `Marketplace` and are created on demand through its
//! accessors, so each call picks up the current session token.

mod accounts;
mod cart;
mod categories;
mod comments;
mod fairs;
mod participations;
mod photos;
mod products;
mod users;

use log::error;

use crate::error::Result;

pub use accounts::*;
pub use cart::*;
pub use categories::*;
pub use comments::*;
pub use fairs::*;
pub use participations::*;
pub use photos::*;
pub use products::*;
pub use users::*;

/// Log a failed remote call before handing the error back
pub(crate) fn logged<T>(action: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!("{} failed: {}", action, err);
    }
    result
}
