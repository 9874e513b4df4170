//! Query functions over a borrowed connection.
//!
//! Every function takes `&Connection` so it can run either standalone via
//! [`crate::Database::with_conn`] or as one step of a larger
//! [`crate::Database::transaction`].

pub mod auth;
pub mod effects;
pub mod ledger;
pub mod raffles;
pub mod store;
pub mod users;

use anyhow::Result;

pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
