//! Fatal gate failures.
//!
//! Access denials and missing content are outcomes, not errors. Only a
//! broken precondition or a failing collaborator ends up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("No page context in processor.")]
    MissingPageContext,

    #[error("No database on processor.")]
    MissingDatabase,

    #[error("layout lookup for `{id}` failed")]
    Lookup {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}
