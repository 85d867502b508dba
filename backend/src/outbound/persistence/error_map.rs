//! Shared translation of pool and Diesel errors into port error variants.
//!
//! Each repository owns an error enum defined by its port; these helpers map
//! the infrastructure failures common to all of them. Constraint violations
//! with port-specific meaning (duplicate names, duplicate emails) are matched
//! at the call site before delegating here.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool checkout failure into the port's connection variant.
pub(crate) fn map_pool_error<E>(err: &PoolError, connection: impl FnOnce(String) -> E) -> E {
    debug!(error = %err, "database connection checkout failed");
    connection(err.to_string())
}

/// Map a Diesel execution failure into the port's connection or query variant.
pub(crate) fn map_diesel_error<E>(
    err: DieselError,
    connection: impl FnOnce(String) -> E,
    query: impl FnOnce(String) -> E,
) -> E {
    debug!(error = %err, "database query failed");
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            connection(info.message().to_owned())
        }
        other => query(other.to_string()),
    }
}

/// Whether the error is the store rejecting a uniqueness constraint.
pub(crate) fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
