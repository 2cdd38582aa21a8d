//! Mappings from storage-layer failures into the domain error type.

use convene_domain::ConveneError;

/// SQLite extended result code for a violated UNIQUE constraint.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// SQLite extended result code for a violated FOREIGN KEY constraint.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

/// Carries a [`ConveneError`] across the repository boundary.
///
/// Driver errors convert into this wrapper with `?`, and repositories
/// unwrap it back into the domain error at their edge. The newtype lives
/// here so the `From` impls for driver errors stay inside this crate.
#[derive(Debug)]
pub struct InfraError(pub ConveneError);

impl From<InfraError> for ConveneError {
    fn from(wrapped: InfraError) -> Self {
        wrapped.0
    }
}

impl From<ConveneError> for InfraError {
    fn from(inner: ConveneError) -> Self {
        Self(inner)
    }
}

impl From<rusqlite::Error> for InfraError {
    fn from(err: rusqlite::Error) -> Self {
        Self(sqlite_to_domain(err))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        Self(ConveneError::Database(format!("connection pool error: {err}")))
    }
}

/// Collapse the rusqlite error tree into the domain's `Database` variant.
///
/// `QueryReturnedNoRows` is the exception: repositories treat a missing
/// row as `NotFound`, an outcome rather than a failure.
fn sqlite_to_domain(err: rusqlite::Error) -> ConveneError {
    use rusqlite::Error;

    match err {
        Error::QueryReturnedNoRows => ConveneError::NotFound("no rows returned by query".into()),
        Error::SqliteFailure(code, detail) => sqlite_failure_to_domain(code, detail),
        Error::FromSqlConversionFailure(_, _, cause) => {
            ConveneError::Database(format!("failed to convert sqlite value: {cause}"))
        }
        Error::InvalidColumnType(_, _, ty) => {
            ConveneError::Database(format!("invalid column type: {ty}"))
        }
        Error::Utf8Error(_) => ConveneError::Database("invalid UTF-8 returned from sqlite".into()),
        Error::InvalidParameterName(name) => {
            ConveneError::Database(format!("invalid parameter name: {name}"))
        }
        Error::InvalidPath(path) => {
            ConveneError::Database(format!("invalid database path: {}", path.display()))
        }
        Error::InvalidQuery => ConveneError::Database("invalid SQL query".into()),
        other => ConveneError::Database(other.to_string()),
    }
}

fn sqlite_failure_to_domain(code: rusqlite::ffi::Error, detail: Option<String>) -> ConveneError {
    use rusqlite::ffi::ErrorCode;

    let text = match code.code {
        ErrorCode::DatabaseBusy => "database is busy".to_owned(),
        ErrorCode::DatabaseLocked => "database is locked".to_owned(),
        ErrorCode::ConstraintViolation if code.extended_code == SQLITE_CONSTRAINT_UNIQUE => {
            "unique constraint violation".to_owned()
        }
        ErrorCode::ConstraintViolation if code.extended_code == SQLITE_CONSTRAINT_FOREIGNKEY => {
            "foreign key constraint violation".to_owned()
        }
        _ => format!(
            "sqlite error {:?} (extended code {}): {}",
            code.code,
            code.extended_code,
            detail.unwrap_or_default()
        ),
    };

    ConveneError::Database(text)
}
