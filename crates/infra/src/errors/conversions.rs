//! Conversions from external infrastructure errors into domain errors.

use calendai_domain::CalendaiError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalendaiError);

impl From<InfraError> for CalendaiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalendaiError> for InfraError {
    fn from(value: CalendaiError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCalendaiError {
    fn into_calendai(self) -> CalendaiError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CalendaiError */
/* -------------------------------------------------------------------------- */

impl IntoCalendaiError for SqlError {
    fn into_calendai(self) -> CalendaiError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        CalendaiError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        CalendaiError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        CalendaiError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        CalendaiError::Database("foreign key constraint violation".into())
                    }
                    _ => CalendaiError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => CalendaiError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                CalendaiError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                CalendaiError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                CalendaiError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                CalendaiError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => CalendaiError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => CalendaiError::Database("invalid SQL query".into()),
            other => CalendaiError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_calendai())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → CalendaiError */
/* -------------------------------------------------------------------------- */

impl IntoCalendaiError for r2d2::Error {
    fn into_calendai(self) -> CalendaiError {
        CalendaiError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_calendai())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalendaiError */
/* -------------------------------------------------------------------------- */

impl IntoCalendaiError for HttpError {
    fn into_calendai(self) -> CalendaiError {
        if self.is_timeout() {
            return CalendaiError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CalendaiError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => CalendaiError::NotFound(message),
                400..=499 => CalendaiError::InvalidInput(message),
                500..=599 => CalendaiError::Network(message),
                _ => CalendaiError::Network(message),
            };
        }

        CalendaiError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_calendai())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
