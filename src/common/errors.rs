use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

/// Error taxonomy shared by every handler and service in the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusinessError {
    /// Malformed or inconsistent input (400 Bad Request)
    ValidationError { field: String, message: String },
    /// Workflow rule violations (422 Unprocessable Entity)
    BusinessRuleViolation { rule: String, message: String },
    /// Referenced resource does not exist (404 Not Found)
    NotFound { resource: String, id: String },
    /// One-row-per-key invariant violated (409 Conflict)
    Duplicate { resource: String, field: String },
    /// A collaborator outside the core failed (502 Bad Gateway)
    ExternalServiceError { service: String, message: String },
    /// Anything else (500 Internal Server Error)
    InternalError { message: String },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::ValidationError { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            BusinessError::BusinessRuleViolation { rule, message } => {
                write!(f, "Business rule '{rule}' violated: {message}")
            }
            BusinessError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            BusinessError::Duplicate { resource, field } => {
                write!(f, "{resource} with this {field} already exists")
            }
            BusinessError::ExternalServiceError { service, message } => {
                write!(f, "External service '{service}' error: {message}")
            }
            BusinessError::InternalError { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for BusinessError {}

impl BusinessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BusinessError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            BusinessError::BusinessRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BusinessError::NotFound { .. } => StatusCode::NOT_FOUND,
            BusinessError::Duplicate { .. } => StatusCode::CONFLICT,
            BusinessError::ExternalServiceError { .. } => StatusCode::BAD_GATEWAY,
            BusinessError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            BusinessError::ValidationError { .. } => "VALIDATION_ERROR",
            BusinessError::BusinessRuleViolation { .. } => "BUSINESS_RULE_VIOLATION",
            BusinessError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            BusinessError::Duplicate { .. } => "DUPLICATE_RESOURCE",
            BusinessError::ExternalServiceError { .. } => "EXTERNAL_SERVICE_ERROR",
            BusinessError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            BusinessError::ValidationError { .. } => "ValidationError",
            BusinessError::BusinessRuleViolation { .. } => "BusinessRuleViolation",
            BusinessError::NotFound { .. } => "NotFound",
            BusinessError::Duplicate { .. } => "Duplicate",
            BusinessError::ExternalServiceError { .. } => "ExternalServiceError",
            BusinessError::InternalError { .. } => "InternalError",
        }
    }
}

/// Convert `BusinessError` to HTTP responses
impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        if matches!(self, BusinessError::InternalError { .. }) {
            tracing::error!("{self}");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "type": self.type_name(),
            }
        }));

        (self.status_code(), body).into_response()
    }
}

/// Maps storage errors onto the business taxonomy
pub struct ErrorMapper;

impl ErrorMapper {
    pub fn map_db_error(err: DbErr, context: &str) -> BusinessError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                return BusinessError::Duplicate {
                    resource: Self::resource_from_context(context),
                    field: Self::field_from_constraint(&msg),
                };
            }
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return BusinessError::ValidationError {
                    field: Self::field_from_constraint(&msg),
                    message: "references a record that does not exist".to_string(),
                };
            }
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(msg) => BusinessError::NotFound {
                resource: Self::resource_from_context(context),
                id: Self::id_from_message(&msg),
            },
            DbErr::Custom(msg) => {
                if let Some(rest) = msg.strip_prefix("Validation failed:") {
                    let rest = rest.trim();
                    let field = rest
                        .split_whitespace()
                        .next()
                        .unwrap_or("unknown")
                        .to_string();
                    BusinessError::ValidationError {
                        field,
                        message: rest.to_string(),
                    }
                } else {
                    BusinessError::InternalError { message: msg }
                }
            }
            DbErr::Conn(conn_err) => BusinessError::ExternalServiceError {
                service: "database".to_string(),
                message: conn_err.to_string(),
            },
            other => BusinessError::InternalError {
                message: other.to_string(),
            },
        }
    }

    fn resource_from_context(context: &str) -> String {
        context.replace('_', " ")
    }

    fn id_from_message(msg: &str) -> String {
        msg.split_whitespace()
            .map(|word| word.trim_matches(|c: char| c == '\'' || c == '"'))
            .find(|word| Uuid::parse_str(word).is_ok())
            .map_or_else(|| "unknown".to_string(), ToString::to_string)
    }

    /// Pulls a column name out of SQLite ("UNIQUE constraint failed: t.col")
    /// or Postgres ("... constraint \"uq_t_col\"") messages
    fn field_from_constraint(msg: &str) -> String {
        if let Some((_, columns)) = msg.split_once("failed:") {
            return columns
                .split(',')
                .filter_map(|c| c.trim().rsplit('.').next())
                .collect::<Vec<_>>()
                .join(", ");
        }
        if let Some(start) = msg.find('"') {
            if let Some(len) = msg[start + 1..].find('"') {
                return msg[start + 1..start + 1 + len].to_string();
            }
        }
        "field".to_string()
    }
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::BusinessError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! business_rule_violation {
    ($rule:expr, $message:expr) => {
        $crate::common::errors::BusinessError::BusinessRuleViolation {
            rule: $rule.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::common::errors::BusinessError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}

#[macro_export]
macro_rules! duplicate_resource {
    ($resource:expr, $field:expr) => {
        $crate::common::errors::BusinessError::Duplicate {
            resource: $resource.to_string(),
            field: $field.to_string(),
        }
    };
}

/// Extension trait to add business error conversion to `DbErr`
pub trait DbErrorExt {
    fn to_business_error(self, context: &str) -> BusinessError;
}

impl DbErrorExt for DbErr {
    fn to_business_error(self, context: &str) -> BusinessError {
        ErrorMapper::map_db_error(self, context)
    }
}

impl From<DbErr> for BusinessError {
    fn from(err: DbErr) -> Self {
        ErrorMapper::map_db_error(err, "record")
    }
}

pub type BusinessResult<T> = Result<T, BusinessError>;
