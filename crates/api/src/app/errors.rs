use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use rolegate_identity::IdentityError;

/// Maps an identity failure to the HTTP response the client sees.
///
/// Provider failures stay opaque: the detail goes to the log, the body
/// carries a generic message.
pub fn identity_error_response(err: IdentityError) -> axum::response::Response {
    let status = match err {
        IdentityError::Validation(_)
        | IdentityError::UnknownRole(_)
        | IdentityError::EmailTaken
        | IdentityError::PasswordMismatch => StatusCode::BAD_REQUEST,
        IdentityError::InvalidCredentials | IdentityError::AccountInactive => {
            StatusCode::UNAUTHORIZED
        }
        IdentityError::NotFound => StatusCode::NOT_FOUND,
        IdentityError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("{err}");
        return json_error(status, "Internal server error");
    }

    json_error(status, err.to_string())
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}
