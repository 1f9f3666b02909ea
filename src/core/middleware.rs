use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::core::app_error::AppError;

/// Header carrying the authenticated principal id. Session validation happens
/// at the gateway; this service only trusts the forwarded identity.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn principal_id(headers: &HeaderMap) -> Option<i32> {
    headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Rejects requests without a forwarded principal and exposes the id as an
/// `Extension<i32>` for handlers behind this layer.
pub async fn user_authorization(mut request: Request, next: Next) -> Result<Response, AppError> {
    let Some(user_id) = principal_id(request.headers()) else {
        return Err(AppError::Unauthorized);
    };
    request.extensions_mut().insert(user_id);
    Ok(next.run(request).await)
}
