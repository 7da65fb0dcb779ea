use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{decode_token, SessionContext};
use crate::error::ApiError;

/// Resolves the caller session from the Authorization header and injects a
/// `SessionContext` extension for the handlers.
pub async fn session_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let token = match extract_bearer(&headers) {
        Ok(token) => token,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    let claims = match decode_token(&token) {
        Ok(claims) => claims,
        Err(err) => return ApiError::unauthorized(err.to_string()).into_response(),
    };

    request.extensions_mut().insert(SessionContext::from(claims));
    next.run(request).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
