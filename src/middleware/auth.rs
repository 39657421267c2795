//! Middleware de autenticación JWT
//!
//! Extrae el token Bearer, lo verifica e inyecta `AuthenticatedUser` en
//! las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::errors::AppError,
    utils::jwt::{extract_token_from_header, verify_token, JwtConfig},
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Middleware de autenticación JWT
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &JwtConfig::from(&state.config))
        .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

    let authenticated_user = AuthenticatedUser {
        user_id: claims.user_id()?,
        email: claims.email,
    };
    tracing::debug!("🔑 Request autenticada para {}", authenticated_user.email);

    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}
