use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use emporium::Emporium;
use emporium_core::repositories::RepositoryProvider;

use crate::{error::ApiError, extractors::BearerToken};

pub struct AppState<R: RepositoryProvider> {
    pub emporium: Arc<Emporium<R>>,
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            emporium: self.emporium.clone(),
        }
    }
}

/// Reject requests without a valid bearer token issued by `/login`.
///
/// On success the token's claims are stored as a request extension.
pub async fn require_auth<R>(
    State(state): State<AppState<R>>,
    BearerToken(token): BearerToken,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    let token = token.ok_or(ApiError::Unauthorized)?;
    let claims = state.emporium.verify_token(&token)?;

    tracing::debug!(user_id = %claims.sub, "Authenticated request");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
