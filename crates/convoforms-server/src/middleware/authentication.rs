use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthState;

/// Requires a verified bearer token to proceed with the request.
///
/// The verified [`AuthState`] is cached in the request extensions, so the
/// handler extracting it again does not verify the token twice.
///
/// ```rust,ignore
/// use axum::middleware::from_fn_with_state;
/// use convoforms_server::middleware::require_authentication;
///
/// let router = router.route_layer(from_fn_with_state(state, require_authentication));
/// ```
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
