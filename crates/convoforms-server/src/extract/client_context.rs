use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum_client_ip::ClientIp;
use convoforms_access::RequestContext;
use derive_more::{Deref, DerefMut};

use crate::service::UserAgentParser;

/// Client address and user agent of the current request.
///
/// Never rejects: unknown values are simply left out of the activity log.
/// The address is resolved by [`ClientIp`], so the router needs a
/// `ClientIpSource` extension for it to be present.
#[derive(Debug, Clone, Default, Deref, DerefMut)]
pub struct ClientContext(pub RequestContext);

impl<S> FromRequestParts<S> for ClientContext
where
    UserAgentParser: FromRef<S>,
    S: Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let mut ctx = RequestContext::new();

        if let Ok(ClientIp(ip)) = ClientIp::from_request_parts(parts, state).await {
            ctx = ctx.with_ip_address(ip);
        }

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(user_agent) = user_agent {
            let parser = UserAgentParser::from_ref(state);
            if let Some(client) = parser.describe(user_agent) {
                ctx = ctx.with_client(client);
            }

            ctx = ctx.with_user_agent(user_agent);
        }

        Ok(Self(ctx))
    }
}

impl aide::OperationInput for ClientContext {}
