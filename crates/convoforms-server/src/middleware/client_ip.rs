//! Client address resolution for the activity log.

use axum::Router;
use axum_client_ip::ClientIpSource;
#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Where the client address is read from.
///
/// Behind a reverse proxy the socket address is the proxy's, so the
/// header it sets must be trusted instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ClientIpHeader {
    /// Peer address of the TCP connection.
    #[default]
    ConnectInfo,
    /// Rightmost address of `X-Forwarded-For`.
    RightmostXForwardedFor,
    /// Rightmost `for=` of the `Forwarded` header.
    RightmostForwarded,
    /// `X-Real-Ip`, as set by nginx.
    XRealIp,
    /// `CF-Connecting-IP`, as set by Cloudflare.
    CfConnectingIp,
    /// `Fly-Client-IP`, as set by Fly.io.
    FlyClientIp,
}

impl From<ClientIpHeader> for ClientIpSource {
    fn from(header: ClientIpHeader) -> Self {
        match header {
            ClientIpHeader::ConnectInfo => Self::ConnectInfo,
            ClientIpHeader::RightmostXForwardedFor => Self::RightmostXForwardedFor,
            ClientIpHeader::RightmostForwarded => Self::RightmostForwarded,
            ClientIpHeader::XRealIp => Self::XRealIp,
            ClientIpHeader::CfConnectingIp => Self::CfConnectingIp,
            ClientIpHeader::FlyClientIp => Self::FlyClientIp,
        }
    }
}

/// Client address configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ClientIpConfig {
    /// Source of the client address recorded in the activity log.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CLIENT_IP_SOURCE", value_enum, default_value = "connect-info")
    )]
    pub client_ip_source: ClientIpHeader,
}

/// Extension trait for `axum::`[`Router`] to configure client address lookup.
pub trait RouterClientIpExt<S> {
    /// Makes the configured source available to the client address extractor.
    ///
    /// `ConnectInfo` additionally requires the server to be started with
    /// `into_make_service_with_connect_info`.
    fn with_client_ip(self, config: &ClientIpConfig) -> Self;
}

impl<S> RouterClientIpExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_client_ip(self, config: &ClientIpConfig) -> Self {
        let source = ClientIpSource::from(config.client_ip_source);
        self.layer(source.into_extension())
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum_client_ip::ClientIp;
    use axum_test::TestServer;

    use super::*;

    async fn echo_ip(ClientIp(ip): ClientIp) -> String {
        ip.to_string()
    }

    #[test]
    fn maps_every_header() {
        assert!(matches!(
            ClientIpSource::from(ClientIpHeader::XRealIp),
            ClientIpSource::XRealIp
        ));
        assert!(matches!(
            ClientIpSource::from(ClientIpHeader::default()),
            ClientIpSource::ConnectInfo
        ));
    }

    #[tokio::test]
    async fn reads_configured_header() -> anyhow::Result<()> {
        let config = ClientIpConfig {
            client_ip_source: ClientIpHeader::XRealIp,
        };
        let app: Router = Router::new()
            .route("/ip", get(echo_ip))
            .with_client_ip(&config);
        let server = TestServer::new(app)?;

        let response = server.get("/ip").add_header("x-real-ip", "203.0.113.7").await;
        response.assert_status_ok();
        response.assert_text("203.0.113.7");
        Ok(())
    }
}
