use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts},
};

use crate::domain::rating::Provenance;

const FORWARDED_FOR: &str = "x-forwarded-for";

impl<S> FromRequestParts<S> for Provenance
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        Ok(Provenance {
            ip_address: forwarded.or(peer),
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Provenance {
        let (mut parts, _) = request.into_parts();
        match Provenance::from_request_parts(&mut parts, &()).await {
            Ok(provenance) => provenance,
            Err(never) => match never {},
        }
    }

    #[tokio::test]
    async fn test_forwarded_for_takes_precedence() {
        let mut request = Request::builder()
            .header(FORWARDED_FOR, "203.0.113.9, 10.0.0.2")
            .header(USER_AGENT, "BikeApp/2.0")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        let provenance = extract(request).await;

        assert_eq!(provenance.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(provenance.user_agent.as_deref(), Some("BikeApp/2.0"));
    }

    #[tokio::test]
    async fn test_falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 0, 12], 51000))));

        let provenance = extract(request).await;

        assert_eq!(provenance.ip_address.as_deref(), Some("192.168.0.12"));
        assert_eq!(provenance.user_agent, None);
    }

    #[tokio::test]
    async fn test_missing_everything() {
        let provenance = extract(Request::builder().body(()).unwrap()).await;

        assert_eq!(provenance, Provenance::default());
    }
}
