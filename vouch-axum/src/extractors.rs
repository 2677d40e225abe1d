use std::net::SocketAddr;

use axum::{
    RequestPartsExt,
    extract::{ConnectInfo, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use axum_extra::{TypedHeader, extract::CookieJar, headers::UserAgent};

use crate::types::{ConnectionInfo, CookieConfig};

impl<S> FromRequestParts<S> for ConnectionInfo
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .extract::<Option<TypedHeader<UserAgent>>>()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid user agent header"))?
            .map(|ua| ua.to_string());

        // Prefer the proxy-provided address; fall back to the socket peer
        let forwarded_ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.split(',').next())
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty());

        let ip = match forwarded_ip {
            Some(ip) => Some(ip),
            None => parts
                .extract::<ConnectInfo<SocketAddr>>()
                .await
                .ok()
                .map(|addr| addr.ip().to_string()),
        };

        Ok(ConnectionInfo { ip, user_agent })
    }
}

/// The session token presented with a privileged request, if any.
pub struct SessionTokenFromCookie(pub Option<String>);

impl<S> FromRequestParts<S> for SessionTokenFromCookie
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookie_name = parts
            .extensions
            .get::<CookieConfig>()
            .map(|config| config.name.clone())
            .unwrap_or_else(|| crate::types::SESSION_COOKIE.to_string());

        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid cookie header"))?;

        let token = jar
            .get(&cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty());

        Ok(SessionTokenFromCookie(token))
    }
}
