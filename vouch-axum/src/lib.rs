//! # Vouch Axum Integration
//!
//! Axum routes for the vouch endorsement self-service flow:
//!
//! - `POST /access/request-code` — email a one-time code to the endorsement's
//!   address. Answers `{"success": true}` no matter what.
//! - `POST /access/verify-code` — exchange a code for the session cookie.
//! - `PATCH /endorsements/{id}` / `DELETE /endorsements/{id}` — mutate the
//!   endorsement under the session cookie.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use vouch::{Vouch, VouchMailerService, MemoryRepositoryProvider};
//! use vouch_core::AccessConfig;
//! use vouch_axum::CookieConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = Arc::new(MemoryRepositoryProvider::new());
//!     let config = AccessConfig::from_env()?;
//!     let cookie_config = CookieConfig::for_environment(config.environment);
//!     let mailer = Arc::new(VouchMailerService::from_env()?);
//!     let vouch = Arc::new(Vouch::new(repositories, config, mailer));
//!
//!     let access_routes = vouch_axum::routes(vouch)
//!         .with_cookie_config(cookie_config)
//!         .build();
//!
//!     let app = Router::new().merge(access_routes);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod routes;
mod types;

pub use error::ApiError;
pub use extractors::SessionTokenFromCookie;
pub use routes::create_router;
pub use types::{
    AckResponse, ConnectionInfo, CookieConfig, CookieSameSite, RequestCodeRequest,
    SESSION_COOKIE, UpdateEndorsementRequest, VerifyCodeRequest,
};

use axum::Router;
use std::sync::Arc;
use vouch::Vouch;
use vouch_core::RepositoryProvider;

/// Create the access routes for your Axum application.
pub fn routes<R>(vouch: Arc<Vouch<R>>) -> AccessRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AccessRouterBuilder {
        vouch,
        cookie_config: CookieConfig::default(),
    }
}

/// Builder for configuring the access routes
pub struct AccessRouterBuilder<R: RepositoryProvider> {
    vouch: Arc<Vouch<R>>,
    cookie_config: CookieConfig,
}

impl<R: RepositoryProvider + 'static> AccessRouterBuilder<R> {
    /// Set custom cookie configuration
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        create_router(self.vouch, self.cookie_config)
    }
}

impl<R: RepositoryProvider + 'static> From<AccessRouterBuilder<R>> for Router {
    fn from(builder: AccessRouterBuilder<R>) -> Self {
        builder.build()
    }
}
