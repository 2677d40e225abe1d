use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{patch, post},
};
use vouch::{EndorsementId, EndorsementUpdate, Vouch};
use vouch_core::RepositoryProvider;

use crate::{
    error::{ApiError, Result},
    extractors::SessionTokenFromCookie,
    types::*,
};

pub struct AccessState<R: RepositoryProvider> {
    pub vouch: Arc<Vouch<R>>,
}

impl<R: RepositoryProvider> Clone for AccessState<R> {
    fn clone(&self) -> Self {
        Self {
            vouch: self.vouch.clone(),
        }
    }
}

pub fn create_router<R>(vouch: Arc<Vouch<R>>, cookie_config: CookieConfig) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AccessState { vouch };

    Router::new()
        .route("/access/request-code", post(request_code_handler))
        .route("/access/verify-code", post(verify_code_handler))
        .route(
            "/endorsements/{id}",
            patch(update_endorsement_handler).delete(delete_endorsement_handler),
        )
        .with_state(state)
        .layer(axum::Extension(cookie_config))
}

/// Always answers `{"success": true}` (malformed email excepted): the
/// response must not reveal whether the record exists or the email matched.
async fn request_code_handler<R>(
    State(state): State<AccessState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    connection_info: ConnectionInfo,
    Json(payload): Json<RequestCodeRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .vouch
        .request_code(
            &EndorsementId::new(&payload.endorsement_id),
            &payload.email,
            connection_info.ip_key(),
        )
        .await
        .map_err(|e| ApiError::from_error(e, &cookie_config))?;

    Ok(Json(AckResponse::ok()))
}

async fn verify_code_handler<R>(
    State(state): State<AccessState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    connection_info: ConnectionInfo,
    Json(payload): Json<VerifyCodeRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let session = state
        .vouch
        .verify_code(
            &EndorsementId::new(&payload.endorsement_id),
            &payload.email,
            &payload.otp,
            connection_info.ip_key(),
        )
        .await
        .map_err(|e| ApiError::from_error(e, &cookie_config))?;

    let max_age = state.vouch.config().session_ttl.num_seconds();
    let cookie = cookie_config.session_cookie(&session.token, max_age);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AckResponse::ok()),
    ))
}

async fn update_endorsement_handler<R>(
    State(state): State<AccessState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    Path(id): Path<String>,
    connection_info: ConnectionInfo,
    SessionTokenFromCookie(token): SessionTokenFromCookie,
    Json(payload): Json<UpdateEndorsementRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let token = token.ok_or(ApiError::VerificationRequired)?;

    let update = EndorsementUpdate {
        author_name: payload.author_name,
        body: payload.body,
    };

    state
        .vouch
        .update_endorsement(
            &token,
            &EndorsementId::new(&id),
            &update,
            connection_info.ip_key(),
        )
        .await
        .map_err(|e| ApiError::from_error(e, &cookie_config))?;

    Ok(Json(AckResponse::ok()))
}

async fn delete_endorsement_handler<R>(
    State(state): State<AccessState<R>>,
    axum::Extension(cookie_config): axum::Extension<CookieConfig>,
    Path(id): Path<String>,
    connection_info: ConnectionInfo,
    SessionTokenFromCookie(token): SessionTokenFromCookie,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let token = token.ok_or(ApiError::VerificationRequired)?;

    state
        .vouch
        .delete_endorsement(&token, &EndorsementId::new(&id), connection_info.ip_key())
        .await
        .map_err(|e| ApiError::from_error(e, &cookie_config))?;

    Ok(Json(AckResponse::ok()))
}
