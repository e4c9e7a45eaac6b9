use super::error::*;
use crate::application_port::{IdentityVerifier, TokenService};
use crate::domain_model::{AccessToken, RefreshToken, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Credential issued by the external identity provider.
    pub token: String,
}

pub async fn generate(
    body: GenerateRequest,
    identity_verifier: Arc<dyn IdentityVerifier>,
    token_service: Arc<dyn TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let identity = identity_verifier
        .verify(&body.token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let token_pair = token_service
        .generate(&identity.email)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(token_pair)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: RefreshToken,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: AccessToken,
}

pub async fn refresh(
    body: RefreshRequest,
    token_service: Arc<dyn TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let access_token = token_service
        .refresh_with_token(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(RefreshResponse {
        access_token,
    })))
}

pub async fn invalidate(
    user_id: UserId,
    token_service: Arc<dyn TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    token_service
        .invalidate(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
