use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, error};
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if let Some(missing) = err.find::<reject::MissingHeader>() {
        debug!(header = missing.name(), "missing header");
        ApiErrorCode::Unauthenticated
    } else if err.find::<BodyDeserializeError>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
        || err.find::<reject::PayloadTooLarge>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
    {
        ApiErrorCode::BadRequest
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else {
        error!("Unhandled rejection: {:?}", err);
        ApiErrorCode::InternalError
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
pub enum ApiErrorCode {
    #[error("Malformed request")]
    BadRequest,
    #[error("Identity credential rejected")]
    InvalidCredential,
    #[error("User is not registered")]
    UnknownSubject,
    #[error("Missing, expired or invalid token")]
    Unauthenticated,
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        error!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UnknownSubject => StatusCode::NOT_FOUND,
            ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UnknownSubject => ApiErrorCode::UnknownSubject,
            AuthError::Unauthenticated(reason) => {
                debug!(%reason, "request not authenticated");
                ApiErrorCode::Unauthenticated
            }
            AuthError::Infrastructure(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<IdentityError> for ApiErrorCode {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::Rejected(reason) => {
                debug!(%reason, "identity credential rejected");
                ApiErrorCode::InvalidCredential
            }
            IdentityError::Unavailable(e) => ApiErrorCode::internal(e),
        }
    }
}
