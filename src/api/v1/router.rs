use super::error::*;
use super::handler;
use crate::application_port::TokenService;
use crate::domain_model::{AccessToken, UserId};
use crate::server::*;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let generate = warp::path("tokens")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<handler::GenerateRequest>())
        .and(with(server.identity_verifier.clone()))
        .and(with(server.token_service.clone()))
        .and_then(handler::generate);

    let refresh = warp::path!("tokens" / "self")
        .and(warp::put())
        .and(json_body::<handler::RefreshRequest>())
        .and(with(server.token_service.clone()))
        .and_then(handler::refresh);

    let invalidate = warp::path!("tokens" / "self")
        .and(warp::delete())
        .and(with_verification(server.token_service.clone()))
        .and(with(server.token_service.clone()))
        .and_then(handler::invalidate);

    generate.or(refresh).or(invalidate)
}

fn json_body<T: DeserializeOwned + Send>()
-> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    token_service: Arc<dyn TokenService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let token_service = token_service.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let user_id = token_service
                    .authenticate(&AccessToken(token.to_string()))
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(user_id)
            } else {
                Err(reject::custom(ApiErrorCode::Unauthenticated))
            }
        }
    })
}
