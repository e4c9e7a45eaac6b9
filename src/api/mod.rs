pub mod v1;

use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Every route the service exposes, with rejections rendered as JSON.
pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    warp::path("backend")
        .and(warp::path("v1"))
        .and(v1::routes(server))
        .recover(v1::recover_error)
        .with(warp::trace::request())
}
