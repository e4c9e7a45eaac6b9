mod error;
mod handler;
mod router;

pub use error::{ApiError, ApiErrorCode, recover_error};
pub use handler::{ApiResponse, GenerateRequest, RefreshRequest, RefreshResponse};
pub use router::routes;
