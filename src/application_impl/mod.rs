mod identity_verifier_fake;
mod identity_verifier_google;
mod jwt_codec;
mod token_service_impl;

pub use identity_verifier_fake::*;
pub use identity_verifier_google::*;
pub use jwt_codec::*;
pub use token_service_impl::*;
