mod identity_verifier;
mod token_service;

pub use identity_verifier::*;
pub use token_service::*;
