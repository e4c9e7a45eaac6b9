use crate::application_port::{CodecError, TokenCodec};
use crate::domain_model::{TokenKind, UserId};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id as decimal string
    exp: i64,
    iat: i64,
    typ: TokenKind,
    jti: String, // keeps tokens minted within the same second distinct
}

pub struct JwtHs512Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs512Codec {
    pub fn try_new(signing_key: &[u8]) -> Result<Self, CodecError> {
        if signing_key.is_empty() {
            return Err(CodecError::Signing("signing key is empty".to_string()));
        }

        // Expiry is checked by hand so that an expired token can still
        // report its (signature-verified) subject.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(JwtHs512Codec {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        })
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl TokenCodec for JwtHs512Codec {
    fn issue_at(
        &self,
        user: UserId,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, CodecError> {
        if ttl.is_zero() {
            return Err(CodecError::Signing("ttl must be positive".to_string()));
        }
        let ttl = TimeDelta::from_std(ttl).map_err(|e| CodecError::Signing(e.to_string()))?;
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| CodecError::Signing("expiry out of range".to_string()))?;

        let claims = Claims {
            sub: user.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            typ: kind,
            jti: Self::gen_jti(),
        };
        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| CodecError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<UserId, CodecError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| CodecError::Malformed)?
            .claims;

        if claims.typ != kind {
            return Err(CodecError::WrongKind { expected: kind });
        }
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| CodecError::Malformed)?;

        // `exp` has whole-second precision; the token stays valid through
        // the second it names.
        if Utc::now().timestamp() > claims.exp {
            return Err(CodecError::Expired { user_id });
        }

        Ok(user_id)
    }
}
