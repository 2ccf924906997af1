//! Requester-identity extraction.
//!
//! Resolution endpoints accept anonymous traffic, so identity is optional:
//! a valid `Authorization: Bearer <jwt>` header yields a [`RequesterIdentity`],
//! anything else yields `None`. The share-creation endpoint turns `None` into
//! a 401 at the handler level.

use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::structs::RequesterIdentity;
use crate::utils::normalize_email;

/// Session token claims issued by the Linkmark auth front end.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a session token. Used by the auth service and by tests.
    pub fn issue(&self, user_id: i64, email: &str, ttl_minutes: i64) -> Option<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).ok()
    }

    pub fn verify(&self, token: &str) -> Option<AccessClaims> {
        decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

/// Extract the requester identity from a request, if any.
///
/// Expired, malformed or missing tokens all map to an anonymous requester;
/// the policy evaluator decides whether anonymity is acceptable.
pub fn identity_from_request(req: &HttpRequest, jwt: &JwtService) -> Option<RequesterIdentity> {
    let header = req.headers().get("Authorization")?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?;

    match jwt.verify(token) {
        Some(claims) => Some(RequesterIdentity {
            id: claims.sub,
            email: normalize_email(&claims.email),
        }),
        None => {
            debug!("Rejected bearer token on {}", req.path());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrip() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.issue(42, "user@x.com", 30).unwrap();

        let claims = jwt.verify(&token).expect("token should verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@x.com");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");

        let token = issuer.issue(1, "user@x.com", 30).unwrap();
        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.issue(1, "user@x.com", -5).unwrap();
        assert!(jwt.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_garbage() {
        let jwt = JwtService::new("test-secret");
        assert!(jwt.verify("not-a-jwt").is_none());
    }
}
