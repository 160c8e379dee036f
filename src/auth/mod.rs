use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;

pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Decoded payload of a signed token. Identity fields are optional because
/// refresh tokens carry only the subject and type marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: i64,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Claims {
    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(REFRESH_TOKEN_TYPE)
    }
}

/// Identity payload embedded into access tokens at login.
#[derive(Debug, Clone)]
pub struct AccessPayload {
    pub user_id: i64,
    pub role: String,
    pub email: String,
    pub institution_id: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token generation failed: {0}")]
    Generation(String),
    /// Covers malformed, expired, bad signature, and wrong issuer/audience.
    /// Deliberately undifferentiated so no detail leaks to the client.
    #[error("invalid token")]
    Invalid,
}

/// Issues and validates HS256-signed tokens. Built once at startup from
/// `JwtConfig` and shared through application state.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    issuer: String,
    audience: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    /// Short-lived token carrying the full identity payload for stateless
    /// authorization.
    pub fn issue_access(&self, payload: &AccessPayload) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: payload.user_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl)).timestamp(),
            role: Some(payload.role.clone()),
            email: Some(payload.email.clone()),
            institution_id: payload.institution_id,
            token_type: None,
        };
        self.sign(&claims)
    }

    /// Long-lived token carrying only the user id and the refresh marker;
    /// used solely to mint a new access token.
    pub fn issue_refresh(&self, user_id: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_ttl)).timestamp(),
            role: None,
            email: None,
            institution_id: None,
            token_type: Some(REFRESH_TOKEN_TYPE.to_string()),
        };
        self.sign(&claims)
    }

    /// Valid only if the signature verifies and issuer, audience, and expiry
    /// all check out. Every failure collapses to `TokenError::Invalid`.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::Generation("empty JWT secret".to_string()));
        }
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Generation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "unit-test-secret".to_string(),
            issuer: "campus-api".to_string(),
            audience: "campus-app".to_string(),
            access_ttl: 3600,
            refresh_ttl: 604800,
        })
    }

    fn payload() -> AccessPayload {
        AccessPayload {
            user_id: 42,
            role: "teacher".to_string(),
            email: "t@school.test".to_string(),
            institution_id: Some(7),
        }
    }

    #[test]
    fn access_token_round_trips() {
        let svc = service();
        let token = svc.issue_access(&payload()).unwrap();
        let claims = svc.validate(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role.as_deref(), Some("teacher"));
        assert_eq!(claims.email.as_deref(), Some("t@school.test"));
        assert_eq!(claims.institution_id, Some(7));
        assert!(!claims.is_refresh());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_invalid() {
        let mut expired = service();
        expired.access_ttl = -10;
        let token = expired.issue_access(&payload()).unwrap();
        assert!(matches!(service().validate(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let mut other = service();
        other.issuer = "someone-else".to_string();
        let token = other.issue_access(&payload()).unwrap();
        assert!(service().validate(&token).is_err());
    }

    #[test]
    fn wrong_audience_is_invalid() {
        let mut other = service();
        other.audience = "other-app".to_string();
        let token = other.issue_access(&payload()).unwrap();
        assert!(service().validate(&token).is_err());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let mut other = service();
        other.secret = "different-secret".to_string();
        let token = other.issue_access(&payload()).unwrap();
        assert!(service().validate(&token).is_err());
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(service().validate("not.a.jwt").is_err());
    }

    #[test]
    fn refresh_token_carries_only_the_marker() {
        let svc = service();
        let token = svc.issue_refresh(42).unwrap();
        let claims = svc.validate(&token).unwrap();
        assert!(claims.is_refresh());
        assert_eq!(claims.sub, 42);
        assert!(claims.role.is_none());
        assert!(claims.email.is_none());
        assert_eq!(claims.exp - claims.iat, 604800);
    }
}
