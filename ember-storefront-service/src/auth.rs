use axum::http::HeaderMap;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UserRole;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: usize,
    iat: usize,
    sub: String,
}

#[derive(Clone)]
pub struct AuthKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub access_token_expires: TimeDelta,
}

pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

impl AuthKeys {
    pub fn new(secret_key: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_ref()),
            decoding_key: DecodingKey::from_secret(secret_key.as_ref()),
            access_token_expires: TimeDelta::hours(8),
        }
    }

    pub fn from_env() -> Self {
        let secret_key = std::env::var("SECRET_KEY").expect("SECRET_KEY must be set");
        Self::new(&secret_key)
    }

    pub fn issue(&self, user_id: &Uuid) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            exp: (now + self.access_token_expires).timestamp() as usize,
            iat: now.timestamp() as usize,
            sub: user_id.to_string(),
        };
        let access_token =
            jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)?;
        Ok(IssuedToken {
            access_token,
            expires_in: self.access_token_expires.num_seconds(),
        })
    }

    /// Returns the subject of a valid, unexpired token. Anything else is `None`.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &jsonwebtoken::Validation::default(),
        )
        .ok()?;
        Uuid::parse_str(&data.claims.sub).ok()
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// What the current request is allowed to do. Every resolution failure
/// collapses to `Anonymous`, so a broken token can never reach gated routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Customer(Uuid),
    Admin(Uuid),
}

impl Session {
    pub fn from_role(user_id: Uuid, role: UserRole) -> Self {
        match role {
            UserRole::Customer => Session::Customer(user_id),
            UserRole::Admin => Session::Admin(user_id),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Session::Anonymous => None,
            Session::Customer(id) | Session::Admin(id) => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Session::Admin(_))
    }
}
