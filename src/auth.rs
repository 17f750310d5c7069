use crate::error::AppError;
use argon2::Argon2;
use axum::{
    async_trait,
    extract::FromRequestParts,
    headers::{authorization::Bearer, Authorization},
    http::{request::Parts, StatusCode},
    TypedHeader,
};
use jsonwebtoken::{
    errors::Result as JwtResult, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use password_hash::{
    self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use serde::{Deserialize, Serialize};
use std::{ops::Deref, time::Duration};

pub fn hash_password(password: impl AsRef<[u8]>) -> password_hash::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_ref(), &salt)
        .map(|h| h.to_string())
}

pub fn verify_password(
    password: impl AsRef<[u8]>,
    password_hash: impl AsRef<str>,
) -> password_hash::Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash.as_ref())?;
    Ok(Argon2::default()
        .verify_password(password.as_ref(), &parsed_hash)
        .is_ok())
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

lazy_static::lazy_static! {
    static ref KEYS: Keys = {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        Keys {
            encoding: EncodingKey::from_base64_secret(&secret).expect("JWT_SECRET is not valid base64"),
            decoding: DecodingKey::from_base64_secret(&secret).expect("JWT_SECRET is not valid base64"),
        }
    };
}

/// Tokens expire one hour after they are minted.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    pub username: String,
    pub exp: u64,
}

#[allow(unused_must_use)]
pub fn ensure_jwt_secret_is_valid() {
    KEYS.deref();
}

pub fn generate_jwt(user_id: i32, username: &str, exp: Duration) -> JwtResult<String> {
    jsonwebtoken::encode(
        &Header::default(),
        &Claims {
            user_id,
            username: username.to_string(),
            exp: jsonwebtoken::get_current_timestamp() + exp.as_secs(),
        },
        &KEYS.encoding,
    )
}

pub fn validate_jwt(token: &str) -> JwtResult<TokenData<Claims>> {
    jsonwebtoken::decode::<Claims>(token, &KEYS.decoding, &Validation::default())
}

/// Bearer-token gate for protected routes. A missing or unreadable
/// `Authorization` header is a 401, a token that fails signature or expiry
/// checks is a 403.
pub struct ExtractAuth(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ExtractAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::from(StatusCode::UNAUTHORIZED, "missing bearer token"))?;

        let token = validate_jwt(bearer.token())
            .map_err(|_| AppError::from(StatusCode::FORBIDDEN, "invalid or expired token"))?;

        Ok(ExtractAuth(token.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_secret() {
        // base64 of a throwaway test secret
        std::env::set_var("JWT_SECRET", "dGVzdC1zZWNyZXQ=");
    }

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn jwt_roundtrip() {
        init_secret();
        let token = generate_jwt(42, "bookworm", TOKEN_LIFETIME).unwrap();
        let data = validate_jwt(&token).unwrap();
        assert_eq!(data.claims.user_id, 42);
        assert_eq!(data.claims.username, "bookworm");
    }

    #[test]
    fn garbage_token_is_rejected() {
        init_secret();
        assert!(validate_jwt("not.a.token").is_err());
    }

    #[test]
    fn claims_serialize_camel_case() {
        let claims = Claims {
            user_id: 7,
            username: "reader".to_string(),
            exp: 0,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["username"], "reader");
    }
}
