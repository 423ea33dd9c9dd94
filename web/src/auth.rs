use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    app_data::AppData,
    app_error::AppError,
    mongo::withid::{parse_id, Id, WithId},
    stores::{Role, User},
    utils::{config::Config, result::Result, simple_error},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn id(&self) -> Option<Id> {
        parse_id(&self.user_id)
    }
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiration_hours)
    }

    pub fn issue(&self, user: &WithId<User>) -> Result<String> {
        let iat = Utc::now();
        let claims = Claims {
            user_id: user.0.to_hex(),
            role: user.1.role,
            iat: iat.timestamp(),
            exp: (iat + self.lifetime).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        Ok(decode::<Claims>(token, &self.decoding, &Validation::default())?.claims)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| simple_error!("cannot hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn reset_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn claims(req: &HttpRequest) -> std::result::Result<Claims, AppError> {
    let token = bearer(req).ok_or_else(|| AppError::unauthorized("No token provided"))?;
    let st = req
        .app_data::<web::Data<AppData>>()
        .ok_or_else(|| AppError::unauthorized("Invalid token"))?;
    st.keys.verify(token).map_err(|e| {
        log::debug!(target: "zetta", "rejected token: {}", e);
        AppError::unauthorized("Invalid token")
    })
}

#[derive(Debug)]
pub struct AdminUser(pub Claims);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(claims(req).and_then(|claims| {
            if claims.role == Role::Admin {
                Ok(AdminUser(claims))
            } else {
                Err(AppError::forbidden("Admin access required"))
            }
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn admin() -> WithId<User> {
        WithId(
            Id::new(),
            User::new("A".into(), "a@example.com".into(), String::new(), Role::Admin),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = JwtKeys::new("secret", 24);
        let user = admin();
        let claims = keys.verify(&keys.issue(&user).unwrap()).unwrap();
        assert_eq!(Some(user.0), claims.id());
        assert_eq!(Role::Admin, claims.role);
        assert_eq!(24 * 3600, claims.exp - claims.iat);
    }

    #[test]
    fn test_wrong_secret() {
        let token = JwtKeys::new("secret", 1).issue(&admin()).unwrap();
        assert!(JwtKeys::new("other", 1).verify(&token).is_err());
    }

    #[test]
    fn test_password_hash() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "plain"));
    }

    #[test]
    fn test_reset_token() {
        let token = reset_token();
        assert_eq!(64, token.len());
        assert_ne!(token, reset_token());
    }
}
