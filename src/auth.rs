use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::role;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn is_staff(&self) -> bool {
        self.role == role::LANDLORD || self.role == role::ADMIN
    }
}

pub fn sign_token(secret: &str, ttl_hours: i64, user_id: Uuid, user_role: &str) -> AppResult<String> {
    let claims = Claims {
        sub: user_id,
        role: user_role.to_string(),
        exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Resolve the caller from the `Authorization: Bearer …` header.
pub fn require_user(state: &AppState, headers: &HeaderMap) -> AppResult<Claims> {
    let raw = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Missing token".to_string()));
    }
    decode_token(&state.config.jwt_secret, token)
}

pub fn require_role(claims: &Claims, allowed_roles: &[&str]) -> AppResult<()> {
    if allowed_roles.contains(&claims.role.as_str()) {
        return Ok(());
    }
    Err(AppError::Forbidden("Forbidden".to_string()))
}

pub fn hash_password(plain: &str) -> AppResult<String> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(plain: &str, hashed: &str) -> AppResult<bool> {
    Ok(bcrypt::verify(plain, hashed)?)
}

/// One-time tenant password, disclosed once at creation: `Tenant@` plus six
/// random digits.
pub fn generate_tenant_password() -> String {
    let digits: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("Tenant@{digits}")
}

#[cfg(test)]
mod tests {
    use super::{decode_token, generate_tenant_password, require_role, sign_token, Claims};
    use uuid::Uuid;

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = sign_token("test-secret", 1, user_id, "landlord").expect("signed token");
        let claims = decode_token("test-secret", &token).expect("decoded claims");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "landlord");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = sign_token("secret-a", 1, Uuid::new_v4(), "tenant").expect("signed token");
        assert!(decode_token("secret-b", &token).is_err());
    }

    #[test]
    fn role_guard_checks_membership() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "tenant".to_string(),
            exp: i64::MAX,
        };
        assert!(require_role(&claims, &["tenant"]).is_ok());
        assert!(require_role(&claims, &["landlord", "admin"]).is_err());
        assert!(!claims.is_staff());
    }

    #[test]
    fn generated_password_has_expected_shape() {
        let password = generate_tenant_password();
        let digits = password.strip_prefix("Tenant@").expect("prefix present");
        assert_eq!(digits.len(), 6);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
