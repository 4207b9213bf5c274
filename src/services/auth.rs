use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    config::Config,
    db::NewsStore,
    error::{AppError, AppResult},
    models::{LoginInput, SignupInput, User, UserDto, UserWithToken},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
}

/// Account creation, login and bearer-token validation
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn NewsStore>,
    jwt_secret: String,
    jwt_expires_in_hours: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn NewsStore>, config: &Config) -> Self {
        Self::with_secret(store, config.jwt_secret.clone(), config.jwt_expires_in_hours)
    }

    pub fn with_secret(
        store: Arc<dyn NewsStore>,
        jwt_secret: String,
        jwt_expires_in_hours: i64,
    ) -> Self {
        Self {
            store,
            jwt_secret,
            jwt_expires_in_hours,
        }
    }

    /// Creates the account and logs it in
    #[instrument(name = "auth.signup", skip(self, input), fields(username = %input.username))]
    pub async fn signup(&self, input: SignupInput) -> AppResult<UserWithToken> {
        input.validate().map_err(AppError::InvalidInput)?;
        let username = input.username.trim();

        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Nome de usuário já existe.".to_string()));
        }

        let password_hash = self.hash_password(&input.password1)?;
        let user = self.store.create_user(username, &password_hash).await?;

        tracing::info!(user_id = user.id, "User signed up");
        self.with_token(&user)
    }

    #[instrument(name = "auth.login", skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> AppResult<UserWithToken> {
        let user = self
            .store
            .find_user_by_username(input.username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        self.verify_password(&input.password, &user.password_hash)?;

        tracing::info!(user_id = user.id, "User logged in");
        self.with_token(&user)
    }

    /// Returns the user id carried by a valid token
    pub fn validate_token(&self, token: &str) -> AppResult<i64> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims.sub)
    }

    fn with_token(&self, user: &User) -> AppResult<UserWithToken> {
        Ok(UserWithToken {
            user: UserDto::from(user),
            token: self.generate_token(user.id)?,
        })
    }

    fn generate_token(&self, user_id: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.jwt_expires_in_hours);

        let claims = Claims {
            sub: user_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<()> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid hash: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::InvalidCredentials)
    }
}
