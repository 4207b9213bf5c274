use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithToken {
    pub user: UserDto,
    pub token: String,
}

/// Signup form, mirroring the classic username + password confirmation flow
#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl SignupInput {
    /// Returns the first validation problem, if any
    pub fn validate(&self) -> Result<(), String> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err("Nome de usuário é obrigatório.".to_string());
        }
        // VARCHAR(150) counts characters, not bytes
        if username.chars().count() > 150 {
            return Err("Nome de usuário muito longo.".to_string());
        }
        if self.password1 != self.password2 {
            return Err("As senhas não conferem.".to_string());
        }
        if self.password1.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "A senha deve ter pelo menos {} caracteres.",
                MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}
