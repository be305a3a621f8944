use serde::{Deserialize, Serialize};

use crate::error::AppError;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;
// bcrypt 只使用前 72 字节
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=72;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !USERNAME_LEN.contains(&self.username.chars().count())
            || !self
                .username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "username must be 3 to 32 letters, digits or underscores".to_string(),
            ));
        }
        if !PASSWORD_LEN.contains(&self.password.len()) {
            return Err(AppError::Validation(
                "password must be between 6 and 72 bytes".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}
