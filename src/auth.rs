use crate::{
  db::{models::User, users, DbPool},
  error::{AppError, AppResult},
};

/// bcrypt ignores everything past 72 bytes, so longer passwords are refused
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
  bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
  bcrypt::verify(password, hash)
}

pub fn validate_password(password: &str) -> AppResult<()> {
  if password.is_empty() {
    return Err(AppError::validation("Password must not be empty"));
  }
  if password.len() > MAX_PASSWORD_BYTES {
    return Err(AppError::validation("Password must be at most 72 characters"));
  }
  Ok(())
}

/// Look up an active user by name and check the password. Unknown users, inactive
/// users and wrong passwords all come back as `Ok(None)`.
pub async fn check_credentials(
  pool: &DbPool,
  username: &str,
  password: &str,
) -> AppResult<Option<User>> {
  let user = match users::find_user_by_username(pool, username).await? {
    Some(user) if user.is_active => user,
    _ => return Ok(None),
  };

  // A malformed stored hash is treated as a failed check
  match verify_password(password, &user.password_hash) {
    Ok(true) => Ok(Some(user)),
    Ok(false) => Ok(None),
    Err(e) => {
      tracing::warn!("Password verification failed for user {}: {}", user.id, e);
      Ok(None)
    }
  }
}
