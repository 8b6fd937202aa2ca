use sqlx::{Executor, Sqlite};

use super::models::User;

pub async fn insert_user<'e, E>(
  executor: E,
  username: &str,
  phone_number: Option<&str>,
  password_hash: &str,
  now: i64,
) -> Result<User, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, User>(
    r#"
    INSERT INTO users (username, phone_number, password_hash, is_active, created_at, updated_at)
    VALUES (?, ?, ?, 1, ?, ?)
    RETURNING id, username, phone_number, password_hash, is_active, created_at, updated_at
    "#,
  )
  .bind(username)
  .bind(phone_number)
  .bind(password_hash)
  .bind(now)
  .bind(now)
  .fetch_one(executor)
  .await
}

/// Look up a user regardless of the `is_active` flag
#[cfg(test)]
pub async fn find_user<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, User>(
    r#"
    SELECT id, username, phone_number, password_hash, is_active, created_at, updated_at
    FROM users
    WHERE id = ?
    "#,
  )
  .bind(id)
  .fetch_optional(executor)
  .await
}

/// Look up a user that has not been deactivated
pub async fn find_active_user<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, User>(
    r#"
    SELECT id, username, phone_number, password_hash, is_active, created_at, updated_at
    FROM users
    WHERE id = ? AND is_active = 1
    "#,
  )
  .bind(id)
  .fetch_optional(executor)
  .await
}

pub async fn find_user_by_username<'e, E>(
  executor: E,
  username: &str,
) -> Result<Option<User>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, User>(
    r#"
    SELECT id, username, phone_number, password_hash, is_active, created_at, updated_at
    FROM users
    WHERE username = ?
    "#,
  )
  .bind(username)
  .fetch_optional(executor)
  .await
}

pub async fn list_users<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  sqlx::query_as::<_, User>(
    r#"
    SELECT id, username, phone_number, password_hash, is_active, created_at, updated_at
    FROM users
    ORDER BY id
    "#,
  )
  .fetch_all(executor)
  .await
}

/// Soft-delete: flips `is_active` off. Returns false if no such user exists.
pub async fn deactivate_user<'e, E>(executor: E, id: i64, now: i64) -> Result<bool, sqlx::Error>
where
  E: Executor<'e, Database = Sqlite>,
{
  let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;

  Ok(result.rows_affected() > 0)
}
