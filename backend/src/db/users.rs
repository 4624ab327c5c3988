use chrono::{DateTime, Utc};
use common::model::user::User;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, name, email, avatar_url, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn insert_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<User> {
    conn.execute(
        "INSERT INTO users (name, email, password, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, email, password_hash, now],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        email: email.to_string(),
        avatar_url: None,
        created_at: now,
        updated_at: now,
    })
}

pub fn find_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()
}

/// The user registered with `email` and their stored password digest.
pub fn find_credentials(conn: &Connection, email: &str) -> rusqlite::Result<Option<(User, String)>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS}, password FROM users WHERE email = ?1"),
        params![email],
        |row| Ok((user_from_row(row)?, row.get(6)?)),
    )
    .optional()
}

pub fn password_hash(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT password FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get(0),
    )
    .optional()
}

/// Whether another account already uses `email`; `ignore_id` excludes the caller's own row.
pub fn email_taken(conn: &Connection, email: &str, ignore_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND id IS NOT ?2)",
        params![email, ignore_id],
        |row| row.get(0),
    )
}

pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    name: &str,
    email: &str,
    new_password_hash: Option<&str>,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET name = ?1, email = ?2, password = COALESCE(?3, password), updated_at = ?4
         WHERE id = ?5",
        params![name, email, new_password_hash, now, user_id],
    )?;
    Ok(())
}

pub fn set_avatar(
    conn: &Connection,
    user_id: i64,
    avatar_url: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE users SET avatar_url = ?1, updated_at = ?2 WHERE id = ?3",
        params![avatar_url, now, user_id],
    )?;
    Ok(())
}

pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, now],
    )?;
    Ok(())
}

pub fn session_user(conn: &Connection, token: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT user_id FROM sessions WHERE token = ?1",
        params![token],
        |row| row.get(0),
    )
    .optional()
}

pub fn delete_session(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_database;

    #[test]
    fn email_uniqueness_ignores_own_row() {
        let (_dir, db) = temp_database();
        let conn = db.open().unwrap();
        let user = insert_user(&conn, "Ana", "ana@example.com", "digest", Utc::now()).unwrap();

        assert!(email_taken(&conn, "ana@example.com", None).unwrap());
        assert!(!email_taken(&conn, "ana@example.com", Some(user.id)).unwrap());
        assert!(!email_taken(&conn, "bob@example.com", None).unwrap());
    }

    #[test]
    fn sessions_resolve_to_their_user() {
        let (_dir, db) = temp_database();
        let conn = db.open().unwrap();
        let user = insert_user(&conn, "Ana", "ana@example.com", "digest", Utc::now()).unwrap();

        create_session(&conn, user.id, "token-1", Utc::now()).unwrap();
        assert_eq!(session_user(&conn, "token-1").unwrap(), Some(user.id));

        delete_session(&conn, "token-1").unwrap();
        assert_eq!(session_user(&conn, "token-1").unwrap(), None);
    }

    #[test]
    fn profile_update_keeps_password_unless_replaced() {
        let (_dir, db) = temp_database();
        let conn = db.open().unwrap();
        let user = insert_user(&conn, "Ana", "ana@example.com", "old", Utc::now()).unwrap();

        update_profile(&conn, user.id, "Ana B", "anab@example.com", None, Utc::now()).unwrap();
        assert_eq!(password_hash(&conn, user.id).unwrap().as_deref(), Some("old"));

        update_profile(&conn, user.id, "Ana B", "anab@example.com", Some("new"), Utc::now()).unwrap();
        assert_eq!(password_hash(&conn, user.id).unwrap().as_deref(), Some("new"));
        assert_eq!(find_user(&conn, user.id).unwrap().unwrap().email, "anab@example.com");
    }
}
