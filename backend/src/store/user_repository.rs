use std::str::FromStr;

use anyhow::Result;
use shared::Role;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::models::user::User;

#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, role, family_id, color) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.to_string())
        .bind(&user.family_id)
        .bind(&user.color)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn list_by_family(&self, family_id: &str) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE family_id = ? ORDER BY name, id")
            .bind(family_id)
            .fetch_all(self.db.pool())
            .await?;
        rows.iter().map(row_to_user).collect()
    }

    pub async fn set_family(&self, user_id: &str, family_id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET family_id = ? WHERE id = ?")
            .bind(family_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn set_color(&self, user_id: &str, color: &str) -> Result<()> {
        sqlx::query("UPDATE users SET color = ? WHERE id = ?")
            .bind(color)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        role: Role::from_str(&role)?,
        family_id: row.get("family_id"),
        color: row.get("color"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Jamie".to_string(),
            role: Role::Parent,
            family_id: None,
            color: None,
        }
    }

    async fn setup_test() -> UserRepository {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        UserRepository::new(db)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_by_email() {
        let repo = setup_test().await;
        let user = sample_user("user_1", "jamie@example.com");
        repo.insert_user(&user).await.unwrap();

        let fetched = repo
            .get_user_by_email("jamie@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = setup_test().await;
        repo.insert_user(&sample_user("user_1", "dup@example.com"))
            .await
            .unwrap();

        let result = repo
            .insert_user(&sample_user("user_2", "dup@example.com"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_family_and_delete() {
        let repo = setup_test().await;
        repo.insert_user(&sample_user("user_1", "a@example.com"))
            .await
            .unwrap();

        repo.set_family("user_1", "family_1").await.unwrap();
        let fetched = repo.get_user("user_1").await.unwrap().unwrap();
        assert_eq!(fetched.family_id.as_deref(), Some("family_1"));

        repo.delete_user("user_1").await.unwrap();
        assert!(repo.get_user("user_1").await.unwrap().is_none());
    }
}
