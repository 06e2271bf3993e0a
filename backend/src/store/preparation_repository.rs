use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::models::preparation::Preparation;

#[derive(Clone)]
pub struct PreparationRepository {
    db: DbConnection,
}

impl PreparationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn list_preparations(&self, family_id: &str) -> Result<Vec<Preparation>> {
        let rows = sqlx::query(
            "SELECT * FROM preparations WHERE family_id = ? ORDER BY due_date, id",
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;
        rows.iter().map(row_to_preparation).collect()
    }

    pub async fn get_preparation(
        &self,
        prep_id: &str,
        family_id: &str,
    ) -> Result<Option<Preparation>> {
        let row = sqlx::query("SELECT * FROM preparations WHERE id = ? AND family_id = ?")
            .bind(prep_id)
            .bind(family_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(row_to_preparation).transpose()
    }

    pub async fn insert_preparation(&self, prep: &Preparation) -> Result<()> {
        sqlx::query(
            "INSERT INTO preparations (id, family_id, child_id, title, description, category, \
             due_date, is_completed, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&prep.id)
        .bind(&prep.family_id)
        .bind(&prep.child_id)
        .bind(&prep.title)
        .bind(&prep.description)
        .bind(&prep.category)
        .bind(prep.due_date.format("%Y-%m-%d").to_string())
        .bind(prep.is_completed as i64)
        .bind(&prep.created_by)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn replace_preparation(&self, prep: &Preparation) -> Result<()> {
        sqlx::query(
            "UPDATE preparations SET child_id = ?, title = ?, description = ?, category = ?, \
             due_date = ?, is_completed = ? WHERE id = ?",
        )
        .bind(&prep.child_id)
        .bind(&prep.title)
        .bind(&prep.description)
        .bind(&prep.category)
        .bind(prep.due_date.format("%Y-%m-%d").to_string())
        .bind(prep.is_completed as i64)
        .bind(&prep.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn set_completed(&self, prep_id: &str, completed: bool) -> Result<()> {
        sqlx::query("UPDATE preparations SET is_completed = ? WHERE id = ?")
            .bind(completed as i64)
            .bind(prep_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_preparation(&self, prep_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM preparations WHERE id = ?")
            .bind(prep_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_preparations_created_by(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM preparations WHERE created_by = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

fn row_to_preparation(row: &SqliteRow) -> Result<Preparation> {
    let due_date: String = row.get("due_date");
    let due_date = NaiveDate::parse_from_str(&due_date, "%Y-%m-%d")
        .with_context(|| format!("Invalid due_date: {}", due_date))?;
    Ok(Preparation {
        id: row.get("id"),
        family_id: row.get("family_id"),
        child_id: row.get("child_id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        due_date,
        is_completed: row.get::<i64, _>("is_completed") != 0,
        created_by: row.get("created_by"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prep(id: &str, due: NaiveDate) -> Preparation {
        Preparation {
            id: id.to_string(),
            family_id: "family_1".to_string(),
            child_id: None,
            title: "Indoor shoes".to_string(),
            description: None,
            category: "school".to_string(),
            due_date: due,
            is_completed: false,
            created_by: "user_1".to_string(),
        }
    }

    async fn setup_test() -> PreparationRepository {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        PreparationRepository::new(db)
    }

    #[tokio::test]
    async fn test_insert_list_ordered_by_due_date() {
        let repo = setup_test().await;
        let later = sample_prep("prep_b", NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        let sooner = sample_prep("prep_a", NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        repo.insert_preparation(&later).await.unwrap();
        repo.insert_preparation(&sooner).await.unwrap();

        let listed = repo.list_preparations("family_1").await.unwrap();
        assert_eq!(listed[0].id, "prep_a");
        assert_eq!(listed[1].id, "prep_b");
    }

    #[tokio::test]
    async fn test_toggle_completed() {
        let repo = setup_test().await;
        let prep = sample_prep("prep_1", NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        repo.insert_preparation(&prep).await.unwrap();

        repo.set_completed("prep_1", true).await.unwrap();
        let fetched = repo
            .get_preparation("prep_1", "family_1")
            .await
            .unwrap()
            .unwrap();
        assert!(fetched.is_completed);
    }

    #[tokio::test]
    async fn test_delete_by_creator() {
        let repo = setup_test().await;
        repo.insert_preparation(&sample_prep(
            "prep_1",
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
        ))
        .await
        .unwrap();

        repo.delete_preparations_created_by("user_1").await.unwrap();
        assert!(repo.list_preparations("family_1").await.unwrap().is_empty());
    }
}
