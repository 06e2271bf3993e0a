use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::models::family::{ChildProfile, Family};

/// Storage for families and the child profiles that belong to them.
#[derive(Clone)]
pub struct FamilyRepository {
    db: DbConnection,
}

impl FamilyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn insert_family(&self, family: &Family) -> Result<()> {
        sqlx::query(
            "INSERT INTO families (id, name, invite_code, created_by) VALUES (?, ?, ?, ?)",
        )
        .bind(&family.id)
        .bind(&family.name)
        .bind(&family.invite_code)
        .bind(&family.created_by)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn get_family(&self, family_id: &str) -> Result<Option<Family>> {
        let row = sqlx::query("SELECT * FROM families WHERE id = ?")
            .bind(family_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(row_to_family))
    }

    pub async fn get_family_by_invite_code(&self, code: &str) -> Result<Option<Family>> {
        let row = sqlx::query("SELECT * FROM families WHERE invite_code = ?")
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(row_to_family))
    }

    pub async fn insert_child_profile(&self, profile: &ChildProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO child_profiles (id, family_id, name, color, invite_code, \
             linked_user_id, created_by) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.id)
        .bind(&profile.family_id)
        .bind(&profile.name)
        .bind(&profile.color)
        .bind(&profile.invite_code)
        .bind(&profile.linked_user_id)
        .bind(&profile.created_by)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    pub async fn list_child_profiles(&self, family_id: &str) -> Result<Vec<ChildProfile>> {
        let rows = sqlx::query(
            "SELECT * FROM child_profiles WHERE family_id = ? ORDER BY created_at, id",
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(row_to_child_profile).collect())
    }

    pub async fn get_child_profile(
        &self,
        profile_id: &str,
        family_id: &str,
    ) -> Result<Option<ChildProfile>> {
        let row = sqlx::query("SELECT * FROM child_profiles WHERE id = ? AND family_id = ?")
            .bind(profile_id)
            .bind(family_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(row_to_child_profile))
    }

    pub async fn get_child_profile_by_invite_code(
        &self,
        code: &str,
    ) -> Result<Option<ChildProfile>> {
        let row = sqlx::query("SELECT * FROM child_profiles WHERE invite_code = ?")
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(row_to_child_profile))
    }

    pub async fn get_child_profile_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<ChildProfile>> {
        let row = sqlx::query("SELECT * FROM child_profiles WHERE linked_user_id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(row_to_child_profile))
    }

    pub async fn link_child_profile(&self, profile_id: &str, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE child_profiles SET linked_user_id = ? WHERE id = ?")
            .bind(user_id)
            .bind(profile_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn unlink_child_profiles_for_user(&self, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE child_profiles SET linked_user_id = NULL WHERE linked_user_id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn delete_child_profile(&self, profile_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM child_profiles WHERE id = ?")
            .bind(profile_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}

fn row_to_family(row: &SqliteRow) -> Family {
    Family {
        id: row.get("id"),
        name: row.get("name"),
        invite_code: row.get("invite_code"),
        created_by: row.get("created_by"),
    }
}

fn row_to_child_profile(row: &SqliteRow) -> ChildProfile {
    ChildProfile {
        id: row.get("id"),
        family_id: row.get("family_id"),
        name: row.get("name"),
        color: row.get("color"),
        invite_code: row.get("invite_code"),
        linked_user_id: row.get("linked_user_id"),
        created_by: row.get("created_by"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_family() -> Family {
        Family {
            id: "family_1".to_string(),
            name: "The Parks".to_string(),
            invite_code: "HARU7G2K".to_string(),
            created_by: "user_1".to_string(),
        }
    }

    fn sample_profile(id: &str, code: &str) -> ChildProfile {
        ChildProfile {
            id: id.to_string(),
            family_id: "family_1".to_string(),
            name: "Minjun".to_string(),
            color: "#4ECDC4".to_string(),
            invite_code: code.to_string(),
            linked_user_id: None,
            created_by: "user_1".to_string(),
        }
    }

    async fn setup_test() -> FamilyRepository {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        FamilyRepository::new(db)
    }

    #[tokio::test]
    async fn test_family_lookup_by_invite_code() {
        let repo = setup_test().await;
        repo.insert_family(&sample_family()).await.unwrap();

        let found = repo
            .get_family_by_invite_code("HARU7G2K")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "family_1");
        assert!(repo
            .get_family_by_invite_code("HARUXXXX")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_child_profile_link_cycle() {
        let repo = setup_test().await;
        repo.insert_family(&sample_family()).await.unwrap();
        repo.insert_child_profile(&sample_profile("child_1", "CHLDA1B2"))
            .await
            .unwrap();

        repo.link_child_profile("child_1", "user_kid").await.unwrap();
        let linked = repo
            .get_child_profile_for_user("user_kid")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(linked.id, "child_1");

        repo.unlink_child_profiles_for_user("user_kid").await.unwrap();
        assert!(repo
            .get_child_profile_for_user("user_kid")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_child_profiles_scoped_by_family() {
        let repo = setup_test().await;
        repo.insert_child_profile(&sample_profile("child_1", "CHLDA1B2"))
            .await
            .unwrap();
        let mut other = sample_profile("child_2", "CHLDC3D4");
        other.family_id = "family_other".to_string();
        repo.insert_child_profile(&other).await.unwrap();

        let listed = repo.list_child_profiles("family_1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "child_1");
    }
}
