use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbConnection;
use crate::domain::ids::generate_id;
use crate::domain::models::event::Event;
use crate::domain::recurrence::Recurrence;

/// Sqlx-backed storage for events and their recurrences. Recurrence
/// rows live and die with their event.
#[derive(Clone)]
pub struct EventRepository {
    db: DbConnection,
}

const SELECT_WITH_RECURRENCE: &str = r#"
    SELECT e.id, e.family_id, e.child_id, e.title, e.description, e.category,
           e.start_date, e.start_time, e.end_time, e.is_all_day, e.color, e.created_by,
           r.frequency AS recurrence_frequency,
           r.days_of_week AS recurrence_days,
           r.end_date AS recurrence_end_date
    FROM events e
    LEFT JOIN recurrences r ON r.event_id = e.id
"#;

impl EventRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn list_events(&self, family_id: &str) -> Result<Vec<Event>> {
        let sql = format!(
            "{} WHERE e.family_id = ? ORDER BY e.start_date, e.start_time",
            SELECT_WITH_RECURRENCE
        );
        let rows = sqlx::query(&sql)
            .bind(family_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(row_to_event).collect()
    }

    pub async fn get_event(&self, event_id: &str, family_id: &str) -> Result<Option<Event>> {
        let sql = format!(
            "{} WHERE e.id = ? AND e.family_id = ?",
            SELECT_WITH_RECURRENCE
        );
        let row = sqlx::query(&sql)
            .bind(event_id)
            .bind(family_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(row_to_event).transpose()
    }

    pub async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, family_id, child_id, title, description, category,
                                start_date, start_time, end_time, is_all_day, color, created_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.family_id)
        .bind(&event.child_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(event.start_date.format("%Y-%m-%d").to_string())
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(event.is_all_day as i64)
        .bind(&event.color)
        .bind(&event.created_by)
        .execute(self.db.pool())
        .await?;

        if let Some(rec) = &event.recurrence {
            self.insert_recurrence(&event.id, rec).await?;
        }
        Ok(())
    }

    /// Full replace: event fields are overwritten and the recurrence
    /// row is deleted then re-inserted.
    pub async fn replace_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE events SET
                child_id = ?, title = ?, description = ?, category = ?,
                start_date = ?, start_time = ?, end_time = ?, is_all_day = ?, color = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.child_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(event.start_date.format("%Y-%m-%d").to_string())
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(event.is_all_day as i64)
        .bind(&event.color)
        .bind(&event.id)
        .execute(self.db.pool())
        .await?;

        sqlx::query("DELETE FROM recurrences WHERE event_id = ?")
            .bind(&event.id)
            .execute(self.db.pool())
            .await?;

        if let Some(rec) = &event.recurrence {
            self.insert_recurrence(&event.id, rec).await?;
        }
        Ok(())
    }

    /// Delete an event and its recurrence.
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM recurrences WHERE event_id = ?")
            .bind(event_id)
            .execute(self.db.pool())
            .await?;
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Remove every event a user created, recurrences first.
    pub async fn delete_events_created_by(&self, user_id: &str) -> Result<()> {
        sqlx::query(
            "DELETE FROM recurrences WHERE event_id IN (SELECT id FROM events WHERE created_by = ?)",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await?;
        sqlx::query("DELETE FROM events WHERE created_by = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn insert_recurrence(&self, event_id: &str, rec: &Recurrence) -> Result<()> {
        let days =
            serde_json::to_string(&rec.days_of_week).context("Serializing days_of_week")?;
        sqlx::query(
            "INSERT INTO recurrences (id, event_id, frequency, days_of_week, end_date) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(generate_id("recurrence"))
        .bind(event_id)
        .bind(&rec.frequency)
        .bind(days)
        .bind(rec.end_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

fn row_to_event(row: &SqliteRow) -> Result<Event> {
    let start_date: String = row.get("start_date");
    let start_date = NaiveDate::parse_from_str(&start_date, "%Y-%m-%d")
        .with_context(|| format!("Invalid start_date: {}", start_date))?;

    let recurrence = match row.get::<Option<String>, _>("recurrence_frequency") {
        Some(frequency) => {
            // Stored weekday JSON that fails to parse degrades to an
            // empty set, which never matches.
            let days_raw: Option<String> = row.get("recurrence_days");
            let days_of_week = days_raw
                .as_deref()
                .and_then(|raw| serde_json::from_str::<Vec<i64>>(raw).ok())
                .unwrap_or_default();
            let end_date = row
                .get::<Option<String>, _>("recurrence_end_date")
                .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok());
            Some(Recurrence {
                frequency,
                days_of_week,
                end_date,
            })
        }
        None => None,
    };

    Ok(Event {
        id: row.get("id"),
        family_id: row.get("family_id"),
        child_id: row.get("child_id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        start_date,
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        is_all_day: row.get::<i64, _>("is_all_day") != 0,
        color: row.get("color"),
        created_by: row.get("created_by"),
        recurrence,
    })
}
