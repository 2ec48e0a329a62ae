//! Repository for the `events` table.

use lineup_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event};

const COLUMNS: &str = "id, promoter_id, title, event_date, created_at, updated_at";

/// Read access to events, plus creation for seeding.
pub struct EventRepo;

impl EventRepo {
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (promoter_id, title, event_date)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(input.promoter_id)
            .bind(&input.title)
            .bind(input.event_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Events owned by a promoter dated at or after `from`, soonest first.
    pub async fn list_upcoming_for_promoter(
        pool: &PgPool,
        promoter_id: DbId,
        from: Timestamp,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE promoter_id = $1 AND event_date >= $2
             ORDER BY event_date ASC, id ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(promoter_id)
            .bind(from)
            .fetch_all(pool)
            .await
    }
}
