//! Repository for the `applications` table.

use lineup_core::spot_lifecycle::application_statuses;
use lineup_core::spot_lifecycle::state_machine::{CONFIRMED, PENDING};
use lineup_core::types::DbId;
use sqlx::PgPool;

use crate::models::application::{Application, CreateApplication};

const COLUMNS: &str = "id, event_id, performer_id, spot_type, status, created_at, updated_at";

pub struct ApplicationRepo;

impl ApplicationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateApplication,
    ) -> Result<Application, sqlx::Error> {
        let query = format!(
            "INSERT INTO applications (event_id, performer_id, spot_type, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(input.event_id)
            .bind(input.performer_id)
            .bind(&input.spot_type)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Accepted applications whose performer holds no live spot on the event,
    /// oldest first.
    pub async fn list_unassigned_accepted(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applications a
             WHERE a.event_id = $1
               AND a.status = $2
               AND NOT EXISTS (
                   SELECT 1 FROM spots s
                   WHERE s.event_id = a.event_id
                     AND s.performer_id = a.performer_id
                     AND s.confirmation_status_id IN ({PENDING}, {CONFIRMED})
               )
             ORDER BY a.created_at ASC, a.id ASC"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(event_id)
            .bind(application_statuses::ACCEPTED)
            .fetch_all(pool)
            .await
    }
}
