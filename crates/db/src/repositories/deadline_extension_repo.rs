//! Repository for the `spot_deadline_extensions` audit table.

use lineup_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::deadline_extension::DeadlineExtension;

const COLUMNS: &str =
    "id, spot_id, previous_deadline, new_deadline, reason, extended_by, created_at";

pub struct DeadlineExtensionRepo;

impl DeadlineExtensionRepo {
    /// Append an audit row. Runs on the caller's connection so it commits
    /// together with the deadline update.
    pub async fn insert(
        conn: &mut PgConnection,
        spot_id: DbId,
        previous_deadline: Option<Timestamp>,
        new_deadline: Timestamp,
        reason: Option<&str>,
        extended_by: DbId,
        at: Timestamp,
    ) -> Result<DeadlineExtension, sqlx::Error> {
        let query = format!(
            "INSERT INTO spot_deadline_extensions
                 (spot_id, previous_deadline, new_deadline, reason, extended_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeadlineExtension>(&query)
            .bind(spot_id)
            .bind(previous_deadline)
            .bind(new_deadline)
            .bind(reason)
            .bind(extended_by)
            .bind(at)
            .fetch_one(conn)
            .await
    }

    /// Extension history for a spot, newest first.
    pub async fn list_for_spot(
        pool: &PgPool,
        spot_id: DbId,
    ) -> Result<Vec<DeadlineExtension>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spot_deadline_extensions
             WHERE spot_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DeadlineExtension>(&query)
            .bind(spot_id)
            .fetch_all(pool)
            .await
    }
}
