use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GameScore {
    pub user_id: String,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

impl GameScore {
    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GameScore>("SELECT * FROM game_scores WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Records a score, keeping the user's best. Submitting a lower score
    /// never lowers the stored one.
    pub async fn save(pool: &SqlitePool, user_id: &str, score: i64) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, GameScore>(
            r#"INSERT INTO game_scores (user_id, score)
               VALUES ($1, $2)
               ON CONFLICT(user_id) DO UPDATE SET
                 score = MAX(game_scores.score, excluded.score),
                 updated_at = datetime('now', 'subsec')
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(score)
        .fetch_one(pool)
        .await
    }

    /// All-time maximum across every user; 0 when no scores exist.
    pub async fn all_time_max(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (Option<i64>,) =
            sqlx::query_as("SELECT MAX(score) FROM game_scores")
                .fetch_one(pool)
                .await?;
        Ok(row.0.unwrap_or(0))
    }
}
