use sqlx::SqlitePool;

pub struct User;

impl User {
    /// Best-effort: make sure a user row exists so foreign references line up.
    /// Callers log and ignore failures; a missing row must not block the
    /// primary operation.
    pub async fn ensure_exists(pool: &SqlitePool, user_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR IGNORE INTO users (id) VALUES ($1)")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
