use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// One stored schedule per (user, day). The plan body is AI-produced JSON and
/// treated as opaque beyond being valid JSON.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub user_id: String,
    pub plan_date: NaiveDate,
    pub plan_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn body(&self) -> serde_json::Value {
        serde_json::from_str(&self.plan_json).unwrap_or(serde_json::Value::Null)
    }

    pub async fn find_for_day(
        pool: &SqlitePool,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE user_id = $1 AND plan_date = $2")
            .bind(user_id)
            .bind(day)
            .fetch_optional(pool)
            .await
    }

    /// Regenerating a plan replaces the prior one for that day.
    pub async fn upsert(
        pool: &SqlitePool,
        user_id: &str,
        day: NaiveDate,
        plan: &serde_json::Value,
    ) -> Result<Self, sqlx::Error> {
        let plan_json = plan.to_string();
        sqlx::query_as::<_, Plan>(
            r#"INSERT INTO plans (user_id, plan_date, plan_json)
               VALUES ($1, $2, $3)
               ON CONFLICT(user_id, plan_date) DO UPDATE SET
                 plan_json = excluded.plan_json,
                 updated_at = datetime('now', 'subsec')
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(day)
        .bind(plan_json)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_utils::setup_test_pool;
    use serde_json::json;

    #[tokio::test]
    async fn regenerate_replaces_prior_plan() {
        let pool = setup_test_pool().await;
        let day = Utc::now().date_naive();

        Plan::upsert(&pool, "u1", day, &json!({"schedule": []}))
            .await
            .unwrap();
        let replaced = Plan::upsert(
            &pool,
            "u1",
            day,
            &json!({"schedule": [{"time": "09:00", "activity": "Deep work"}]}),
        )
        .await
        .unwrap();

        assert_eq!(replaced.body()["schedule"].as_array().unwrap().len(), 1);

        let fetched = Plan::find_for_day(&pool, "u1", day).await.unwrap().unwrap();
        assert_eq!(fetched.body(), replaced.body());
    }
}
