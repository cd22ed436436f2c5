use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PeakFocus {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommuteMode {
    None,
    Walk,
    Bike,
    Transit,
    Drive,
}

/// Exactly one row per user; writes are upserts.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Preferences {
    pub user_id: String,
    pub wake_time: String,
    pub sleep_time: String,
    pub peak_focus: PeakFocus,
    pub city: String,
    pub break_style: String,
    pub break_interval_minutes: i64,
    pub max_work_hours: i64,
    pub commute_mode: CommuteMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            wake_time: "08:00".to_string(),
            sleep_time: "23:00".to_string(),
            peak_focus: PeakFocus::Morning,
            city: String::new(),
            break_style: "short".to_string(),
            break_interval_minutes: 90,
            max_work_hours: 8,
            commute_mode: CommuteMode::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePreferences {
    pub wake_time: Option<String>,
    pub sleep_time: Option<String>,
    pub peak_focus: Option<PeakFocus>,
    pub city: Option<String>,
    pub break_style: Option<String>,
    pub break_interval_minutes: Option<i64>,
    pub max_work_hours: Option<i64>,
    pub commute_mode: Option<CommuteMode>,
}

impl Preferences {
    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Preferences>("SELECT * FROM preferences WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Current preferences for a user, falling back to defaults when the row
    /// does not exist yet.
    pub async fn find_or_default(pool: &SqlitePool, user_id: &str) -> Result<Self, sqlx::Error> {
        Ok(Self::find_by_user(pool, user_id).await?.unwrap_or_else(|| {
            let mut prefs = Preferences::default();
            prefs.user_id = user_id.to_string();
            prefs
        }))
    }

    pub async fn upsert(
        pool: &SqlitePool,
        user_id: &str,
        data: &UpdatePreferences,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_or_default(pool, user_id).await?;

        let wake_time = data.wake_time.clone().unwrap_or(existing.wake_time);
        let sleep_time = data.sleep_time.clone().unwrap_or(existing.sleep_time);
        let peak_focus = data.peak_focus.unwrap_or(existing.peak_focus);
        let city = data.city.clone().unwrap_or(existing.city);
        let break_style = data.break_style.clone().unwrap_or(existing.break_style);
        let break_interval_minutes = data
            .break_interval_minutes
            .unwrap_or(existing.break_interval_minutes);
        let max_work_hours = data.max_work_hours.unwrap_or(existing.max_work_hours);
        let commute_mode = data.commute_mode.unwrap_or(existing.commute_mode);

        sqlx::query_as::<_, Preferences>(
            r#"INSERT INTO preferences (
                user_id, wake_time, sleep_time, peak_focus, city, break_style,
                break_interval_minutes, max_work_hours, commute_mode
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               ON CONFLICT(user_id) DO UPDATE SET
                 wake_time = excluded.wake_time,
                 sleep_time = excluded.sleep_time,
                 peak_focus = excluded.peak_focus,
                 city = excluded.city,
                 break_style = excluded.break_style,
                 break_interval_minutes = excluded.break_interval_minutes,
                 max_work_hours = excluded.max_work_hours,
                 commute_mode = excluded.commute_mode
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(wake_time)
        .bind(sleep_time)
        .bind(peak_focus)
        .bind(city)
        .bind(break_style)
        .bind(break_interval_minutes)
        .bind(max_work_hours)
        .bind(commute_mode)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_utils::setup_test_pool;

    #[tokio::test]
    async fn upsert_keeps_one_row_per_user() {
        let pool = setup_test_pool().await;

        let first = Preferences::upsert(
            &pool,
            "u1",
            &UpdatePreferences {
                wake_time: Some("07:00".to_string()),
                sleep_time: None,
                peak_focus: Some(PeakFocus::Evening),
                city: Some("Seattle".to_string()),
                break_style: None,
                break_interval_minutes: None,
                max_work_hours: None,
                commute_mode: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(first.wake_time, "07:00");
        assert_eq!(first.peak_focus, PeakFocus::Evening);

        // Second upsert only touches city; everything else survives.
        let second = Preferences::upsert(
            &pool,
            "u1",
            &UpdatePreferences {
                wake_time: None,
                sleep_time: None,
                peak_focus: None,
                city: Some("Portland".to_string()),
                break_style: None,
                break_interval_minutes: None,
                max_work_hours: None,
                commute_mode: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(second.wake_time, "07:00");
        assert_eq!(second.city, "Portland");
    }
}
