use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub async fn setup_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("invalid sqlite config")
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to open sqlite memory db");

    bootstrap_schema(&pool).await;

    pool
}

async fn bootstrap_schema(pool: &SqlitePool) {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL DEFAULT (datetime('now','subsec'))
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id BLOB PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            importance TEXT NOT NULL DEFAULT 'medium',
            status TEXT NOT NULL DEFAULT 'todo',
            scheduled_time TEXT,
            task_date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now','subsec')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now','subsec'))
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            user_id TEXT PRIMARY KEY,
            wake_time TEXT NOT NULL DEFAULT '08:00',
            sleep_time TEXT NOT NULL DEFAULT '23:00',
            peak_focus TEXT NOT NULL DEFAULT 'morning',
            city TEXT NOT NULL DEFAULT '',
            break_style TEXT NOT NULL DEFAULT 'short',
            break_interval_minutes INTEGER NOT NULL DEFAULT 90,
            max_work_hours INTEGER NOT NULL DEFAULT 8,
            commute_mode TEXT NOT NULL DEFAULT 'none'
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS plans (
            user_id TEXT NOT NULL,
            plan_date TEXT NOT NULL,
            plan_json TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now','subsec')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now','subsec')),
            PRIMARY KEY (user_id, plan_date)
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS game_scores (
            user_id TEXT PRIMARY KEY,
            score INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now','subsec'))
        );
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .expect("failed to bootstrap test schema");
    }
}
