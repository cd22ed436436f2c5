pub mod game_score;
pub mod plan;
pub mod preferences;
pub mod task;
pub mod user;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
