use std::sync::Arc;

use ai::ModelRouter;
use db::DBService;
use services::services::{AstronomyService, WeatherService};

pub mod error;
pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub ai: Arc<ModelRouter>,
    pub weather: WeatherService,
    pub astronomy: AstronomyService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self {
            db,
            ai: Arc::new(ModelRouter::new()),
            weather: WeatherService::new(),
            astronomy: AstronomyService::new(),
        }
    }
}
