//! Astronomy picture of the day, shown alongside the generated plan. Purely
//! decorative context; any failure degrades to "no picture today".

use serde::{Deserialize, Serialize};

const APOD_URL: &str = "https://api.nasa.gov/planetary/apod";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstronomyPicture {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub media_type: String,
}

#[derive(Clone)]
pub struct AstronomyService {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl Default for AstronomyService {
    fn default() -> Self {
        Self::new()
    }
}

impl AstronomyService {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: APOD_URL.to_string(),
            api_key: std::env::var("NASA_API_KEY").unwrap_or_else(|_| "DEMO_KEY".to_string()),
        }
    }

    pub async fn picture_of_the_day(&self) -> Result<AstronomyPicture, reqwest::Error> {
        self.client
            .get(&self.url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<AstronomyPicture>()
            .await
    }
}
