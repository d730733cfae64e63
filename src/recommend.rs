use std::time::Duration;

use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const MAX_RESULTS: &str = "10";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Category {
    Energy,
    Relax,
    Meditate,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Energy, Category::Relax, Category::Meditate];

    pub fn search_phrase(self) -> &'static str {
        match self {
            Category::Energy => "気合を入れる動画",
            Category::Relax => "リラックスできる音楽",
            Category::Meditate => "瞑想の音楽",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Energy => "Energy",
            Category::Relax => "Relax",
            Category::Meditate => "Meditate",
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned status {status}")]
    Api { status: u16 },

    #[error("search response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RecommendOutcome {
    Picked(String),
    Empty,
}

pub trait VideoSearch {
    fn search(&self, phrase: &str) -> Result<Vec<String>, RecommendError>;
}

pub struct YoutubeSearch {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl YoutubeSearch {
    pub fn new(api_key: String) -> Result<Self, RecommendError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, api_key })
    }
}

impl VideoSearch for YoutubeSearch {
    fn search(&self, phrase: &str) -> Result<Vec<String>, RecommendError> {
        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[
                ("part", "snippet"),
                ("maxResults", MAX_RESULTS),
                ("q", phrase),
                ("key", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecommendError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        Ok(parse_video_ids(&body)?)
    }
}

pub fn recommend(
    search: &dyn VideoSearch,
    category: Category,
) -> Result<RecommendOutcome, RecommendError> {
    let ids = search.search(category.search_phrase())?;
    match ids.choose(&mut rand::thread_rng()) {
        Some(id) => Ok(RecommendOutcome::Picked(watch_url(id))),
        None => Ok(RecommendOutcome::Empty),
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

// Channel and playlist results carry no videoId and are skipped.
#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

fn parse_video_ids(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let response = serde_json::from_str::<SearchResponse>(body)?;
    Ok(response
        .items
        .into_iter()
        .filter_map(|item| item.id.video_id)
        .collect())
}
