use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, header};
use serde_json::{Value, json};

use crate::{
    config::Config,
    types::CatalogHit,
    ytmusic::{CatalogService, SearchError, SearchFilter, parse},
};

const ORIGIN: &str = "https://music.youtube.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:88.0) Gecko/20100101 Firefox/88.0";

pub struct YtMusicClient {
    client: Client,
    api_url: String,
}

impl YtMusicClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.ytmusic_api_url.clone(),
        }
    }

    fn request_body(query: &str, filter: SearchFilter) -> Value {
        json!({
            "context": {
                "client": {
                    "clientName": "WEB_REMIX",
                    "clientVersion": format!("1.{}.01.00", Utc::now().format("%Y%m%d")),
                    "hl": "en"
                },
                "user": {}
            },
            "query": query,
            "params": filter.params()
        })
    }
}

#[async_trait]
impl CatalogService for YtMusicClient {
    /// Searches YouTube Music the way the web client does.
    ///
    /// Posts the query with the filter's `params` to `/search` and parses
    /// the song rows out of the response. At most `limit` hits are returned,
    /// in the catalog's own ranking order.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx statuses and non-JSON bodies are returned
    /// as [`SearchError`]. A well-formed response without a results shelf is
    /// an empty list, not an error.
    async fn search(
        &self,
        query: &str,
        filter: SearchFilter,
        limit: usize,
    ) -> Result<Vec<CatalogHit>, SearchError> {
        let api_url = format!(
            "{uri}/search?alt=json&prettyPrint=false",
            uri = self.api_url
        );

        let response = self
            .client
            .post(&api_url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ORIGIN, ORIGIN)
            .json(&Self::request_body(query, filter))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        if !body.is_object() {
            return Err(SearchError::InvalidResponse(
                "response is not a JSON object".to_string(),
            ));
        }

        let mut hits = parse::parse_search_results(&body);
        hits.truncate(limit);
        Ok(hits)
    }
}
