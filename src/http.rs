use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::backend::{PageWindow, SearchBackend};
use crate::config::ApiConfig;
use crate::error::{Result, ScoutError};
use crate::types::{MoveCursorPageInfo, SearchResult};

/// Talks to the search proxy: a search endpoint and a move-cursor endpoint under one base URL
pub struct HttpBackend {
    client: Client,
    base_url: String,
    search_path: String,
    move_cursor_path: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            search_path: config.search_path.clone(),
            move_cursor_path: config.move_cursor_path.clone(),
        })
    }

    fn search_url(&self, query: &str, window: &PageWindow) -> String {
        let mut url = format!(
            "{}{}?q={}",
            self.base_url,
            self.search_path,
            urlencoding::encode(query)
        );
        match window {
            PageWindow::Forward { first, after } => {
                url.push_str(&format!("&first={}", first));
                if let Some(after) = after.as_deref().filter(|c| !c.is_empty()) {
                    url.push_str(&format!("&after={}", urlencoding::encode(after)));
                }
            }
            PageWindow::Backward { last, before } => {
                url.push_str(&format!(
                    "&last={}&before={}",
                    last,
                    urlencoding::encode(before)
                ));
            }
        }
        url
    }

    fn move_cursor_url(&self, query: &str, shift: i64, cursor: &str) -> String {
        let mut url = format!(
            "{}{}?q={}&shift={}",
            self.base_url,
            self.move_cursor_path,
            urlencoding::encode(query),
            shift
        );
        if !cursor.is_empty() {
            url.push_str(&format!("&cursor={}", urlencoding::encode(cursor)));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ScoutError::Transport(format!("{} from {}: {}", status, url, text)));
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

// Proxy responses carry the payload under `data`, next to status metadata we ignore.

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveCursorData {
    page_info: MoveCursorPageInfo,
}

#[async_trait]
impl SearchBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(&self, query: &str, window: PageWindow) -> Result<SearchResult> {
        let url = self.search_url(query, &window);
        self.get_json(&url).await
    }

    async fn move_cursor(
        &self,
        query: &str,
        shift: i64,
        cursor: &str,
    ) -> Result<MoveCursorPageInfo> {
        let url = self.move_cursor_url(query, shift, cursor);
        let data: MoveCursorData = self.get_json(&url).await?;
        Ok(data.page_info)
    }
}
