use super::token::{api_error_message, BearerToken};
use super::{FeedRequest, Post};
use crate::config::TwitterConfig;
use crate::error::{FeedError, FeedResult};
use serde::Deserialize;
use tracing::{debug, warn};

const USER_TIMELINE_PATH: &str = "/1.1/statuses/user_timeline.json";

#[derive(Debug, Deserialize)]
struct TimelineStatus {
    text: String,
    created_at: String,
}

pub struct TimelineFetcher {
    timeline_url: String,
    client: reqwest::Client,
}

impl TimelineFetcher {
    pub fn new(config: &TwitterConfig, client: reqwest::Client) -> Self {
        Self {
            timeline_url: format!("{}{}", config.api_base(), USER_TIMELINE_PATH),
            client,
        }
    }

    /// Fetch a user's recent tweets, newest first as Twitter returns them.
    ///
    /// `request.max_count` is sent as-is; clamp it with [`FeedRequest::clamped`].
    pub async fn fetch_posts(
        &self,
        token: &BearerToken,
        request: &FeedRequest,
    ) -> FeedResult<Vec<Post>> {
        debug!(
            username = %request.username,
            count = request.max_count,
            "Fetching user timeline"
        );

        let count = request.max_count.to_string();
        let response = self
            .client
            .get(&self.timeline_url)
            .query(&[
                ("screen_name", request.username.as_str()),
                ("count", count.as_str()),
            ])
            .header(reqwest::header::AUTHORIZATION, token.authorization_header())
            .send()
            .await
            .map_err(|e| FeedError::fetch(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FeedError::fetch(format!("failed to read timeline response: {e}")))?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                username = %request.username,
                "Timeline request failed"
            );
            return Err(FeedError::Fetch {
                status: Some(status.as_u16()),
                message: api_error_message(&body),
            });
        }

        let statuses: Vec<TimelineStatus> = serde_json::from_str(&body)
            .map_err(|e| FeedError::fetch(format!("malformed timeline response: {e}")))?;

        Ok(statuses
            .into_iter()
            .map(|s| Post {
                text: s.text,
                created_at: s.created_at,
            })
            .collect())
    }
}
