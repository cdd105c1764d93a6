pub mod timeline;
pub mod token;

use crate::config::{normalize_username, TwitterConfig};
use crate::error::{FeedError, FeedResult};
use crate::twitter_parser::{annotate_posts, TextAnnotator};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use timeline::TimelineFetcher;
use token::{Credentials, TokenProvider};
use tracing::info;

/// Format of `created_at` in v1.1 API responses, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub username: String,
    pub max_count: u32,
}

impl FeedRequest {
    /// Build a request whose count is clamped to the administrative ceiling.
    pub fn clamped(username: &str, requested: u32, ceiling: u32) -> Self {
        Self {
            username: normalize_username(username).to_string(),
            max_count: requested.min(ceiling),
        }
    }
}

/// A tweet as returned by the timeline endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub text: String,
    pub created_at: String,
}

impl Post {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_twitter_date(&self.created_at)
    }
}

/// A tweet whose text has been rewritten into markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedPost {
    pub text: String,
    pub created_at: String,
}

impl AnnotatedPost {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_twitter_date(&self.created_at)
    }
}

pub fn parse_twitter_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, TWITTER_DATE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone)]
pub enum FeedData {
    Posts(Vec<AnnotatedPost>),
    Loading,
    Error(String),
}

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self) -> Result<FeedData>;
}

/// Token exchange, timeline fetch and annotation for one block.
pub struct TwitterFeedFetcher {
    credentials: Credentials,
    request: FeedRequest,
    tokens: TokenProvider,
    timeline: TimelineFetcher,
    annotator: TextAnnotator,
}

impl TwitterFeedFetcher {
    pub fn new(config: &TwitterConfig, request: FeedRequest) -> FeedResult<Self> {
        let client = build_client(config.timeout())?;

        Ok(Self {
            credentials: config.credentials(),
            request,
            tokens: TokenProvider::new(config, client.clone()),
            timeline: TimelineFetcher::new(config, client),
            annotator: config.annotator(),
        })
    }

    pub async fn fetch_annotated(&self) -> FeedResult<Vec<AnnotatedPost>> {
        let token = self.tokens.acquire_token(&self.credentials).await?;
        let posts = self.timeline.fetch_posts(&token, &self.request).await?;
        info!(
            username = %self.request.username,
            posts = posts.len(),
            "Fetched timeline"
        );
        Ok(annotate_posts(&self.annotator, posts))
    }
}

#[async_trait]
impl FeedFetcher for TwitterFeedFetcher {
    async fn fetch(&self) -> Result<FeedData> {
        Ok(FeedData::Posts(self.fetch_annotated().await?))
    }
}

fn build_client(timeout: Duration) -> FeedResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("twitter-feed/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FeedError::Config(format!("failed to build HTTP client: {e}")))
}
