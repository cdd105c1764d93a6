//! A content block that shows a Twitter user's recent tweets.
//!
//! Each build exchanges the application's API key and secret for an app-only
//! bearer token, fetches the user timeline, links URLs, hashtags and mentions
//! in every tweet, and renders the result as HTML.

pub mod config;
pub mod error;
pub mod feeds;
pub mod twitter_parser;
pub mod ui;

pub use config::Config;
pub use error::{FeedError, FeedResult};
pub use feeds::{AnnotatedPost, FeedData, FeedFetcher, FeedRequest, Post};
pub use twitter_parser::{annotate, TextAnnotator};
pub use ui::TwitterFeedBlock;
