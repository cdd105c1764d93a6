use crate::config::{normalize_username, BlockConfig, TwitterConfig};
use crate::error::{FeedError, FeedResult};
use crate::feeds::{AnnotatedPost, FeedData, FeedFetcher, FeedRequest, TwitterFeedFetcher};
use crate::twitter_parser::escape_html;
use std::fmt::{self, Write as _};

const PROFILE_BASE: &str = "http://www.twitter.com/";
const DISPLAY_DATE_FORMAT: &str = "%b %e, %Y %H:%M";

/// The "Twitter Feed" content block: one user's recent tweets as HTML.
pub struct TwitterFeedBlock {
    twitter: TwitterConfig,
    config: BlockConfig,
    posts: Vec<AnnotatedPost>,
    loading: bool,
    error: Option<String>,
}

impl TwitterFeedBlock {
    pub fn new(twitter: TwitterConfig, config: BlockConfig) -> Self {
        Self {
            twitter,
            config,
            posts: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn username(&self) -> &str {
        normalize_username(&self.config.username)
    }

    /// The timeline request this block issues, with its count clamped to the site ceiling.
    pub fn feed_request(&self) -> FeedRequest {
        FeedRequest::clamped(
            &self.config.username,
            self.config.num_tweets,
            self.twitter.max_tweets,
        )
    }

    pub fn create_fetcher(&self) -> FeedResult<Box<dyn FeedFetcher>> {
        if self.username().is_empty() {
            return Err(FeedError::Config("block.username is required".into()));
        }
        let fetcher = TwitterFeedFetcher::new(&self.twitter, self.feed_request())?;
        Ok(Box::new(fetcher))
    }

    pub fn update_data(&mut self, data: FeedData) {
        match data {
            FeedData::Posts(posts) => {
                self.posts = posts;
                self.loading = false;
                self.error = None;
            }
            FeedData::Loading => {
                self.loading = true;
            }
            FeedData::Error(e) => {
                self.error = Some(e);
                self.loading = false;
            }
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut html);
        html
    }

    fn write_html(&self, html: &mut String) -> fmt::Result {
        let state = if self.error.is_some() {
            " twitter-feed--error"
        } else if self.loading {
            " twitter-feed--loading"
        } else {
            ""
        };

        writeln!(html, r#"<div class="twitter-feed{state}">"#)?;
        writeln!(
            html,
            r#"  <h2 class="twitter-feed__user">{}</h2>"#,
            profile_link(self.username())
        )?;

        if let Some(ref error) = self.error {
            writeln!(
                html,
                r#"  <p class="twitter-feed__message">Tweets are unavailable right now.</p>"#
            )?;
            writeln!(html, "  <!-- {} -->", escape_comment(error))?;
        } else if self.loading {
            writeln!(html, r#"  <p class="twitter-feed__message">Loading...</p>"#)?;
        } else if self.posts.is_empty() {
            writeln!(
                html,
                r#"  <p class="twitter-feed__message">No tweets to display.</p>"#
            )?;
        } else {
            writeln!(html, r#"  <ul class="twitter-feed__tweets">"#)?;
            for post in &self.posts {
                writeln!(
                    html,
                    r#"    <li class="tweet"><p class="tweet__text">{}</p><span class="tweet__date">{}</span></li>"#,
                    post.text,
                    escape_html(&display_date(post))
                )?;
            }
            writeln!(html, "  </ul>")?;
        }

        writeln!(html, "</div>")
    }
}

/// The block header: the username linked to the profile page.
pub fn profile_link(username: &str) -> String {
    let user = escape_html(username);
    format!(r#"<a href="{PROFILE_BASE}{user}" target="_blank">@{user}</a>"#)
}

fn display_date(post: &AnnotatedPost) -> String {
    post.created_at_utc()
        .map(|dt| dt.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|| post.created_at.clone())
}

fn escape_comment(s: &str) -> String {
    escape_html(s).replace("--", "- -")
}
