//! Tweet text annotation: links, #hashtags and @mentions become anchors.
//!
//! Passes run in a fixed order (links, hashtags, mentions), each over the
//! output of the previous one. Each pass is skipped when its trigger
//! substring (`http`, `#`, `@`) is absent.

use crate::feeds::{AnnotatedPost, Post};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const DEFAULT_HASHTAG_BASE: &str = "https://twitter.com/hashtag/";
pub const DEFAULT_PROFILE_BASE: &str = "https://twitter.com/";

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b((?:https?://|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]+|\((?:[^\s()<>]+|(?:\([^\s()<>]+\)))*\))+(?:\((?:[^\s()<>]+|(?:\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#,
    )
    .expect("link pattern is valid")
});

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\s)#(\w*[a-zA-ZüöäßÜÄÖ_]+\w*)").expect("hashtag pattern is valid")
});

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)@(\w*[a-zA-Z_]+\w*)").expect("mention pattern is valid"));

/// Rewrites raw tweet text into HTML markup.
#[derive(Debug, Clone)]
pub struct TextAnnotator {
    hashtag_base: String,
    profile_base: String,
}

impl Default for TextAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_HASHTAG_BASE, DEFAULT_PROFILE_BASE)
    }
}

impl TextAnnotator {
    pub fn new(hashtag_base: impl Into<String>, profile_base: impl Into<String>) -> Self {
        Self {
            hashtag_base: hashtag_base.into(),
            profile_base: profile_base.into(),
        }
    }

    pub fn annotate(&self, text: &str) -> String {
        let text = link_urls(text);
        let text = self.link_hashtags(&text);
        self.link_mentions(&text)
    }

    fn link_hashtags(&self, text: &str) -> String {
        if !text.contains('#') {
            return text.to_string();
        }
        HASHTAG_RE
            .replace_all(text, |caps: &Captures| {
                let tag = escape_html(&caps[2]);
                format!(
                    r#"{}<a href="{}{tag}" target="_blank">#{tag}</a>"#,
                    &caps[1],
                    escape_html(&self.hashtag_base)
                )
            })
            .into_owned()
    }

    fn link_mentions(&self, text: &str) -> String {
        if !text.contains('@') {
            return text.to_string();
        }
        MENTION_RE
            .replace_all(text, |caps: &Captures| {
                let user = escape_html(&caps[2]);
                format!(
                    r#"{}<a href="{}{user}" target="_blank">@{user}</a>"#,
                    &caps[1],
                    escape_html(&self.profile_base)
                )
            })
            .into_owned()
    }
}

fn link_urls(text: &str) -> String {
    // TODO: tighten the trigger so bare www./domain links are found without an http elsewhere
    if !text.contains("http") {
        return text.to_string();
    }
    LINK_RE
        .replace_all(text, |caps: &Captures| {
            let url = escape_html(&caps[1]);
            format!(r#"<a href="{url}" target="_blank">{url}</a>"#)
        })
        .into_owned()
}

/// Escape a detected value for use in an attribute or element body.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Annotate with the default twitter.com targets.
pub fn annotate(text: &str) -> String {
    TextAnnotator::default().annotate(text)
}

/// Annotate every post in place of its raw text, keeping order and timestamps.
pub fn annotate_posts(annotator: &TextAnnotator, posts: Vec<Post>) -> Vec<AnnotatedPost> {
    posts
        .into_iter()
        .map(|post| AnnotatedPost {
            text: annotator.annotate(&post.text),
            created_at: post.created_at,
        })
        .collect()
}
