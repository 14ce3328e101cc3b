//! Top-post and keyword-frequency analysis over Reddit search results

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::TOP_N;
use crate::sources::RedditPost;

/// Derived summary for a Reddit search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditAnalysis {
    /// Up to [`TOP_N`] posts ranked by score, descending
    pub top_posts: Vec<TopPost>,

    /// Up to [`TOP_N`] most frequent words across all fetched posts
    pub top_keywords: Vec<KeywordCount>,

    /// One-line summary naming the top post
    pub insights: String,
}

/// The projection of a post kept in the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPost {
    pub title: String,
    pub score: i64,
    pub num_comments: i64,
    pub created_utc: f64,
}

/// A word with its occurrence count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

/// Sentinel insight for an empty result set
pub const NO_RESULTS: &str = "No results found";

/// Compute the derived summary for a list of fetched posts.
///
/// Posts are ranked by score descending (stable: ties keep fetch order).
/// Word frequency runs over the lower-cased concatenation of title and
/// selftext across all posts, split on whitespace, no stemming and no
/// stopword removal. Count ties break alphabetically so the ranking is
/// deterministic.
pub fn analyze(posts: &[RedditPost]) -> RedditAnalysis {
    if posts.is_empty() {
        return RedditAnalysis {
            top_posts: Vec::new(),
            top_keywords: Vec::new(),
            insights: NO_RESULTS.to_string(),
        };
    }

    let mut top_posts: Vec<TopPost> = posts
        .iter()
        .map(|post| TopPost {
            title: post.title.clone(),
            score: post.score,
            num_comments: post.num_comments,
            created_utc: post.created_utc,
        })
        .collect();
    top_posts.sort_by(|a, b| b.score.cmp(&a.score));
    top_posts.truncate(TOP_N);

    let top_keywords = keyword_frequency(posts);

    // posts is non-empty here, so top_posts has a first entry
    let top = &top_posts[0];
    let insights = format!(
        "Top post: {} ({} points, {} comments)",
        top.title, top.score, top.num_comments
    );

    RedditAnalysis {
        top_posts,
        top_keywords,
        insights,
    }
}

/// Word counts over the concatenated post text, top entries only
fn keyword_frequency(posts: &[RedditPost]) -> Vec<KeywordCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for post in posts {
        let text = format!("{} {}", post.title, post.selftext).to_lowercase();
        for word in text.split_whitespace() {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
    ranked.truncate(TOP_N);
    ranked
}
