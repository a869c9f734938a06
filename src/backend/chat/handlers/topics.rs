/**
 * Topic Board Handler
 *
 * This module implements `GET /topics`, which feeds the "Popular" and
 * "Recent" boards of the chat page from the broker's topic statistics.
 */

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::broker::TopicSummary;
use crate::shared::config::ALL_CHATS;

/// Board ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicSort {
    /// Most buffered chats first
    #[default]
    Popular,
    /// Most recently active first
    Recent,
}

impl std::str::FromStr for TopicSort {
    type Err = BackendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "popular" => Ok(Self::Popular),
            "recent" => Ok(Self::Recent),
            other => Err(BackendError::bad_request(format!(
                "Invalid sort '{}', expected 'popular' or 'recent'",
                other
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicsParams {
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub sort: TopicSort,
    pub topics: Vec<TopicSummary>,
}

/// Order and trim topic summaries for a board
///
/// The catch-all feed and topics with no live chats are left out.
pub fn rank_topics(summaries: Vec<TopicSummary>, sort: TopicSort, limit: usize) -> Vec<TopicSummary> {
    let mut topics: Vec<TopicSummary> = summaries
        .into_iter()
        .filter(|summary| summary.topic != ALL_CHATS && summary.event_count > 0)
        .collect();

    match sort {
        TopicSort::Popular => topics.sort_by(|a, b| {
            b.event_count
                .cmp(&a.event_count)
                .then(b.latest_timestamp.cmp(&a.latest_timestamp))
                .then(a.topic.cmp(&b.topic))
        }),
        TopicSort::Recent => topics.sort_by(|a, b| {
            b.latest_timestamp
                .cmp(&a.latest_timestamp)
                .then(a.topic.cmp(&b.topic))
        }),
    }
    topics.truncate(limit);
    topics
}

/// Handle a topic board request (GET /topics?sort=popular|recent)
pub async fn handle_topics(
    State(app_state): State<AppState>,
    Query(params): Query<TopicsParams>,
) -> Result<Json<TopicsResponse>, BackendError> {
    let sort = match params.sort.as_deref() {
        Some(raw) => raw.parse()?,
        None => TopicSort::default(),
    };
    let topics = rank_topics(
        app_state.broker.topic_summaries(),
        sort,
        app_state.config.max_topic_lists,
    );
    Ok(Json(TopicsResponse { sort, topics }))
}
