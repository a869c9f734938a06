//! `GET /settings`: the values the chat page needs to drive its polling.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::shared::config::ALL_CHATS;
use crate::shared::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    /// Topic of the catch-all feed
    pub all_chats: &'static str,
    pub max_chat_life_hours: u64,
    pub topic_refresh_seconds: u64,
    pub max_topic_lists: usize,
    pub chats_on_screen: usize,
}

impl From<&AppConfig> for ClientSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            all_chats: ALL_CHATS,
            max_chat_life_hours: config.max_chat_life_hours,
            topic_refresh_seconds: config.topic_refresh_seconds,
            max_topic_lists: config.max_topic_lists,
            chats_on_screen: config.chats_on_screen,
        }
    }
}

pub async fn handle_settings(State(config): State<Arc<AppConfig>>) -> Json<ClientSettings> {
    Json(ClientSettings::from(config.as_ref()))
}
