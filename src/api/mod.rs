//! Payload types for the Atlas backend API.

pub mod client;

use serde::{Deserialize, Serialize};

use crate::core::connection::Connection;
use crate::core::tool::ClassifiedTool;

#[derive(Deserialize)]
pub struct ToolsResponse {
    pub tools: Vec<ClassifiedTool>,
}

#[derive(Deserialize)]
pub struct ConnectionsResponse {
    pub connections: Vec<Connection>,
}

#[derive(Serialize)]
pub struct CreateConnectionRequest {
    pub app_key: String,
}

#[derive(Deserialize)]
pub struct DeleteConnectionResponse {
    pub deleted: bool,
}

#[derive(Serialize)]
pub struct AddToolRequest {
    pub tool_id: String,
}

#[derive(Serialize)]
pub struct AgentMessageRequest {
    pub message: String,
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct AgentReplyDelta {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct AgentReplyChunk {
    pub delta: AgentReplyDelta,
}

/// Pull the text delta out of one SSE `data:` payload, if any.
pub fn extract_reply_delta(data: &str) -> Option<String> {
    serde_json::from_str::<AgentReplyChunk>(data)
        .ok()
        .and_then(|chunk| chunk.delta.content)
}
