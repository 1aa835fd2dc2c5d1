//! HTTP client for the Atlas backend.
//!
//! Every call follows the same shape: bearer auth, JSON bodies, and a
//! status check that surfaces the server's error text. The composer's
//! async side effects go through the [`ToolActions`] seam so the UI can be
//! driven with scripted outcomes in tests.

use std::error::Error;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{
    AddToolRequest, AgentMessageRequest, ConnectionsResponse, CreateConnectionRequest,
    DeleteConnectionResponse, ToolsResponse,
};
use crate::core::connection::Connection;
use crate::core::tool::ClassifiedTool;
use crate::utils::url::construct_api_url;

/// The two side-effecting actions the mention composer can dispatch.
/// Errors are plain strings so outcomes can cross task boundaries into
/// transcript notices unchanged.
#[async_trait]
pub trait ToolActions: Send + Sync {
    async fn connect_tool(&self, tool: &ClassifiedTool) -> Result<(), String>;
    async fn add_tool_to_agent(&self, agent_id: &str, tool: &ClassifiedTool) -> Result<(), String>;
}

#[derive(Clone)]
pub struct AtlasClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AtlasClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let url = construct_api_url(&self.base_url, endpoint);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, Box<dyn Error + Send + Sync>> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(format!("API request failed with status {status}: {error_text}").into())
    }

    /// Tools visible to `agent_id`, each tagged with its connection status.
    pub async fn list_available_tools(
        &self,
        agent_id: &str,
    ) -> Result<Vec<ClassifiedTool>, Box<dyn Error + Send + Sync>> {
        debug!(agent_id, "fetching tool list");
        let response = self
            .request(reqwest::Method::GET, &format!("agents/{agent_id}/tools"))
            .send()
            .await?;
        let tools = Self::check(response).await?.json::<ToolsResponse>().await?;
        Ok(tools.tools)
    }

    pub async fn list_connections(&self) -> Result<Vec<Connection>, Box<dyn Error + Send + Sync>> {
        let response = self
            .request(reqwest::Method::GET, "connections")
            .send()
            .await?;
        let list = Self::check(response)
            .await?
            .json::<ConnectionsResponse>()
            .await?;
        Ok(list.connections)
    }

    pub async fn create_connection(&self, app_key: &str) -> Result<Connection, Box<dyn Error + Send + Sync>> {
        debug!(app_key, "creating connection");
        let response = self
            .request(reqwest::Method::POST, "connections")
            .json(&CreateConnectionRequest {
                app_key: app_key.to_string(),
            })
            .send()
            .await?;
        Ok(Self::check(response).await?.json::<Connection>().await?)
    }

    pub async fn delete_connection(&self, app_key: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        debug!(app_key, "deleting connection");
        let response = self
            .request(reqwest::Method::DELETE, &format!("connections/{app_key}"))
            .send()
            .await?;
        let outcome = Self::check(response)
            .await?
            .json::<DeleteConnectionResponse>()
            .await?;
        Ok(outcome.deleted)
    }

    async fn add_tool(&self, agent_id: &str, tool_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        debug!(agent_id, tool_id, "adding tool to agent");
        let response = self
            .request(reqwest::Method::POST, &format!("agents/{agent_id}/tools"))
            .json(&AddToolRequest {
                tool_id: tool_id.to_string(),
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Open a streaming reply for one outgoing message. The caller drives
    /// the SSE byte stream; the raw markup string is sent verbatim.
    pub async fn send_agent_message(
        &self,
        agent_id: &str,
        message: &str,
    ) -> Result<reqwest::Response, Box<dyn Error + Send + Sync>> {
        let response = self
            .request(reqwest::Method::POST, &format!("agents/{agent_id}/messages"))
            .json(&AgentMessageRequest {
                message: message.to_string(),
                stream: true,
            })
            .send()
            .await?;
        Self::check(response).await
    }
}

#[async_trait]
impl ToolActions for AtlasClient {
    async fn connect_tool(&self, tool: &ClassifiedTool) -> Result<(), String> {
        let app_key = tool
            .app_key
            .clone()
            .unwrap_or_else(|| tool.name.to_ascii_lowercase());
        self.create_connection(&app_key)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn add_tool_to_agent(&self, agent_id: &str, tool: &ClassifiedTool) -> Result<(), String> {
        self.add_tool(agent_id, &tool.id)
            .await
            .map_err(|e| e.to_string())
    }
}
