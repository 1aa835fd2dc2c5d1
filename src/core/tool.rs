//! Classified tools as supplied by the Atlas backend.
//!
//! The backend owns classification; the client only reads it. A tool's
//! status is never mutated locally — the composer overlays a loading
//! indicator while an action is in flight, nothing more.

use serde::{Deserialize, Serialize};

/// Connection status of a tool relative to the selected agent.
/// Exactly one value applies at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    ConnectedToAgent,
    ConnectedToAccount,
    AvailableToConnect,
}

impl ToolStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolStatus::ConnectedToAgent => "connected_to_agent",
            ToolStatus::ConnectedToAccount => "connected_to_account",
            ToolStatus::AvailableToConnect => "available_to_connect",
        }
    }

    /// Short human label for list surfaces.
    pub fn label(self) -> &'static str {
        match self {
            ToolStatus::ConnectedToAgent => "on agent",
            ToolStatus::ConnectedToAccount => "on account",
            ToolStatus::AvailableToConnect => "available",
        }
    }
}

/// A tool entry as seen by the mention UI.
///
/// Field names mirror the backend payload: tool entries use camelCase,
/// unlike connection records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTool {
    pub id: String,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "qualifiedName", skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    pub status: ToolStatus,
    #[serde(rename = "toolCount", skip_serializing_if = "Option::is_none")]
    pub tool_count: Option<u32>,
    #[serde(rename = "appKey", skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,
}

impl ClassifiedTool {
    /// Case-insensitive substring match on either the display name or the
    /// raw name. Used to narrow the suggestion popup.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.display_name.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
    }

    /// The mention markup token for this tool.
    pub fn mention_markup(&self) -> String {
        format!("@[{}]({})", self.display_name, self.id)
    }
}

/// Narrow a tool list to the entries matching `query`, preserving order.
pub fn filter_tools<'a>(tools: &'a [ClassifiedTool], query: &str) -> Vec<&'a ClassifiedTool> {
    tools.iter().filter(|t| t.matches_query(query)).collect()
}

/// The single unambiguous match for `query`, or `None` on zero or ties.
/// Bare Tab/Enter confirmation only acts on a unique match.
pub fn find_unique_match<'a>(
    tools: &'a [ClassifiedTool],
    query: &str,
) -> Option<&'a ClassifiedTool> {
    let mut matches = tools.iter().filter(|t| t.matches_query(query));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}

#[cfg(test)]
pub(crate) fn test_tool(id: &str, display: &str, status: ToolStatus) -> ClassifiedTool {
    ClassifiedTool {
        id: id.to_string(),
        name: display.to_lowercase().replace(' ', "_"),
        display_name: display.to_string(),
        qualified_name: None,
        status,
        tool_count: None,
        app_key: None,
    }
}
