//! Glyph resolution for tools and mention states.
//!
//! Suggestion rows and list surfaces tag each tool with a provider glyph
//! and a connection-state glyph. Resolution is total: an unknown tool
//! degrades to the generic search glyph, never an error.

use crate::core::tool::{ClassifiedTool, ToolStatus};

/// Built-in agentpress tools, matched by exact (normalized) name before
/// any provider lookup.
const AGENTPRESS_GLYPHS: &[(&str, &str)] = &[
    ("web_search", "🔍"),
    ("browser", "🌐"),
    ("files", "📁"),
    ("shell", "🖥"),
    ("code_interpreter", "🧮"),
    ("image_generation", "🎨"),
    ("data_provider", "🗄"),
];

/// Known providers, matched by substring against qualified names first,
/// then against display/raw names. Order matters: more specific keys
/// come before their prefixes (e.g. `googlesheets` before `google`).
const PROVIDER_GLYPHS: &[(&str, &str)] = &[
    ("gmail", "✉"),
    ("googlesheets", "📊"),
    ("googledocs", "📄"),
    ("googledrive", "🗂"),
    ("googlecalendar", "📅"),
    ("google", "🔎"),
    ("outlook", "✉"),
    ("slack", "💬"),
    ("discord", "💬"),
    ("telegram", "💬"),
    ("whatsapp", "💬"),
    ("notion", "📝"),
    ("airtable", "🗃"),
    ("github", "🐙"),
    ("gitlab", "🦊"),
    ("linear", "📐"),
    ("jira", "🧭"),
    ("trello", "📋"),
    ("asana", "✅"),
    ("hubspot", "🤝"),
    ("salesforce", "☁"),
    ("stripe", "💳"),
    ("shopify", "🛍"),
    ("calendly", "📅"),
    ("zoom", "🎥"),
    ("figma", "🎨"),
    ("dropbox", "📦"),
    ("supabase", "⚡"),
    ("twitter", "🐦"),
    ("typefully", "✍"),
    ("linkedin", "💼"),
    ("reddit", "👽"),
    ("youtube", "▶"),
];

/// Fallback when nothing matches.
pub const GENERIC_TOOL_GLYPH: &str = "🔍";

/// The shapes a caller may hold when it needs a tool glyph: a full
/// classified tool, a raw mention (id plus display text), or a bare name.
pub enum ToolIconSource<'a> {
    Classified(&'a ClassifiedTool),
    Mention { id: &'a str, display: &'a str },
    Name(&'a str),
}

impl<'a> From<&'a ClassifiedTool> for ToolIconSource<'a> {
    fn from(tool: &'a ClassifiedTool) -> Self {
        ToolIconSource::Classified(tool)
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

fn provider_glyph(haystack: &str) -> Option<&'static str> {
    let haystack = haystack.to_ascii_lowercase();
    PROVIDER_GLYPHS
        .iter()
        .find(|(key, _)| haystack.contains(key))
        .map(|(_, glyph)| *glyph)
}

/// Resolve a tool to its display glyph. Resolution order: exact
/// agentpress name match, qualified-name substring, display/name
/// substring, generic fallback.
pub fn resolve_tool_glyph(source: &ToolIconSource<'_>) -> &'static str {
    let (name, display, qualified) = match source {
        ToolIconSource::Classified(tool) => (
            Some(tool.name.as_str()),
            Some(tool.display_name.as_str()),
            tool.qualified_name.as_deref(),
        ),
        ToolIconSource::Mention { id, display } => (Some(*id), Some(*display), None),
        ToolIconSource::Name(name) => (Some(*name), None, None),
    };

    if let Some(name) = name {
        let normalized = normalize(name);
        if let Some((_, glyph)) = AGENTPRESS_GLYPHS.iter().find(|(key, _)| *key == normalized) {
            return glyph;
        }
    }

    if let Some(glyph) = qualified.and_then(provider_glyph) {
        return glyph;
    }

    for candidate in [display, name].into_iter().flatten() {
        if let Some(glyph) = provider_glyph(&normalize(candidate)) {
            return glyph;
        }
    }

    GENERIC_TOOL_GLYPH
}

/// Connection indicator shown on a suggestion row. `Loading` replaces the
/// status glyph while that tool's action is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionIndicator {
    AvailableToConnect,
    ConnectedToAccount,
    ConnectedToAgent,
    Loading,
}

impl From<ToolStatus> for MentionIndicator {
    fn from(status: ToolStatus) -> Self {
        match status {
            ToolStatus::AvailableToConnect => MentionIndicator::AvailableToConnect,
            ToolStatus::ConnectedToAccount => MentionIndicator::ConnectedToAccount,
            ToolStatus::ConnectedToAgent => MentionIndicator::ConnectedToAgent,
        }
    }
}

/// Total over the closed indicator enum; no default branch exists.
pub fn mention_state_glyph(indicator: MentionIndicator) -> &'static str {
    match indicator {
        MentionIndicator::AvailableToConnect => "○",
        MentionIndicator::ConnectedToAccount => "◐",
        MentionIndicator::ConnectedToAgent => "●",
        MentionIndicator::Loading => "⟳",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool::test_tool;

    #[test]
    fn agentpress_names_match_exactly() {
        assert_eq!(resolve_tool_glyph(&ToolIconSource::Name("web_search")), "🔍");
        assert_eq!(resolve_tool_glyph(&ToolIconSource::Name("Code Interpreter")), "🧮");
    }

    #[test]
    fn qualified_name_wins_over_display_name() {
        let mut tool = test_tool("t1", "Mail helper", ToolStatus::AvailableToConnect);
        tool.qualified_name = Some("composio/gmail".to_string());
        assert_eq!(resolve_tool_glyph(&ToolIconSource::Classified(&tool)), "✉");
    }

    #[test]
    fn display_substring_matches_provider_table() {
        let source = ToolIconSource::Mention {
            id: "available_composio_notion",
            display: "Notion Workspace",
        };
        assert_eq!(resolve_tool_glyph(&source), "📝");
    }

    #[test]
    fn specific_google_products_beat_the_google_fallback() {
        assert_eq!(resolve_tool_glyph(&ToolIconSource::Name("googlesheets")), "📊");
        assert_eq!(resolve_tool_glyph(&ToolIconSource::Name("google")), "🔎");
    }

    #[test]
    fn unknown_tools_degrade_to_the_generic_glyph() {
        let tool = test_tool("t9", "Frobnicator", ToolStatus::ConnectedToAgent);
        assert_eq!(
            resolve_tool_glyph(&ToolIconSource::Classified(&tool)),
            GENERIC_TOOL_GLYPH
        );
        assert_eq!(resolve_tool_glyph(&ToolIconSource::Name("")), GENERIC_TOOL_GLYPH);
    }

    #[test]
    fn state_glyphs_cover_every_indicator() {
        let glyphs: Vec<_> = [
            MentionIndicator::AvailableToConnect,
            MentionIndicator::ConnectedToAccount,
            MentionIndicator::ConnectedToAgent,
            MentionIndicator::Loading,
        ]
        .into_iter()
        .map(mention_state_glyph)
        .collect();
        assert_eq!(glyphs.len(), 4);
        assert!(glyphs.iter().all(|g| !g.is_empty()));
    }
}
