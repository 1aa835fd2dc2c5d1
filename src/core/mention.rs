//! Tool-mention markup embedded in chat messages.
//!
//! Outgoing messages reference agent tools with the durable markup form
//! `@[DisplayName](toolId)`. The backend receives the markup verbatim;
//! display surfaces render the plain form via [`extract_plain_text`] so
//! internal tool identifiers never reach the screen.
//!
//! The grammar is a single fixed, non-nested token shape, so parsing is a
//! stateless regex scan per call rather than a general parser.

use std::sync::LazyLock;

use regex::Regex;

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\[([^\]]+)\]\(([^)]+)\)").expect("mention pattern compiles"));

/// Tool category derived from the tool id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentionKind {
    ConfiguredMcp,
    CustomMcp,
    ComposioMcp,
}

impl MentionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MentionKind::ConfiguredMcp => "configured_mcp",
            MentionKind::CustomMcp => "custom_mcp",
            MentionKind::ComposioMcp => "composio_mcp",
        }
    }
}

/// A single `@[display](id)` token found in a message.
///
/// `start`/`end` are byte offsets into the source string, with
/// `start < end`; matches are found left-to-right and never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMention {
    pub id: String,
    pub display: String,
    pub kind: MentionKind,
    pub original_text: String,
    pub start: usize,
    pub end: usize,
}

/// Classify a tool id by its prefix. Total: unrecognized ids are treated
/// as custom MCP tools.
pub fn classify_tool_id(tool_id: &str) -> MentionKind {
    if tool_id.starts_with("configured_mcp_") || tool_id.starts_with("default_configured_mcp_") {
        MentionKind::ConfiguredMcp
    } else if tool_id.starts_with("custom_mcp_") || tool_id.starts_with("default_custom_mcp_") {
        MentionKind::CustomMcp
    } else if tool_id.contains("composio") || tool_id.starts_with("available_composio_") {
        MentionKind::ComposioMcp
    } else {
        MentionKind::CustomMcp
    }
}

/// Scan a message for mention markup. Malformed or absent markup yields an
/// empty vec; this never fails.
pub fn parse_tool_mentions(message: &str) -> Vec<ToolMention> {
    MENTION_RE
        .captures_iter(message)
        .map(|caps| {
            let whole = caps.get(0).expect("capture group 0 always present");
            let display = &caps[1];
            let id = &caps[2];
            ToolMention {
                id: id.to_string(),
                display: display.to_string(),
                kind: classify_tool_id(id),
                original_text: whole.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
            }
        })
        .collect()
}

/// Replace every markup token with `@display`, dropping the tool id.
pub fn extract_plain_text(message: &str) -> String {
    MENTION_RE.replace_all(message, "@$1").into_owned()
}

/// Whether the message contains at least one mention token.
pub fn has_tool_mentions(message: &str) -> bool {
    MENTION_RE.is_match(message)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionPartition {
    pub valid: Vec<ToolMention>,
    pub invalid: Vec<ToolMention>,
}

/// Partition mentions by membership in the caller-supplied id allow-list.
pub fn validate_mentions(mentions: Vec<ToolMention>, available_ids: &[String]) -> MentionPartition {
    let mut partition = MentionPartition::default();
    for mention in mentions {
        if available_ids.iter().any(|id| *id == mention.id) {
            partition.valid.push(mention);
        } else {
            partition.invalid.push(mention);
        }
    }
    partition
}

/// Human sentence describing the mentioned tools, for transcript notices.
pub fn mentions_summary(mentions: &[ToolMention]) -> String {
    match mentions {
        [] => String::new(),
        [only] => format!("Mentioned: {}", only.display),
        [first, second] => format!("Mentioned: {} and {}", first.display, second.display),
        [first, second, rest @ ..] => {
            let others = rest.len();
            let noun = if others == 1 { "other" } else { "others" };
            format!(
                "Mentioned: {}, {} and {} {}",
                first.display, second.display, others, noun
            )
        }
    }
}

/// Unique Composio app keys referenced by the given mentions, in first-seen
/// order. Non-composio mentions are skipped.
pub fn composio_app_keys(mentions: &[ToolMention]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for mention in mentions {
        if mention.kind != MentionKind::ComposioMcp {
            continue;
        }
        if let Some(key) = app_key_from_id(&mention.id) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}

// Ids arrive as e.g. `available_composio_gmail` or `composio_slack_v2`; the
// app key is the first segment after the prefix.
fn app_key_from_id(tool_id: &str) -> Option<String> {
    let cleaned = tool_id
        .replace("available_composio_", "")
        .replace("composio_", "");
    cleaned
        .split('_')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_ascii_lowercase())
}
