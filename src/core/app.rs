//! Runtime state for a chat session.
//!
//! `App` owns the transcript, the composer text and caret, the tool
//! catalog for the selected agent, the suggestion popup, and the single
//! pending-action slot. The event loop mutates it synchronously; async
//! side effects (connect, add-to-agent, replies) report back through it
//! when they finish.

use std::collections::VecDeque;

use tracing::debug;

use crate::core::mention::{
    composio_app_keys, extract_plain_text, has_tool_mentions, mentions_summary,
    parse_tool_mentions, validate_mentions,
};
use crate::core::message::Message;
use crate::core::store::ConnectionStore;
use crate::core::tool::{ClassifiedTool, ToolStatus};
use crate::ui::glyphs::MentionIndicator;
use crate::ui::suggestions::MentionSuggestState;
use crate::utils::input::{next_char_boundary, prev_char_boundary, sanitize_text_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Connect,
    AddToAgent,
}

/// The one in-flight action slot. Only one action may be pending at a
/// time across the whole composer; the composer is locked while it is
/// occupied, so actions can never race each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub tool_id: String,
    pub kind: ActionKind,
}

/// What the event loop must do after a confirmed suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum MentionOutcome {
    /// Markup was inserted into the composer; nothing to spawn.
    Inserted,
    /// Spawn the given async action; insertion was suppressed.
    Dispatch { tool: ClassifiedTool, kind: ActionKind },
    /// No unambiguous target; the key falls through to default behavior.
    Fallthrough,
}

pub struct App {
    pub messages: VecDeque<Message>,
    pub input: String,
    /// Byte offset of the caret within `input`.
    pub caret: usize,
    pub agent_id: String,
    pub tools: Vec<ClassifiedTool>,
    pub tools_stale: bool,
    tools_error_notified: bool,
    pub suggestions: MentionSuggestState,
    pub pending_action: Option<PendingAction>,
    pub connections: ConnectionStore,
    /// An assistant reply is currently streaming in.
    pub streaming: bool,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
}

impl App {
    pub fn new(agent_id: String) -> Self {
        Self {
            messages: VecDeque::new(),
            input: String::new(),
            caret: 0,
            agent_id,
            tools: Vec::new(),
            tools_stale: true,
            tools_error_notified: false,
            suggestions: MentionSuggestState::new(),
            pending_action: None,
            connections: ConnectionStore::new(),
            streaming: false,
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    /// Editing is disabled while an action is pending: a trigger must not
    /// overlap an async side effect.
    pub fn input_locked(&self) -> bool {
        self.pending_action.is_some()
    }

    // --- composer editing -------------------------------------------------

    pub fn insert_str(&mut self, text: &str) {
        let sanitized = sanitize_text_input(text);
        self.input.insert_str(self.caret, &sanitized);
        self.caret += sanitized.len();
        self.refresh_suggestions();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buffer = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buffer));
    }

    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        let start = prev_char_boundary(&self.input, self.caret);
        self.input.replace_range(start..self.caret, "");
        self.caret = start;
        self.refresh_suggestions();
    }

    pub fn move_caret_left(&mut self) {
        self.caret = prev_char_boundary(&self.input, self.caret);
        self.refresh_suggestions();
    }

    pub fn move_caret_right(&mut self) {
        self.caret = next_char_boundary(&self.input, self.caret);
        self.refresh_suggestions();
    }

    pub fn refresh_suggestions(&mut self) {
        self.suggestions.refresh(&self.input, self.caret, &self.tools);
    }

    // --- tool catalog -----------------------------------------------------

    pub fn set_tools(&mut self, tools: Vec<ClassifiedTool>) {
        debug!(count = tools.len(), agent = %self.agent_id, "tool list updated");
        self.tools = tools;
        self.tools_stale = false;
        self.tools_error_notified = false;
        self.refresh_suggestions();
    }

    /// A failed fetch is surfaced once; the composer stays usable with the
    /// empty or stale list it already has.
    pub fn tools_fetch_failed(&mut self, error: &str) {
        self.tools_stale = false;
        if !self.tools_error_notified {
            self.tools_error_notified = true;
            self.notice_warning(format!("Couldn't load tools for this agent: {error}"));
        }
    }

    /// Indicator for a suggestion row: the pending tool shows the loading
    /// glyph in place of its status.
    pub fn indicator_for(&self, tool: &ClassifiedTool) -> MentionIndicator {
        if self
            .pending_action
            .as_ref()
            .is_some_and(|pending| pending.tool_id == tool.id)
        {
            MentionIndicator::Loading
        } else {
            tool.status.into()
        }
    }

    // --- mention confirmation ---------------------------------------------

    /// Resolve a Tab/Enter (or an explicitly navigated selection) against
    /// the suggestion popup. Which of the three paths runs depends only on
    /// the target tool's status.
    pub fn confirm_mention(&mut self) -> MentionOutcome {
        if self.input_locked() {
            return MentionOutcome::Fallthrough;
        }
        let Some(tool) = self.suggestions.confirm_target(&self.tools).cloned() else {
            return MentionOutcome::Fallthrough;
        };

        match tool.status {
            ToolStatus::ConnectedToAgent => {
                self.insert_mention_markup(&tool);
                MentionOutcome::Inserted
            }
            ToolStatus::ConnectedToAccount => {
                self.begin_action(&tool, ActionKind::AddToAgent);
                MentionOutcome::Dispatch {
                    tool,
                    kind: ActionKind::AddToAgent,
                }
            }
            ToolStatus::AvailableToConnect => {
                self.begin_action(&tool, ActionKind::Connect);
                MentionOutcome::Dispatch {
                    tool,
                    kind: ActionKind::Connect,
                }
            }
        }
    }

    fn insert_mention_markup(&mut self, tool: &ClassifiedTool) {
        let Some(trigger) = self.suggestions.trigger().cloned() else {
            return;
        };
        let markup = tool.mention_markup();
        self.input.replace_range(trigger.start..trigger.end, &markup);
        self.caret = trigger.start + markup.len();
        self.suggestions.dismiss();
        self.refresh_suggestions();
    }

    fn begin_action(&mut self, tool: &ClassifiedTool, kind: ActionKind) {
        debug!(tool = %tool.id, ?kind, "mention action dispatched");
        self.pending_action = Some(PendingAction {
            tool_id: tool.id.clone(),
            kind,
        });
    }

    /// Close out an async action. The slot clears on every path; failures
    /// become error notices carrying the underlying message; success
    /// invalidates the tool catalog so the status advances on refetch.
    /// No markup is inserted on either path.
    pub fn finish_action(&mut self, tool: &ClassifiedTool, kind: ActionKind, result: Result<(), String>) {
        self.pending_action = None;
        match (kind, result) {
            (ActionKind::Connect, Ok(())) => {
                self.tools_stale = true;
                // A new connection record exists server-side now.
                self.connections.invalidate();
                self.notice_info(format!(
                    "Connected {}. Mention it again once it's on the agent.",
                    tool.display_name
                ));
            }
            (ActionKind::AddToAgent, Ok(())) => {
                self.tools_stale = true;
                self.notice_info(format!("Added {} to this agent.", tool.display_name));
            }
            (ActionKind::Connect, Err(error)) => {
                self.notice_error(action_failure("connect", &tool.display_name, &error));
            }
            (ActionKind::AddToAgent, Err(error)) => {
                self.notice_error(action_failure("add", &tool.display_name, &error));
            }
        }
    }

    // --- outgoing messages ------------------------------------------------

    /// Take the composer contents for sending. Returns the wire form (raw
    /// markup) — the transcript gets the plain form so tool ids never
    /// reach a display surface.
    pub fn take_outgoing_message(&mut self) -> Option<String> {
        if self.streaming || self.input_locked() || self.input.trim().is_empty() {
            return None;
        }
        let wire = std::mem::take(&mut self.input);
        self.caret = 0;
        self.suggestions.dismiss();

        self.messages.push_back(Message::user(extract_plain_text(&wire)));

        if has_tool_mentions(&wire) {
            let mentions = parse_tool_mentions(&wire);
            debug!(apps = ?composio_app_keys(&mentions), "outgoing message mentions tools");
            let available: Vec<String> = self.tools.iter().map(|t| t.id.clone()).collect();
            let partition = validate_mentions(mentions, &available);
            if !partition.invalid.is_empty() {
                let names: Vec<&str> = partition
                    .invalid
                    .iter()
                    .map(|m| m.display.as_str())
                    .collect();
                self.notice_warning(format!(
                    "Not available to this agent: {}",
                    names.join(", ")
                ));
            }
            let summary = mentions_summary(&partition.valid);
            if !summary.is_empty() {
                self.notice_info(summary);
            }
        }

        self.streaming = true;
        self.messages.push_back(Message::assistant(String::new()));
        Some(wire)
    }

    pub fn append_reply_delta(&mut self, delta: &str) {
        if let Some(last) = self.messages.back_mut() {
            if last.role.is_assistant() {
                last.content.push_str(delta);
            }
        }
    }

    pub fn finish_reply(&mut self) {
        self.streaming = false;
    }

    pub fn reply_failed(&mut self, error: &str) {
        self.streaming = false;
        self.notice_error(format!("Reply failed: {error}"));
    }

    // --- notices ----------------------------------------------------------

    pub fn notice_info(&mut self, content: impl Into<String>) {
        self.messages.push_back(Message::app_info(content));
    }

    pub fn notice_warning(&mut self, content: impl Into<String>) {
        self.messages.push_back(Message::app_warning(content));
    }

    pub fn notice_error(&mut self, content: impl Into<String>) {
        self.messages.push_back(Message::app_error(content));
    }
}

fn action_failure(verb: &str, display_name: &str, error: &str) -> String {
    if error.trim().is_empty() {
        format!("Failed to {verb} {display_name}.")
    } else {
        format!("Failed to {verb} {display_name}: {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ToolActions;
    use crate::core::message::TranscriptRole;
    use crate::core::tool::test_tool;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted action seam recording every invocation.
    struct ScriptedActions {
        connect_result: Result<(), String>,
        add_result: Result<(), String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedActions {
        fn ok() -> Self {
            Self {
                connect_result: Ok(()),
                add_result: Ok(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                connect_result: Err(message.to_string()),
                add_result: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolActions for ScriptedActions {
        async fn connect_tool(&self, tool: &ClassifiedTool) -> Result<(), String> {
            self.calls.lock().unwrap().push(format!("connect:{}", tool.id));
            self.connect_result.clone()
        }

        async fn add_tool_to_agent(
            &self,
            agent_id: &str,
            tool: &ClassifiedTool,
        ) -> Result<(), String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("add:{agent_id}:{}", tool.id));
            self.add_result.clone()
        }
    }

    fn app_with_gmail(status: ToolStatus) -> App {
        let mut app = App::new("agent-1".to_string());
        app.set_tools(vec![test_tool("t1", "Gmail", status)]);
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    async fn run_dispatch(app: &mut App, actions: &ScriptedActions, outcome: MentionOutcome) {
        let MentionOutcome::Dispatch { tool, kind } = outcome else {
            panic!("expected dispatch, got {outcome:?}");
        };
        let result = match kind {
            ActionKind::Connect => actions.connect_tool(&tool).await,
            ActionKind::AddToAgent => actions.add_tool_to_agent(&app.agent_id, &tool).await,
        };
        app.finish_action(&tool, kind, result);
    }

    #[tokio::test]
    async fn available_tool_connects_without_inserting_markup() {
        let mut app = app_with_gmail(ToolStatus::AvailableToConnect);
        let actions = ScriptedActions::ok();

        type_text(&mut app, "@Gma");
        let outcome = app.confirm_mention();

        // Insertion is suppressed and the composer locks while pending.
        assert_eq!(app.input, "@Gma");
        assert!(app.input_locked());
        assert_eq!(
            app.indicator_for(&app.tools[0]),
            MentionIndicator::Loading
        );

        run_dispatch(&mut app, &actions, outcome).await;

        assert_eq!(*actions.calls.lock().unwrap(), vec!["connect:t1"]);
        assert!(!app.input_locked());
        assert!(app.tools_stale);
        let last = app.messages.back().expect("notice");
        assert_eq!(last.role, TranscriptRole::AppInfo);
        assert!(last.content.contains("Connected Gmail"));
        assert!(!app.input.contains("@[Gmail]"));
    }

    #[tokio::test]
    async fn account_tool_adds_to_agent_and_reports_failure_message() {
        let mut app = app_with_gmail(ToolStatus::ConnectedToAccount);
        let actions = ScriptedActions::failing("quota exceeded");

        type_text(&mut app, "@Gma");
        let outcome = app.confirm_mention();
        run_dispatch(&mut app, &actions, outcome).await;

        assert_eq!(*actions.calls.lock().unwrap(), vec!["add:agent-1:t1"]);
        assert!(!app.input_locked());
        let last = app.messages.back().expect("notice");
        assert_eq!(last.role, TranscriptRole::AppError);
        assert!(last.content.contains("quota exceeded"));
        assert_eq!(app.input, "@Gma");
    }

    #[test]
    fn agent_tool_inserts_markup_and_calls_nothing() {
        let mut app = app_with_gmail(ToolStatus::ConnectedToAgent);
        type_text(&mut app, "ask @Gma");

        let outcome = app.confirm_mention();

        assert_eq!(outcome, MentionOutcome::Inserted);
        assert_eq!(app.input, "ask @[Gmail](t1)");
        assert_eq!(app.caret, app.input.len());
        assert!(!app.input_locked());
        assert!(!app.suggestions.is_active());
    }

    #[test]
    fn ambiguous_confirm_falls_through() {
        let mut app = App::new("agent-1".to_string());
        app.set_tools(vec![
            test_tool("t1", "Gmail", ToolStatus::ConnectedToAgent),
            test_tool("t2", "Google Sheets", ToolStatus::ConnectedToAgent),
        ]);
        type_text(&mut app, "@g");

        assert_eq!(app.confirm_mention(), MentionOutcome::Fallthrough);
        assert_eq!(app.input, "@g");
    }

    #[test]
    fn locked_composer_rejects_edits_and_confirms() {
        let mut app = app_with_gmail(ToolStatus::AvailableToConnect);
        type_text(&mut app, "@Gma");
        app.confirm_mention();
        assert!(app.input_locked());
        assert_eq!(app.confirm_mention(), MentionOutcome::Fallthrough);
    }

    #[test]
    fn outgoing_message_displays_plain_text_and_flags_unknown_tools() {
        let mut app = app_with_gmail(ToolStatus::ConnectedToAgent);
        app.insert_str("ping @[Gmail](t1) and @[Ghost](custom_mcp_ghost)");

        let wire = app.take_outgoing_message().expect("message");
        assert_eq!(wire, "ping @[Gmail](t1) and @[Ghost](custom_mcp_ghost)");

        let roles: Vec<_> = app.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                TranscriptRole::User,
                TranscriptRole::AppWarning,
                TranscriptRole::AppInfo,
                TranscriptRole::Assistant,
            ]
        );
        assert_eq!(app.messages[0].content, "ping @Gmail and @Ghost");
        assert!(app.messages[1].content.contains("Ghost"));
        assert_eq!(app.messages[2].content, "Mentioned: Gmail");
        assert!(app.streaming);
    }

    #[test]
    fn empty_or_streaming_composer_sends_nothing() {
        let mut app = app_with_gmail(ToolStatus::ConnectedToAgent);
        assert!(app.take_outgoing_message().is_none());

        app.insert_str("hello");
        app.streaming = true;
        assert!(app.take_outgoing_message().is_none());
    }

    #[test]
    fn reply_deltas_accumulate_into_the_last_assistant_message() {
        let mut app = app_with_gmail(ToolStatus::ConnectedToAgent);
        app.insert_str("hello");
        app.take_outgoing_message();

        app.append_reply_delta("Hi ");
        app.append_reply_delta("there");
        app.finish_reply();

        let last = app.messages.back().expect("assistant");
        assert_eq!(last.content, "Hi there");
        assert!(!app.streaming);
    }

    #[test]
    fn tool_fetch_failure_notifies_once() {
        let mut app = App::new("agent-1".to_string());
        app.tools_fetch_failed("boom");
        app.tools_fetch_failed("boom");
        let warnings = app
            .messages
            .iter()
            .filter(|m| m.role == TranscriptRole::AppWarning)
            .count();
        assert_eq!(warnings, 1);
    }
}
