//! Mention suggestion popup state.
//!
//! The composer owns one of these and refreshes it after every edit or
//! caret move. Trigger detection scans backward from the caret for the
//! nearest `@`; the candidate query runs from just after the `@` to the
//! next space or end of text.

use memchr::memrchr;

use crate::core::tool::ClassifiedTool;

/// An active `@` trigger. `start` is the byte offset of the `@` itself;
/// `end` is the byte offset one past the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionTrigger {
    pub start: usize,
    pub end: usize,
    pub query: String,
}

/// Locate the mention currently being typed, if any.
pub fn active_trigger(text: &str, caret: usize) -> Option<MentionTrigger> {
    let caret = caret.min(text.len());
    let at = memrchr(b'@', text[..caret].as_bytes())?;

    // A space between the trigger and the caret means the user moved on.
    if text[at + 1..caret].chars().any(char::is_whitespace) {
        return None;
    }

    let end = text[at + 1..]
        .find(char::is_whitespace)
        .map(|offset| at + 1 + offset)
        .unwrap_or(text.len());
    Some(MentionTrigger {
        start: at,
        end,
        query: text[at + 1..end].to_string(),
    })
}

#[derive(Debug, Default)]
pub struct MentionSuggestState {
    trigger: Option<MentionTrigger>,
    /// Indices into the tool catalog passed to `refresh`.
    matches: Vec<usize>,
    selected: usize,
    /// Whether the user explicitly navigated the popup. A navigated row
    /// confirms directly; otherwise confirmation requires a unique match.
    navigated: bool,
}

impl MentionSuggestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the trigger and match set after an edit or caret move.
    pub fn refresh(&mut self, text: &str, caret: usize, tools: &[ClassifiedTool]) {
        let trigger = active_trigger(text, caret);
        if trigger != self.trigger {
            self.navigated = false;
            self.selected = 0;
        }
        self.trigger = trigger;

        self.matches.clear();
        if let Some(trigger) = &self.trigger {
            for (index, tool) in tools.iter().enumerate() {
                if tool.matches_query(&trigger.query) {
                    self.matches.push(index);
                }
            }
        }
        if self.selected >= self.matches.len() {
            self.selected = 0;
        }
    }

    pub fn dismiss(&mut self) {
        self.trigger = None;
        self.matches.clear();
        self.selected = 0;
        self.navigated = false;
    }

    pub fn is_active(&self) -> bool {
        self.trigger.is_some() && !self.matches.is_empty()
    }

    pub fn trigger(&self) -> Option<&MentionTrigger> {
        self.trigger.as_ref()
    }

    pub fn match_indices(&self) -> &[usize] {
        &self.matches
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn navigated(&self) -> bool {
        self.navigated
    }

    pub fn move_up(&mut self) {
        if !self.matches.is_empty() {
            self.navigated = true;
            if self.selected == 0 {
                self.selected = self.matches.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if !self.matches.is_empty() {
            self.navigated = true;
            self.selected = (self.selected + 1) % self.matches.len();
        }
    }

    /// Explicitly pick a visible row (pointer selection). Returns false
    /// when the row is out of range.
    pub fn select(&mut self, row: usize) -> bool {
        if row >= self.matches.len() {
            return false;
        }
        self.selected = row;
        self.navigated = true;
        true
    }

    /// The tool to act on when the user confirms. An explicitly navigated
    /// row wins; a bare Tab/Enter only acts on a single unambiguous match.
    pub fn confirm_target<'a>(&self, tools: &'a [ClassifiedTool]) -> Option<&'a ClassifiedTool> {
        if !self.is_active() {
            return None;
        }
        if self.navigated {
            return self.matches.get(self.selected).and_then(|&i| tools.get(i));
        }
        if self.matches.len() == 1 {
            return tools.get(self.matches[0]);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool::{test_tool, ToolStatus};

    fn catalog() -> Vec<ClassifiedTool> {
        vec![
            test_tool("t1", "Gmail", ToolStatus::AvailableToConnect),
            test_tool("t2", "Google Sheets", ToolStatus::ConnectedToAgent),
            test_tool("t3", "Slack", ToolStatus::ConnectedToAccount),
        ]
    }

    #[test]
    fn trigger_tracks_nearest_at_sign() {
        assert_eq!(active_trigger("hello", 5), None);
        let trigger = active_trigger("ask @Gma", 8).expect("trigger");
        assert_eq!(trigger.start, 4);
        assert_eq!(trigger.query, "Gma");
        assert_eq!(trigger.end, 8);
    }

    #[test]
    fn query_runs_to_the_next_space() {
        let text = "ask @Gma about it";
        let trigger = active_trigger(text, 8).expect("trigger");
        assert_eq!(trigger.query, "Gma");
        assert_eq!(&text[trigger.start..trigger.end], "@Gma");
    }

    #[test]
    fn whitespace_between_trigger_and_caret_deactivates() {
        let text = "ask @Gma about";
        assert_eq!(active_trigger(text, text.len()), None);
    }

    #[test]
    fn bare_at_matches_everything() {
        let mut state = MentionSuggestState::new();
        state.refresh("@", 1, &catalog());
        assert!(state.is_active());
        assert_eq!(state.match_indices(), &[0, 1, 2]);
    }

    #[test]
    fn narrowing_is_case_insensitive() {
        let mut state = MentionSuggestState::new();
        state.refresh("@gOO", 4, &catalog());
        assert_eq!(state.match_indices(), &[1]);
    }

    #[test]
    fn bare_confirm_requires_a_unique_match() {
        let tools = catalog();
        let mut state = MentionSuggestState::new();

        state.refresh("@g", 2, &tools); // Gmail and Google Sheets tie
        assert!(state.confirm_target(&tools).is_none());

        state.refresh("@gma", 4, &tools);
        assert_eq!(state.confirm_target(&tools).map(|t| t.id.as_str()), Some("t1"));

        state.refresh("@zzz", 4, &tools);
        assert!(state.confirm_target(&tools).is_none());
    }

    #[test]
    fn navigation_overrides_ambiguity() {
        let tools = catalog();
        let mut state = MentionSuggestState::new();
        state.refresh("@g", 2, &tools);
        state.move_down();
        assert_eq!(state.confirm_target(&tools).map(|t| t.id.as_str()), Some("t2"));
        state.move_up();
        assert_eq!(state.confirm_target(&tools).map(|t| t.id.as_str()), Some("t1"));
    }

    #[test]
    fn retyping_resets_navigation() {
        let tools = catalog();
        let mut state = MentionSuggestState::new();
        state.refresh("@g", 2, &tools);
        state.move_down();
        assert!(state.navigated());

        state.refresh("@gm", 3, &tools);
        assert!(!state.navigated());
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn pointer_selection_confirms_a_specific_row() {
        let tools = catalog();
        let mut state = MentionSuggestState::new();
        state.refresh("@g", 2, &tools);

        assert!(state.select(1));
        assert_eq!(state.confirm_target(&tools).map(|t| t.id.as_str()), Some("t2"));
        assert!(!state.select(5));
    }

    #[test]
    fn selection_wraps_at_both_ends() {
        let tools = catalog();
        let mut state = MentionSuggestState::new();
        state.refresh("@", 1, &tools);
        state.move_up();
        assert_eq!(state.selected_index(), 2);
        state.move_down();
        assert_eq!(state.selected_index(), 0);
    }
}
