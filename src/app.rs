use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::api::AssistantClient;
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use crate::dictation::{self, Dictation};
use crate::parser::split_assistant_response;

/// Rows scrolled past the top of the log before the jump-to-top badge
/// is offered.
pub const SCROLL_TOP_THRESHOLD: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One canned prompt card shown above the chat log. Selecting a card only
/// fills the draft input; it never sends.
pub struct Suggestion {
    pub icon: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        icon: "🌤",
        title: "Weather forecast",
        text: "What the weather like in Kyiv?",
    },
    Suggestion {
        icon: "💊",
        title: "Stock information",
        text: "Do you have an aspirin in stock?",
    },
    Suggestion {
        icon: "🚑",
        title: "The incident happened",
        text: "There was a car accident. We need pain relief, antibiotics, wound care.  How many medicines do we need for 10 people?",
    },
    Suggestion {
        icon: "📄",
        title: "Drug information",
        text: "What are the analogs for XYLOCAINE?",
    },
];

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation state (append-only log, one request in flight at most)
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars
    pub loading: bool,
    pub query_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat area, for scroll math
    pub chat_width: u16,  // inner width of the chat area, for wrap math
    pub chat_area: Option<Rect>,
    pub suggestion_areas: Vec<Rect>,

    // Voice input
    pub listening: bool,
    pub dictation_task: Option<JoinHandle<anyhow::Result<String>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub config: Config,
    pub client: AssistantClient,
    pub dictation: Arc<dyn Dictation>,
    pub clipboard: Box<dyn Clipboard + Send>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let client = AssistantClient::new(config.endpoint());
        let dictation = dictation::from_config(config.dictation_command.as_deref());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            messages: Vec::new(),
            input: String::new(),
            input_cursor: 0,
            loading: false,
            query_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            suggestion_areas: Vec::new(),

            listening: false,
            dictation_task: None,

            animation_frame: 0,

            config,
            client,
            dictation,
            clipboard: Box::new(SystemClipboard),
        }
    }

    // -----------------------------------------------------------------
    // Conversation
    // -----------------------------------------------------------------

    /// Validate and stage a submission. Returns the text to send, or None
    /// when the draft is blank or a request is already in flight.
    fn begin_submit(&mut self) -> Option<String> {
        if self.input.trim().is_empty() || self.loading {
            return None;
        }

        // The user turn carries the draft verbatim, untrimmed.
        let text = std::mem::take(&mut self.input);
        self.input_cursor = 0;
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: text.clone(),
        });
        self.loading = true;
        self.scroll_to_bottom();
        Some(text)
    }

    /// Send the current draft to the assistant on a background task.
    pub fn submit(&mut self) {
        let Some(text) = self.begin_submit() else {
            return;
        };

        let client = self.client.clone();
        self.query_task = Some(tokio::spawn(async move { client.query(&text).await }));
    }

    /// Fold a finished request into the log. Success runs the raw text
    /// through the marker splitter; failures become visible error turns.
    fn complete_query(&mut self, result: anyhow::Result<String>) {
        let content = match result {
            Ok(raw) => split_assistant_response(&raw),
            Err(err) => format!("Error: {}", err),
        };

        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content,
        });
        self.loading = false;
        self.scroll_to_bottom();
    }

    /// Collect the outstanding request once its task has finished. Called
    /// from the main loop; returns immediately while still in flight.
    pub async fn poll_response(&mut self) {
        if !self.query_task.as_ref().is_some_and(|task| task.is_finished()) {
            return;
        }

        if let Some(task) = self.query_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => Err(err.into()),
            };
            self.complete_query(result);
        }
    }

    /// Put a suggestion's prompt text in the draft without sending it.
    pub fn select_suggestion(&mut self, index: usize) {
        if let Some(suggestion) = SUGGESTIONS.get(index) {
            self.input = suggestion.text.to_string();
            self.input_cursor = self.input.chars().count();
        }
    }

    /// Copy the most recent assistant reply to the clipboard.
    pub fn copy_latest_reply(&self) -> bool {
        if !self.config.copy_enabled() {
            return false;
        }

        let Some(message) = self
            .messages
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::Assistant)
        else {
            return false;
        };

        self.clipboard.copy(&message.content)
    }

    // -----------------------------------------------------------------
    // Voice input
    // -----------------------------------------------------------------

    /// Begin one voice capture. Refused while a request is pending, while
    /// already listening, or when the host has no recognizer.
    pub fn start_dictation(&mut self) {
        if self.loading || self.listening {
            return;
        }
        if !self.config.voice_enabled() || !self.dictation.is_available() {
            return;
        }

        self.listening = true;
        let recognizer = Arc::clone(&self.dictation);
        self.dictation_task =
            Some(tokio::task::spawn_blocking(move || recognizer.capture()));
    }

    /// Collect a finished utterance into the draft input. Error or end
    /// clears the listening signal either way.
    pub async fn poll_dictation(&mut self) {
        if !self
            .dictation_task
            .as_ref()
            .is_some_and(|task| task.is_finished())
        {
            return;
        }

        if let Some(task) = self.dictation_task.take() {
            match task.await {
                Ok(Ok(transcript)) => {
                    self.input = transcript;
                    self.input_cursor = self.input.chars().count();
                }
                Ok(Err(err)) => tracing::warn!("dictation failed: {:#}", err),
                Err(err) => tracing::warn!("dictation task died: {}", err),
            }
            self.listening = false;
        }
    }

    // -----------------------------------------------------------------
    // Chat viewport
    // -----------------------------------------------------------------

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = (self.chat_scroll.saturating_add(lines)).min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll so the newest turn (or the waiting indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    /// True once the log is scrolled far enough down that jumping back to
    /// the top is worth offering.
    pub fn show_scroll_top(&self) -> bool {
        self.config.scroll_top_enabled() && self.chat_scroll > SCROLL_TOP_THRESHOLD
    }

    /// Total rendered rows of the log at the current wrap width.
    fn total_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;

        for message in &self.messages {
            total += 1; // Role line ("You:" or "Assistant:")
            for line in message.content.lines() {
                // Character count, not byte length, for UTF-8 wrap math
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1;
                } else {
                    total += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total += 1; // Blank line after message
        }

        if self.loading {
            total += 2; // Role line + waiting indicator
        }

        total
    }

    fn max_scroll(&self) -> u16 {
        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.total_lines().saturating_sub(visible)
    }

    /// Tick animation frame (called by the Tick event).
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use anyhow::anyhow;

    /// Clipboard double that records every copied string.
    struct RecordingClipboard(Arc<Mutex<Vec<String>>>);

    impl Clipboard for RecordingClipboard {
        fn copy(&self, text: &str) -> bool {
            self.0.lock().unwrap().push(text.to_string());
            true
        }
    }

    fn app() -> App {
        App::new(Config::new())
    }

    fn app_with_recording_clipboard() -> (App, Arc<Mutex<Vec<String>>>) {
        let copied = Arc::new(Mutex::new(Vec::new()));
        let mut app = app();
        app.clipboard = Box::new(RecordingClipboard(Arc::clone(&copied)));
        (app, copied)
    }

    // ---- Submission gating ----

    #[test]
    fn empty_draft_is_not_submitted() {
        let mut app = app();
        assert!(app.begin_submit().is_none());
        assert!(app.messages.is_empty());
        assert!(!app.loading);
    }

    #[test]
    fn whitespace_draft_is_not_submitted() {
        let mut app = app();
        app.input = "   ".to_string();
        assert!(app.begin_submit().is_none());
        assert!(app.messages.is_empty());
        assert!(!app.loading);
        // The draft is only cleared on an actual submission
        assert_eq!(app.input, "   ");
    }

    #[test]
    fn submission_is_refused_while_pending() {
        let mut app = app();
        app.loading = true;
        app.input = "second question".to_string();
        assert!(app.begin_submit().is_none());
        assert!(app.messages.is_empty());
        assert_eq!(app.input, "second question");
    }

    #[test]
    fn submission_appends_verbatim_user_turn_and_clears_draft() {
        let mut app = app();
        app.input = "  does ibuprofen interact with warfarin?  ".to_string();
        app.input_cursor = 5;

        let sent = app.begin_submit().unwrap();

        assert_eq!(sent, "  does ibuprofen interact with warfarin?  ");
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, ChatRole::User);
        assert_eq!(app.messages[0].content, sent);
        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
        assert!(app.loading);
    }

    // ---- Completion handling ----

    #[test]
    fn successful_completion_appends_parsed_reply() {
        let mut app = app();
        app.loading = true;

        app.complete_query(Ok(
            "[user]stock?[assistant]We have 40 packs. Metadata{source:db}".to_string(),
        ));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, ChatRole::Assistant);
        assert_eq!(app.messages[0].content, "We have 40 packs.\nMetadata{source:db}");
        assert!(!app.loading);
    }

    #[test]
    fn unmarked_response_is_shown_verbatim() {
        let mut app = app();
        app.loading = true;

        app.complete_query(Ok("plain reply without markers".to_string()));

        assert_eq!(app.messages[0].content, "plain reply without markers");
    }

    #[test]
    fn failed_completion_appends_error_turn() {
        let mut app = app();
        app.loading = true;

        app.complete_query(Err(anyhow!("Network response was not ok")));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, ChatRole::Assistant);
        assert_eq!(app.messages[0].content, "Error: Network response was not ok");
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn failed_round_trip_grows_log_by_two_turns() {
        let mut app = app();
        // Nothing listens on port 9, so the request fails fast.
        app.client = AssistantClient::new("http://127.0.0.1:9/query");
        app.input = "hola".to_string();

        app.submit();
        assert!(app.loading);
        assert_eq!(app.messages.len(), 1);

        for _ in 0..500 {
            if !app.loading {
                break;
            }
            app.poll_response().await;
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(!app.loading);
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].role, ChatRole::User);
        assert_eq!(app.messages[1].role, ChatRole::Assistant);
        assert!(app.messages[1].content.starts_with("Error: "));
        assert!(app.query_task.is_none());
    }

    #[test]
    fn successful_round_trip_grows_log_by_two_turns() {
        let mut app = app();
        app.input = "stock?".to_string();

        assert!(app.begin_submit().is_some());
        app.complete_query(Ok(
            "[user]stock?[assistant]In stock. Metadata{}".to_string()
        ));

        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].role, ChatRole::User);
        assert_eq!(app.messages[1].role, ChatRole::Assistant);
        assert_eq!(app.messages[1].content, "In stock.\nMetadata{}");
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn poll_response_is_a_noop_without_a_task() {
        let mut app = app();
        app.poll_response().await;
        assert!(app.messages.is_empty());
        assert!(!app.loading);
    }

    // ---- Suggestions ----

    #[test]
    fn selecting_a_suggestion_fills_the_draft_only() {
        let mut app = app();

        app.select_suggestion(1);

        assert_eq!(app.input, SUGGESTIONS[1].text);
        assert_eq!(app.input_cursor, SUGGESTIONS[1].text.chars().count());
        assert!(app.messages.is_empty());
        assert!(app.query_task.is_none());
        assert!(!app.loading);
    }

    #[test]
    fn out_of_range_suggestion_changes_nothing() {
        let mut app = app();
        app.input = "draft".to_string();
        app.select_suggestion(SUGGESTIONS.len());
        assert_eq!(app.input, "draft");
    }

    // ---- Clipboard ----

    #[test]
    fn copy_targets_latest_assistant_turn() {
        let (mut app, copied) = app_with_recording_clipboard();
        app.messages.push(ChatMessage {
            role: ChatRole::User,
            content: "question".to_string(),
        });
        app.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "first reply".to_string(),
        });
        app.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "second reply".to_string(),
        });
        app.messages.push(ChatMessage {
            role: ChatRole::User,
            content: "newer question".to_string(),
        });

        assert!(app.copy_latest_reply());
        assert_eq!(copied.lock().unwrap().as_slice(), ["second reply"]);
    }

    #[test]
    fn copy_without_replies_is_a_noop() {
        let (app, copied) = app_with_recording_clipboard();
        assert!(!app.copy_latest_reply());
        assert!(copied.lock().unwrap().is_empty());
    }

    #[test]
    fn copy_respects_config_flag() {
        let (mut app, copied) = app_with_recording_clipboard();
        app.config.enable_copy = Some(false);
        app.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: "reply".to_string(),
        });

        assert!(!app.copy_latest_reply());
        assert!(copied.lock().unwrap().is_empty());
    }

    // ---- Voice input ----

    #[test]
    fn dictation_is_refused_while_pending() {
        let mut app = app();
        app.config.dictation_command = Some("echo hi".to_string());
        app.dictation = dictation::from_config(app.config.dictation_command.as_deref());
        app.loading = true;

        app.start_dictation();

        assert!(!app.listening);
        assert!(app.dictation_task.is_none());
    }

    #[test]
    fn dictation_is_refused_without_a_recognizer() {
        let mut app = app();
        app.start_dictation();
        assert!(!app.listening);
        assert!(app.dictation_task.is_none());
    }

    #[tokio::test]
    async fn finished_utterance_fills_the_draft() {
        let mut app = app();
        app.config.dictation_command = Some("echo what are the analogs".to_string());
        app.dictation = dictation::from_config(app.config.dictation_command.as_deref());

        app.start_dictation();
        assert!(app.listening);

        for _ in 0..500 {
            if !app.listening {
                break;
            }
            app.poll_dictation().await;
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(!app.listening);
        assert_eq!(app.input, "what are the analogs");
        assert_eq!(app.input_cursor, "what are the analogs".chars().count());
        assert!(app.messages.is_empty());
    }

    #[tokio::test]
    async fn failed_utterance_clears_listening_and_keeps_draft() {
        let mut app = app();
        app.input = "typed so far".to_string();
        app.config.dictation_command = Some("false".to_string());
        app.dictation = dictation::from_config(app.config.dictation_command.as_deref());

        app.start_dictation();
        for _ in 0..500 {
            if !app.listening {
                break;
            }
            app.poll_dictation().await;
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert!(!app.listening);
        assert_eq!(app.input, "typed so far");
    }

    // ---- Scroll tracking ----

    #[test]
    fn scroll_badge_requires_passing_the_threshold() {
        let mut app = app();
        assert!(!app.show_scroll_top());

        app.chat_scroll = SCROLL_TOP_THRESHOLD;
        assert!(!app.show_scroll_top());

        app.chat_scroll = SCROLL_TOP_THRESHOLD + 1;
        assert!(app.show_scroll_top());
    }

    #[test]
    fn scroll_badge_respects_config_flag() {
        let mut app = app();
        app.config.enable_scroll_top = Some(false);
        app.chat_scroll = SCROLL_TOP_THRESHOLD + 10;
        assert!(!app.show_scroll_top());
    }

    #[test]
    fn scroll_to_bottom_tracks_wrapped_lines() {
        let mut app = app();
        app.chat_height = 5;
        app.chat_width = 10;
        for _ in 0..4 {
            app.messages.push(ChatMessage {
                role: ChatRole::User,
                content: "0123456789012345".to_string(), // wraps to 2 rows
            });
        }

        app.scroll_to_bottom();

        // 4 messages * (1 role + 2 wrapped + 1 blank) = 16 rows, 5 visible
        assert_eq!(app.chat_scroll, 11);
        assert!(app.show_scroll_top());

        app.scroll_to_top();
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut app = app();
        app.chat_height = 20;
        app.scroll_down(50);
        assert_eq!(app.chat_scroll, 0); // empty log, nothing to scroll
        app.scroll_up(3);
        assert_eq!(app.chat_scroll, 0);
    }

    // ---- Animation ----

    #[test]
    fn animation_only_advances_while_pending() {
        let mut app = app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        app.loading = true;
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 2);
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
