use ratatui::layout::Rect;
use ratatui::widgets::{Paragraph, Wrap};
use tokio::task::JoinHandle;

use crate::client::{ApiError, TranscriptClient};
use crate::state::{ChatState, UploadState, View};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

type RequestTask = JoinHandle<Result<String, ApiError>>;

pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub input_mode: InputMode,

    pub upload: UploadState,
    pub chat: ChatState,

    // In-flight requests, polled from the event loop
    pub upload_task: Option<RequestTask>,
    pub chat_task: Option<RequestTask>,

    pub client: TranscriptClient,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the conversation box
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8,

    // Panel areas for mouse hit-testing (updated during render)
    pub nav_items_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(client: TranscriptClient) -> Self {
        Self {
            should_quit: false,
            view: View::default(),
            input_mode: InputMode::Normal,

            upload: UploadState::default(),
            chat: ChatState::default(),

            upload_task: None,
            chat_task: None,

            client,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            nav_items_area: None,
            chat_area: None,
        }
    }

    pub fn switch_view(&mut self, view: View) {
        if self.view != view {
            tracing::debug!(?view, "switching view");
            self.view = view;
            self.input_mode = InputMode::Normal;
        }
    }

    /// Kick off an upload of the selected file, if there is one and no
    /// upload is already running.
    pub fn submit_upload(&mut self) {
        let Some(path) = self.upload.begin_submit() else {
            tracing::debug!(
                selected = self.upload.selected_file.is_some(),
                loading = self.upload.loading,
                "upload ignored"
            );
            return;
        };

        let client = self.client.clone();
        self.upload_task = Some(tokio::spawn(async move { client.upload(&path).await }));
    }

    /// Append the draft to the conversation and ask the backend about it
    pub fn send_chat(&mut self) {
        let Some(question) = self.chat.begin_send() else {
            tracing::debug!(sending = self.chat.sending, "send ignored");
            return;
        };

        // Keep the new message and the "Thinking..." line in view
        self.scroll_chat_to_bottom();

        let client = self.client.clone();
        self.chat_task = Some(tokio::spawn(async move { client.chat(&question).await }));
    }

    pub fn is_busy(&self) -> bool {
        self.upload_task.is_some() || self.chat_task.is_some()
    }

    /// Apply the outcome of any request that has finished since the last call
    pub async fn poll_tasks(&mut self) {
        if let Some(outcome) = take_finished(&mut self.upload_task).await {
            match &outcome {
                Ok(message) => tracing::info!(%message, "upload finished"),
                Err(e) => tracing::warn!(error = %e, "upload failed"),
            }
            self.upload.finish_submit(outcome);
        }

        if let Some(outcome) = take_finished(&mut self.chat_task).await {
            match &outcome {
                Ok(answer) => tracing::info!(chars = answer.chars().count(), "answer received"),
                Err(e) => tracing::warn!(error = %e, "chat request failed"),
            }
            self.chat.finish_send(outcome);
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.upload.loading || self.chat.sending {
            self.animation_frame = (self.animation_frame + 1) % 4;
        }
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.chat_line_count().saturating_sub(self.visible_chat_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    /// Scroll the conversation so its last line is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();
        let visible_height = self.visible_chat_height();

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered line count of the conversation, including the pending
    /// "Thinking..." indicator. Counted with the same word wrapping the chat
    /// box uses.
    fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let lines = Paragraph::new(ui::chat_text(&self.chat, self.animation_frame))
            .wrap(Wrap { trim: true })
            .line_count(wrap_width);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }
}

async fn take_finished(task: &mut Option<RequestTask>) -> Option<Result<String, ApiError>> {
    if !task.as_ref().is_some_and(|t| t.is_finished()) {
        return None;
    }
    let handle = task.take()?;
    Some(match handle.await {
        Ok(outcome) => outcome,
        Err(join_error) => Err(ApiError::Task(join_error.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatMessage;
    use std::io::Write;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn settle(app: &mut App) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while app.is_busy() {
                app.poll_tasks().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("requests did not finish");
    }

    #[tokio::test]
    async fn test_starts_on_upload_view() {
        let app = App::new(TranscriptClient::new("http://127.0.0.1:9"));
        assert_eq!(app.view, View::Upload);
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "answer": "Hi there" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut app = App::new(TranscriptClient::new(&server.uri()));
        app.chat.set_draft("Hello");
        app.send_chat();

        // user message is visible before the answer arrives
        assert_eq!(app.chat.messages, vec![ChatMessage::user("Hello")]);
        assert!(app.chat.sending);

        // a second send while waiting does nothing
        app.send_chat();
        assert_eq!(app.chat.messages.len(), 1);

        settle(&mut app).await;
        assert_eq!(
            app.chat.messages,
            vec![ChatMessage::user("Hello"), ChatMessage::bot("Hi there")]
        );
        assert!(app.chat.draft.is_empty());
        assert!(!app.chat.sending);
    }

    #[tokio::test]
    async fn test_chat_failure_becomes_bot_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "detail": "model offline" })),
            )
            .mount(&server)
            .await;

        let mut app = App::new(TranscriptClient::new(&server.uri()));
        app.chat.set_draft("Hello");
        app.send_chat();
        settle(&mut app).await;

        assert_eq!(app.chat.messages.len(), 2);
        let reply = &app.chat.messages[1];
        assert!(reply.text.starts_with("Error: "), "{}", reply.text);
        assert!(reply.text.ends_with("model offline"), "{}", reply.text);
        assert!(app.chat.draft.is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_file_does_nothing() {
        let mut app = App::new(TranscriptClient::new("http://127.0.0.1:9"));
        app.submit_upload();
        assert!(app.upload_task.is_none());
        assert!(app.upload.status.is_empty());
        assert!(!app.upload.loading);
    }

    #[tokio::test]
    async fn test_upload_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "Transcript received" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Alice: let's ship on Friday").unwrap();

        let mut app = App::new(TranscriptClient::new(&server.uri()));
        app.upload.select_file(file.path());
        app.submit_upload();
        assert!(app.upload.loading);

        settle(&mut app).await;
        assert_eq!(app.upload.status, "Transcript received");
        assert!(!app.upload.loading);
        assert_eq!(app.upload.selected_file.as_deref(), Some(file.path()));
    }

    #[tokio::test]
    async fn test_upload_unreachable_server() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"notes").unwrap();

        let mut app = App::new(TranscriptClient::new("http://127.0.0.1:9"));
        app.upload.select_file(file.path());
        app.submit_upload();
        settle(&mut app).await;

        assert!(app.upload.status.starts_with("Upload failed: "), "{}", app.upload.status);
        assert!(!app.upload.loading);
    }

    #[tokio::test]
    async fn test_scroll_follows_new_messages() {
        let mut app = App::new(TranscriptClient::new("http://127.0.0.1:9"));
        app.chat_height = 4;
        app.chat_width = 20;
        for i in 0..5 {
            app.chat.messages.push(ChatMessage::user(format!("question {i}")));
        }
        // 5 messages of one line plus a blank line each
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 6);

        app.scroll_chat_up(10);
        assert_eq!(app.chat_scroll, 0);
        app.scroll_chat_down(100);
        assert_eq!(app.chat_scroll, 6);
    }

    #[tokio::test]
    async fn test_scroll_down_near_u16_max_clamps() {
        let mut app = App::new(TranscriptClient::new("http://127.0.0.1:9"));
        app.chat_height = 4;
        app.chat_width = 20;
        app.chat.messages.push(ChatMessage::user("one"));
        app.chat_scroll = u16::MAX - 1;

        app.scroll_chat_down(u16::MAX);
        assert_eq!(app.chat_scroll, 0);
    }

    #[tokio::test]
    async fn test_line_count_follows_word_wrap() {
        let mut app = App::new(TranscriptClient::new("http://127.0.0.1:9"));
        app.chat_height = 5;
        app.chat_width = 20;
        // wraps on words: "Bot: aaaaaaaaaaa" / "bbbbbbbbbbb" / "ccccccccccc" /
        // "ENDMARKER", then a blank line
        app.chat
            .messages
            .push(ChatMessage::bot("aaaaaaaaaaa bbbbbbbbbbb ccccccccccc ENDMARKER"));

        assert_eq!(app.chat_line_count(), 5);
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 0);

        app.chat.messages.push(ChatMessage::user("next"));
        app.chat.sending = true;
        // + "User: next", blank, "Bot: Thinking."
        assert_eq!(app.chat_line_count(), 8);
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 3);
    }
}
