use std::path::PathBuf;

use crate::client::DocQaClient;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Question input
    pub input_cursor: usize, // cursor position in session.pending_input, in chars

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Upload prompt overlay
    pub show_upload_prompt: bool,
    pub upload_input: String,
    pub upload_cursor: usize,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // In-flight requests
    pub upload_task: Option<tokio::task::JoinHandle<anyhow::Result<String>>>,
    pub ask_task: Option<tokio::task::JoinHandle<anyhow::Result<String>>>,

    // Backend
    pub client: DocQaClient,
}

impl App {
    pub fn new(api_url: &str) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: Session::new(),

            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            show_upload_prompt: false,
            upload_input: String::new(),
            upload_cursor: 0,

            animation_frame: 0,

            upload_task: None,
            ask_task: None,

            client: DocQaClient::new(api_url),
        }
    }

    /// Submit the drafted question. Spawns the ask request in the
    /// background; a blank draft or an already pending ask is a no-op.
    pub fn submit_question(&mut self) {
        if self.ask_task.is_some() {
            return;
        }
        let Some(question) = self.session.take_question() else {
            return;
        };
        self.input_cursor = 0;
        self.scroll_chat_to_bottom();

        let client = self.client.clone();
        self.ask_task = Some(tokio::spawn(async move { client.ask(&question).await }));
    }

    /// Submit the path typed into the upload prompt. Spawns the upload
    /// request in the background; ignored while another upload is pending.
    pub fn submit_upload(&mut self) {
        if self.upload_task.is_some() {
            return;
        }
        let path = expand_home(self.upload_input.trim());
        if path.as_os_str().is_empty() {
            return;
        }
        self.close_upload_prompt();
        self.session.begin_upload();

        let client = self.client.clone();
        self.upload_task = Some(tokio::spawn(async move { client.upload(&path).await }));
    }

    /// Collect results of any finished background request and fold them
    /// into the session. Called on every tick.
    pub async fn poll_requests(&mut self) {
        if self.upload_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.upload_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(err) => Err(anyhow::anyhow!("upload task panicked: {err}")),
                };
                self.session.finish_upload(result);
            }
        }

        if self.ask_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.ask_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(err) => Err(anyhow::anyhow!("ask task panicked: {err}")),
                };
                self.session.finish_question(result);
                self.scroll_chat_to_bottom();
            }
        }
    }

    pub fn open_upload_prompt(&mut self) {
        self.show_upload_prompt = true;
        self.upload_input.clear();
        self.upload_cursor = 0;
    }

    pub fn close_upload_prompt(&mut self) {
        self.show_upload_prompt = false;
        self.upload_input.clear();
        self.upload_cursor = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.answer_in_flight || self.session.upload_in_flight {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_chat_down(&mut self) {
        let max_scroll = self.transcript_line_count().saturating_sub(self.chat_height);
        if self.chat_scroll < max_scroll {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll chat so the latest turn (or the typing indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.transcript_line_count();
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Number of rendered lines the transcript occupies at the current
    /// chat width, including the typing indicator when a reply is pending.
    fn transcript_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.session.transcript {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += char_count.div_ceil(wrap_width) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.answer_in_flight {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        total_lines
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_scroll_accounts_for_wrapped_lines() {
        let mut app = App::new("http://localhost:8000");
        app.chat_width = 10;
        app.chat_height = 4;
        app.session.pending_input = "a".repeat(35);
        app.session.take_question().unwrap();
        app.session.finish_question(Ok("ok".to_string()));

        app.scroll_chat_to_bottom();
        // 35 chars at width 10 wrap to 4 lines, plus role and blank lines
        assert!(app.chat_scroll > 0);
    }

    #[test]
    fn exact_fit_line_counts_as_one_row() {
        let mut app = App::new("http://localhost:8000");
        app.chat_width = 10;
        app.session.pending_input = "a".repeat(10);
        app.session.take_question().unwrap();

        // Role line + one content row + blank line, plus the two
        // typing-indicator lines while the answer is pending
        assert_eq!(app.transcript_line_count(), 5);
    }

    #[test]
    fn short_transcript_does_not_scroll() {
        let mut app = App::new("http://localhost:8000");
        app.chat_width = 80;
        app.chat_height = 20;
        app.session.pending_input = "hi".to_string();
        app.session.take_question().unwrap();

        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 0);
    }
}
