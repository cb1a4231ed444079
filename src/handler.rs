use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_requests().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if key.code == KeyCode::Char('o') && key.modifiers.contains(KeyModifiers::CONTROL) {
        if app.show_upload_prompt {
            app.close_upload_prompt();
        } else {
            app.open_upload_prompt();
        }
        return;
    }

    if app.show_upload_prompt {
        handle_upload_prompt(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the input box
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        // Upload prompt
        KeyCode::Char('o') | KeyCode::Char('u') => app.open_upload_prompt(),

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('g') => app.scroll_chat_to_top(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_question();
        }
        KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Down => app.scroll_chat_down(),
        _ => {
            let mut input = std::mem::take(&mut app.session.pending_input);
            let mut cursor = app.input_cursor;
            edit_field(&mut input, &mut cursor, key);
            app.session.pending_input = input;
            app.input_cursor = cursor;
        }
    }
}

fn handle_upload_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_upload_prompt(),
        KeyCode::Enter => app.submit_upload(),
        _ => {
            let mut input = std::mem::take(&mut app.upload_input);
            let mut cursor = app.upload_cursor;
            edit_field(&mut input, &mut cursor, key);
            app.upload_input = input;
            app.upload_cursor = cursor;
        }
    }
}

/// Cursor-aware editing shared by the question input and the upload prompt
fn edit_field(input: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(input, *cursor);
            input.insert(byte_pos, c);
            *cursor += 1;
        }
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            *cursor = (*cursor + 1).min(input.chars().count());
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = input.chars().count();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn edits_respect_utf8_boundaries() {
        let mut input = "héllo".to_string();
        let mut cursor = 2; // between é and l

        edit_field(&mut input, &mut cursor, key(KeyCode::Char('x')));
        assert_eq!(input, "héxllo");
        assert_eq!(cursor, 3);

        edit_field(&mut input, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(input, "héllo");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn cursor_stays_within_bounds() {
        let mut input = "ab".to_string();
        let mut cursor = 2;

        edit_field(&mut input, &mut cursor, key(KeyCode::Right));
        assert_eq!(cursor, 2);

        edit_field(&mut input, &mut cursor, key(KeyCode::Home));
        assert_eq!(cursor, 0);

        edit_field(&mut input, &mut cursor, key(KeyCode::Left));
        assert_eq!(cursor, 0);

        edit_field(&mut input, &mut cursor, key(KeyCode::Delete));
        assert_eq!(input, "b");
    }
}
