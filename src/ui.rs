use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::session::ChatRole;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, summary (when present), chat, input, footer
    let summary_height = summary_panel_height(app, area);
    let [header_area, summary_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(summary_height),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    if summary_height > 0 {
        render_summary(app, frame, summary_area);
    }
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_upload_prompt {
        render_upload_prompt(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let upload_indicator = if app.session.upload_in_flight {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!(" analyzing{}", dots)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" DocuMind ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            app.client.base_url().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(upload_indicator, Style::default().fg(Color::Yellow)),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

/// Height of the summary panel: enough for the wrapped summary text plus
/// borders, capped to a third of the screen. Zero when no summary exists.
fn summary_panel_height(app: &App, area: Rect) -> u16 {
    let Some(summary) = &app.session.summary else {
        return 0;
    };

    let wrap_width = area.width.saturating_sub(2).max(1) as usize;
    let mut lines: u16 = 0;
    for line in summary.lines() {
        let char_count = line.chars().count();
        lines += if char_count == 0 {
            1
        } else {
            char_count.div_ceil(wrap_width) as u16
        };
    }

    (lines + 2).min(area.height / 3)
}

fn render_summary(app: &App, frame: &mut Frame, area: Rect) {
    let summary = app.session.summary.as_deref().unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Document Summary ");

    let paragraph = Paragraph::new(summary)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    // Record the inner size so scroll calculations match what is drawn
    let inner = block.inner(area);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let chat_text = if app.session.transcript.is_empty() && !app.session.answer_in_flight {
        let hint = if app.session.summary.is_some() {
            "Ask a question about the document..."
        } else {
            "Upload a PDF (Ctrl+O), then ask questions about it..."
        };
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &app.session.transcript {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    )));
                }
            }
            for content_line in msg.content.lines() {
                lines.push(Line::from(content_line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.session.answer_in_flight {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask a question ");

    // Horizontal scrolling keeps the cursor visible for long drafts
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .session
        .pending_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !app.show_upload_prompt {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = if app.show_upload_prompt {
        "Enter: upload  Esc: cancel"
    } else {
        match app.input_mode {
            InputMode::Editing => "Enter: send  Ctrl+O: upload PDF  Esc: browse  Ctrl+C: quit",
            InputMode::Normal => "i: type  o: upload PDF  j/k: scroll  g/G: top/bottom  q: quit",
        }
    };

    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    frame.render_widget(footer, area);
}

fn render_upload_prompt(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Upload PDF ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Path to a PDF file. Enter to upload, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    let instructions_area = Rect::new(inner.x, inner.y, inner.width, 1);
    frame.render_widget(instructions, instructions_area);

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let input = Paragraph::new(app.upload_input.as_str())
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, input_area);

    let cursor_x = app.upload_cursor.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_panel_sizes_to_wrapped_text() {
        let mut app = App::new("http://localhost:8000");
        let area = Rect::new(0, 0, 80, 30);

        assert_eq!(summary_panel_height(&app, area), 0);

        // Exactly one wrapped row at the inner width (80 - 2 borders)
        app.session.summary = Some("a".repeat(78));
        assert_eq!(summary_panel_height(&app, area), 3);

        // A long summary is capped to a third of the screen
        app.session.summary = Some("a".repeat(78 * 40));
        assert_eq!(summary_panel_height(&app, area), 10);
    }
}
