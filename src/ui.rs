use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::state::{ChatState, Sender, View};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const SIDEBAR_WIDTH: u16 = 26;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);

    match app.view {
        View::Upload => render_upload_screen(app, frame, main_area),
        View::Chat => render_chat_screen(app, frame, main_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Meeting Mind ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.base_url().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Meeting Mind ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items: Vec<ListItem> = View::all()
        .iter()
        .map(|view| {
            let style = if *view == app.view {
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", view.title())).style(style)
        })
        .collect();

    // One row per item; stored for mouse hit-testing
    let items_area = Rect {
        height: inner.height.min(items.len() as u16),
        ..inner
    };
    app.nav_items_area = Some(items_area);

    frame.render_widget(List::new(items), items_area);
}

fn render_upload_screen(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", View::Upload.title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [input_area, selected_area, loading_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(inner);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" File path (i to edit, Enter to select) ");

    let path_len = app.upload.path_input.chars().count();
    let (visible_path, cursor_x) = visible_slice(&app.upload.path_input, path_len, input_area);
    frame.render_widget(
        Paragraph::new(visible_path)
            .style(Style::default().fg(Color::Cyan))
            .block(input_block),
        input_area,
    );
    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    let selected = match &app.upload.selected_file {
        Some(path) => Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::DarkGray)),
            Span::raw(path.display().to_string()),
        ]),
        None => Line::from(Span::styled(
            "No file selected",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    };
    frame.render_widget(Paragraph::new(selected), selected_area);

    if app.upload.loading {
        let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
        let loading = Line::from(vec![
            Span::styled(format!("{} ", spinner), Style::default().fg(Color::Yellow).bold()),
            Span::styled("Uploading...", Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(Paragraph::new(loading), loading_area);
    }

    let status_style = if app.upload.status.starts_with("Upload failed:") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    frame.render_widget(
        Paragraph::new(app.upload.status.as_str())
            .style(status_style)
            .wrap(Wrap { trim: true }),
        status_area,
    );
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", View::Chat.title()));

    let conversation = chat_text(&app.chat, app.animation_frame);

    let chat = Paragraph::new(conversation)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Type your question... ");

    let (visible_text, cursor_x) = visible_slice(&app.chat.draft, app.chat.cursor, input_area);

    // Cyan text to match the "User:" style
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

/// Conversation lines as the chat box renders them, before wrapping
pub fn chat_text(chat: &ChatState, animation_frame: u8) -> Text<'static> {
    if chat.messages.is_empty() && !chat.sending {
        Text::from(Span::styled(
            "Ask a question about your meetings...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in &chat.messages {
            let label_style = match msg.sender {
                Sender::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                Sender::Bot => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            };
            let label = Span::styled(format!("{}: ", msg.sender.label()), label_style);

            let mut text_lines = msg.text.lines();
            let first = text_lines.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![label, Span::raw(first)]));
            lines.extend(text_lines.map(|l| Line::from(l.to_string())));
            lines.push(Line::default());
        }

        if chat.sending {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((animation_frame as usize % 3) + 1);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}: ", Sender::Bot.label()),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        Text::from(lines)
    }
}

/// The part of a single-line input that fits inside a bordered box,
/// scrolled horizontally so the cursor stays visible. Returns the text and
/// the cursor column relative to the box's inner area.
fn visible_slice(input: &str, cursor_pos: usize, area: Rect) -> (String, u16) {
    let inner_width = area.width.saturating_sub(2) as usize;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible: String = input.chars().skip(scroll_offset).take(inner_width).collect();
    (visible, (cursor_pos - scroll_offset) as u16)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.view {
        View::Upload => " UPLOAD ",
        View::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: &[(&str, &str)] = match (app.view, app.input_mode) {
        (View::Upload, InputMode::Normal) => &[
            (" i ", " edit path "),
            (" Enter ", " upload "),
            (" Tab ", " chat "),
            (" q ", " quit "),
        ],
        (View::Chat, InputMode::Normal) => &[
            (" i ", " type "),
            (" j/k ", " scroll "),
            (" Tab ", " upload "),
            (" q ", " quit "),
        ],
        (View::Upload, InputMode::Editing) => &[(" Enter ", " select "), (" Esc ", " cancel ")],
        (View::Chat, InputMode::Editing) => &[(" Enter ", " send "), (" Esc ", " done ")],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in pairs {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TranscriptClient;
    use crate::state::ChatMessage;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App) -> String {
        draw_sized(app, 100, 20)
    }

    fn draw_sized(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_visible_slice_scrolls_to_cursor() {
        let area = Rect::new(0, 0, 7, 3); // 5 columns inside the borders
        assert_eq!(visible_slice("abc", 3, area), ("abc".to_string(), 3));
        assert_eq!(visible_slice("abcdefgh", 8, area), ("efgh".to_string(), 4));
    }

    #[test]
    fn test_upload_screen_shows_status_and_spinner() {
        let mut app = App::new(TranscriptClient::new("http://localhost:8000"));
        app.upload.select_file("standup.txt");
        app.upload.loading = true;
        app.upload.status = "Transcript received".to_string();

        let screen = draw(&mut app);
        assert!(screen.contains("Upload Transcript"));
        assert!(screen.contains("Selected: standup.txt"));
        assert!(screen.contains("Uploading..."));
        assert!(screen.contains("Transcript received"));
        assert_eq!(app.nav_items_area.map(|a| a.height), Some(2));
    }

    #[test]
    fn test_chat_screen_shows_conversation() {
        let mut app = App::new(TranscriptClient::new("http://localhost:8000"));
        app.view = View::Chat;
        app.chat.messages.push(ChatMessage::user("Hello"));
        app.chat.messages.push(ChatMessage::bot("Hi there"));

        let screen = draw(&mut app);
        assert!(screen.contains("User: Hello"));
        assert!(screen.contains("Bot: Hi there"));
        assert!(!screen.contains("Thinking"));
    }

    #[test]
    fn test_last_wrapped_reply_reachable_at_bottom() {
        let mut app = App::new(TranscriptClient::new("http://localhost:8000"));
        app.view = View::Chat;
        for i in 0..6 {
            app.chat.messages.push(ChatMessage::user(format!("q{i}")));
            app.chat.messages.push(ChatMessage::bot(format!(
                "aaaaaaaaaaa bbbbbbbbbbb ccccccccccc ENDMARKER{i}"
            )));
        }

        // first frame records the 20x5 conversation box
        draw_sized(&mut app, 48, 12);
        assert_eq!((app.chat_width, app.chat_height), (20, 5));

        app.scroll_chat_to_bottom();
        let screen = draw_sized(&mut app, 48, 12);
        assert!(screen.contains("ENDMARKER5"), "{screen}");

        app.scroll_chat_down(100);
        let screen = draw_sized(&mut app, 48, 12);
        assert!(screen.contains("ENDMARKER5"), "{screen}");
    }
}
