use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::state::View;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::InputClosed => {
            tracing::warn!("terminal input closed, quitting");
            app.should_quit = true;
        }
    }

    // Every event is a chance to pick up finished requests; Tick guarantees
    // this happens even when the user is idle.
    app.poll_tasks().await;
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => match app.view {
            View::Upload => handle_upload_editing(app, key),
            View::Chat => handle_chat_editing(app, key),
        },
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Navigation between screens
        KeyCode::Tab | KeyCode::BackTab => app.switch_view(app.view.toggle()),
        KeyCode::Char('1') => app.switch_view(View::Upload),
        KeyCode::Char('2') => app.switch_view(View::Chat),

        _ => match app.view {
            View::Upload => handle_upload_normal(app, key),
            View::Chat => handle_chat_normal(app, key),
        },
    }
}

fn handle_upload_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('e') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter | KeyCode::Char('u') => app.submit_upload(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.chat_height / 2);
        }
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        _ => {}
    }
}

fn handle_upload_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.upload.select_typed_path();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.upload.path_input.pop();
        }
        KeyCode::Char(c) => {
            app.upload.path_input.push(c);
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.send_chat(),
        KeyCode::Backspace => app.chat.backspace(),
        KeyCode::Delete => app.chat.delete(),
        KeyCode::Left => app.chat.cursor_left(),
        KeyCode::Right => app.chat.cursor_right(),
        KeyCode::Home => app.chat.cursor_home(),
        KeyCode::End => app.chat.cursor_end(),
        KeyCode::Char(c) => app.chat.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (col, row) = (mouse.column, mouse.row);
    let in_area = |area: Option<Rect>| {
        area.is_some_and(|a| col >= a.x && col < a.x + a.width && row >= a.y && row < a.y + a.height)
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            // Sidebar items are one row each, in View::all() order
            if let Some(area) = app.nav_items_area.filter(|a| in_area(Some(*a))) {
                let idx = (row - area.y) as usize;
                if let Some(view) = View::all().get(idx).copied() {
                    app.switch_view(view);
                }
            }
        }
        MouseEventKind::ScrollDown if app.view == View::Chat && in_area(app.chat_area) => {
            app.scroll_chat_down(3);
        }
        MouseEventKind::ScrollUp if app.view == View::Chat && in_area(app.chat_area) => {
            app.scroll_chat_up(3);
        }
        _ => {}
    }
}
