//! 视图层模块
//!
//! 把纯视图描述 [`ListView`](crate::render::ListView) 绘制到终端

pub mod components;

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::state::{App, AppMode};
use crate::latch::FORBIDDEN_TEXT;
use crate::overlay::OverlayPhase;
use crate::render::{EMPTY_PLACEHOLDER, RowView};
use components::{centered_rect, render_dialog_framework, render_input_widget};

/// 绘制 UI
pub fn draw(frame: &mut Frame, app: &App, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(5),    // 列表
            Constraint::Length(3), // 统计
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_list(frame, app, now, chunks[1]);
    render_counters(frame, app, now, chunks[2]);
    render_help(frame, app, chunks[3]);

    match &app.mode {
        AppMode::Adding => render_add_dialog(frame, app),
        AppMode::Alert(message) => render_alert_dialog(frame, message),
        AppMode::Normal => {}
    }

    if app.overlay.is_showing() {
        render_overlay(frame, app.overlay.phase());
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("📝 待办清单")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn row_style(row: &RowView, selected: bool, appeared: bool) -> Style {
    let mut style = if row.removing {
        Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
    } else if row.completed {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };
    if !appeared {
        style = style.add_modifier(Modifier::DIM);
    }
    if selected {
        style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    style
}

fn render_list(frame: &mut Frame, app: &App, now: Instant, area: Rect) {
    let block = Block::default().title("任务列表").borders(Borders::ALL);

    let rows = app.view.rows();
    if rows.is_empty() {
        let empty = Paragraph::new(EMPTY_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let since_render = now.saturating_duration_since(app.rendered_at);
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let checkbox = if row.completed { "[x] " } else { "[ ] " };
            let appeared = since_render >= row.appear_delay;
            let style = row_style(row, row.index == app.selected_index, appeared);
            ListItem::new(Line::from(vec![
                Span::styled(checkbox, style),
                Span::styled(row.text.as_str(), style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected_index));

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_counters(frame: &mut Frame, app: &App, now: Instant, area: Rect) {
    let counters = app.counters.displayed(now);
    let line = Line::from(vec![
        Span::raw("全部 "),
        Span::styled(counters.total.to_string(), Style::default().fg(Color::Cyan)),
        Span::raw("   已完成 "),
        Span::styled(
            counters.completed.to_string(),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   未完成 "),
        Span::styled(
            counters.pending.to_string(),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    let stats = Paragraph::new(line).block(Block::default().title("统计").borders(Borders::ALL));
    frame.render_widget(stats, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[a] 添加  [空格] 完成/取消  [d] 删除  [c] 清除已完成  [j/k] 导航  [q] 退出"
        }
        AppMode::Adding => "输入内容后按 [Enter] 添加  [Esc] 取消",
        AppMode::Alert(_) => "[Enter] 确定",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_add_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 25, frame.area());
    let inner = render_dialog_framework(frame, area, "添加任务", Color::Cyan);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    render_input_widget(frame, chunks[0], "内容", &app.input_buffer);
    frame.render_widget(
        Paragraph::new("按 Enter 添加，Esc 取消").style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
}

fn render_alert_dialog(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let dialog = Paragraph::new(format!("{}\n\n[Enter] 确定", message))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("⚠️ 错误").borders(Borders::ALL));

    frame.render_widget(dialog, area);
}

fn render_overlay(frame: &mut Frame, phase: OverlayPhase) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let style = match phase {
        OverlayPhase::Fading => Style::default()
            .fg(Color::Gray)
            .bg(Color::Black)
            .add_modifier(Modifier::DIM),
        _ => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
    };

    let padding = area.height.saturating_sub(1) / 2;
    let mut lines: Vec<Line> = (0..padding).map(|_| Line::raw("")).collect();
    lines.push(Line::raw(FORBIDDEN_TEXT));

    let overlay = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(overlay, area);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::config::Config;
    use crate::models::TodoList;
    use crate::storage::MemoryStore;

    fn draw_to_buffer(app: &App, now: Instant) -> ratatui::buffer::Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, app, now)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn screen_text(app: &App, now: Instant) -> String {
        draw_to_buffer(app, now)
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_markup_is_drawn_literally() {
        let now = Instant::now();
        let mut list = TodoList::new();
        list.append("<script>x</script>".to_string());
        let app = App::new(list, Box::new(MemoryStore::new()), &Config::default(), now);
        let text = screen_text(&app, now);
        assert!(text.contains("[ ] <script>x</script>"));
    }

    #[test]
    fn test_overlay_covers_screen() {
        let now = Instant::now();
        let mut app = App::new(
            TodoList::new(),
            Box::new(MemoryStore::new()),
            &Config::default(),
            now,
        );
        for _ in 0..crate::latch::FORBIDDEN_THRESHOLD {
            app.add_item(FORBIDDEN_TEXT.to_string(), now).unwrap();
        }
        assert!(app.overlay.is_showing());
        let buffer = draw_to_buffer(&app, now);
        assert_eq!(buffer[(0, 0)].bg, Color::Red);
        assert_eq!(buffer[(79, 19)].bg, Color::Red);
    }
}
