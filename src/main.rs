mod animation;
mod config;
mod error;
mod latch;
mod logger;
mod models;
mod overlay;
mod render;
mod storage;
mod timers;
mod ui;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;

use crate::config::Config;
use crate::render::HtmlSnapshot;
use crate::storage::{FileStore, load_todos};
use crate::ui::{App, draw};

/// 动画进行中的刷新间隔
const FRAME: Duration = Duration::from_millis(16);
/// 空闲时的事件等待上限
const IDLE: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    let config_path = Config::default_path()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("无法加载配置 {}", config_path.display()))?;
    let data_dir = config.resolve_data_dir()?;
    let _log_guard = logger::init(&data_dir, config.log_level()?)?;

    // 加载列表 (~/.local/share/todo-latch/<key>.json)
    let store = FileStore::new(data_dir.clone())?;
    let list = load_todos(&store, &config.storage_key).with_context(|| {
        format!(
            "无法读取 {}，请修复或删除该文件",
            store.path_for(&config.storage_key).display()
        )
    })?;
    info!(items = list.len(), dir = %data_dir.display(), "列表已加载");

    // 创建应用状态
    let mut app = App::new(list, Box::new(store), &config, Instant::now());
    if let Some(path) = &config.html_snapshot {
        app = app.with_render_target(Box::new(HtmlSnapshot::new(path.clone())));
    }

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(pending = app.next_deadline().is_some(), "退出");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now)?;
        terminal.draw(|f| draw(f, app, now))?;

        ring_bells(terminal.backend_mut(), app.take_bells())?;

        let timeout = if app.counters.is_animating(now)
            || app.overlay.is_showing()
            || app.has_rows_appearing(now)
        {
            FRAME
        } else {
            app.next_deadline()
                .map(|deadline| deadline.saturating_duration_since(now).min(IDLE))
                .unwrap_or(IDLE)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && ui::handle_key_event(app, key.code, Instant::now())?
                {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// 终端没有震动，用响铃代替
fn ring_bells<W: Write>(out: &mut W, count: usize) -> io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    for _ in 0..count {
        out.write_all(b"\x07")?;
    }
    Write::flush(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_bells() {
        let mut out = Vec::new();
        ring_bells(&mut out, 3).unwrap();
        assert_eq!(out, b"\x07\x07\x07");

        let mut silent = Vec::new();
        ring_bells(&mut silent, 0).unwrap();
        assert!(silent.is_empty());
    }
}
