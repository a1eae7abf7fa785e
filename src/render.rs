//! 纯投影：列表 + 计数器 -> 视图描述
//!
//! 具体的呈现由 [`RenderTarget`] 负责（终端视图或 HTML 快照）。

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use thiserror::Error;

use crate::models::{Counters, ItemId, TodoList};

/// 空列表占位文本
pub const EMPTY_PLACEHOLDER: &str = "暂无任务";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("写入快照失败: {0}")]
    Io(#[from] io::Error),
    #[error("格式化失败")]
    Fmt(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: ItemId,
    pub index: usize,
    pub text: String,
    pub completed: bool,
    /// 出现动画的延迟，与行号成正比
    pub appear_delay: Duration,
    pub removing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    Empty,
    Rows(Vec<RowView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub body: ListBody,
    pub counters: Counters,
}

impl ListView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            ListBody::Empty => &[],
            ListBody::Rows(rows) => rows,
        }
    }
}

pub fn render(list: &TodoList, removing: &HashSet<ItemId>, stagger: Duration) -> ListView {
    let body = if list.is_empty() {
        ListBody::Empty
    } else {
        ListBody::Rows(
            list.items()
                .iter()
                .enumerate()
                .map(|(index, item)| RowView {
                    id: item.id,
                    index,
                    text: item.text.clone(),
                    completed: item.completed,
                    appear_delay: stagger.saturating_mul(index as u32),
                    removing: removing.contains(&item.id),
                })
                .collect(),
        )
    };

    ListView {
        body,
        counters: list.counters(),
    }
}

/// 转义 HTML 特殊字符，用户文本永远不会被当作标记解析
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 视图的呈现目标
pub trait RenderTarget {
    fn present(&mut self, view: &ListView) -> Result<(), RenderError>;
}

/// 将视图物化为 HTML 片段
pub fn to_html(view: &ListView) -> Result<String, RenderError> {
    let mut html = String::new();
    let counters = view.counters;
    writeln!(
        html,
        "<div class=\"stats\"><span class=\"total\">{}</span><span class=\"completed\">{}</span><span class=\"pending\">{}</span></div>",
        counters.total, counters.completed, counters.pending
    )?;
    writeln!(html, "<ul class=\"todo-list\">")?;
    match &view.body {
        ListBody::Empty => {
            writeln!(html, "  <li class=\"empty-message\">{EMPTY_PLACEHOLDER}</li>")?;
        }
        ListBody::Rows(rows) => {
            for row in rows {
                let mut class = String::from("todo-item");
                if row.completed {
                    class.push_str(" completed");
                }
                if row.removing {
                    class.push_str(" removing");
                }
                writeln!(
                    html,
                    "  <li class=\"{class}\" style=\"animation-delay: {}ms\"><input type=\"checkbox\" class=\"todo-checkbox\"{}><span class=\"todo-text\">{}</span><button class=\"delete-btn\">删除</button></li>",
                    row.appear_delay.as_millis(),
                    if row.completed { " checked" } else { "" },
                    escape_html(&row.text),
                )?;
            }
        }
    }
    writeln!(html, "</ul>")?;
    Ok(html)
}

/// 每次渲染都覆盖写入的 HTML 快照文件
#[derive(Debug, Clone)]
pub struct HtmlSnapshot {
    path: PathBuf,
}

impl HtmlSnapshot {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RenderTarget for HtmlSnapshot {
    fn present(&mut self, view: &ListView) -> Result<(), RenderError> {
        let body = to_html(view)?;
        let content = format!(
            "<!-- {} -->\n{}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            body
        );
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_renders_placeholder() {
        let view = render(&TodoList::new(), &HashSet::new(), Duration::ZERO);
        assert_eq!(view.body, ListBody::Empty);
        assert!(view.rows().is_empty());
        assert!(to_html(&view).unwrap().contains(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn test_rows_follow_list_order() {
        let mut list = TodoList::new();
        let texts = ["one", "two", "three", "four"];
        for text in texts {
            list.append(text.to_string());
        }
        let view = render(&list, &HashSet::new(), Duration::from_millis(40));
        let rendered: Vec<&str> = view.rows().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(rendered, texts);
        assert_eq!(view.rows()[3].appear_delay, Duration::from_millis(120));
        assert_eq!(view.counters.total, 4);
    }

    #[test]
    fn test_removing_flag() {
        let mut list = TodoList::new();
        let id = list.append("a".to_string());
        list.append("b".to_string());
        let removing = HashSet::from([id]);
        let view = render(&list, &removing, Duration::ZERO);
        assert!(view.rows()[0].removing);
        assert!(!view.rows()[1].removing);
        assert!(to_html(&view).unwrap().contains("todo-item removing"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_script_is_literal_text() {
        let mut list = TodoList::new();
        list.append("<script>alert(1)</script>".to_string());
        let view = render(&list, &HashSet::new(), Duration::ZERO);
        assert_eq!(view.rows()[0].text, "<script>alert(1)</script>");

        let html = to_html(&view).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_html_snapshot_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.html");
        let mut target = HtmlSnapshot::new(path.clone());
        let mut list = TodoList::new();
        list.append("buy milk".to_string());
        list.toggle(0).unwrap();
        target
            .present(&render(&list, &HashSet::new(), Duration::ZERO))
            .unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("todo-item completed"));
        assert!(content.contains(" checked"));
    }
}
