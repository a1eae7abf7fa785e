//! App 状态定义 (Model)
//!
//! 列表、闩锁、遮罩、动画与定时器都归属于同一个控制器

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::animation::AnimatedCounters;
use crate::config::Config;
use crate::latch::ForbiddenLatch;
use crate::models::{Item, ItemId, TodoList};
use crate::overlay::Overlay;
use crate::render::{ListView, RenderTarget, render};
use crate::storage::KeyValueStore;
use crate::timers::{TimerId, TimerQueue};

/// 应用状态
pub struct App {
    pub list: TodoList,
    pub(super) store: Box<dyn KeyValueStore>,
    pub(super) storage_key: String,
    pub(super) snapshot: Option<Box<dyn RenderTarget>>,
    pub latch: ForbiddenLatch,
    pub overlay: Overlay,
    pub counters: AnimatedCounters,
    pub(super) timers: TimerQueue<Deferred>,
    pub(super) removing: HashMap<ItemId, TimerId>, // 正在淡出、尚未真正删除的条目
    pub view: ListView,
    pub rendered_at: Instant,
    pub selected_index: usize,
    pub mode: AppMode,
    pub input_buffer: String,
    pub message: Option<String>,
    pub(super) pending_bells: usize,
    pub(super) removal_delay: Duration,
    pub(super) stagger: Duration,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Adding,
    Alert(String), // 阻塞式错误提示，确认后才继续
}

/// 延迟执行的任务
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    CommitRemoval(ItemId),
    FadeOverlay,
    DismissOverlay,
}

impl App {
    /// 创建新的应用实例
    pub fn new(list: TodoList, store: Box<dyn KeyValueStore>, config: &Config, now: Instant) -> Self {
        let counters = AnimatedCounters::new(list.counters(), config.counter_animation(), now);
        let view = render(&list, &HashSet::new(), config.stagger());
        Self {
            list,
            store,
            storage_key: config.storage_key.clone(),
            snapshot: None,
            latch: ForbiddenLatch::new(),
            overlay: Overlay::new(),
            counters,
            timers: TimerQueue::new(),
            removing: HashMap::new(),
            view,
            rendered_at: now,
            selected_index: 0,
            mode: AppMode::Normal,
            input_buffer: String::new(),
            message: None,
            pending_bells: 0,
            removal_delay: config.removal_delay(),
            stagger: config.stagger(),
        }
    }

    /// 附加额外的渲染目标（如 HTML 快照）
    pub fn with_render_target(mut self, target: Box<dyn RenderTarget>) -> Self {
        self.snapshot = Some(target);
        self
    }

    /// 获取当前选中的条目
    pub fn selected_item(&self) -> Option<&Item> {
        self.list.get(self.selected_index)
    }

    /// 取出待响铃次数（终端中代替震动）
    pub fn take_bells(&mut self) -> usize {
        std::mem::take(&mut self.pending_bells)
    }

    /// 下一个定时任务的截止时间
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// 是否还有行处于出现延迟中（需要继续高频刷新）
    pub fn has_rows_appearing(&self, now: Instant) -> bool {
        let since_render = now.saturating_duration_since(self.rendered_at);
        self.view
            .rows()
            .iter()
            .any(|row| row.appear_delay > since_render)
    }

    /// 确保选中索引有效
    pub(super) fn clamp_selection(&mut self) {
        if self.list.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.list.len() {
            self.selected_index = self.list.len() - 1;
        }
    }
}
