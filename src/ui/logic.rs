//! 业务逻辑处理 (Update/Dispatch)
//!
//! 每次变更的顺序固定：修改列表 -> 持久化 -> 重新渲染 -> 检查闩锁

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::actions::Action;
use super::state::{App, AppMode, Deferred};
use crate::error::AppError;
use crate::latch::{BLOCKED_COMMAND, FORBIDDEN_TEXT, INJECTION_COUNT, LatchEvent};
use crate::models::ItemId;
use crate::overlay::{OVERLAY_FADE, OVERLAY_VISIBLE, Overlay};
use crate::render::render;
use crate::storage::save_todos;

impl App {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action, now: Instant) -> Result<bool, AppError> {
        match action {
            Action::Quit => return Ok(true),
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::StartAdd => self.start_add(),
            Action::ToggleSelected => self.toggle_selected(now)?,
            Action::DeleteSelected => self.delete_selected(now)?,
            Action::ClearCompleted => self.clear_completed(now)?,

            Action::Cancel => self.cancel(),
            Action::Submit => {
                if self.mode == AppMode::Adding {
                    self.submit(now)?;
                }
            }
            Action::Acknowledge => {
                if matches!(self.mode, AppMode::Alert(_)) {
                    self.mode = AppMode::Normal;
                    self.inject_forbidden(now)?;
                }
            }

            Action::Input(c) => {
                if self.mode == AppMode::Adding {
                    self.input_buffer.push(c);
                }
            }
            Action::DeleteChar => {
                if self.mode == AppMode::Adding {
                    self.input_buffer.pop();
                }
            }
        }
        Ok(false)
    }

    // ============ 导航相关 ============

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.list.len() {
            self.selected_index += 1;
        }
    }

    // ============ 添加相关 ============

    pub fn start_add(&mut self) {
        self.mode = AppMode::Adding;
        self.input_buffer.clear();
    }

    /// 提交输入：空白输入忽略，拦截命令弹出提示，其余追加
    pub fn submit(&mut self, now: Instant) -> Result<(), AppError> {
        let text = self.input_buffer.trim().to_string();
        if text.is_empty() {
            return Ok(());
        }
        self.input_buffer.clear();

        if text == BLOCKED_COMMAND {
            warn!(command = %text, "拦截命令");
            self.mode = AppMode::Alert(format!("「{BLOCKED_COMMAND}」是被禁止的命令，无法添加！"));
            return Ok(());
        }

        self.mode = AppMode::Normal;
        self.add_item(text, now)?;
        self.selected_index = self.list.len() - 1;
        self.message = Some("任务已添加".to_string());
        Ok(())
    }

    /// 追加一个条目
    pub fn add_item(&mut self, text: String, now: Instant) -> Result<ItemId, AppError> {
        info!(text = %text, "添加任务");
        let id = self.list.append(text);
        self.persist()?;
        self.rerender(now)?;
        self.check_latch(now);
        Ok(id)
    }

    /// 拦截命令的替代动作：逐个注入禁忌条目，每次都检查闩锁
    fn inject_forbidden(&mut self, now: Instant) -> Result<(), AppError> {
        for _ in 0..INJECTION_COUNT {
            self.add_item(FORBIDDEN_TEXT.to_string(), now)?;
        }
        self.message = Some(format!("已注入 {INJECTION_COUNT} 个条目"));
        Ok(())
    }

    // ============ 切换 / 删除 ============

    pub fn toggle_selected(&mut self, now: Instant) -> Result<(), AppError> {
        if self.list.is_empty() {
            return Ok(());
        }
        self.toggle(self.selected_index, now)
    }

    pub fn toggle(&mut self, index: usize, now: Instant) -> Result<(), AppError> {
        let completed = self.list.toggle(index)?;
        debug!(index, completed, "切换完成状态");
        self.persist()?;
        self.rerender(now)
    }

    /// 标记为删除中，延迟后按 id 真正删除
    pub fn delete_selected(&mut self, now: Instant) -> Result<(), AppError> {
        let Some(id) = self.selected_item().map(|item| item.id) else {
            return Ok(());
        };
        if self.removing.contains_key(&id) {
            return Ok(());
        }
        if self.removal_delay.is_zero() {
            return self.remove_at(self.selected_index, now);
        }

        let timer = self
            .timers
            .schedule(now, self.removal_delay, Deferred::CommitRemoval(id));
        self.removing.insert(id, timer);
        self.rerender(now)
    }

    fn commit_removal(&mut self, id: ItemId, now: Instant) -> Result<(), AppError> {
        self.removing.remove(&id);
        match self.list.position_of(id) {
            Some(index) => self.remove_at(index, now),
            None => {
                warn!(%id, "待删除的条目已不存在");
                Ok(())
            }
        }
    }

    pub fn remove_at(&mut self, index: usize, now: Instant) -> Result<(), AppError> {
        let removed = self.list.remove_at(index)?;
        if let Some(timer) = self.removing.remove(&removed.id) {
            self.timers.cancel(timer);
        }
        info!(index, text = %removed.text, "删除任务");
        self.persist()?;
        self.rerender(now)?;
        self.check_latch(now);
        self.message = Some("任务已删除".to_string());
        Ok(())
    }

    /// 删除所有已完成条目
    pub fn clear_completed(&mut self, now: Instant) -> Result<(), AppError> {
        let removed = self.list.remove_completed();
        for id in &removed {
            if let Some(timer) = self.removing.remove(id) {
                self.timers.cancel(timer);
            }
        }
        info!(count = removed.len(), "清除已完成任务");
        self.persist()?;
        self.rerender(now)?;
        self.check_latch(now);
        self.message = Some(format!("已清除 {} 个已完成任务", removed.len()));
        Ok(())
    }

    // ============ 持久化 / 渲染 / 闩锁 ============

    fn persist(&mut self) -> Result<(), AppError> {
        save_todos(self.store.as_mut(), &self.storage_key, &self.list)?;
        Ok(())
    }

    fn rerender(&mut self, now: Instant) -> Result<(), AppError> {
        let removing: HashSet<ItemId> = self.removing.keys().copied().collect();
        self.view = render(&self.list, &removing, self.stagger);
        self.rendered_at = now;
        self.counters.retarget(self.view.counters, now);
        self.clamp_selection();
        if let Some(target) = self.snapshot.as_mut() {
            target.present(&self.view)?;
        }
        Ok(())
    }

    fn check_latch(&mut self, now: Instant) {
        let count = self.list.count_text(FORBIDDEN_TEXT);
        if let Some(LatchEvent::Fired) = self.latch.evaluate(count) {
            self.fire_overlay(now);
        }
        debug!(count, state = ?self.latch.state(), "闩锁检查");
    }

    fn fire_overlay(&mut self, now: Instant) {
        warn!(fired = self.overlay.fired_count() + 1, "触发全屏警示");
        for stale in self.overlay.show() {
            self.timers.cancel(stale);
        }
        let fade = self.timers.schedule(now, OVERLAY_VISIBLE, Deferred::FadeOverlay);
        let dismiss = self
            .timers
            .schedule(now, OVERLAY_VISIBLE + OVERLAY_FADE, Deferred::DismissOverlay);
        self.overlay.track(fade);
        self.overlay.track(dismiss);
        self.pending_bells += Overlay::pulse_count();
    }

    /// 刷新：执行到期的延迟任务
    pub fn tick(&mut self, now: Instant) -> Result<(), AppError> {
        for task in self.timers.drain_due(now) {
            match task {
                Deferred::CommitRemoval(id) => self.commit_removal(id, now)?,
                Deferred::FadeOverlay => self.overlay.fade(),
                Deferred::DismissOverlay => {
                    self.overlay.dismiss();
                    self.latch.reset();
                    debug!("警示已消失，闩锁重置");
                }
            }
        }
        Ok(())
    }

    // ============ 通用操作 ============

    pub fn cancel(&mut self) {
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
        self.message = None;
    }
}
