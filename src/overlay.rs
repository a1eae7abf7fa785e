//! 全屏警示遮罩
//!
//! 触发后可见 2.5 秒，再淡出 0.5 秒；消失时由调用方重置闩锁。

use std::time::Duration;

use crate::timers::TimerId;

pub const OVERLAY_VISIBLE: Duration = Duration::from_millis(2500);
pub const OVERLAY_FADE: Duration = Duration::from_millis(500);
/// 震动节奏（毫秒）：震动、停顿交替
pub const PULSE_PATTERN: [u64; 5] = [200, 100, 200, 100, 400];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    #[default]
    Hidden,
    Visible,
    Fading,
}

#[derive(Debug, Default)]
pub struct Overlay {
    phase: OverlayPhase,
    timers: Vec<TimerId>,
    fired_count: usize,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_showing(&self) -> bool {
        self.phase != OverlayPhase::Hidden
    }

    pub fn fired_count(&self) -> usize {
        self.fired_count
    }

    /// 显示遮罩；返回需要取消的旧定时器
    pub fn show(&mut self) -> Vec<TimerId> {
        self.phase = OverlayPhase::Visible;
        self.fired_count += 1;
        std::mem::take(&mut self.timers)
    }

    pub fn track(&mut self, timer: TimerId) {
        self.timers.push(timer);
    }

    pub fn fade(&mut self) {
        if self.phase == OverlayPhase::Visible {
            self.phase = OverlayPhase::Fading;
        }
    }

    pub fn dismiss(&mut self) {
        self.phase = OverlayPhase::Hidden;
        self.timers.clear();
    }

    /// 震动节奏中“震动”段的次数
    pub fn pulse_count() -> usize {
        PULSE_PATTERN.iter().step_by(2).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases() {
        let mut overlay = Overlay::new();
        assert!(!overlay.is_showing());
        assert!(overlay.show().is_empty());
        assert_eq!(overlay.phase(), OverlayPhase::Visible);
        overlay.fade();
        assert_eq!(overlay.phase(), OverlayPhase::Fading);
        overlay.dismiss();
        assert_eq!(overlay.phase(), OverlayPhase::Hidden);
        assert_eq!(overlay.fired_count(), 1);
        assert_eq!(Overlay::pulse_count(), 3);
    }

    #[test]
    fn test_refire_returns_previous_timers() {
        let mut overlay = Overlay::new();
        let mut queue = crate::timers::TimerQueue::<()>::new();
        let now = std::time::Instant::now();
        overlay.show();
        let timer = queue.schedule(now, OVERLAY_VISIBLE, ());
        overlay.track(timer);
        assert_eq!(overlay.show(), vec![timer]);
        assert_eq!(overlay.fired_count(), 2);
    }
}
