//! 禁忌条目闩锁
//!
//! 两个状态：`Armed`（待触发）与 `Triggered`（已触发）。
//! 禁忌文本数量达到阈值且处于 `Armed` 时触发一次；数量回落到阈值以下时立即重新待命。

/// 被拦截的命令文本
pub const BLOCKED_COMMAND: &str = "不要回头";
/// 闩锁统计的禁忌文本
pub const FORBIDDEN_TEXT: &str = "它就在你身后";
/// 触发阈值
pub const FORBIDDEN_THRESHOLD: usize = 30;
/// 拦截命令后批量注入的条目数量
pub const INJECTION_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchState {
    #[default]
    Armed,
    Triggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEvent {
    Fired,
}

#[derive(Debug, Clone, Default)]
pub struct ForbiddenLatch {
    state: LatchState,
}

impl ForbiddenLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LatchState {
        self.state
    }

    #[cfg(test)]
    pub fn is_triggered(&self) -> bool {
        self.state == LatchState::Triggered
    }

    /// 根据当前禁忌文本数量更新状态
    pub fn evaluate(&mut self, count: usize) -> Option<LatchEvent> {
        if count < FORBIDDEN_THRESHOLD {
            self.state = LatchState::Armed;
            return None;
        }
        match self.state {
            LatchState::Armed => {
                self.state = LatchState::Triggered;
                Some(LatchEvent::Fired)
            }
            LatchState::Triggered => None,
        }
    }

    /// 遮罩自动消失后无条件重置
    pub fn reset(&mut self) {
        self.state = LatchState::Armed;
    }
}
