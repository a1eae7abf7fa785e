//! 延迟任务队列
//!
//! 每个任务返回一个可取消的句柄，替代“捕获旧状态的回调”。

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    deadline: Instant,
    task: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: now + delay,
            task,
        });
        id
    }

    /// 取消任务；任务已执行或不存在时返回 false
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// 取出所有到期任务，按截止时间排序，相同截止时间按调度顺序
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.deadline <= now);
        self.entries = pending;
        due.sort_by_key(|entry| (entry.deadline, entry.id));
        due.into_iter().map(|entry| entry.task).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_deadline_order() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(start, Duration::from_millis(300), "late");
        timers.schedule(start, Duration::from_millis(100), "early");
        timers.schedule(start, Duration::from_millis(100), "early-2");

        assert!(timers.drain_due(start).is_empty());
        assert_eq!(
            timers.next_deadline(),
            Some(start + Duration::from_millis(100))
        );
        assert_eq!(
            timers.drain_due(start + Duration::from_millis(150)),
            vec!["early", "early-2"]
        );
        assert_eq!(timers.len(), 1);
        assert_eq!(
            timers.drain_due(start + Duration::from_secs(1)),
            vec!["late"]
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        let id = timers.schedule(start, Duration::ZERO, 1);
        timers.schedule(start, Duration::ZERO, 2);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.drain_due(start), vec![2]);
    }
}
