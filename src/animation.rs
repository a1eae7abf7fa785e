//! 计数器缓动动画
//!
//! `value(t) = round(from + (to - from) * (1 - (1 - t)^3))`，每次刷新采样，直到 `t >= 1`。

use std::time::{Duration, Instant};

use crate::models::Counters;

/// 三次缓出
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    from: i64,
    to: i64,
    started: Instant,
    duration: Duration,
}

impl CounterAnimation {
    pub fn new(from: i64, to: i64, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    /// 静止在某个值
    pub fn settled(value: i64, now: Instant) -> Self {
        Self::new(value, value, now, Duration::ZERO)
    }

    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }

    pub fn value_at(&self, now: Instant) -> i64 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        let delta = (self.to - self.from) as f64;
        (self.from as f64 + delta * ease_out_cubic(t)).round() as i64
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> i64 {
        self.to
    }
}

/// 总数 / 已完成 / 待完成 三个独立动画
#[derive(Debug, Clone)]
pub struct AnimatedCounters {
    total: CounterAnimation,
    completed: CounterAnimation,
    pending: CounterAnimation,
    duration: Duration,
}

impl AnimatedCounters {
    pub fn new(initial: Counters, duration: Duration, now: Instant) -> Self {
        Self {
            total: CounterAnimation::settled(initial.total as i64, now),
            completed: CounterAnimation::settled(initial.completed as i64, now),
            pending: CounterAnimation::settled(initial.pending as i64, now),
            duration,
        }
    }

    /// 从当前显示值缓动到新目标；目标未变的计数器保持不动
    pub fn retarget(&mut self, target: Counters, now: Instant) {
        let duration = self.duration;
        let retarget_one = |anim: &mut CounterAnimation, to: usize| {
            let to = to as i64;
            if anim.target() != to {
                *anim = CounterAnimation::new(anim.value_at(now), to, now, duration);
            }
        };
        retarget_one(&mut self.total, target.total);
        retarget_one(&mut self.completed, target.completed);
        retarget_one(&mut self.pending, target.pending);
    }

    /// 当前显示值
    pub fn displayed(&self, now: Instant) -> Counters {
        let sample = |anim: &CounterAnimation| anim.value_at(now).max(0) as usize;
        Counters {
            total: sample(&self.total),
            completed: sample(&self.completed),
            pending: sample(&self.pending),
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        [&self.total, &self.completed, &self.pending]
            .iter()
            .any(|anim| !anim.is_finished(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.5, 0.875)]
    #[case(1.0, 1.0)]
    #[case(2.0, 1.0)]
    fn test_ease_out_cubic(#[case] t: f64, #[case] expected: f64) {
        assert!((ease_out_cubic(t) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_value_at_follows_formula() {
        let start = Instant::now();
        let anim = CounterAnimation::new(0, 8, start, Duration::from_millis(400));
        assert_eq!(anim.value_at(start), 0);
        // t = 0.5 -> 8 * 0.875 = 7
        assert_eq!(anim.value_at(start + Duration::from_millis(200)), 7);
        assert_eq!(anim.value_at(start + Duration::from_millis(400)), 8);
        assert!(anim.is_finished(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_counting_down() {
        let start = Instant::now();
        let anim = CounterAnimation::new(10, 2, start, Duration::from_millis(100));
        // t = 0.5 -> 10 - 8 * 0.875 = 3
        assert_eq!(anim.value_at(start + Duration::from_millis(50)), 3);
    }

    #[test]
    fn test_retarget_starts_from_displayed_value() {
        let start = Instant::now();
        let duration = Duration::from_millis(400);
        let mut counters = AnimatedCounters::new(Counters::default(), duration, start);
        counters.retarget(
            Counters {
                total: 8,
                completed: 0,
                pending: 8,
            },
            start,
        );
        let mid = start + Duration::from_millis(200);
        assert_eq!(counters.displayed(mid).total, 7);
        assert!(counters.is_animating(mid));

        counters.retarget(
            Counters {
                total: 9,
                completed: 0,
                pending: 9,
            },
            mid,
        );
        assert_eq!(counters.displayed(mid).total, 7);
        let done = mid + duration;
        assert_eq!(counters.displayed(done).total, 9);
        assert!(!counters.is_animating(done));
    }

    #[test]
    fn test_zero_duration_jumps() {
        let now = Instant::now();
        let mut counters = AnimatedCounters::new(Counters::default(), Duration::ZERO, now);
        let target = Counters {
            total: 3,
            completed: 1,
            pending: 2,
        };
        counters.retarget(target, now);
        assert_eq!(counters.displayed(now), target);
    }
}
