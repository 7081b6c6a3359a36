//! Real-time task scheduler — the single queue behind the engine's timers.
//!
//! The clock tick, the population-growth timer and the pool trim are
//! recurring tasks in one priority queue keyed by due time. Tasks due at
//! the same millisecond fire in `ScheduledTask` declaration order, so a
//! given sequence of `advance` calls always yields the same firing order.
//! The queue only hands out tasks; the engine runs them one at a time.

use crate::{clock::SimSpeed, config::TimerConfig};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScheduledTask {
    ClockTick,
    PopulationGrowth,
    PoolTrim,
}

/// Ordering: (due_ms ASC, task ASC). `Reverse` makes the heap a min-heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    due_ms: u64,
    task: ScheduledTask,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Pending>>,
    now_ms: u64,
    timers: TimerConfig,
}

impl Scheduler {
    /// Arm all three tasks, each first due one interval from now.
    pub fn new(timers: TimerConfig, speed: SimSpeed) -> Self {
        let mut scheduler = Self { queue: BinaryHeap::new(), now_ms: 0, timers };
        for task in [ScheduledTask::ClockTick, ScheduledTask::PopulationGrowth, ScheduledTask::PoolTrim] {
            scheduler.arm(task, speed);
        }
        scheduler
    }

    /// Milliseconds of real time seen so far.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// How long `task` waits between firings. Only the clock tick follows
    /// the game speed.
    pub fn interval_ms(&self, task: ScheduledTask, speed: SimSpeed) -> u64 {
        let interval = match task {
            ScheduledTask::ClockTick => self.timers.tick_interval_ms / u64::from(speed.multiplier()),
            ScheduledTask::PopulationGrowth => self.timers.growth_interval_ms,
            ScheduledTask::PoolTrim => self.timers.trim_interval_ms,
        };
        interval.max(1)
    }

    /// Let `elapsed_ms` of real time pass. Nothing fires until `pop_due`.
    pub fn advance(&mut self, elapsed_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
    }

    /// Take the earliest task whose due time has passed and re-arm it for
    /// its next firing. Returns `None` when nothing is due.
    pub fn pop_due(&mut self, speed: SimSpeed) -> Option<ScheduledTask> {
        let Reverse(next) = *self.queue.peek()?;
        if next.due_ms > self.now_ms {
            return None;
        }
        self.queue.pop();
        let interval = self.interval_ms(next.task, speed);
        self.queue.push(Reverse(Pending { due_ms: next.due_ms + interval, task: next.task }));
        Some(next.task)
    }

    /// Re-arm the clock tick from now, e.g. after a speed change.
    pub fn rearm_clock(&mut self, speed: SimSpeed) {
        self.queue.retain(|Reverse(p)| p.task != ScheduledTask::ClockTick);
        self.arm(ScheduledTask::ClockTick, speed);
    }

    fn arm(&mut self, task: ScheduledTask, speed: SimSpeed) {
        let due_ms = self.now_ms + self.interval_ms(task, speed);
        self.queue.push(Reverse(Pending { due_ms, task }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn scheduler() -> Scheduler {
        Scheduler::new(SimConfig::default_test().timers, SimSpeed::Normal)
    }

    fn drain(s: &mut Scheduler, speed: SimSpeed) -> Vec<ScheduledTask> {
        std::iter::from_fn(|| s.pop_due(speed)).collect()
    }

    #[test]
    fn nothing_fires_before_its_interval() {
        let mut s = scheduler();
        s.advance(999);
        assert!(drain(&mut s, SimSpeed::Normal).is_empty());
        s.advance(1);
        assert_eq!(drain(&mut s, SimSpeed::Normal), [ScheduledTask::ClockTick]);
    }

    #[test]
    fn ten_seconds_fire_in_time_then_task_order() {
        let mut s = scheduler();
        s.advance(10_000);
        let fired = drain(&mut s, SimSpeed::Normal);
        let ticks = fired.iter().filter(|t| **t == ScheduledTask::ClockTick).count();
        let trims = fired.iter().filter(|t| **t == ScheduledTask::PoolTrim).count();
        assert_eq!(ticks, 10);
        assert_eq!(trims, 2);
        // At 5000 ms the tick precedes the trim; at 10000 ms tick, growth, trim.
        assert_eq!(
            &fired[fired.len() - 3..],
            [ScheduledTask::ClockTick, ScheduledTask::PopulationGrowth, ScheduledTask::PoolTrim]
        );
        assert_eq!(fired[4..6], [ScheduledTask::ClockTick, ScheduledTask::PoolTrim]);
    }

    #[test]
    fn faster_speeds_shorten_only_the_clock_interval() {
        let mut s = Scheduler::new(SimConfig::default_test().timers, SimSpeed::Faster);
        assert_eq!(s.interval_ms(ScheduledTask::ClockTick, SimSpeed::Faster), 200);
        assert_eq!(s.interval_ms(ScheduledTask::PopulationGrowth, SimSpeed::Faster), 10_000);
        s.advance(1_000);
        let ticks = drain(&mut s, SimSpeed::Faster)
            .into_iter()
            .filter(|t| *t == ScheduledTask::ClockTick)
            .count();
        assert_eq!(ticks, 5);
    }

    #[test]
    fn rearm_restarts_the_clock_from_now() {
        let mut s = scheduler();
        s.advance(900);
        s.rearm_clock(SimSpeed::Fast);
        s.advance(499);
        assert!(drain(&mut s, SimSpeed::Fast).is_empty());
        s.advance(1);
        assert_eq!(drain(&mut s, SimSpeed::Fast), [ScheduledTask::ClockTick]);
    }
}
