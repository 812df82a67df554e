use std::time::Duration;

const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Once,
    Repeating { interval: Duration },
}

#[derive(Debug, Clone)]
struct ScheduledTimer<E> {
    id: TimerId,
    due_at: Duration,
    kind: TimerKind,
    event: E,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiredTimer<E> {
    pub id: TimerId,
    pub fired_at: Duration,
    pub event: E,
}

/// Deterministic delayed-call and repeating-interval queue on a simulated clock.
///
/// Callers advance the clock once per tick, then drain due timers one at a time
/// with [`Scheduler::pop_due`]. Draining one at a time means a cancellation issued
/// while handling one timer is honored for every timer that has not fired yet.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    timers: Vec<ScheduledTimer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
        }
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn delayed_call(&mut self, delay: Duration, event: E) -> TimerId {
        self.insert(delay, TimerKind::Once, event)
    }

    /// First fires after one full interval, then every interval until cancelled.
    pub fn repeating(&mut self, interval: Duration, event: E) -> TimerId {
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        self.insert(interval, TimerKind::Repeating { interval }, event)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Removes and returns the earliest due timer; ties resolve in scheduling order.
    pub fn pop_due(&mut self) -> Option<FiredTimer<E>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_at <= self.now)
            .min_by_key(|(_, timer)| (timer.due_at, timer.id))
            .map(|(index, _)| index)?;

        match self.timers[index].kind {
            TimerKind::Once => {
                let timer = self.timers.swap_remove(index);
                Some(FiredTimer {
                    id: timer.id,
                    fired_at: timer.due_at,
                    event: timer.event,
                })
            }
            TimerKind::Repeating { interval } => {
                let timer = &mut self.timers[index];
                let fired_at = timer.due_at;
                timer.due_at = timer.due_at.saturating_add(interval);
                Some(FiredTimer {
                    id: timer.id,
                    fired_at,
                    event: timer.event.clone(),
                })
            }
        }
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    fn insert(&mut self, delay: Duration, kind: TimerKind, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.timers.push(ScheduledTimer {
            id,
            due_at: self.now.saturating_add(delay),
            kind,
            event,
        });
        id
    }
}
