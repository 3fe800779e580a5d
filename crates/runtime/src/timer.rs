/// Deterministic delayed-task queue.
///
/// Key properties:
/// - Total ordering on `(due, id)`: equal due times fire in scheduling order.
/// - Cancellation does not perturb the order of remaining timers.
/// - Time only advances when the caller passes a later `now`.
use foundation::time::TimeMs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    due: TimeMs,
    id: TimerId,
}

#[derive(Debug)]
struct Item<T> {
    key: Key,
    payload: T,
}

#[derive(Debug)]
pub struct Timers<T> {
    next_id: u64,
    items: Vec<Item<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
        }
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Schedule `payload` to fire once `delay_ms` has elapsed after `now`.
    pub fn schedule(&mut self, now: TimeMs, delay_ms: u64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.items.push(Item {
            key: Key {
                due: now.after(delay_ms),
                id,
            },
            payload,
        });
        id
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.items.iter().any(|i| i.key.id == id)
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.items.iter().position(|i| i.key.id == id) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Pops the earliest timer whose due time is `<= now`.
    pub fn pop_due(&mut self, now: TimeMs) -> Option<(TimerId, T)> {
        let mut best_idx: Option<usize> = None;
        for (idx, item) in self.items.iter().enumerate() {
            if item.key.due > now {
                continue;
            }
            match best_idx {
                None => best_idx = Some(idx),
                Some(best) => {
                    if item.key < self.items[best].key {
                        best_idx = Some(idx);
                    }
                }
            }
        }

        let idx = best_idx?;
        let item = self.items.swap_remove(idx);
        Some((item.key.id, item.payload))
    }

    /// Pops every timer due at `now`, in firing order.
    pub fn drain_due(&mut self, now: TimeMs) -> Vec<(TimerId, T)> {
        let mut out = Vec::new();
        while let Some(fired) = self.pop_due(now) {
            out.push(fired);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Timers;
    use foundation::time::TimeMs;

    #[test]
    fn nothing_fires_before_due() {
        let mut t = Timers::new();
        t.schedule(TimeMs(0), 50, "fit");
        assert!(t.pop_due(TimeMs(49)).is_none());
        let (_, v) = t.pop_due(TimeMs(50)).unwrap();
        assert_eq!(v, "fit");
        assert!(t.is_empty());
    }

    #[test]
    fn fires_by_due_then_schedule_order() {
        let mut t = Timers::new();
        t.schedule(TimeMs(0), 30, "late");
        t.schedule(TimeMs(0), 10, "a");
        t.schedule(TimeMs(0), 10, "b");
        let got: Vec<_> = t.drain_due(TimeMs(100)).into_iter().map(|(_, v)| v).collect();
        assert_eq!(got, vec!["a", "b", "late"]);
    }

    #[test]
    fn cancel_removes_pending_timer() {
        let mut t = Timers::new();
        let a = t.schedule(TimeMs(0), 10, "a");
        t.schedule(TimeMs(0), 10, "b");
        assert!(t.cancel(a));
        assert!(!t.cancel(a));
        assert!(!t.is_pending(a));

        let got: Vec<_> = t.drain_due(TimeMs(10)).into_iter().map(|(_, v)| v).collect();
        assert_eq!(got, vec!["b"]);
    }
}
