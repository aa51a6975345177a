use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Rc<Cell<bool>>)>,
}

/// Broadcasts "the host was resized" to every live subscription.
///
/// Cloning shares the same listener list. Emission only raises a flag on
/// each subscription; subscribers pick it up when they next poll.
#[derive(Clone, Default)]
pub struct ResizeSignal {
    listeners: Rc<RefCell<Listeners>>,
}

impl ResizeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. It stays registered until the subscription drops.
    pub fn subscribe(&self) -> ResizeSubscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;

        let pending = Rc::new(Cell::new(false));
        listeners.entries.push((id, Rc::clone(&pending)));

        ResizeSubscription {
            id,
            pending,
            signal: Rc::downgrade(&self.listeners),
        }
    }

    pub fn emit(&self) {
        for (_, pending) in &self.listeners.borrow().entries {
            pending.set(true);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// A registered resize listener. Deregisters on drop.
pub struct ResizeSubscription {
    id: u64,
    pending: Rc<Cell<bool>>,
    signal: Weak<RefCell<Listeners>>,
}

impl ResizeSubscription {
    /// Returns whether a resize was signalled since the last call, clearing it.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.signal.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeSubscription")
            .field("id", &self.id)
            .field("pending", &self.pending.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_flags_every_subscriber_once() {
        let signal = ResizeSignal::new();
        let a = signal.subscribe();
        let b = signal.subscribe();

        signal.emit();
        assert!(a.take());
        assert!(!a.take());
        assert!(b.is_pending());
    }

    #[test]
    fn dropping_subscription_deregisters() {
        let signal = ResizeSignal::new();
        let sub = signal.subscribe();
        assert_eq!(signal.listener_count(), 1);

        drop(sub);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_signal_drops_cleanly() {
        let signal = ResizeSignal::new();
        let sub = signal.subscribe();
        drop(signal);
        assert!(!sub.take());
    }

    #[test]
    fn clones_share_listeners() {
        let signal = ResizeSignal::new();
        let other = signal.clone();
        let sub = signal.subscribe();

        other.emit();
        assert!(sub.take());
        assert_eq!(other.listener_count(), 1);
    }
}
