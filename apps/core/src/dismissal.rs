use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    OutsidePointer,
    Escape,
    Navigated,
}

/// Visibility of the suggestion dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropdownState {
    visible: bool,
}

impl DropdownState {
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true when the dropdown was open and is now closed.
    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        tracing::debug!(?reason, was_visible = self.visible, "dropdown dismiss");
        let was_visible = self.visible;
        self.visible = false;
        was_visible
    }

    pub fn on_escape(&mut self) -> bool {
        self.dismiss(DismissReason::Escape)
    }

    pub fn on_outside_pointer(&mut self) -> bool {
        self.dismiss(DismissReason::OutsidePointer)
    }

    /// Refocusing reopens only when results are already in memory.
    pub fn on_focus(&mut self, has_results: bool) -> bool {
        if has_results && !self.visible {
            self.visible = true;
            return true;
        }
        false
    }
}

pub type OutsideCallback = Arc<dyn Fn() + Send + Sync>;

/// Source of "interaction happened outside the widget" notifications.
pub trait OutsideInteraction {
    fn on_outside(&self, callback: OutsideCallback) -> OutsideSubscription;
}

type ListenerList = Arc<Mutex<Vec<(u64, OutsideCallback)>>>;

/// Unregisters its listener when dropped.
pub struct OutsideSubscription {
    id: u64,
    listeners: ListenerList,
}

impl Drop for OutsideSubscription {
    fn drop(&mut self) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Listener registry fed by the host's pointer-down handling.
#[derive(Clone, Default)]
pub struct OutsideListeners {
    next_id: Arc<Mutex<u64>>,
    listeners: ListenerList,
}

impl OutsideListeners {
    /// `inside` is whether the pointer-down target sits in the widget subtree.
    pub fn pointer_down(&self, inside: bool) {
        if inside {
            return;
        }
        let callbacks: Vec<OutsideCallback> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

impl OutsideInteraction for OutsideListeners {
    fn on_outside(&self, callback: OutsideCallback) -> OutsideSubscription {
        let id = match self.next_id.lock() {
            Ok(mut next) => {
                *next += 1;
                *next
            }
            Err(_) => 0,
        };
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, callback));
        }
        OutsideSubscription {
            id,
            listeners: Arc::clone(&self.listeners),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{DropdownState, OutsideInteraction, OutsideListeners};

    #[test]
    fn escape_hides_only_when_visible() {
        let mut state = DropdownState::default();
        assert!(!state.on_escape());
        state.set_visible(true);
        assert!(state.on_escape());
        assert!(!state.is_visible());
    }

    #[test]
    fn focus_reopens_only_with_results_in_memory() {
        let mut state = DropdownState::default();
        assert!(!state.on_focus(false));
        assert!(!state.is_visible());
        assert!(state.on_focus(true));
        assert!(state.is_visible());
        assert!(!state.on_focus(true));
    }

    #[test]
    fn outside_pointer_closes_dropdown() {
        let mut state = DropdownState::default();
        state.set_visible(true);
        assert!(state.on_outside_pointer());
        assert!(!state.on_outside_pointer());
    }

    #[test]
    fn listeners_fire_for_outside_pointer_only() {
        let listeners = OutsideListeners::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _subscription = listeners.on_outside(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        listeners.pointer_down(true);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        listeners.pointer_down(false);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_unregisters_listener() {
        let listeners = OutsideListeners::default();
        let subscription = listeners.on_outside(Arc::new(|| {}));
        assert_eq!(listeners.listener_count(), 1);
        drop(subscription);
        assert_eq!(listeners.listener_count(), 0);
    }
}
