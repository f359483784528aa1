use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;

use crate::domain::identity::models::Identity;

/// Callback invoked with the new session state on every transition.
pub type Observer = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;

#[derive(Default)]
struct ObserverList {
    next_id: u64,
    entries: Vec<(u64, Observer)>,
}

/// Registry of session observers.
///
/// Delivery is synchronous and in registration order. Observers are invoked
/// on a snapshot of the registry, so a callback may subscribe, unsubscribe or
/// call back into the session manager.
#[derive(Default)]
pub struct Observers {
    list: Arc<Mutex<ObserverList>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    ///
    /// # Returns
    /// Subscription handle; dropping it removes the observer
    pub fn subscribe(&self, observer: Observer) -> Subscription {
        let mut list = lock(&self.list);
        let id = list.next_id;
        list.next_id += 1;
        list.entries.push((id, observer));

        Subscription {
            id,
            list: Arc::downgrade(&self.list),
        }
    }

    /// Deliver a state transition to every registered observer.
    pub fn notify(&self, state: Option<&Identity>) {
        let snapshot: Vec<Observer> = lock(&self.list)
            .entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in snapshot {
            observer(state);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.list).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a registered observer.
///
/// The observer stays registered until the handle is dropped or
/// `unsubscribe` is called. Use `detach` to keep it for the lifetime of the
/// session manager.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    list: Weak<Mutex<ObserverList>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}

    /// Keep the observer registered without holding the handle.
    pub fn detach(mut self) {
        self.list = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            lock(&list).entries.retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock(list: &Mutex<ObserverList>) -> MutexGuard<'_, ObserverList> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}
