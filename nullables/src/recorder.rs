//! Nullable event sink: records every published event for later assertions.

use std::sync::{Arc, Mutex, PoisonError};

/// Collects events delivered to the listeners it hands out.
///
/// Clones share the same buffer.
pub struct RecordingListener<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone + Send + 'static> RecordingListener<E> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A boxed listener suitable for an event bus `subscribe` call.
    pub fn listener(&self) -> Box<dyn Fn(&E) + Send + Sync> {
        let events = Arc::clone(&self.events);
        Box::new(move |event: &E| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        })
    }

    /// Everything recorded so far, in delivery order.
    pub fn events(&self) -> Vec<E> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return and forget everything recorded so far.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<E: Clone + Send + 'static> Default for RecordingListener<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RecordingListener<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let recorder = RecordingListener::<u32>::new();
        let listener = recorder.listener();
        listener(&1);
        listener(&2);
        assert_eq!(recorder.events(), vec![1, 2]);
        assert_eq!(recorder.take(), vec![1, 2]);
        assert!(recorder.is_empty());
    }
}
