// Observable single-value holder.
// Notifies one bound listener on every change and replays the current value on bind.

use std::fmt;

/// Callback invoked with the held value.
pub type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// A value with at most one listener.
///
/// `set_value` always notifies, even when the new value equals the old one.
/// Not synchronised: set it from the context the listener expects to run on.
pub struct ObservableValue<T> {
    value: T,
    listener: Option<Listener<T>>,
}

impl<T> ObservableValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listener: None,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Store `value`, then notify the listener with it.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.value);
        }
    }

    /// Replace the listener and immediately call it with the current value.
    /// The previous listener is dropped without further notification.
    pub fn bind(&mut self, listener: impl FnMut(&T) + Send + 'static) {
        let listener = self.listener.insert(Box::new(listener));
        listener(&self.value);
    }

    /// Drop the listener. Returns whether one was bound.
    pub fn unbind(&mut self) -> bool {
        self.listener.take().is_some()
    }

    pub fn is_bound(&self) -> bool {
        self.listener.is_some()
    }
}

impl<T: Default> Default for ObservableValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("value", &self.value)
            .field("bound", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(&T) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
    }

    #[test]
    fn test_bind_replays_current_value() {
        let mut observable: ObservableValue<Option<i32>> = ObservableValue::default();
        let (seen, listener) = recorder::<Option<i32>>();

        observable.bind(listener);
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn test_set_value_notifies_every_time() {
        let mut observable = ObservableValue::new(1);
        let (seen, listener) = recorder::<i32>();
        observable.bind(listener);

        observable.set_value(2);
        observable.set_value(2);
        observable.set_value(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2, 3]);
        assert_eq!(*observable.value(), 3);
    }

    #[test]
    fn test_rebind_discards_previous_listener() {
        let mut observable = ObservableValue::new("a".to_string());
        let (first, listener) = recorder::<String>();
        observable.bind(listener);

        let (second, listener) = recorder::<String>();
        observable.bind(listener);
        observable.set_value("b".to_string());

        assert_eq!(*first.lock().unwrap(), vec!["a".to_string()]);
        assert_eq!(*second.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_set_without_listener() {
        let mut observable = ObservableValue::new(0);
        observable.set_value(5);
        assert_eq!(*observable.value(), 5);
        assert!(!observable.is_bound());
    }

    #[test]
    fn test_unbind() {
        let mut observable = ObservableValue::new(0);
        let (seen, listener) = recorder::<i32>();
        observable.bind(listener);

        assert!(observable.unbind());
        observable.set_value(1);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
        assert!(!observable.unbind());
    }
}
