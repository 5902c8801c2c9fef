//! Animated values
//!
//! An [`AnimatedValue`] is a continuous value that can be set directly or
//! driven by a spring. Handles are cheap to clone and share one value.
//!
//! # Native driven values
//!
//! A value created with [`AnimatedValue::native`] is advanced by a driver
//! running off the UI thread (see [`crate::driver::NativeDriver`]). The copy
//! of the value visible to the UI thread, returned by [`AnimatedValue::value`]
//! and handed to [`AnimatedValue::stop_animation`] callbacks, is only kept in
//! sync while at least one listener is attached. Any consumer that reads a
//! native value asynchronously must call [`AnimatedValue::ensure_subscribed`]
//! first.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::spring::{Spring, SpringConfig};

/// Listener called with every new value
pub type ValueListener = Arc<dyn Fn(f64) + Send + Sync>;

/// Callback receiving the value read by [`AnimatedValue::stop_animation`]
pub type ValueCallback = Box<dyn FnOnce(f64) + Send>;

/// Callback run when an animation ends
pub type EndCallback = Box<dyn FnOnce(AnimationEnd) + Send>;

/// How an animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEnd {
    /// True if the animation reached its target, false if it was interrupted
    pub finished: bool,
}

/// Identifier of a value listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Running {
    spring: Spring,
    on_end: Option<EndCallback>,
}

struct Inner {
    value: f64,
    mirror: f64,
    native: bool,
    running: Option<Running>,
    listeners: Vec<(ListenerId, ValueListener)>,
    next_listener: u64,
    pending_reads: Vec<ValueCallback>,
}

impl Inner {
    fn cancel(&mut self) -> Option<EndCallback> {
        self.running.take().and_then(|running| running.on_end)
    }

    fn listeners(&self) -> Vec<ValueListener> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }

    fn sync_mirror(&mut self) {
        if !self.native || !self.listeners.is_empty() {
            self.mirror = self.value;
        }
    }
}

/// A continuous, animatable value
#[derive(Clone)]
pub struct AnimatedValue {
    inner: Arc<Mutex<Inner>>,
}

impl AnimatedValue {
    /// Create a value animated on the UI thread
    pub fn new(value: f64) -> Self {
        Self::with_driver(value, false)
    }

    /// Create a value animated by the native driver
    pub fn native(value: f64) -> Self {
        Self::with_driver(value, true)
    }

    fn with_driver(value: f64, native: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                mirror: value,
                native,
                running: None,
                listeners: Vec::new(),
                next_listener: 0,
                pending_reads: Vec::new(),
            })),
        }
    }

    /// Is this value driven by an out-of-thread animation driver?
    pub fn is_native_driven(&self) -> bool {
        self.inner.lock().native
    }

    /// Value as seen from the UI thread
    pub fn value(&self) -> f64 {
        self.inner.lock().mirror
    }

    /// Check if an animation is in flight
    pub fn is_animating(&self) -> bool {
        let inner = self.inner.lock();
        inner.running.is_some() || !inner.pending_reads.is_empty()
    }

    /// Set the value directly, interrupting any animation
    pub fn set_value(&self, value: f64) {
        let (interrupted, listeners) = {
            let mut inner = self.inner.lock();
            let interrupted = inner.cancel();
            inner.value = value;
            inner.mirror = value;
            (interrupted, inner.listeners())
        };
        if let Some(on_end) = interrupted {
            on_end(AnimationEnd { finished: false });
        }
        for listener in listeners {
            listener(value);
        }
    }

    /// Attach a listener
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Detach a listener
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Attach a no-op listener to a native value that has none
    ///
    /// Returns true if a listener was added.
    pub fn ensure_subscribed(&self) -> bool {
        let mut inner = self.inner.lock();
        if !inner.native || !inner.listeners.is_empty() {
            return false;
        }
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(|_| {})));
        true
    }

    /// Stop any animation and read the current value
    ///
    /// UI-thread values call back immediately. Native values call back on
    /// the next driver frame.
    pub fn stop_animation<F>(&self, callback: F)
    where
        F: FnOnce(f64) + Send + 'static,
    {
        let (interrupted, immediate) = {
            let mut inner = self.inner.lock();
            let interrupted = inner.cancel();
            if inner.native {
                inner.pending_reads.push(Box::new(callback));
                (interrupted, None)
            } else {
                (interrupted, Some((callback, inner.mirror)))
            }
        };
        if let Some(on_end) = interrupted {
            on_end(AnimationEnd { finished: false });
        }
        if let Some((callback, value)) = immediate {
            callback(value);
        }
    }

    /// Spring toward `to`, replacing any running animation
    ///
    /// `velocity` is in units per second. The replaced animation's end
    /// callback runs with `finished: false`.
    pub fn spring_to(
        &self,
        to: f64,
        config: SpringConfig,
        velocity: f64,
        on_end: Option<EndCallback>,
    ) {
        let interrupted = {
            let mut inner = self.inner.lock();
            let interrupted = inner.cancel();
            let spring = Spring::new(inner.value, to, velocity, config);
            inner.running = Some(Running { spring, on_end });
            interrupted
        };
        if let Some(on_end) = interrupted {
            on_end(AnimationEnd { finished: false });
        }
    }

    /// Advance by one frame
    ///
    /// Called by the host frame loop for UI-thread values and by the native
    /// driver for native values. Returns true while an animation is running.
    pub fn tick(&self, dt: Duration) -> bool {
        let (reads, read_value, update, finished) = {
            let mut inner = self.inner.lock();
            let reads = std::mem::take(&mut inner.pending_reads);
            let read_value = inner.mirror;

            let mut update = None;
            let mut finished = None;
            let current = inner.value;
            if let Some(running) = inner.running.as_mut() {
                let (next, done) = if running.spring.is_at_rest(current) {
                    (running.spring.to, true)
                } else {
                    running.spring.step(current, dt)
                };
                inner.value = next;
                inner.sync_mirror();
                update = Some((next, inner.listeners()));
                if done {
                    finished = inner.running.take().map(|r| r.on_end);
                }
            }
            (reads, read_value, update, finished)
        };

        for read in reads {
            read(read_value);
        }
        if let Some((value, listeners)) = update {
            for listener in listeners {
                listener(value);
            }
        }
        if let Some(Some(on_end)) = finished {
            on_end(AnimationEnd { finished: true });
        }
        self.is_animating()
    }
}

impl fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AnimatedValue")
            .field("value", &inner.value)
            .field("mirror", &inner.mirror)
            .field("native", &inner.native)
            .field("animating", &inner.running.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const FRAME: Duration = Duration::from_millis(16);

    fn run(value: &AnimatedValue) {
        for _ in 0..1000 {
            if !value.tick(FRAME) {
                return;
            }
        }
        panic!("animation did not finish");
    }

    #[test]
    fn test_set_value_notifies_listeners() {
        let value = AnimatedValue::new(0.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        value.add_listener(move |v| sink.lock().push(v));
        value.set_value(0.5);
        assert_eq!(value.value(), 0.5);
        assert_eq!(*seen.lock(), vec![0.5]);
    }

    #[test]
    fn test_spring_reaches_target_and_reports_finished() {
        let value = AnimatedValue::new(1.0);
        let finished = Arc::new(Mutex::new(None));
        let slot = finished.clone();
        value.spring_to(
            0.0,
            SpringConfig::default(),
            0.0,
            Some(Box::new(move |end| *slot.lock() = Some(end.finished))),
        );
        assert!(value.is_animating());
        run(&value);
        assert_eq!(value.value(), 0.0);
        assert_eq!(*finished.lock(), Some(true));
    }

    #[test]
    fn test_new_spring_interrupts_previous() {
        let value = AnimatedValue::new(1.0);
        let first = Arc::new(Mutex::new(None));
        let slot = first.clone();
        value.spring_to(
            0.0,
            SpringConfig::default(),
            0.0,
            Some(Box::new(move |end| *slot.lock() = Some(end.finished))),
        );
        value.tick(FRAME);
        value.spring_to(1.0, SpringConfig::default(), 0.0, None);
        assert_eq!(*first.lock(), Some(false));
        run(&value);
        assert_eq!(value.value(), 1.0);
    }

    #[test]
    fn test_stop_animation_reads_synchronously() {
        let value = AnimatedValue::new(1.0);
        value.spring_to(0.0, SpringConfig::default(), 0.0, None);
        value.tick(FRAME);
        let expected = value.value();

        let read = Arc::new(Mutex::new(None));
        let slot = read.clone();
        value.stop_animation(move |v| *slot.lock() = Some(v));
        assert_eq!(*read.lock(), Some(expected));
        assert!(!value.is_animating());
    }

    #[test]
    fn test_spring_at_target_finishes_on_next_frame() {
        let value = AnimatedValue::new(0.0);
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        value.spring_to(
            0.0,
            SpringConfig::default(),
            0.0,
            Some(Box::new(move |end| flag.store(end.finished, Ordering::SeqCst))),
        );
        assert!(!done.load(Ordering::SeqCst));
        assert!(!value.tick(FRAME));
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn test_native_value_without_listener_reads_stale() {
        let value = AnimatedValue::native(1.0);
        assert!(value.is_native_driven());
        value.spring_to(0.0, SpringConfig::default(), 0.0, None);
        for _ in 0..5 {
            value.tick(FRAME);
        }
        // The driver moved the value but the UI thread never heard about it
        assert_eq!(value.value(), 1.0);

        let read = Arc::new(Mutex::new(None));
        let slot = read.clone();
        value.stop_animation(move |v| *slot.lock() = Some(v));
        assert_eq!(*read.lock(), None);
        value.tick(FRAME);
        assert_eq!(*read.lock(), Some(1.0));
    }

    #[test]
    fn test_native_value_with_subscriber_stays_in_sync() {
        let value = AnimatedValue::native(1.0);
        assert!(value.ensure_subscribed());
        assert!(!value.ensure_subscribed());
        assert_eq!(value.listener_count(), 1);

        value.spring_to(0.0, SpringConfig::default(), 0.0, None);
        for _ in 0..5 {
            value.tick(FRAME);
        }
        let moved = value.value();
        assert!(moved < 1.0);

        let read = Arc::new(Mutex::new(None));
        let slot = read.clone();
        value.stop_animation(move |v| *slot.lock() = Some(v));
        value.tick(FRAME);
        assert_eq!(*read.lock(), Some(moved));
    }

    #[test]
    fn test_ui_thread_value_needs_no_subscriber() {
        let value = AnimatedValue::new(0.0);
        assert!(!value.ensure_subscribed());
        assert_eq!(value.listener_count(), 0);
    }

    #[test]
    fn test_remove_listener() {
        let value = AnimatedValue::new(0.0);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = value.add_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        value.set_value(1.0);
        assert!(value.remove_listener(id));
        value.set_value(2.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
