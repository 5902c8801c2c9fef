//! Native animation driver
//!
//! Steps native-driven [`AnimatedValue`]s on a tokio task at a fixed frame
//! interval, so animations progress without the UI thread ticking them.

use std::time::Duration;
use tokio::task::JoinHandle;

use crate::animated::AnimatedValue;

/// Default frame interval (60 fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Background driver for native animated values
#[derive(Debug)]
pub struct NativeDriver {
    handle: JoinHandle<()>,
}

impl NativeDriver {
    /// Spawn a driver on the current tokio runtime
    ///
    /// Values that are not native driven are ignored; the host frame loop
    /// owns those.
    pub fn spawn(values: Vec<AnimatedValue>, frame_interval: Duration) -> Self {
        let values: Vec<AnimatedValue> = values
            .into_iter()
            .filter(|value| {
                let native = value.is_native_driven();
                if !native {
                    tracing::warn!("NativeDriver given a UI-thread animated value; ignoring it");
                }
                native
            })
            .collect();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(frame_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                for value in &values {
                    value.tick(frame_interval);
                }
            }
        });

        Self { handle }
    }

    /// Stop driving
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for NativeDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spring::SpringConfig;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_driver_completes_native_spring() {
        let value = AnimatedValue::native(1.0);
        value.ensure_subscribed();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        value.spring_to(
            0.0,
            SpringConfig::default(),
            0.0,
            Some(Box::new(move |end| flag.store(end.finished, Ordering::SeqCst))),
        );

        let driver = NativeDriver::spawn(vec![value.clone()], DEFAULT_FRAME_INTERVAL);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(value.value(), 0.0);
        driver.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_delivers_async_reads() {
        let value = AnimatedValue::native(0.25);
        value.ensure_subscribed();
        let _driver = NativeDriver::spawn(vec![value.clone()], DEFAULT_FRAME_INTERVAL);

        let (tx, rx) = tokio::sync::oneshot::channel();
        value.stop_animation(move |v| {
            let _ = tx.send(v);
        });
        let read = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("read not delivered")
            .unwrap();
        assert_eq!(read, 0.25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_ignores_ui_thread_values() {
        let value = AnimatedValue::new(1.0);
        value.spring_to(0.0, SpringConfig::default(), 0.0, None);
        let _driver = NativeDriver::spawn(vec![value.clone()], DEFAULT_FRAME_INTERVAL);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(value.value(), 1.0);
        assert!(value.is_animating());
    }
}
