/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use log::debug;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ExpiringCache;

/// Stops the background sweep when told to, or when dropped.
pub struct SweepHandle {
    quit_sender: Option<oneshot::Sender<()>>,
    join_handle: JoinHandle<()>,
}

impl SweepHandle {
    pub fn stop(&mut self) {
        if let Some(sender) = self.quit_sender.take() {
            let _ = sender.send(());
        }
    }

    /// Stop and wait until the sweep task has exited.
    pub async fn shutdown(mut self) {
        self.stop();
        let _ = (&mut self.join_handle).await;
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<K, V, E> ExpiringCache<K, V, E>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: 'static,
{
    /// Spawn a task that removes stale entries every `interval`.
    ///
    /// The task keeps only a weak reference, it also exits once the cache
    /// itself is dropped.
    pub fn spawn_sweep(self: &Arc<Self>, interval: Duration, handle: Option<Handle>) -> SweepHandle
    where
        Self: Send + Sync,
    {
        let handle = handle.unwrap_or_else(Handle::current);
        let cache: Weak<Self> = Arc::downgrade(self);
        let (quit_sender, mut quit_receiver) = oneshot::channel::<()>();

        let join_handle = handle.spawn(async move {
            let mut sweep_interval = tokio::time::interval(interval);
            sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            sweep_interval.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = &mut quit_receiver => break,
                    _ = sweep_interval.tick() => {
                        let Some(cache) = cache.upgrade() else {
                            break;
                        };
                        let removed = cache.sweep();
                        if removed > 0 {
                            debug!("expiring cache sweep removed {removed} entries");
                        }
                    }
                }
            }
        });

        SweepHandle {
            quit_sender: Some(quit_sender),
            join_handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_types::ManualClock;

    fn new_cache(clock: Arc<ManualClock>) -> Arc<ExpiringCache<u32, u32, ()>> {
        Arc::new(ExpiringCache::new(
            Duration::from_millis(100),
            clock,
            |k: &u32| Ok(*k + 1),
        ))
    }

    #[tokio::test]
    async fn sweep_without_access() {
        let clock = Arc::new(ManualClock::default());
        let cache = new_cache(clock.clone());
        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        assert_eq!(cache.len(), 2);

        let sweep = cache.spawn_sweep(Duration::from_millis(10), None);
        clock.set_millis(1000);

        for _ in 0..100 {
            if cache.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(cache.is_empty());

        sweep.shutdown().await;
    }

    #[tokio::test]
    async fn stop_sweep() {
        let clock = Arc::new(ManualClock::default());
        let cache = new_cache(clock.clone());
        let sweep = cache.spawn_sweep(Duration::from_millis(10), None);
        sweep.shutdown().await;

        cache.get(&1).unwrap();
        clock.set_millis(1000);
        tokio::time::sleep(Duration::from_millis(50)).await;
        // no sweep after teardown
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn exit_on_cache_drop() {
        let clock = Arc::new(ManualClock::default());
        let cache = new_cache(clock);
        let sweep = cache.spawn_sweep(Duration::from_millis(10), None);
        drop(cache);

        for _ in 0..100 {
            if sweep.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(sweep.is_finished());
    }
}
