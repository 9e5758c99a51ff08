use std::time::Duration;

use parking_lot::Mutex;

/// Dedicated tokio runtime that runs a refresh task on a fixed interval, so
/// blocking refreshes never occupy the server's workers. Stops when dropped.
pub(crate) struct Runtime {
    threads: usize,
    interval: Duration,
    inner: Mutex<Option<tokio::runtime::Runtime>>,
}

impl Runtime {
    pub(crate) fn new(threads: usize, interval: Duration) -> Self {
        Self {
            threads,
            interval,
            inner: Mutex::new(None),
        }
    }

    pub(crate) fn start<F>(&self, task: F) -> std::io::Result<()>
    where
        F: Fn() + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.is_some() {
            tracing::warn!("telemetry runtime already started");
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.threads)
            .thread_name("telemetry-refresh")
            .enable_time()
            .build()?;

        let period = self.interval;
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });

        *inner = Some(runtime);
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if let Some(runtime) = self.inner.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}
