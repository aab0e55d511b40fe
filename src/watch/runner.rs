// src/watch/runner.rs

//! Scheduler loop: bootstrap once, poll forever, stop on interrupt.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// One watcher flavor driven by the scheduler loop.
#[async_trait]
pub trait Watcher: Send {
    /// Seed state from one fetch when no prior state exists, without
    /// notifying. Runs once before polling; a failure is logged by the
    /// driver and polling starts anyway with state left absent.
    async fn bootstrap(&mut self) -> Result<()>;

    /// One full fetch+extract+diff+notify cycle.
    async fn run_cycle(&mut self) -> Result<()>;
}

/// Bootstrap if needed, then run exactly one cycle.
pub async fn run_once(watcher: &mut dyn Watcher) -> Result<()> {
    if let Err(e) = watcher.bootstrap().await {
        log::error!("Failed to initialize state: {e}");
    }
    watcher.run_cycle().await
}

/// Run the watch loop until interrupted.
///
/// Any cycle failure is logged and the loop carries on. The interrupt is
/// honored at the sleep boundary, never mid-cycle.
pub async fn run_watch_loop(watcher: &mut dyn Watcher, poll_interval: Duration) -> Result<()> {
    if let Err(e) = watcher.bootstrap().await {
        log::error!("Failed to initialize state: {e}");
    }

    loop {
        if let Err(e) = watcher.run_cycle().await {
            log::error!("Check failed: {e}");
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopped by user.");
                return Ok(());
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[derive(Default)]
    struct Scripted {
        bootstrap_fails: bool,
        bootstraps: usize,
        cycles: usize,
    }

    #[async_trait]
    impl Watcher for Scripted {
        async fn bootstrap(&mut self) -> Result<()> {
            self.bootstraps += 1;
            if self.bootstrap_fails {
                return Err(AppError::extract("label missing"));
            }
            Ok(())
        }

        async fn run_cycle(&mut self) -> Result<()> {
            self.cycles += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_once_bootstraps_then_cycles() {
        let mut watcher = Scripted::default();
        run_once(&mut watcher).await.unwrap();
        assert_eq!(watcher.bootstraps, 1);
        assert_eq!(watcher.cycles, 1);
    }

    #[tokio::test]
    async fn failed_bootstrap_still_polls() {
        let mut watcher = Scripted {
            bootstrap_fails: true,
            ..Scripted::default()
        };
        run_once(&mut watcher).await.unwrap();
        assert_eq!(watcher.cycles, 1);
    }
}
