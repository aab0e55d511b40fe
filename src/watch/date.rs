// src/watch/date.rs

//! Updated-date watcher.
//!
//! Tracks the "Senast uppdaterad / granskad" date on the page and rotates a
//! last/previous pair whenever the page shows a strictly newer date.

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;
use crate::extract::{Extract, UpdatedDateExtractor};
use crate::fetch::PageFetcher;
use crate::state::{DateState, StateStore};

use super::runner::Watcher;

pub struct DateWatcher {
    url: String,
    fetcher: PageFetcher,
    extractor: UpdatedDateExtractor,
    store: StateStore,
    state: DateState,
}

impl DateWatcher {
    /// Build the watcher, reading any prior state off disk.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = StateStore::new(&config.watch.state_file);
        let state = store.load().await.unwrap_or_default();
        Ok(Self {
            url: config.watch.target_url.clone(),
            fetcher: PageFetcher::new()?,
            extractor: UpdatedDateExtractor::new(),
            store,
            state,
        })
    }

    /// One fetch+extract+diff pass over an explicit state value, returning
    /// the state to carry forward.
    async fn check_once(&self, state: DateState) -> Result<DateState> {
        let html = self.fetcher.fetch(&self.url).await?;
        let iso = self.extractor.extract(&html)?;

        let (next, updated) = apply_observation(&state, &iso);
        if updated {
            self.store.save(&next).await?;
            log::info!(
                "UPDATED: {} (prev {}). URL: {}",
                fmt_ddmm(next.last_seen_updated_date.as_deref()),
                fmt_ddmm(next.previous_seen_updated_date.as_deref()),
                self.url
            );
        } else {
            log::info!(
                "No change, last updated {}, previous update {}.",
                fmt_ddmm(next.last_seen_updated_date.as_deref()),
                fmt_ddmm(next.previous_seen_updated_date.as_deref())
            );
        }
        Ok(next)
    }
}

#[async_trait]
impl Watcher for DateWatcher {
    async fn bootstrap(&mut self) -> Result<()> {
        if !self.state.is_empty() {
            return Ok(());
        }

        let html = self.fetcher.fetch(&self.url).await?;
        let iso = self.extractor.extract(&html)?;
        let seeded = DateState {
            last_seen_updated_date: Some(iso.clone()),
            previous_seen_updated_date: None,
        };
        self.store.save(&seeded).await?;
        self.state = seeded;
        log::info!("Initialized last_seen to {iso}");
        Ok(())
    }

    async fn run_cycle(&mut self) -> Result<()> {
        self.state = self.check_once(self.state.clone()).await?;
        Ok(())
    }
}

/// Apply a freshly extracted date to the stored state.
///
/// Returns the state to carry forward and whether this was an update.
/// Dates compare as strings; the fixed-width ISO format makes that order
/// chronological. An incoming date that differs but is not greater (a
/// backdated correction) is deliberately "no change".
fn apply_observation(state: &DateState, iso: &str) -> (DateState, bool) {
    let newer = match &state.last_seen_updated_date {
        Some(last) => iso > last.as_str(),
        None => true,
    };

    if !newer {
        return (state.clone(), false);
    }

    // Rotate: previous <- last, last <- iso.
    (
        DateState {
            previous_seen_updated_date: state.last_seen_updated_date.clone(),
            last_seen_updated_date: Some(iso.to_string()),
        },
        true,
    )
}

/// Format `YYYY-MM-DD` as `DD/MM` for compact log lines.
///
/// Absent dates print as "unknown"; anything unexpectedly shaped falls back
/// to the raw string.
fn fmt_ddmm(iso: Option<&str>) -> String {
    let Some(iso) = iso else {
        return "unknown".to_string();
    };

    let parts: Vec<&str> = iso.split('-').collect();
    if let [_, month, day] = parts.as_slice() {
        if let (Ok(day), Ok(month)) = (day.parse::<u32>(), month.parse::<u32>()) {
            return format!("{day:02}/{month:02}");
        }
    }
    iso.to_string()
}
