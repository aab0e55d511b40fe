// src/watch/changes.rs

//! Change-list watcher.
//!
//! Tracks the entries under the "Senaste publicerade ändringar" heading and
//! mails a summary whenever the page shows entries not seen before.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Local;

use crate::config::Config;
use crate::error::Result;
use crate::extract::{ChangeListExtractor, Extract};
use crate::fetch::PageFetcher;
use crate::notify::Mailer;
use crate::state::{ChangeListState, StateStore};

use super::runner::Watcher;

pub struct ChangeListWatcher {
    url: String,
    fetcher: PageFetcher,
    extractor: ChangeListExtractor,
    store: StateStore,
    mailer: Mailer,
    state: Option<ChangeListState>,
}

impl ChangeListWatcher {
    /// Build the watcher, reading any prior state off disk.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = StateStore::new(&config.watch.state_file);
        let state = store.load().await;
        Ok(Self {
            url: config.watch.target_url.clone(),
            fetcher: PageFetcher::new()?,
            extractor: ChangeListExtractor::new(),
            store,
            mailer: Mailer::new(config.smtp.clone()),
            state,
        })
    }

    /// Record a first-ever entry list without notifying.
    async fn seed(&mut self, entries: Vec<String>) -> Result<()> {
        let seeded = ChangeListState {
            last_seen_changes: entries,
        };
        self.store.save(&seeded).await?;
        log::info!(
            "Initialized with {} entries, newest: {}",
            seeded.last_seen_changes.len(),
            seeded
                .last_seen_changes
                .first()
                .map(String::as_str)
                .unwrap_or("(none)")
        );
        self.state = Some(seeded);
        Ok(())
    }
}

#[async_trait]
impl Watcher for ChangeListWatcher {
    async fn bootstrap(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Ok(());
        }

        let html = self.fetcher.fetch(&self.url).await?;
        let entries = self.extractor.extract(&html)?;
        if entries.is_empty() {
            log::warn!(
                "Extracted an empty change list from {}; leaving state unseeded",
                self.url
            );
            return Ok(());
        }
        self.seed(entries).await
    }

    async fn run_cycle(&mut self) -> Result<()> {
        let html = self.fetcher.fetch(&self.url).await?;
        let entries = self.extractor.extract(&html)?;

        if entries.is_empty() {
            // A legitimate page never renders zero entries; treat this as a
            // transient extraction problem and keep the stored state.
            log::warn!(
                "Extracted an empty change list from {}; keeping previous state",
                self.url
            );
            return Ok(());
        }

        let Some(previous) = self.state.clone() else {
            // Bootstrap failed earlier; seed silently now.
            return self.seed(entries).await;
        };

        let fresh = new_entries(&previous.last_seen_changes, &entries);
        if fresh.is_empty() {
            log::info!("No new changes ({} entries).", entries.len());
            return Ok(());
        }

        let next = ChangeListState {
            last_seen_changes: entries,
        };
        // Persist before the send attempt: a failed notification must not
        // block state rotation.
        self.store.save(&next).await?;

        let subject = subject_for(&fresh);
        let body = compose_body(
            &self.url,
            &fresh,
            &previous.last_seen_changes,
            &next.last_seen_changes,
        );
        self.state = Some(next);

        self.mailer.send(&subject, body).await?;
        log::info!("Sent notification for {} new entries.", fresh.len());
        Ok(())
    }
}

/// Entries in `current` whose exact string is absent from `previous`.
///
/// Membership diff, not positional: reordering alone is not a change.
fn new_entries(previous: &[String], current: &[String]) -> Vec<String> {
    let seen: HashSet<&str> = previous.iter().map(String::as_str).collect();
    current
        .iter()
        .filter(|entry| !seen.contains(entry.as_str()))
        .cloned()
        .collect()
}

/// Subject suffix: new-entry count plus the newest entry's leading date
/// token.
fn subject_for(fresh: &[String]) -> String {
    let count = fresh.len();
    let noun = if count == 1 { "change" } else { "changes" };
    let newest_date = fresh
        .first()
        .and_then(|entry| entry.split_whitespace().next())
        .unwrap_or("?");
    format!("{count} new {noun}, latest {newest_date}")
}

/// Compose the plain-text notification body.
fn compose_body(url: &str, fresh: &[String], previous: &[String], current: &[String]) -> String {
    let count = fresh.len();
    let noun = if count == 1 { "entry" } else { "entries" };

    let mut body = format!("{count} new change {noun} on {url}\n\n");
    for entry in fresh {
        body.push_str("  - ");
        body.push_str(entry);
        body.push('\n');
    }
    body.push_str(&format!(
        "\nPrevious newest: {}\n",
        previous.first().map(String::as_str).unwrap_or("(none)")
    ));
    body.push_str(&format!(
        "Current newest:  {}\n",
        current.first().map(String::as_str).unwrap_or("(none)")
    ));
    body.push_str(&format!(
        "\nDetected {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    body
}
