use anyhow::Result;
use tracing::{info, warn};

use crate::store::{LocalStore, WATCHLIST_KEY};

/// Insertion-ordered set of content ids, persisted in full on every change.
#[derive(Debug)]
pub struct Watchlist {
    store: LocalStore,
    ids: Vec<String>,
}

impl Watchlist {
    /// Loads the saved list. An unreadable entry starts an empty list rather
    /// than failing startup.
    pub async fn load(store: LocalStore) -> Self {
        let ids = match store.get::<Vec<String>>(WATCHLIST_KEY).await {
            Ok(Some(ids)) => dedupe_preserve_order(ids),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable watchlist: {:#}", e);
                Vec::new()
            }
        };
        info!("Watchlist loaded with {} entries", ids.len());
        Self { store, ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    /// Returns false (and writes nothing) when the id is already present.
    /// The in-memory list only changes once the write succeeded.
    pub async fn add(&mut self, id: &str) -> Result<bool> {
        if self.contains(id) {
            return Ok(false);
        }
        let mut next = self.ids.clone();
        next.push(id.to_string());
        self.commit(next).await?;
        Ok(true)
    }

    /// Returns false (and writes nothing) when the id is not present.
    pub async fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next: Vec<String> = self.ids.iter().filter(|x| *x != id).cloned().collect();
        self.commit(next).await?;
        Ok(true)
    }

    async fn commit(&mut self, next: Vec<String>) -> Result<()> {
        self.store.set(WATCHLIST_KEY, &next).await?;
        self.ids = next;
        Ok(())
    }
}

fn dedupe_preserve_order(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
