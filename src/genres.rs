use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::tmdb::{self, Genre, TmdbApi};

pub const UNKNOWN_GENRE: &str = "Unknown";

/// Session-scoped genre id → name table.
///
/// Populated once from the movie and show genre lists. Population is
/// all-or-nothing: a failed load leaves the table empty and the next call
/// tries again. Concurrent first callers share a single in-flight load.
#[derive(Debug, Default)]
pub struct GenreCache {
    names: OnceCell<HashMap<i32, String>>,
}

impl GenreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an already-populated cache.
    pub fn from_genres(genres: impl IntoIterator<Item = Genre>) -> Self {
        Self {
            names: OnceCell::new_with(Some(merge([genres]))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.names.initialized()
    }

    /// Loads the table if needed and swallows failures; callers then see every
    /// id as unknown.
    pub async fn ensure_loaded(&self, api: &dyn TmdbApi) {
        if let Err(e) = self.try_load(api).await {
            warn!("Failed to load genre lists, genre names unavailable: {}", e);
        }
    }

    pub async fn try_load(&self, api: &dyn TmdbApi) -> tmdb::Result<()> {
        self.names
            .get_or_try_init(|| async {
                let (movie, show) = tokio::try_join!(api.movie_genres(), api.show_genres())?;
                let names = merge([movie, show]);
                debug!(count = names.len(), "Genre cache populated");
                Ok::<_, tmdb::TmdbError>(names)
            })
            .await?;
        Ok(())
    }

    pub fn resolve(&self, id: i32) -> &str {
        self.names
            .get()
            .and_then(|names| names.get(&id))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_GENRE)
    }
}

/// Later lists overwrite earlier ones on id collision.
fn merge<I>(lists: impl IntoIterator<Item = I>) -> HashMap<i32, String>
where
    I: IntoIterator<Item = Genre>,
{
    let mut names = HashMap::new();
    for list in lists {
        for genre in list {
            names.insert(genre.id, genre.name);
        }
    }
    names
}
