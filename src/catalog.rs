use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::adapter::{to_content, FEATURED_THRESHOLD};
use crate::content::{Content, ContentBundle, MediaKind};
use crate::genres::GenreCache;
use crate::tmdb::{self, DiscoverFilter, RawRecord, TimeWindow, TmdbApi, TrendingMedia};

pub const ANIMATION_GENRE_ID: i32 = 16;
pub const DOCUMENTARY_GENRE_ID: i32 = 99;
pub const CATEGORY_LIMIT: usize = 20;
const POPULARITY_DESC: &str = "popularity.desc";

/// One API client together with the genre table loaded through it.
pub struct Session {
    api: Arc<dyn TmdbApi>,
    genres: GenreCache,
}

impl Session {
    /// Checks a client by loading its genre lists. A rejected key fails here.
    pub async fn validate(api: Arc<dyn TmdbApi>) -> tmdb::Result<Self> {
        let genres = GenreCache::new();
        genres.try_load(api.as_ref()).await?;
        Ok(Self { api, genres })
    }

    fn adapt_all(&self, records: Vec<RawRecord>, hint: Option<MediaKind>) -> Vec<Content> {
        records
            .into_iter()
            .map(|r| to_content(r, hint, &self.genres))
            .collect()
    }
}

/// Per-category aggregation over the TMDB client.
///
/// No operation here returns an error: a failing category is logged and comes
/// back empty (or `None`), so one broken endpoint never hides the others.
pub struct Catalog {
    session: RwLock<Option<Arc<Session>>>,
}

impl Catalog {
    pub fn new(api: Arc<dyn TmdbApi>) -> Self {
        Self {
            session: RwLock::new(Some(Arc::new(Session {
                api,
                genres: GenreCache::new(),
            }))),
        }
    }

    /// A catalog waiting for an API key. Every category is empty until
    /// [`Catalog::reconfigure`] succeeds.
    pub fn unconfigured() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }

    pub async fn is_configured(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Validates a new client by loading its genre lists, then swaps it in.
    /// The previous session stays active if validation fails.
    pub async fn reconfigure(&self, api: Arc<dyn TmdbApi>) -> tmdb::Result<()> {
        let session = Session::validate(api).await?;
        self.install(session).await;
        Ok(())
    }

    pub async fn install(&self, session: Session) {
        *self.session.write().await = Some(Arc::new(session));
        info!("Catalog reconfigured with new credentials");
    }

    /// Drops the current credentials; the catalog is unconfigured afterwards.
    pub async fn clear(&self) {
        *self.session.write().await = None;
        info!("Catalog credentials cleared");
    }

    async fn session(&self) -> Option<Arc<Session>> {
        self.session.read().await.clone()
    }

    async fn guarded<T, F, Fut>(&self, label: &'static str, fetch: F) -> Option<T>
    where
        F: FnOnce(Arc<Session>) -> Fut,
        Fut: Future<Output = tmdb::Result<T>>,
    {
        let Some(session) = self.session().await else {
            warn!("Skipping {}: no TMDB API key configured", label);
            return None;
        };
        session.genres.ensure_loaded(session.api.as_ref()).await;
        match fetch(session).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!(category = label, "Failed to fetch {}: {}", label, e);
                None
            }
        }
    }

    pub async fn trending(&self) -> Vec<Content> {
        self.guarded("trending", |s| async move {
            let page = s.api.trending(TrendingMedia::All, TimeWindow::Week).await?;
            Ok(s.adapt_all(page.results, None))
        })
        .await
        .unwrap_or_default()
    }

    pub async fn popular_movies(&self) -> Vec<Content> {
        self.guarded("popular movies", |s| async move {
            let page = s.api.popular_movies(1).await?;
            Ok(s.adapt_all(page.results, Some(MediaKind::Movie)))
        })
        .await
        .unwrap_or_default()
    }

    pub async fn popular_shows(&self) -> Vec<Content> {
        self.guarded("popular shows", |s| async move {
            let page = s.api.popular_shows(1).await?;
            Ok(s.adapt_all(page.results, Some(MediaKind::Tv)))
        })
        .await
        .unwrap_or_default()
    }

    pub async fn top_rated_movies(&self) -> Vec<Content> {
        self.guarded("top rated movies", |s| async move {
            let page = s.api.top_rated_movies(1).await?;
            Ok(s.adapt_all(page.results, Some(MediaKind::Movie)))
        })
        .await
        .unwrap_or_default()
    }

    pub async fn top_rated_shows(&self) -> Vec<Content> {
        self.guarded("top rated shows", |s| async move {
            let page = s.api.top_rated_shows(1).await?;
            Ok(s.adapt_all(page.results, Some(MediaKind::Tv)))
        })
        .await
        .unwrap_or_default()
    }

    /// Animated movies and shows, best rated first.
    pub async fn animated(&self) -> Vec<Content> {
        self.guarded("animated", |s| async move {
            let filter = DiscoverFilter::by_genre(ANIMATION_GENRE_ID, POPULARITY_DESC);
            let (movies, shows) =
                tokio::try_join!(s.api.discover_movies(&filter), s.api.discover_shows(&filter))?;
            let mut combined = s.adapt_all(movies.results, Some(MediaKind::Movie));
            combined.extend(s.adapt_all(shows.results, Some(MediaKind::Tv)));
            combined.sort_by(|a, b| b.rating.total_cmp(&a.rating));
            Ok(combined)
        })
        .await
        .unwrap_or_default()
    }

    pub async fn documentaries(&self) -> Vec<Content> {
        self.guarded("documentaries", |s| async move {
            let filter = DiscoverFilter::by_genre(DOCUMENTARY_GENRE_ID, POPULARITY_DESC);
            let page = s.api.discover_movies(&filter).await?;
            Ok(s.adapt_all(page.results, Some(MediaKind::Movie)))
        })
        .await
        .unwrap_or_default()
    }

    pub async fn search(&self, query: &str) -> Vec<Content> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let query = query.to_string();
        self.guarded("search", |s| async move {
            let page = s.api.search_multi(&query, 1).await?;
            let titles = page.results.into_iter().filter(|r| !r.is_person()).collect();
            Ok(s.adapt_all(titles, None))
        })
        .await
        .unwrap_or_default()
    }

    pub async fn details(&self, id: &str, media: MediaKind) -> Option<Content> {
        let Ok(id) = id.trim().parse::<i64>() else {
            warn!("Ignoring details request for non-numeric id '{}'", id);
            return None;
        };
        self.guarded("details", |s| async move {
            let record = match media {
                MediaKind::Movie => s.api.movie_details(id).await?,
                MediaKind::Tv => s.api.show_details(id).await?,
            };
            Ok(to_content(record, Some(media), &s.genres))
        })
        .await
    }

    pub async fn featured(&self) -> Option<Content> {
        pick_featured(&self.trending().await)
    }

    /// Loads every home-view category concurrently. Waits for all of them,
    /// whatever their outcome, before assembling the bundle.
    pub async fn load_all(&self) -> ContentBundle {
        let (trending, movies, series, cartoons, documentaries) = tokio::join!(
            self.trending(),
            self.popular_movies(),
            self.popular_shows(),
            self.animated(),
            self.documentaries(),
        );
        let featured = pick_featured(&trending);
        info!(
            trending = trending.len(),
            movies = movies.len(),
            series = series.len(),
            cartoons = cartoons.len(),
            documentaries = documentaries.len(),
            featured = featured.is_some(),
            "Loaded content bundle"
        );
        ContentBundle {
            trending: truncated(trending),
            movies: truncated(movies),
            series: truncated(series),
            cartoons: truncated(cartoons),
            documentaries: truncated(documentaries),
            featured,
        }
    }
}

/// First qualifying entry in list order, not the best rated one.
pub fn pick_featured(trending: &[Content]) -> Option<Content> {
    trending
        .iter()
        .find(|c| c.featured && c.rating >= FEATURED_THRESHOLD)
        .or_else(|| trending.first())
        .cloned()
}

fn truncated(mut list: Vec<Content>) -> Vec<Content> {
    list.truncate(CATEGORY_LIMIT);
    list
}
