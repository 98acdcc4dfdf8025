use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const PLACEHOLDER_POSTER: &str = "/placeholder-poster.jpg";
pub const PLACEHOLDER_BACKDROP: &str = "/placeholder-backdrop.jpg";

/// Failures raised by the TMDB client. The request URL carries the API key,
/// so errors only ever name the endpoint path.
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = TmdbError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingMedia {
    All,
    Movie,
    Tv,
}

impl TrendingMedia {
    fn as_path(&self) -> &'static str {
        match self {
            TrendingMedia::All => "all",
            TrendingMedia::Movie => "movie",
            TrendingMedia::Tv => "tv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    fn as_path(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosterSize {
    W200,
    W300,
    W400,
    #[default]
    W500,
    W780,
    Original,
}

impl PosterSize {
    fn token(&self) -> &'static str {
        match self {
            PosterSize::W200 => "w200",
            PosterSize::W300 => "w300",
            PosterSize::W400 => "w400",
            PosterSize::W500 => "w500",
            PosterSize::W780 => "w780",
            PosterSize::Original => "original",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackdropSize {
    W300,
    W780,
    #[default]
    W1280,
    Original,
}

impl BackdropSize {
    fn token(&self) -> &'static str {
        match self {
            BackdropSize::W300 => "w300",
            BackdropSize::W780 => "w780",
            BackdropSize::W1280 => "w1280",
            BackdropSize::Original => "original",
        }
    }
}

/// Filters accepted by the discover endpoints. `year` maps to `year` for
/// movies and `first_air_date_year` for shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverFilter {
    pub page: Option<u32>,
    pub genre: Option<i32>,
    pub year: Option<i32>,
    pub sort_by: Option<String>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiscoverTarget {
    Movie,
    Tv,
}

impl DiscoverFilter {
    pub fn by_genre(genre: i32, sort_by: &str) -> Self {
        Self {
            genre: Some(genre),
            sort_by: Some(sort_by.to_string()),
            ..Self::default()
        }
    }

    fn params(&self, target: DiscoverTarget) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(genre) = self.genre {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = self.year {
            let key = match target {
                DiscoverTarget::Movie => "year",
                DiscoverTarget::Tv => "first_air_date_year",
            };
            params.push((key, year.to_string()));
        }
        if let Some(sort_by) = self.sort_by.as_ref() {
            params.push(("sort_by", sort_by.clone()));
        }
        if let Some(min) = self.min_rating {
            params.push(("vote_average.gte", min.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// A movie, show or (in search/trending results) person exactly as TMDB
/// returns it. Movie-only and show-only fields are all optional here; the
/// adapter resolves the variant once on ingestion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub id: i64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub genre_ids: Option<Vec<i32>>,
    pub genres: Option<Vec<Genre>>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub episode_run_time: Option<Vec<u32>>,
    pub reviews: Option<Page<RawReview>>,
}

impl RawRecord {
    pub fn is_person(&self) -> bool {
        self.media_type.as_deref() == Some("person")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReview {
    pub id: String,
    #[serde(default)]
    pub author: String,
    pub author_details: Option<AuthorDetails>,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorDetails {
    pub username: Option<String>,
    pub avatar_path: Option<String>,
    pub rating: Option<f64>,
}

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn trending(&self, media: TrendingMedia, window: TimeWindow) -> Result<Page<RawRecord>>;
    async fn popular_movies(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn popular_shows(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn top_rated_movies(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn top_rated_shows(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn now_playing_movies(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn upcoming_movies(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn airing_today_shows(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn on_the_air_shows(&self, page: u32) -> Result<Page<RawRecord>>;
    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<RawRecord>>;
    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<RawRecord>>;
    async fn search_shows(&self, query: &str, page: u32) -> Result<Page<RawRecord>>;
    async fn movie_details(&self, id: i64) -> Result<RawRecord>;
    async fn show_details(&self, id: i64) -> Result<RawRecord>;
    async fn movie_genres(&self) -> Result<Vec<Genre>>;
    async fn show_genres(&self) -> Result<Vec<Genre>>;
    async fn discover_movies(&self, filter: &DiscoverFilter) -> Result<Page<RawRecord>>;
    async fn discover_shows(&self, filter: &DiscoverFilter) -> Result<Page<RawRecord>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, TMDB_BASE)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let user_agent = format!("streamyeebs/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = build_url(&self.base_url, endpoint, &self.api_key, params);
        debug!(endpoint, "TMDB request");
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TmdbError::Transport {
                endpoint: endpoint.to_string(),
                source: e.without_url(),
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|e| TmdbError::Transport {
            endpoint: endpoint.to_string(),
            source: e.without_url(),
        })?;
        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), body = %text, "TMDB error response");
            return Err(TmdbError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        serde_json::from_str(&text).map_err(|source| TmdbError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn paged(&self, endpoint: &str, page: u32) -> Result<Page<RawRecord>> {
        self.get_json(endpoint, &[("page", page.to_string())]).await
    }

    async fn search(&self, endpoint: &str, query: &str, page: u32) -> Result<Page<RawRecord>> {
        self.get_json(
            endpoint,
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn trending(&self, media: TrendingMedia, window: TimeWindow) -> Result<Page<RawRecord>> {
        let endpoint = format!("/trending/{}/{}", media.as_path(), window.as_path());
        self.get_json(&endpoint, &[]).await
    }

    async fn popular_movies(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/movie/popular", page).await
    }

    async fn popular_shows(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/tv/popular", page).await
    }

    async fn top_rated_movies(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/movie/top_rated", page).await
    }

    async fn top_rated_shows(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/tv/top_rated", page).await
    }

    async fn now_playing_movies(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/movie/now_playing", page).await
    }

    async fn upcoming_movies(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/movie/upcoming", page).await
    }

    async fn airing_today_shows(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/tv/airing_today", page).await
    }

    async fn on_the_air_shows(&self, page: u32) -> Result<Page<RawRecord>> {
        self.paged("/tv/on_the_air", page).await
    }

    async fn search_multi(&self, query: &str, page: u32) -> Result<Page<RawRecord>> {
        self.search("/search/multi", query, page).await
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<Page<RawRecord>> {
        self.search("/search/movie", query, page).await
    }

    async fn search_shows(&self, query: &str, page: u32) -> Result<Page<RawRecord>> {
        self.search("/search/tv", query, page).await
    }

    async fn movie_details(&self, id: i64) -> Result<RawRecord> {
        let endpoint = format!("/movie/{id}");
        self.get_json(&endpoint, &[("append_to_response", "reviews".to_string())])
            .await
    }

    async fn show_details(&self, id: i64) -> Result<RawRecord> {
        let endpoint = format!("/tv/{id}");
        self.get_json(&endpoint, &[("append_to_response", "reviews".to_string())])
            .await
    }

    async fn movie_genres(&self) -> Result<Vec<Genre>> {
        let list: GenreList = self.get_json("/genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    async fn show_genres(&self) -> Result<Vec<Genre>> {
        let list: GenreList = self.get_json("/genre/tv/list", &[]).await?;
        Ok(list.genres)
    }

    async fn discover_movies(&self, filter: &DiscoverFilter) -> Result<Page<RawRecord>> {
        self.get_json("/discover/movie", &filter.params(DiscoverTarget::Movie))
            .await
    }

    async fn discover_shows(&self, filter: &DiscoverFilter) -> Result<Page<RawRecord>> {
        self.get_json("/discover/tv", &filter.params(DiscoverTarget::Tv))
            .await
    }
}

fn build_url(base: &str, endpoint: &str, api_key: &str, params: &[(&str, String)]) -> String {
    let mut url = format!("{base}{endpoint}?api_key={}", urlencoding::encode(api_key));
    for (key, value) in params {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

pub fn poster_url(path: Option<&str>, size: PosterSize) -> String {
    image_url(path, size.token()).unwrap_or_else(|| PLACEHOLDER_POSTER.to_string())
}

pub fn backdrop_url(path: Option<&str>, size: BackdropSize) -> String {
    image_url(path, size.token()).unwrap_or_else(|| PLACEHOLDER_BACKDROP.to_string())
}

pub(crate) fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}/{size}{p}"))
}
