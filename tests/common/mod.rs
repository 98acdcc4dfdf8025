#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use streamyeebs::tmdb::{
    DiscoverFilter, Genre, Page, RawRecord, Result, TimeWindow, TmdbApi, TmdbError, TrendingMedia,
};

/// In-memory TMDB. Responses are keyed by endpoint name; discover calls are
/// keyed as `discover_movies:<genre>` / `discover_shows:<genre>`.
#[derive(Default)]
pub struct FakeTmdb {
    pages: HashMap<String, Vec<Value>>,
    details: HashMap<String, Value>,
    movie_genres: Vec<Genre>,
    show_genres: Vec<Genre>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeTmdb {
    pub fn new() -> Self {
        Self::default().with_genres(
            vec![
                genre(16, "Animation"),
                genre(18, "Drama"),
                genre(28, "Action"),
                genre(99, "Documentary"),
            ],
            vec![
                genre(16, "Animation"),
                genre(18, "Drama"),
                genre(10765, "Sci-Fi & Fantasy"),
            ],
        )
    }

    pub fn with_genres(mut self, movie: Vec<Genre>, show: Vec<Genre>) -> Self {
        self.movie_genres = movie;
        self.show_genres = show;
        self
    }

    pub fn with_page(mut self, endpoint: &str, results: Vec<Value>) -> Self {
        self.pages.insert(endpoint.to_string(), results);
        self
    }

    pub fn with_details(mut self, endpoint: &str, id: i64, record: Value) -> Self {
        self.details.insert(format!("{endpoint}:{id}"), record);
        self
    }

    pub fn failing(mut self, endpoint: &str) -> Self {
        self.failing.insert(endpoint.to_string());
        self
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == endpoint)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn enter(&self, endpoint: &str) -> Result<()> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        if self.failing.contains(endpoint) {
            return Err(TmdbError::Status {
                endpoint: endpoint.to_string(),
                status: 500,
            });
        }
        Ok(())
    }

    fn page(&self, endpoint: &str) -> Result<Page<RawRecord>> {
        self.enter(endpoint)?;
        let results = self.pages.get(endpoint).cloned().unwrap_or_default();
        let total = results.len() as u32;
        serde_json::from_value(json!({
            "page": 1,
            "results": results,
            "total_pages": 1,
            "total_results": total
        }))
        .map_err(|source| TmdbError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    fn detail(&self, endpoint: &str, id: i64) -> Result<RawRecord> {
        self.enter(endpoint)?;
        match self.details.get(&format!("{endpoint}:{id}")) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|source| {
                TmdbError::Decode {
                    endpoint: endpoint.to_string(),
                    source,
                }
            }),
            None => Err(TmdbError::Status {
                endpoint: endpoint.to_string(),
                status: 404,
            }),
        }
    }

    fn genres(&self, endpoint: &str, list: &[Genre]) -> Result<Vec<Genre>> {
        self.enter(endpoint)?;
        Ok(list.to_vec())
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn trending(
        &self,
        _media: TrendingMedia,
        _window: TimeWindow,
    ) -> Result<Page<RawRecord>> {
        self.page("trending")
    }
    async fn popular_movies(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("popular_movies")
    }
    async fn popular_shows(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("popular_shows")
    }
    async fn top_rated_movies(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("top_rated_movies")
    }
    async fn top_rated_shows(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("top_rated_shows")
    }
    async fn now_playing_movies(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("now_playing_movies")
    }
    async fn upcoming_movies(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("upcoming_movies")
    }
    async fn airing_today_shows(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("airing_today_shows")
    }
    async fn on_the_air_shows(&self, _page: u32) -> Result<Page<RawRecord>> {
        self.page("on_the_air_shows")
    }
    async fn search_multi(&self, _query: &str, _page: u32) -> Result<Page<RawRecord>> {
        self.page("search_multi")
    }
    async fn search_movies(&self, _query: &str, _page: u32) -> Result<Page<RawRecord>> {
        self.page("search_movies")
    }
    async fn search_shows(&self, _query: &str, _page: u32) -> Result<Page<RawRecord>> {
        self.page("search_shows")
    }
    async fn movie_details(&self, id: i64) -> Result<RawRecord> {
        self.detail("movie_details", id)
    }
    async fn show_details(&self, id: i64) -> Result<RawRecord> {
        self.detail("show_details", id)
    }
    async fn movie_genres(&self) -> Result<Vec<Genre>> {
        self.genres("movie_genres", &self.movie_genres)
    }
    async fn show_genres(&self) -> Result<Vec<Genre>> {
        self.genres("show_genres", &self.show_genres)
    }
    async fn discover_movies(&self, filter: &DiscoverFilter) -> Result<Page<RawRecord>> {
        self.page(&discover_key("discover_movies", filter))
    }
    async fn discover_shows(&self, filter: &DiscoverFilter) -> Result<Page<RawRecord>> {
        self.page(&discover_key("discover_shows", filter))
    }
}

fn discover_key(endpoint: &str, filter: &DiscoverFilter) -> String {
    match filter.genre {
        Some(genre) => format!("{endpoint}:{genre}"),
        None => endpoint.to_string(),
    }
}

pub fn genre(id: i32, name: &str) -> Genre {
    Genre {
        id,
        name: name.to_string(),
    }
}

pub fn movie(id: i64, title: &str, vote: f64, genre_ids: &[i32]) -> Value {
    json!({
        "id": id,
        "media_type": "movie",
        "title": title,
        "overview": format!("{title} overview"),
        "poster_path": format!("/{id}.jpg"),
        "backdrop_path": null,
        "release_date": "2023-07-21",
        "vote_average": vote,
        "genre_ids": genre_ids
    })
}

pub fn show(id: i64, name: &str, vote: f64, genre_ids: &[i32]) -> Value {
    json!({
        "id": id,
        "media_type": "tv",
        "name": name,
        "overview": "",
        "poster_path": null,
        "first_air_date": "2019-11-12",
        "vote_average": vote,
        "genre_ids": genre_ids
    })
}

pub fn person(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "media_type": "person",
        "name": name,
        "known_for_department": "Acting"
    })
}

/// A fake where every home-view category has at least one entry.
pub fn populated() -> FakeTmdb {
    FakeTmdb::new()
        .with_page(
            "trending",
            vec![
                movie(1, "Trend A", 7.9, &[28]),
                show(2, "Trend B", 8.2, &[18]),
                movie(3, "Trend C", 9.0, &[18]),
            ],
        )
        .with_page("popular_movies", vec![movie(10, "Popular Movie", 6.5, &[28])])
        .with_page("popular_shows", vec![show(20, "Popular Show", 7.7, &[10765])])
        .with_page("discover_movies:16", vec![movie(30, "Toon Movie", 7.0, &[16])])
        .with_page("discover_shows:16", vec![show(31, "Toon Show", 8.6, &[16])])
        .with_page("discover_movies:99", vec![movie(40, "Doc", 7.2, &[99])])
}
