//! Maps raw TMDB records into [`Content`].
//!
//! The adapter never fails: every missing field degrades to a fixed default.

use chrono::{Datelike, NaiveDate, Utc};

use crate::content::{Content, ContentKind, MediaKind, Review};
use crate::genres::{GenreCache, UNKNOWN_GENRE};
use crate::tmdb::{self, BackdropSize, Genre, PosterSize, RawRecord, RawReview};

pub const MISSING_DESCRIPTION: &str = "No description available.";
pub const FEATURED_THRESHOLD: f64 = 8.0;
pub const TRENDING_THRESHOLD: f64 = 7.5;
const MAX_GENRES: usize = 3;
const DEFAULT_MOVIE_RUNTIME: &str = "2h 0m";
const DEFAULT_EPISODE_RUNTIME: u32 = 45;
const AVATAR_SIZE: &str = "w185";

/// Fields shared by both record variants.
#[derive(Debug, Clone, Default)]
pub struct RecordCommon {
    pub id: i64,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<i32>,
    pub genres: Vec<Genre>,
    pub reviews: Option<Vec<RawReview>>,
}

#[derive(Debug, Clone, Default)]
pub struct MovieRecord {
    pub common: RecordCommon,
    pub title: String,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ShowRecord {
    pub common: RecordCommon,
    pub name: String,
    pub first_air_date: Option<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub episode_run_time: Vec<u32>,
}

#[derive(Debug, Clone)]
pub enum MediaRecord {
    Movie(MovieRecord),
    Show(ShowRecord),
}

impl MediaRecord {
    /// Resolves the variant of a raw record. An explicit hint wins; otherwise
    /// a `title` marks a movie and a `name` marks a show.
    pub fn ingest(raw: RawRecord, hint: Option<MediaKind>) -> Self {
        let kind = hint.unwrap_or_else(|| guess_kind(&raw));
        let common = RecordCommon {
            id: raw.id,
            overview: raw.overview,
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            vote_average: raw.vote_average.unwrap_or(0.0),
            genre_ids: raw.genre_ids.unwrap_or_default(),
            genres: raw.genres.unwrap_or_default(),
            reviews: raw.reviews.map(|page| page.results),
        };
        match kind {
            MediaKind::Movie => MediaRecord::Movie(MovieRecord {
                common,
                title: raw.title.or(raw.name).unwrap_or_default(),
                release_date: raw.release_date,
                runtime: raw.runtime,
            }),
            MediaKind::Tv => MediaRecord::Show(ShowRecord {
                common,
                name: raw.name.or(raw.title).unwrap_or_default(),
                first_air_date: raw.first_air_date,
                number_of_seasons: raw.number_of_seasons,
                number_of_episodes: raw.number_of_episodes,
                episode_run_time: raw.episode_run_time.unwrap_or_default(),
            }),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaRecord::Movie(_) => MediaKind::Movie,
            MediaRecord::Show(_) => MediaKind::Tv,
        }
    }

    fn common(&self) -> &RecordCommon {
        match self {
            MediaRecord::Movie(m) => &m.common,
            MediaRecord::Show(s) => &s.common,
        }
    }
}

fn guess_kind(raw: &RawRecord) -> MediaKind {
    if raw.title.is_some() {
        MediaKind::Movie
    } else if raw.name.is_some() || raw.media_type.as_deref() == Some("tv") {
        MediaKind::Tv
    } else {
        MediaKind::Movie
    }
}

pub fn to_content(raw: RawRecord, hint: Option<MediaKind>, genres: &GenreCache) -> Content {
    adapt(&MediaRecord::ingest(raw, hint), genres)
}

pub fn adapt(record: &MediaRecord, genres: &GenreCache) -> Content {
    let common = record.common();
    let mut genre = genre_names(common, genres);
    let kind = categorize(record.kind(), &genre);
    genre.truncate(MAX_GENRES);
    let (title, date, duration, seasons, episodes) = match record {
        MediaRecord::Movie(m) => (
            m.title.clone(),
            m.release_date.as_deref(),
            movie_duration(m.runtime),
            None,
            None,
        ),
        MediaRecord::Show(s) => (
            s.name.clone(),
            s.first_air_date.as_deref(),
            show_duration(&s.episode_run_time),
            s.number_of_seasons,
            s.number_of_episodes,
        ),
    };

    Content {
        id: common.id.to_string(),
        title,
        description: common
            .overview
            .clone()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        poster: tmdb::poster_url(common.poster_path.as_deref(), PosterSize::default()),
        backdrop: tmdb::backdrop_url(common.backdrop_path.as_deref(), BackdropSize::default()),
        year: release_year(date),
        rating: round_rating(common.vote_average),
        duration,
        genre,
        kind,
        media_type: record.kind(),
        featured: common.vote_average >= FEATURED_THRESHOLD,
        trending: common.vote_average >= TRENDING_THRESHOLD,
        seasons,
        episodes,
        reviews: common
            .reviews
            .as_ref()
            .map(|list| list.iter().map(map_review).collect()),
    }
}

fn genre_names(common: &RecordCommon, genres: &GenreCache) -> Vec<String> {
    let names: Vec<&str> = if common.genres.is_empty() {
        common.genre_ids.iter().map(|id| genres.resolve(*id)).collect()
    } else {
        common.genres.iter().map(|g| g.name.as_str()).collect()
    };
    names
        .into_iter()
        .filter(|name| *name != UNKNOWN_GENRE)
        .map(str::to_string)
        .collect()
}

/// Animation beats Documentary, and both beat the variant.
pub fn categorize(kind: MediaKind, genres: &[String]) -> ContentKind {
    if genres.iter().any(|g| g == "Animation") {
        ContentKind::Cartoon
    } else if genres.iter().any(|g| g == "Documentary") {
        ContentKind::Documentary
    } else {
        match kind {
            MediaKind::Movie => ContentKind::Movie,
            MediaKind::Tv => ContentKind::Series,
        }
    }
}

pub fn movie_duration(runtime: Option<u32>) -> String {
    match runtime.filter(|r| *r > 0) {
        Some(r) => format!("{}h {}m", r / 60, r % 60),
        None => DEFAULT_MOVIE_RUNTIME.to_string(),
    }
}

pub fn show_duration(episode_run_time: &[u32]) -> String {
    let minutes = episode_run_time
        .first()
        .copied()
        .filter(|r| *r > 0)
        .unwrap_or(DEFAULT_EPISODE_RUNTIME);
    format!("{minutes}m")
}

/// Accepts `YYYY-MM-DD` or a bare year; anything else is the current year.
pub fn release_year(date: Option<&str>) -> i32 {
    date.map(str::trim)
        .and_then(|d| {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map(|nd| nd.year())
                .ok()
                .or_else(|| {
                    (d.len() == 4 && d.chars().all(|c| c.is_ascii_digit()))
                        .then(|| d.parse().ok())
                        .flatten()
                })
        })
        .unwrap_or_else(|| Utc::now().year())
}

/// One decimal place, half rounded up. Ratings are never negative.
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn map_review(review: &RawReview) -> Review {
    let details = review.author_details.clone().unwrap_or_default();
    let username = details
        .username
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| review.author.clone());
    Review {
        id: review.id.clone(),
        user_id: username.clone(),
        username,
        avatar: avatar_url(details.avatar_path.as_deref()),
        rating: details.rating.unwrap_or(0.0),
        comment: review.content.clone(),
        date: review.created_at.clone().unwrap_or_default(),
        helpful: 0,
    }
}

// Older TMDB accounts carry a gravatar URL with a leading slash.
fn avatar_url(path: Option<&str>) -> String {
    match path {
        Some(p) if p.starts_with("/http") => p[1..].to_string(),
        other => tmdb::image_url(other, AVATAR_SIZE).unwrap_or_default(),
    }
}
