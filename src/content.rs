use serde::{Deserialize, Serialize};

/// Which remote endpoint family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "movie" => Some(MediaKind::Movie),
            "tv" | "show" | "series" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

/// Display category. Shows are labelled `series`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
    Cartoon,
    Documentary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub avatar: String,
    pub rating: f64,
    pub comment: String,
    pub date: String,
    pub helpful: u32,
}

/// Display-ready title, built once by the adapter and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: String,
    pub title: String,
    pub description: String,
    pub poster: String,
    pub backdrop: String,
    pub year: i32,
    pub rating: f64,
    pub duration: String,
    pub genre: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub media_type: MediaKind,
    pub featured: bool,
    pub trending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}

/// Everything the home view renders after one full load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentBundle {
    pub trending: Vec<Content>,
    pub movies: Vec<Content>,
    pub series: Vec<Content>,
    pub cartoons: Vec<Content>,
    pub documentaries: Vec<Content>,
    pub featured: Option<Content>,
}
