mod common;

use common::{genre, movie, person, populated, show, FakeTmdb};
use serde_json::json;
use std::sync::Arc;
use streamyeebs::catalog::Catalog;
use streamyeebs::content::{ContentKind, MediaKind};
use streamyeebs::genres::GenreCache;
use streamyeebs::tmdb::TmdbApi;

fn catalog_with(fake: &Arc<FakeTmdb>) -> Catalog {
    Catalog::new(fake.clone() as Arc<dyn TmdbApi>)
}

#[tokio::test]
async fn load_all_isolates_a_failing_category() {
    let fake = Arc::new(populated().failing("popular_movies"));
    let bundle = catalog_with(&fake).load_all().await;

    assert!(bundle.movies.is_empty());
    assert_eq!(bundle.trending.len(), 3);
    assert_eq!(bundle.series.len(), 1);
    assert_eq!(bundle.cartoons.len(), 2);
    assert_eq!(bundle.documentaries.len(), 1);
    assert!(bundle.featured.is_some());
    assert_eq!(fake.calls_to("popular_movies"), 1);
}

#[tokio::test]
async fn load_all_truncates_long_categories() {
    let many = (0..35).map(|i| movie(i, "M", 6.0, &[28])).collect();
    let fake = Arc::new(FakeTmdb::new().with_page("popular_movies", many));
    let bundle = catalog_with(&fake).load_all().await;
    assert_eq!(bundle.movies.len(), 20);
    assert_eq!(bundle.movies[0].id, "0");
}

#[tokio::test]
async fn featured_pick_is_first_qualifying_trending_entry() {
    let fake = Arc::new(populated());
    let catalog = catalog_with(&fake);

    let featured = catalog.featured().await.expect("featured pick");
    assert_eq!(featured.id, "2");
    assert_eq!(featured.title, "Trend B");

    let bundle = catalog.load_all().await;
    assert_eq!(bundle.featured.map(|c| c.id), Some("2".to_string()));
}

#[tokio::test]
async fn featured_pick_falls_back_then_disappears() {
    let fake = Arc::new(FakeTmdb::new().with_page(
        "trending",
        vec![movie(5, "Meh", 6.1, &[]), movie(6, "Fine", 7.6, &[])],
    ));
    assert_eq!(
        catalog_with(&fake).featured().await.map(|c| c.id),
        Some("5".to_string())
    );

    let failing = Arc::new(populated().failing("trending"));
    let catalog = catalog_with(&failing);
    assert!(catalog.featured().await.is_none());
    assert!(catalog.load_all().await.featured.is_none());
}

#[tokio::test]
async fn trending_resolves_variant_per_record() {
    let fake = Arc::new(populated());
    let trending = catalog_with(&fake).trending().await;
    let kinds: Vec<_> = trending.iter().map(|c| (c.media_type, c.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (MediaKind::Movie, ContentKind::Movie),
            (MediaKind::Tv, ContentKind::Series),
            (MediaKind::Movie, ContentKind::Movie),
        ]
    );
    assert_eq!(trending[1].duration, "45m");
    assert_eq!(trending[0].genre, vec!["Action".to_string()]);
}

#[tokio::test]
async fn popular_endpoints_apply_their_variant_hint() {
    let fake = Arc::new(
        FakeTmdb::new()
            .with_page(
                "popular_movies",
                vec![json!({ "id": 9, "name": "Odd", "vote_average": 5.0 })],
            )
            .with_page("popular_shows", vec![json!({ "id": 8, "title": "Odder" })]),
    );
    let catalog = catalog_with(&fake);
    let movies = catalog.popular_movies().await;
    assert_eq!(movies[0].media_type, MediaKind::Movie);
    assert_eq!(movies[0].title, "Odd");
    assert_eq!(movies[0].duration, "2h 0m");
    let shows = catalog.popular_shows().await;
    assert_eq!(shows[0].media_type, MediaKind::Tv);
    assert_eq!(shows[0].kind, ContentKind::Series);
}

#[tokio::test]
async fn animated_combines_both_variants_best_rated_first() {
    let fake = Arc::new(populated());
    let cartoons = catalog_with(&fake).animated().await;
    let ids: Vec<_> = cartoons.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["31", "30"]);
    assert!(cartoons.iter().all(|c| c.kind == ContentKind::Cartoon));
    assert_eq!(fake.calls_to("discover_movies:16"), 1);
    assert_eq!(fake.calls_to("discover_shows:16"), 1);
}

#[tokio::test]
async fn animated_is_empty_when_either_side_fails() {
    let fake = Arc::new(populated().failing("discover_shows:16"));
    assert!(catalog_with(&fake).animated().await.is_empty());
}

#[tokio::test]
async fn documentaries_use_documentary_discovery() {
    let fake = Arc::new(populated());
    let docs = catalog_with(&fake).documentaries().await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].kind, ContentKind::Documentary);
    assert_eq!(fake.calls_to("discover_movies:99"), 1);
}

#[tokio::test]
async fn search_drops_people_and_skips_blank_queries() {
    let fake = Arc::new(FakeTmdb::new().with_page(
        "search_multi",
        vec![
            movie(1, "Alien", 8.1, &[28]),
            person(2, "Sigourney Weaver"),
            show(3, "Alien Earth", 7.0, &[10765]),
        ],
    ));
    let catalog = catalog_with(&fake);

    let results = catalog.search("alien").await;
    let ids: Vec<_> = results.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    assert!(catalog.search("   ").await.is_empty());
    assert_eq!(fake.calls_to("search_multi"), 1);
}

#[tokio::test]
async fn details_use_inline_genres_and_reviews() {
    let fake = Arc::new(FakeTmdb::new().with_details(
        "movie_details",
        550,
        json!({
            "id": 550,
            "title": "Fight Club",
            "overview": "An insomniac office worker...",
            "release_date": "1999-10-15",
            "vote_average": 8.438,
            "runtime": 139,
            "genres": [{ "id": 18, "name": "Drama" }, { "id": 53, "name": "Thriller" }],
            "reviews": {
                "page": 1,
                "results": [{
                    "id": "5b1c13b9c3a36848f2026384",
                    "author": "Goddard",
                    "author_details": { "username": "Goddard", "avatar_path": null, "rating": null },
                    "content": "Pretty awesome movie.",
                    "created_at": "2018-06-09T17:51:53.359Z"
                }],
                "total_pages": 1,
                "total_results": 1
            }
        }),
    ));
    let catalog = catalog_with(&fake);

    let c = catalog.details("550", MediaKind::Movie).await.expect("details");
    assert_eq!(c.title, "Fight Club");
    assert_eq!(c.rating, 8.4);
    assert_eq!(c.duration, "2h 19m");
    assert_eq!(c.genre, vec!["Drama".to_string(), "Thriller".to_string()]);
    assert!(c.featured);
    let reviews = c.reviews.expect("reviews");
    assert_eq!(reviews[0].username, "Goddard");
    assert_eq!(reviews[0].avatar, "");

    assert!(catalog.details("404", MediaKind::Movie).await.is_none());
    let calls_before = fake.total_calls();
    assert!(catalog.details("abc", MediaKind::Tv).await.is_none());
    assert_eq!(fake.total_calls(), calls_before);
}

#[tokio::test]
async fn genre_cache_loads_once_and_is_idempotent() {
    let fake = FakeTmdb::new();
    let cache = GenreCache::new();

    cache.ensure_loaded(&fake).await;
    let first = cache.resolve(10765).to_string();
    cache.ensure_loaded(&fake).await;

    assert_eq!(cache.resolve(10765), first);
    assert_eq!(first, "Sci-Fi & Fantasy");
    assert_eq!(fake.calls_to("movie_genres"), 1);
    assert_eq!(fake.calls_to("show_genres"), 1);
}

#[tokio::test]
async fn concurrent_first_callers_share_one_load() {
    let fake = FakeTmdb::new();
    let cache = GenreCache::new();
    tokio::join!(cache.ensure_loaded(&fake), cache.ensure_loaded(&fake));
    assert!(cache.is_loaded());
    assert_eq!(fake.calls_to("movie_genres"), 1);
}

#[tokio::test]
async fn show_genres_overwrite_movie_genres_on_collision() {
    let fake = FakeTmdb::new().with_genres(
        vec![genre(28, "Action")],
        vec![genre(28, "Action & Adventure")],
    );
    let cache = GenreCache::new();
    cache.ensure_loaded(&fake).await;
    assert_eq!(cache.resolve(28), "Action & Adventure");
}

#[tokio::test]
async fn genre_failure_is_all_or_nothing_and_retried() {
    let fake = FakeTmdb::new().failing("show_genres");
    let cache = GenreCache::new();
    cache.ensure_loaded(&fake).await;
    assert!(!cache.is_loaded());
    assert_eq!(cache.resolve(16), "Unknown");

    cache.ensure_loaded(&fake).await;
    assert_eq!(fake.calls_to("show_genres"), 2);
}

#[tokio::test]
async fn categories_still_load_without_genres() {
    let fake = Arc::new(populated().failing("movie_genres"));
    let catalog = catalog_with(&fake);
    let movies = catalog.popular_movies().await;
    assert_eq!(movies.len(), 1);
    assert!(movies[0].genre.is_empty());

    // Discovery by genre id still works; only the names are missing.
    let docs = catalog.documentaries().await;
    assert_eq!(docs[0].kind, ContentKind::Movie);
}

#[tokio::test]
async fn reconfigure_validates_before_swapping() {
    let catalog = Catalog::unconfigured();
    assert!(catalog.trending().await.is_empty());

    let rejected = Arc::new(populated().failing("movie_genres"));
    assert!(catalog.reconfigure(rejected.clone()).await.is_err());
    assert!(!catalog.is_configured().await);

    let accepted = Arc::new(populated());
    catalog
        .reconfigure(accepted.clone())
        .await
        .expect("valid client is accepted");
    assert!(catalog.is_configured().await);
    assert_eq!(catalog.trending().await.len(), 3);
    // Genres were loaded during validation, not again on first use.
    assert_eq!(accepted.calls_to("movie_genres"), 1);

    assert!(catalog.reconfigure(rejected).await.is_err());
    assert_eq!(catalog.trending().await.len(), 3);
    assert_eq!(accepted.calls_to("trending"), 2);
}
