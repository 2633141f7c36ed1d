use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt, future, stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::movies::Movie;

use super::error::ServerError;
use super::state::AppState;
use super::views;

/// Minimum trimmed query length; mirrors the client-side rule.
const MIN_QUERY_CHARS: usize = 3;
/// Cap on query size to keep abusive payloads away from the providers.
const MAX_QUERY_BYTES: usize = 8 * 1024;
const MAX_TOP_K: u64 = 20;

fn default_top_k() -> u64 {
    5
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/static/chat.js", get(chat_js))
        .route("/static/style.css", get(style_css))
        .route("/recommend", post(recommend))
        .route("/start-sse", get(start_sse))
        .route("/generate-story/stream", get(generate_story_stream))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[derive(Deserialize)]
pub struct StoryParams {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: u64,
}

#[derive(Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: u64,
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    pub movies: Vec<Movie>,
    pub query: String,
    pub total_results: usize,
}

/// Rejects queries the chat UI would never send: too short to mean
/// anything, too large to forward, or an out-of-range result count.
fn validate(query: &str, top_k: u64) -> Result<&str, ServerError> {
    let trimmed = query.trim();

    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(ServerError::BadRequest(format!(
            "query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }
    if trimmed.len() > MAX_QUERY_BYTES {
        return Err(ServerError::BadRequest(format!(
            "query too large ({} bytes); maximum is {} bytes",
            trimmed.len(),
            MAX_QUERY_BYTES
        )));
    }
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(ServerError::BadRequest(format!(
            "invalid top_k ({top_k}): must be between 1 and {MAX_TOP_K}"
        )));
    }

    Ok(trimmed)
}

/// Serve the main chat page.
async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

async fn chat_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        include_str!("../../assets/chat.js"),
    )
}

async fn style_css() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../../assets/style.css"),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Movie recommendations as plain JSON (`POST /recommend`).
async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ServerError> {
    let query = validate(&request.query, request.top_k)?;

    log::info!(
        "getting recommendations for query: '{query}', top_k: {}",
        request.top_k
    );

    let movies = state.rag.similar_movies(query, request.top_k).await?;

    log::info!("found {} recommendations", movies.len());

    Ok(Json(RecommendationResponse {
        total_results: movies.len(),
        query: query.to_string(),
        movies,
    }))
}

/// Placeholder bot-message fragment the chat controller inserts before it
/// opens the story stream (`GET /start-sse`).
async fn start_sse(Query(params): Query<StoryParams>) -> Result<Html<String>, ServerError> {
    let query = validate(&params.query, params.top_k)?;

    Ok(Html(views::bot_message(query, params.top_k)))
}

/// Turn any movie plot into a database story (`GET /generate-story/stream`).
///
/// Event order: one `movie_data`, zero or more `content` chunks, one `done`.
/// A mid-stream provider failure replaces the rest of the stream with a
/// single terminal `error` event; no `done` follows it.
async fn generate_story_stream(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StoryParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let query = validate(&params.query, params.top_k)?;

    let movies = state.rag.similar_movies(query, params.top_k).await?;
    let movie = movies
        .into_iter()
        .next()
        .ok_or_else(|| ServerError::NotFound("no matching movies in the index".to_string()))?;

    log::info!("streaming story for '{}' (movie {})", movie.title, movie.id);

    let chunks = state.story.stream_story(&movie.plot).await?;

    let movie_data = json!({
        "title": movie.title,
        "poster_url": movie.poster_url,
        "plot": movie.plot,
    });

    let events = story_events(movie_data, chunks)
        .map(|(name, data)| Ok::<Event, Infallible>(Event::default().event(name).data(data)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Assembles the story stream as `(event name, data)` pairs: one
/// `movie_data`, then a `content` pair per chunk, closed by a single
/// terminal pair: `done` on success, `error` on a chunk failure.
fn story_events(
    movie_data: serde_json::Value,
    chunks: BoxStream<'static, anyhow::Result<String>>,
) -> impl Stream<Item = (&'static str, String)> + Send {
    let head = stream::once(future::ready(("movie_data", movie_data.to_string())));

    // `None` marks the chunks running dry; `scan` swallows everything after
    // a failure so `done` never follows `error`.
    let body = chunks
        .map(Some)
        .chain(stream::once(future::ready(None)))
        .scan(false, |failed, chunk| {
            if *failed {
                return future::ready(None);
            }

            let event = match chunk {
                Some(Ok(text)) => ("content", text),
                Some(Err(why)) => {
                    *failed = true;
                    log::error!("story generation failed: {why:?}");
                    ("error", "story generation failed".to_string())
                }
                None => ("done", json!({ "status": "complete" }).to_string()),
            };

            future::ready(Some(event))
        });

    head.chain(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_query_is_rejected() {
        let err = validate("hi", 5).unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[test]
    fn whitespace_does_not_count_toward_length() {
        assert!(validate("  a  ", 5).is_err());
    }

    #[test]
    fn valid_query_is_trimmed() {
        assert_eq!(validate("  a heist movie  ", 5).unwrap(), "a heist movie");
    }

    #[test]
    fn three_characters_is_enough() {
        assert_eq!(validate("spy", 1).unwrap(), "spy");
    }

    #[test]
    fn oversized_query_is_rejected() {
        let long = "x".repeat(MAX_QUERY_BYTES + 1);
        assert!(validate(&long, 5).is_err());
    }

    #[test]
    fn top_k_bounds_are_enforced() {
        assert!(validate("a heist movie", 0).is_err());
        assert!(validate("a heist movie", MAX_TOP_K + 1).is_err());
        assert!(validate("a heist movie", MAX_TOP_K).is_ok());
    }

    #[test]
    fn top_k_defaults_to_five() {
        let params: StoryParams =
            serde_json::from_str(r#"{ "query": "a heist movie" }"#).unwrap();
        assert_eq!(params.top_k, 5);
    }

    fn collect(
        movie_data: serde_json::Value,
        chunks: Vec<anyhow::Result<String>>,
    ) -> Vec<(&'static str, String)> {
        let chunks = stream::iter(chunks).boxed();
        futures::executor::block_on(story_events(movie_data, chunks).collect())
    }

    #[test]
    fn story_stream_is_movie_data_then_content_then_done() {
        let events = collect(
            json!({ "title": "Night Train" }),
            vec![Ok("Once".to_string()), Ok(" upon a time".to_string())],
        );

        let names: Vec<_> = events.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["movie_data", "content", "content", "done"]);
        assert_eq!(events[0].1, json!({ "title": "Night Train" }).to_string());
        assert_eq!(events[1].1, "Once");
        assert_eq!(events[3].1, json!({ "status": "complete" }).to_string());
    }

    #[test]
    fn empty_story_still_closes_with_done() {
        let events = collect(json!({ "title": "Night Train" }), vec![]);

        let names: Vec<_> = events.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["movie_data", "done"]);
    }

    #[test]
    fn provider_failure_ends_the_stream_with_error() {
        let events = collect(
            json!({ "title": "Night Train" }),
            vec![
                Ok("Once".to_string()),
                Err(anyhow::anyhow!("connection reset")),
                Ok("never delivered".to_string()),
            ],
        );

        let names: Vec<_> = events.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["movie_data", "content", "error"]);
        assert_eq!(events.last().unwrap().1, "story generation failed");
    }
}
