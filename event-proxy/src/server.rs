use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use event_time::{
    format_date_input, format_time_input, ics_filename, parse_date, to_icalendar, validate_time,
    Calendar, Event, EventForm, IcsSettings, CONTENT_TYPE,
};
use serde::{Deserialize, Serialize};

use crate::cache::{self, Cache};
use crate::error::{Error, Result};
use crate::upstream::Upstream;

const FEED_NAME: &str = "Events";
const EVENT_CACHE_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct AppState {
    upstream: Arc<Upstream>,
    settings: Arc<IcsSettings>,
    events: Arc<Cache<String, Event>>,
    feed: Arc<Cache<(), Calendar>>,
}

impl AppState {
    pub fn new(upstream: Upstream, settings: IcsSettings, cache: cache::Config) -> Self {
        Self {
            upstream: Arc::new(upstream),
            settings: Arc::new(settings),
            events: Cache::new(cache, EVENT_CACHE_CAPACITY),
            feed: Cache::new(cache, 1),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events.ics", get(handle_feed))
        .route("/events/normalize", post(handle_normalize))
        .route("/events/:file", get(handle_event))
        .route("/mask/date", get(handle_mask_date))
        .route("/mask/time", get(handle_mask_time))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not found") })
        .with_state(state)
}

#[derive(Deserialize)]
struct ExportQuery {
    #[serde(default)]
    json: bool,
}

#[derive(Deserialize)]
struct MaskQuery {
    #[serde(default)]
    value: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct Masked {
    value: String,
    valid: bool,
}

async fn handle_feed(State(state): State<AppState>) -> Result<Response> {
    let calendar = fetch_feed(&state).await?;

    Ok((
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        calendar.to_ics(&state.settings).to_string(),
    )
        .into_response())
}

async fn handle_event(
    State(state): State<AppState>,
    Path(file): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let id = file.trim_end_matches(".ics");
    let event = fetch_event(&state, id).await?;

    if query.json {
        return Ok(Json(event.as_ref()).into_response());
    }

    let disposition = format!("attachment; filename=\"{}\"", ics_filename(&event.title));

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        to_icalendar(&event, &state.settings),
    )
        .into_response())
}

async fn handle_normalize(Json(form): Json<EventForm>) -> Response {
    match form.normalize() {
        Ok(input) => Json(input).into_response(),
        Err(errors) => {
            tracing::debug!(%errors, "rejected event form");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
    }
}

async fn handle_mask_date(Query(query): Query<MaskQuery>) -> Json<Masked> {
    let value = format_date_input(&query.value);
    let valid = parse_date(&value).is_ok();
    Json(Masked { value, valid })
}

async fn handle_mask_time(Query(query): Query<MaskQuery>) -> Json<Masked> {
    let value = format_time_input(&query.value);
    let valid = validate_time(&value);
    Json(Masked { value, valid })
}

async fn fetch_event(state: &AppState, id: &str) -> Result<Arc<Event>> {
    let key = id.to_string();

    if let Some(event) = state.events.get(&key).await {
        tracing::debug!(%id, "serving cached event");
        return Ok(event);
    }

    let event = state
        .upstream
        .get_event(id)
        .await?
        .ok_or_else(|| Error::NotFound(key.clone()))?;

    tracing::info!(%id, title = %event.title, "fetched event");

    Ok(Arc::clone(&state.events).insert(key, event).await)
}

async fn fetch_feed(state: &AppState) -> Result<Arc<Calendar>> {
    if let Some(calendar) = state.feed.get(&()).await {
        tracing::debug!("serving cached feed");
        return Ok(calendar);
    }

    let events = state.upstream.list_events().await?;
    tracing::info!(count = events.len(), "fetched event feed");

    let calendar = Calendar {
        name: FEED_NAME.to_string(),
        events,
    };

    Ok(Arc::clone(&state.feed).insert((), calendar).await)
}
