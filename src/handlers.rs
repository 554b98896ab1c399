use crate::catalog::SUGGESTED_EMOJIS;
use crate::errors::AppError;
use crate::models::{DayRecord, HabitRequest, HistoryQuery, HistoryView, Overview, Period};
use crate::state::{AppState, SharedStore};
use crate::tracker::Tracker;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDate};

pub async fn list_habits(State(state): State<AppState>) -> Result<Json<Overview>, AppError> {
    with_tracker(&state, |tracker| Ok(Json(tracker.overview()?))).await
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<HabitRequest>,
) -> Result<Json<Overview>, AppError> {
    with_tracker(&state, move |tracker| {
        tracker.create(&payload.name, &payload.emoji, today())?;
        Ok(Json(tracker.overview()?))
    })
    .await
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HabitRequest>,
) -> Result<Json<Overview>, AppError> {
    with_tracker(&state, move |tracker| {
        tracker.rename(&id, &payload.name, &payload.emoji, today())?;
        Ok(Json(tracker.overview()?))
    })
    .await
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Overview>, AppError> {
    with_tracker(&state, move |tracker| {
        tracker.delete(&id, today())?;
        Ok(Json(tracker.overview()?))
    })
    .await
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Overview>, AppError> {
    with_tracker(&state, move |tracker| {
        tracker.toggle_completion(&id, today())?;
        Ok(Json(tracker.overview()?))
    })
    .await
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryView>, AppError> {
    let period = query.period.unwrap_or_default();
    with_tracker(&state, move |tracker| Ok(Json(tracker.history(period, today())?))).await
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayRecord>, AppError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))?;

    with_tracker(&state, move |tracker| {
        tracker
            .day(date, today())?
            .map(Json)
            .ok_or_else(|| AppError::not_found(format!("no record for {date}")))
    })
    .await
}

pub async fn reset_history(State(state): State<AppState>) -> Result<Json<HistoryView>, AppError> {
    with_tracker(&state, |tracker| {
        tracker.reset_history(today())?;
        Ok(Json(tracker.history(Period::Quarter, today())?))
    })
    .await
}

pub async fn suggested_emojis() -> Json<Vec<&'static str>> {
    Json(SUGGESTED_EMOJIS.to_vec())
}

/// Runs `work` under the tracker lock on the blocking pool, since the store writes to disk.
async fn with_tracker<T, F>(state: &AppState, work: F) -> Result<T, AppError>
where
    F: FnOnce(&mut Tracker<SharedStore>) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let mut tracker = state.tracker.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || work(&mut tracker))
        .await
        .map_err(AppError::internal)?
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
