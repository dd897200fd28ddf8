//! Route handlers.
//!
//! Each handler takes the shared connection lock once, builds the service it
//! needs on top of it, and releases the lock when it returns.

use crate::error::{ApiError, ApiResult};
use crate::inputs::{
    IssueInput, ListQuery, LogInput, NoteInput, NotesInput, PhotoInput, PhotoUpdate, PlantInput,
    SymptomInput, SymptomUpdate, TaskInput, TreatmentInput, TreatmentLogInput,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use voltbetta_core::repo::fish_repo::SqliteFishRepository;
use voltbetta_core::repo::maintenance_repo::SqliteMaintenanceRepository;
use voltbetta_core::repo::note_repo::SqliteNoteRepository;
use voltbetta_core::repo::photo_repo::SqlitePhotoRepository;
use voltbetta_core::repo::plant_repo::SqlitePlantRepository;
use voltbetta_core::repo::tank_log_repo::SqliteTankLogRepository;
use voltbetta_core::repo::treatment_repo::SqliteTreatmentRepository;
use voltbetta_core::service::fish_service::FishService;
use voltbetta_core::service::maintenance_service::MaintenanceService;
use voltbetta_core::service::note_service::NoteService;
use voltbetta_core::service::photo_service::PhotoService;
use voltbetta_core::service::plant_service::PlantService;
use voltbetta_core::service::tank_log_service::TankLogService;
use voltbetta_core::service::treatment_service::TreatmentService;
use voltbetta_core::view::{
    filter_sorted, NoteFilter, PhotoFilter, PlantFilter, TankLogFilter, TaskFilter,
    TreatmentFilter, ViewFilter,
};
use voltbetta_core::{
    FishPhoto, FishProfile, MaintenanceCategory, MaintenanceTask, Note, Plant, PlantLocation,
    RecordId, TankLog, TreatmentPlan, TreatmentStatus,
};

type Created<T> = (StatusCode, Json<T>);

fn created<T>(value: T) -> Created<T> {
    (StatusCode::CREATED, Json(value))
}

fn visible<T: Clone, F: ViewFilter<T>>(items: &[T], filter: &F) -> Vec<T> {
    filter_sorted(items, filter).into_iter().cloned().collect()
}

fn parse_query<T>(
    key: &str,
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> ApiResult<Option<T>> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown {key} `{raw}`"))),
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: voltbetta_core::core_version(),
    })
}

// fish

pub async fn list_fish(State(state): State<AppState>) -> ApiResult<Json<Vec<FishProfile>>> {
    let conn = state.db().await;
    let profiles = FishService::new(SqliteFishRepository::new(&conn)).list_profiles()?;
    Ok(Json(profiles))
}

pub async fn get_fish(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<FishProfile>> {
    let conn = state.db().await;
    let profile = FishService::new(SqliteFishRepository::new(&conn)).get_profile(id)?;
    Ok(Json(profile))
}

pub async fn update_fish(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(mut profile): Json<FishProfile>,
) -> ApiResult<Json<FishProfile>> {
    profile.id = Some(id);
    let conn = state.db().await;
    let service = FishService::new(SqliteFishRepository::new(&conn));
    service.update_profile(&profile)?;
    Ok(Json(service.get_profile(id)?))
}

// tank logs

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<TankLog>>> {
    let filter = TankLogFilter {
        search: query.search.unwrap_or_default(),
        category: query.category.filter(|category| !category.trim().is_empty()),
    };
    let conn = state.db().await;
    let logs = TankLogService::new(SqliteTankLogRepository::new(&conn)).list_logs()?;
    Ok(Json(visible(&logs, &filter)))
}

pub async fn create_log(
    State(state): State<AppState>,
    Json(input): Json<LogInput>,
) -> ApiResult<Created<TankLog>> {
    let log = input.into_log(Utc::now());
    let conn = state.db().await;
    let log = TankLogService::new(SqliteTankLogRepository::new(&conn)).create_log(&log)?;
    Ok(created(log))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<TankLog>> {
    let conn = state.db().await;
    let log = TankLogService::new(SqliteTankLogRepository::new(&conn)).get_log(id)?;
    Ok(Json(log))
}

pub async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<LogInput>,
) -> ApiResult<Json<TankLog>> {
    let conn = state.db().await;
    let service = TankLogService::new(SqliteTankLogRepository::new(&conn));
    let mut log = service.get_log(id)?;
    input.apply(&mut log);
    service.update_log(&log)?;
    Ok(Json(log))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let conn = state.db().await;
    TankLogService::new(SqliteTankLogRepository::new(&conn)).delete_log(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// maintenance tasks

/// Task service that keeps reminders in step with writes.
fn task_service<'conn>(
    state: &AppState,
    conn: &'conn rusqlite::Connection,
) -> MaintenanceService<SqliteMaintenanceRepository<'conn>> {
    MaintenanceService::new(SqliteMaintenanceRepository::new(conn))
        .with_reminders(state.notifier(), state.reminder_settings())
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<MaintenanceTask>>> {
    let filter = TaskFilter {
        search: query.search.unwrap_or_default(),
        category: parse_query("category", query.category.as_deref(), MaintenanceCategory::parse)?,
        show_completed: query.show_completed.unwrap_or(false),
        now: Utc::now(),
    };
    let conn = state.db().await;
    let tasks = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn)).list_tasks()?;
    Ok(Json(visible(&tasks, &filter)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> ApiResult<Created<MaintenanceTask>> {
    let task = input.into_task(Utc::now());
    let conn = state.db().await;
    let task = task_service(&state, &conn).create_task(&task)?;
    Ok(created(task))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<MaintenanceTask>> {
    let conn = state.db().await;
    let task = MaintenanceService::new(SqliteMaintenanceRepository::new(&conn)).get_task(id)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<TaskInput>,
) -> ApiResult<Json<MaintenanceTask>> {
    let conn = state.db().await;
    let service = task_service(&state, &conn);
    let mut task = service.get_task(id)?;
    input.apply(&mut task);
    service.update_task(&task)?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let conn = state.db().await;
    task_service(&state, &conn).delete_task(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/:id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<MaintenanceTask>> {
    let conn = state.db().await;
    let task = task_service(&state, &conn).complete_task(id, Utc::now())?;
    Ok(Json(task))
}

// plants

pub async fn list_plants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Plant>>> {
    let filter = PlantFilter {
        search: query.search.unwrap_or_default(),
        location: parse_query("location", query.location.as_deref(), PlantLocation::parse)?,
    };
    let conn = state.db().await;
    let plants = PlantService::new(SqlitePlantRepository::new(&conn)).list_plants()?;
    Ok(Json(visible(&plants, &filter)))
}

pub async fn create_plant(
    State(state): State<AppState>,
    Json(input): Json<PlantInput>,
) -> ApiResult<Created<Plant>> {
    let plant = input.into_plant(Utc::now());
    let conn = state.db().await;
    let plant = PlantService::new(SqlitePlantRepository::new(&conn)).create_plant(&plant)?;
    Ok(created(plant))
}

pub async fn get_plant(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<Plant>> {
    let conn = state.db().await;
    let plant = PlantService::new(SqlitePlantRepository::new(&conn)).get_plant(id)?;
    Ok(Json(plant))
}

pub async fn update_plant(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<PlantInput>,
) -> ApiResult<Json<Plant>> {
    let conn = state.db().await;
    let service = PlantService::new(SqlitePlantRepository::new(&conn));
    let mut plant = service.get_plant(id)?;
    input.apply(&mut plant);
    service.update_plant(&plant)?;
    Ok(Json(plant))
}

pub async fn delete_plant(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let conn = state.db().await;
    PlantService::new(SqlitePlantRepository::new(&conn)).delete_plant(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/plants/:id/issues
pub async fn add_plant_issue(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<IssueInput>,
) -> ApiResult<Json<Plant>> {
    let conn = state.db().await;
    let plant = PlantService::new(SqlitePlantRepository::new(&conn)).add_issue(
        id,
        &input.description,
        input.severity,
        Utc::now(),
    )?;
    Ok(Json(plant))
}

/// POST /api/plants/:id/issues/:index/resolve
pub async fn resolve_plant_issue(
    State(state): State<AppState>,
    Path((id, index)): Path<(RecordId, usize)>,
    Json(input): Json<NotesInput>,
) -> ApiResult<Json<Plant>> {
    let conn = state.db().await;
    let plant = PlantService::new(SqlitePlantRepository::new(&conn)).resolve_issue(
        id,
        index,
        &input.notes,
        Utc::now(),
    )?;
    Ok(Json(plant))
}

// treatment plans

pub async fn list_treatments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<TreatmentPlan>>> {
    let filter = TreatmentFilter {
        search: query.search.unwrap_or_default(),
        status: parse_query("status", query.status.as_deref(), TreatmentStatus::parse)?,
    };
    let conn = state.db().await;
    let plans = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).list_plans()?;
    Ok(Json(visible(&plans, &filter)))
}

pub async fn create_treatment(
    State(state): State<AppState>,
    Json(input): Json<TreatmentInput>,
) -> ApiResult<Created<TreatmentPlan>> {
    let plan = input.into_plan(Utc::now());
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).create_plan(&plan)?;
    Ok(created(plan))
}

pub async fn get_treatment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).get_plan(id)?;
    Ok(Json(plan))
}

pub async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<TreatmentInput>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let service = TreatmentService::new(SqliteTreatmentRepository::new(&conn));
    let mut plan = service.get_plan(id)?;
    input.apply(&mut plan);
    service.update_plan(&plan)?;
    Ok(Json(plan))
}

pub async fn delete_treatment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let conn = state.db().await;
    TreatmentService::new(SqliteTreatmentRepository::new(&conn)).delete_plan(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/treatments/:id/logs
pub async fn add_treatment_log(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<TreatmentLogInput>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).add_log(
        id,
        &input.actions,
        &input.notes,
        Utc::now(),
    )?;
    Ok(Json(plan))
}

/// POST /api/treatments/:id/symptoms
pub async fn add_symptom(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<SymptomInput>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).add_symptom(
        id,
        &input.name,
        input.severity,
        Utc::now(),
    )?;
    Ok(Json(plan))
}

/// POST /api/treatments/:id/symptoms/:index
pub async fn update_symptom(
    State(state): State<AppState>,
    Path((id, index)): Path<(RecordId, usize)>,
    Json(input): Json<SymptomUpdate>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).update_symptom(
        id,
        index,
        input.severity,
        &input.notes,
        Utc::now(),
    )?;
    Ok(Json(plan))
}

/// POST /api/treatments/:id/complete
pub async fn complete_treatment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<NotesInput>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).complete(
        id,
        &input.notes,
        Utc::now(),
    )?;
    Ok(Json(plan))
}

/// POST /api/treatments/:id/discontinue
pub async fn discontinue_treatment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<NotesInput>,
) -> ApiResult<Json<TreatmentPlan>> {
    let conn = state.db().await;
    let plan = TreatmentService::new(SqliteTreatmentRepository::new(&conn)).discontinue(
        id,
        &input.notes,
        Utc::now(),
    )?;
    Ok(Json(plan))
}

// photos

pub async fn list_photos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<FishPhoto>>> {
    let filter = PhotoFilter {
        search: query.search.unwrap_or_default(),
        category: query.category.filter(|category| !category.trim().is_empty()),
        include_treatment: query.include_treatment.unwrap_or(false),
    };
    let conn = state.db().await;
    let photos = photo_service(&state, &conn).list_photos()?;
    Ok(Json(visible(&photos, &filter)))
}

pub async fn create_photo(
    State(state): State<AppState>,
    Json(input): Json<PhotoInput>,
) -> ApiResult<Created<FishPhoto>> {
    let conn = state.db().await;
    let photo = photo_service(&state, &conn).add_photo(
        &input.source_path,
        &input.caption,
        input.category(),
        input.treatment_plan_id,
        Utc::now(),
    )?;
    Ok(created(photo))
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<FishPhoto>> {
    let conn = state.db().await;
    let photo = photo_service(&state, &conn).get_photo(id)?;
    Ok(Json(photo))
}

pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<PhotoUpdate>,
) -> ApiResult<Json<FishPhoto>> {
    let conn = state.db().await;
    let service = photo_service(&state, &conn);
    let mut photo = service.get_photo(id)?;
    photo.caption = input.caption;
    if let Some(category) = input.category {
        photo.category = category;
    }
    photo.treatment_plan_id = input.treatment_plan_id;
    photo.is_treatment_photo = input.treatment_plan_id.is_some();
    service.update_photo(&photo)?;
    Ok(Json(photo))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let conn = state.db().await;
    photo_service(&state, &conn).delete_photo(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/photos/:id/thumbnail, PNG bytes.
pub async fn photo_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<impl IntoResponse> {
    let path = {
        let conn = state.db().await;
        photo_service(&state, &conn).thumbnail(id)?
    };
    let bytes = tokio::fs::read(&path).await.map_err(|source| {
        ApiError::Service(voltbetta_core::media::MediaError::Io { path, source }.into())
    })?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

fn photo_service<'conn>(
    state: &AppState,
    conn: &'conn rusqlite::Connection,
) -> PhotoService<SqlitePhotoRepository<'conn>, SqliteTreatmentRepository<'conn>> {
    PhotoService::new(
        SqlitePhotoRepository::new(conn),
        SqliteTreatmentRepository::new(conn),
        state.images().clone(),
    )
}

// notes

pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Note>>> {
    let filter = NoteFilter {
        search: query.search.unwrap_or_default(),
        tag: query.tag.filter(|tag| !tag.trim().is_empty()),
    };
    let conn = state.db().await;
    let notes = NoteService::new(SqliteNoteRepository::new(&conn)).list_notes()?;
    Ok(Json(visible(&notes, &filter)))
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(input): Json<NoteInput>,
) -> ApiResult<Created<Note>> {
    let note = input.into_note(Utc::now());
    let conn = state.db().await;
    let note = NoteService::new(SqliteNoteRepository::new(&conn)).create_note(&note)?;
    Ok(created(note))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<Json<Note>> {
    let conn = state.db().await;
    let note = NoteService::new(SqliteNoteRepository::new(&conn)).get_note(id)?;
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(input): Json<NoteInput>,
) -> ApiResult<Json<Note>> {
    let conn = state.db().await;
    let note = NoteService::new(SqliteNoteRepository::new(&conn)).update_note(
        id,
        &input.title,
        &input.content,
        &input.tags,
        Utc::now(),
    )?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> ApiResult<StatusCode> {
    let conn = state.db().await;
    NoteService::new(SqliteNoteRepository::new(&conn)).delete_note(id)?;
    Ok(StatusCode::NO_CONTENT)
}
