use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use std::sync::Arc;
use voltbetta_api::inputs::{
    IssueInput, ListQuery, NoteInput, NotesInput, PhotoInput, PlantInput, SymptomInput,
    SymptomUpdate, TaskInput, TreatmentInput,
};
use voltbetta_api::{routes, AppState};
use voltbetta_core::notify::ReminderSettings;
use voltbetta_core::{
    open_db_in_memory, ImageStore, IssueSeverity, MaintenanceCategory, MaintenanceStatus,
    RecordingNotifier, SymptomSeverity, TreatmentStatus,
};

fn state_in(dir: &std::path::Path) -> AppState {
    AppState::new(
        open_db_in_memory().unwrap(),
        ImageStore::new(dir.join("images"), dir.join("thumbs"), 64),
    )
}

fn task_input(title: &str, scheduled_in: Duration) -> TaskInput {
    TaskInput {
        title: title.to_string(),
        description: String::new(),
        category: MaintenanceCategory::WaterChange,
        scheduled_at: Utc::now() + scheduled_in,
        is_recurring: true,
        recurrence_days: Some(7),
        notifications_enabled: None,
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn write_png(path: &std::path::Path) {
    image::RgbImage::from_pixel(128, 32, image::Rgb([10, 60, 200]))
        .save(path)
        .unwrap();
}

#[tokio::test]
async fn health_reports_version() {
    let Json(health) = routes::health().await;
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn seeded_fish_profile_is_listed() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let Json(profiles) = routes::list_fish(State(state.clone())).await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name, "Volt");
}

#[tokio::test]
async fn task_lifecycle_over_handlers() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let (status, Json(task)) =
        routes::create_task(State(state.clone()), Json(task_input("Water change", Duration::days(-2))))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let id = task.id.unwrap();
    assert_eq!(task.status_at(Utc::now()), MaintenanceStatus::Overdue);

    let Json(done) = routes::complete_task(State(state.clone()), Path(id))
        .await
        .unwrap();
    assert!(done.last_completed_at.is_some());
    assert_eq!(done.status_at(Utc::now()), MaintenanceStatus::Upcoming);

    let status = routes::delete_task(State(state.clone()), Path(id))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let err = routes::get_task(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_list_applies_search_and_category() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    routes::create_task(State(state.clone()), Json(task_input("Water change", Duration::days(3))))
        .await
        .unwrap();
    let mut feeding = task_input("Feed bloodworms", Duration::days(1));
    feeding.category = MaintenanceCategory::Feeding;
    routes::create_task(State(state.clone()), Json(feeding))
        .await
        .unwrap();

    let Json(all) = routes::list_tasks(State(state.clone()), Query(ListQuery::default()))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Feed bloodworms");

    let query = ListQuery {
        search: Some("WATER".to_string()),
        ..ListQuery::default()
    };
    let Json(found) = routes::list_tasks(State(state.clone()), Query(query))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Water change");

    let query = ListQuery {
        category: Some("feeding".to_string()),
        ..ListQuery::default()
    };
    let Json(found) = routes::list_tasks(State(state.clone()), Query(query))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let query = ListQuery {
        category: Some("vacuuming".to_string()),
        ..ListQuery::default()
    };
    let err = routes::list_tasks(State(state), Query(query))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_note_title_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let input = NoteInput {
        title: "  ".to_string(),
        content: "empty".to_string(),
        tags: String::new(),
    };
    let err = routes::create_note(State(state), Json(input))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn note_list_filters_by_tag() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    for (title, tags) in [("Feeding", "food, routine"), ("Fin check", "health")] {
        let input = NoteInput {
            title: title.to_string(),
            content: String::new(),
            tags: tags.to_string(),
        };
        routes::create_note(State(state.clone()), Json(input))
            .await
            .unwrap();
    }

    let query = ListQuery {
        tag: Some("routine".to_string()),
        ..ListQuery::default()
    };
    let Json(notes) = routes::list_notes(State(state), Query(query))
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Feeding");
}

#[tokio::test]
async fn plant_issue_can_be_added_and_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let input = PlantInput {
        name: "Java Fern".to_string(),
        scientific_name: Some("Microsorum pteropus".to_string()),
        added_at: None,
        care_notes: String::new(),
        location: None,
        light: None,
    };
    let (_, Json(plant)) = routes::create_plant(State(state.clone()), Json(input))
        .await
        .unwrap();
    let id = plant.id.unwrap();

    let issue = IssueInput {
        description: "brown spots".to_string(),
        severity: IssueSeverity::Minor,
    };
    routes::add_plant_issue(State(state.clone()), Path(id), Json(issue))
        .await
        .unwrap();

    let Json(plant) = routes::resolve_plant_issue(
        State(state.clone()),
        Path((id, 0)),
        Json(NotesInput {
            notes: "trimmed leaf".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(plant.issues[0].is_resolved);

    let err = routes::resolve_plant_issue(State(state), Path((id, 4)), Json(NotesInput::default()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn treatment_actions_update_plan() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let input = TreatmentInput {
        illness_name: "Fin rot".to_string(),
        description: String::new(),
        started_at: None,
        medication_notes: "Indian almond leaf".to_string(),
    };
    let (_, Json(plan)) = routes::create_treatment(State(state.clone()), Json(input))
        .await
        .unwrap();
    let id = plan.id.unwrap();

    routes::add_symptom(
        State(state.clone()),
        Path(id),
        Json(SymptomInput {
            name: "Ragged fins".to_string(),
            severity: SymptomSeverity::Moderate,
        }),
    )
    .await
    .unwrap();
    let Json(plan) = routes::update_symptom(
        State(state.clone()),
        Path((id, 0)),
        Json(SymptomUpdate {
            severity: SymptomSeverity::Mild,
            notes: "improving".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(plan.symptoms[0].history.len(), 2);

    let Json(plan) = routes::complete_treatment(
        State(state.clone()),
        Path(id),
        Json(NotesInput {
            notes: "healed".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(plan.status, TreatmentStatus::Completed);

    let query = ListQuery {
        status: Some("active".to_string()),
        ..ListQuery::default()
    };
    let Json(active) = routes::list_treatments(State(state), Query(query))
        .await
        .unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn photo_upload_rejects_missing_source_and_serves_thumbnail() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let missing = PhotoInput {
        source_path: dir.path().join("missing.png"),
        caption: String::new(),
        category: None,
        treatment_plan_id: None,
    };
    let err = routes::create_photo(State(state.clone()), Json(missing))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let source = dir.path().join("volt.png");
    image::RgbImage::from_pixel(128, 32, image::Rgb([10, 60, 200]))
        .save(&source)
        .unwrap();
    let input = PhotoInput {
        source_path: source,
        caption: "New plants".to_string(),
        category: Some("Tank".to_string()),
        treatment_plan_id: None,
    };
    let (_, Json(photo)) = routes::create_photo(State(state.clone()), Json(input))
        .await
        .unwrap();
    assert_eq!(photo.category, "Tank");

    let response = routes::photo_thumbnail(State(state), Path(photo.id.unwrap()))
        .await
        .unwrap()
        .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
}

#[tokio::test]
async fn missing_task_body_carries_error_message() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let response = routes::get_task(State(state), Path(41))
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("41"), "{message}");
}

#[tokio::test]
async fn oversized_recurrence_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let mut input = task_input("Yearly scape", Duration::days(3));
    input.recurrence_days = Some(u32::MAX);
    let response = routes::create_task(State(state.clone()), Json(input))
        .await
        .unwrap_err()
        .into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await["error"].is_string());

    let Json(tasks) = routes::list_tasks(State(state), Query(ListQuery::default()))
        .await
        .unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn task_writes_keep_reminders_in_step() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let state = state_in(dir.path()).with_notifier(notifier.clone(), ReminderSettings::default());

    let mut one_off = task_input("Rinse sponge", Duration::days(2));
    one_off.is_recurring = false;
    let (_, Json(rinse)) = routes::create_task(State(state.clone()), Json(one_off))
        .await
        .unwrap();
    let (_, Json(water)) =
        routes::create_task(State(state.clone()), Json(task_input("Water change", Duration::days(3))))
            .await
            .unwrap();
    assert_eq!(notifier.scheduled().len(), 2);

    routes::complete_task(State(state.clone()), Path(rinse.id.unwrap()))
        .await
        .unwrap();
    let pending = notifier.scheduled();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].tag, water.notification_id);

    routes::delete_task(State(state), Path(water.id.unwrap()))
        .await
        .unwrap();
    assert!(notifier.scheduled().is_empty());
}

#[tokio::test]
async fn photo_list_keeps_treatment_photos_out_unless_asked() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(dir.path());

    let plan = TreatmentInput {
        illness_name: "Ich".to_string(),
        description: String::new(),
        started_at: None,
        medication_notes: String::new(),
    };
    let (_, Json(plan)) = routes::create_treatment(State(state.clone()), Json(plan))
        .await
        .unwrap();

    let gallery_source = dir.path().join("portrait.png");
    write_png(&gallery_source);
    let spots_source = dir.path().join("spots.png");
    write_png(&spots_source);
    for (source, plan_id) in [(gallery_source, None), (spots_source, plan.id)] {
        let input = PhotoInput {
            source_path: source,
            caption: String::new(),
            category: None,
            treatment_plan_id: plan_id,
        };
        routes::create_photo(State(state.clone()), Json(input))
            .await
            .unwrap();
    }

    let Json(gallery) = routes::list_photos(State(state.clone()), Query(ListQuery::default()))
        .await
        .unwrap();
    assert_eq!(gallery.len(), 1);
    assert!(!gallery[0].is_treatment_photo);

    let query = ListQuery {
        include_treatment: Some(true),
        ..ListQuery::default()
    };
    let Json(all) = routes::list_photos(State(state), Query(query))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}
