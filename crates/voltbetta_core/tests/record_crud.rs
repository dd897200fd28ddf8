use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use voltbetta_core::db::open_db_in_memory;
use voltbetta_core::repo::fish_repo::{FishRepository, SqliteFishRepository};
use voltbetta_core::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use voltbetta_core::repo::plant_repo::{PlantRepository, SqlitePlantRepository};
use voltbetta_core::repo::tank_log_repo::{SqliteTankLogRepository, TankLogRepository};
use voltbetta_core::repo::RepoError;
use voltbetta_core::service::note_service::NoteService;
use voltbetta_core::service::tank_log_service::TankLogService;
use voltbetta_core::service::ServiceError;
use voltbetta_core::{
    IssueSeverity, LightLevel, Note, Plant, PlantLocation, TankLog, ValidationError,
    WaterParameters, DEFAULT_FISH_ID,
};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

#[test]
fn tank_log_round_trips_water_readings() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTankLogRepository::new(&conn);

    let mut log = TankLog::new("Water test", "weekly check", at(2025, 4, 10))
        .with_category("Water Parameters");
    log.water = Some(WaterParameters {
        ammonia: Some(0.0),
        nitrite: None,
        nitrate: Some(5.0),
        ph: Some(7.2),
        temperature: Some(78.0),
    });

    let id = repo.create_log(&log).unwrap();
    let loaded = repo.get_log(id).unwrap().unwrap();

    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.category, "Water Parameters");
    assert_eq!(loaded.logged_at, at(2025, 4, 10));
    assert_eq!(loaded.water, log.water);
}

#[test]
fn tank_logs_list_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTankLogRepository::new(&conn);

    repo.create_log(&TankLog::new("old", "", at(2025, 3, 27)))
        .unwrap();
    repo.create_log(&TankLog::new("new", "", at(2025, 4, 10)))
        .unwrap();
    repo.create_log(&TankLog::new("mid", "", at(2025, 4, 3)))
        .unwrap();

    let titles = repo
        .list_logs()
        .unwrap()
        .into_iter()
        .map(|log| log.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["new", "mid", "old"]);
}

#[test]
fn update_and_delete_of_missing_row_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTankLogRepository::new(&conn);

    let mut ghost = TankLog::new("ghost", "", at(2025, 1, 1));
    ghost.id = Some(404);

    assert!(matches!(
        repo.update_log(&ghost),
        Err(RepoError::NotFound { id: 404, .. })
    ));
    assert!(matches!(
        repo.delete_log(404),
        Err(RepoError::NotFound { id: 404, .. })
    ));
    assert!(repo.get_log(404).unwrap().is_none());
}

#[test]
fn blank_title_is_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTankLogRepository::new(&conn);

    let err = repo
        .create_log(&TankLog::new("   ", "", at(2025, 1, 1)))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankField("title"))
    ));
    assert!(repo.list_logs().unwrap().is_empty());
}

#[test]
fn tank_log_service_maps_missing_rows_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TankLogService::new(SqliteTankLogRepository::new(&conn));

    let created = service
        .create_log(&TankLog::new("Added driftwood", "", at(2025, 2, 1)))
        .unwrap();
    assert!(created.id.is_some());

    service.delete_log(created.id.unwrap()).unwrap();
    assert!(matches!(
        service.get_log(created.id.unwrap()),
        Err(ServiceError::NotFound { .. })
    ));
}

#[test]
fn plants_round_trip_issues_and_sort_by_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlantRepository::new(&conn);

    let mut sword = Plant::new("amazon Sword", at(2025, 2, 1));
    sword.light = LightLevel::High;
    sword.location = PlantLocation::InQuarantine;
    sword.add_issue("yellow leaves", IssueSeverity::Moderate, at(2025, 3, 1));
    let sword_id = repo.create_plant(&sword).unwrap();
    repo.create_plant(&Plant::new("Java Fern", at(2025, 1, 15)))
        .unwrap();
    repo.create_plant(&Plant::new("Anubias", at(2025, 1, 15)))
        .unwrap();

    let names = repo
        .list_plants()
        .unwrap()
        .into_iter()
        .map(|plant| plant.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["amazon Sword", "Anubias", "Java Fern"]);

    let loaded = repo.get_plant(sword_id).unwrap().unwrap();
    assert_eq!(loaded.light, LightLevel::High);
    assert_eq!(loaded.location, PlantLocation::InQuarantine);
    assert_eq!(loaded.issues.len(), 1);
    assert_eq!(loaded.issues[0].severity, IssueSeverity::Moderate);
    assert!(!loaded.issues[0].is_resolved);
}

#[test]
fn corrupted_enum_text_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePlantRepository::new(&conn);
    let id = repo
        .create_plant(&Plant::new("Java Fern", at(2025, 1, 15)))
        .unwrap();

    conn.execute(
        "UPDATE plants SET light = 'blinding' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    assert!(matches!(repo.get_plant(id), Err(RepoError::InvalidData(_))));
}

#[test]
fn note_update_bumps_modified_and_reorders_list() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::new(&conn));

    let first = service
        .create_note(&Note::new("Feeding", "pellets x3", "food", at(2025, 4, 1)))
        .unwrap();
    service
        .create_note(&Note::new("Fin check", "looks good", "health", at(2025, 4, 2)))
        .unwrap();

    let updated = service
        .update_note(
            first.id.unwrap(),
            "Feeding plan",
            "pellets x2, bloodworms sunday",
            "food, routine",
            at(2025, 4, 5),
        )
        .unwrap();
    assert_eq!(updated.created_at, at(2025, 4, 1));
    assert_eq!(updated.modified_at, at(2025, 4, 5));
    assert!(updated.has_tag("routine"));

    let titles = service
        .list_notes()
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Feeding plan", "Fin check"]);
}

#[test]
fn note_repo_rejects_modified_before_created() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let mut note = Note::new("Backdated", "", "", at(2025, 4, 5));
    note.modified_at = at(2025, 4, 1);
    assert!(matches!(
        repo.create_note(&note),
        Err(RepoError::Validation(ValidationError::EndBeforeStart(_)))
    ));
}

#[test]
fn fish_profile_can_be_edited() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFishRepository::new(&conn);

    let mut volt = repo.get_profile(DEFAULT_FISH_ID).unwrap().unwrap();
    assert_eq!(volt.name, "Volt");
    assert_eq!(volt.acquired_on, NaiveDate::from_ymd_opt(2025, 4, 5));

    volt.tank = Some("5 gallon planted".to_string());
    repo.update_profile(&volt).unwrap();

    let profiles = repo.list_profiles().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].tank.as_deref(), Some("5 gallon planted"));
}
