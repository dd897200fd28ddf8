use voltbetta_core::db::open_db_in_memory;
use voltbetta_core::repo::maintenance_repo::{MaintenanceRepository, SqliteMaintenanceRepository};
use voltbetta_core::repo::plant_repo::{PlantRepository, SqlitePlantRepository};
use voltbetta_core::repo::tank_log_repo::{SqliteTankLogRepository, TankLogRepository};
use voltbetta_core::{seed_sample_data, SeedSummary};

#[test]
fn seed_fills_empty_database_once() {
    let mut conn = open_db_in_memory().unwrap();

    let summary = seed_sample_data(&mut conn).unwrap();
    assert_eq!(
        summary,
        SeedSummary {
            tasks: 5,
            logs: 3,
            plants: 3,
        }
    );

    let again = seed_sample_data(&mut conn).unwrap();
    assert!(again.is_empty());

    let tasks = SqliteMaintenanceRepository::new(&conn).list_tasks().unwrap();
    assert_eq!(tasks.len(), 5);
    assert!(tasks.iter().all(|task| task.is_recurring));
    assert_eq!(tasks[0].title, "Test Water Parameters");

    let logs = SqliteTankLogRepository::new(&conn).list_logs().unwrap();
    assert!(logs
        .iter()
        .all(|log| log.category == "Water Parameters" && log.water.is_some()));

    let plants = SqlitePlantRepository::new(&conn).list_plants().unwrap();
    let names = plants.into_iter().map(|plant| plant.name).collect::<Vec<_>>();
    assert_eq!(names, vec!["Amazon Sword", "Anubias", "Java Fern"]);
}

#[test]
fn seed_skips_database_with_user_records() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO plants (name, added_at, location, light) VALUES ('Moss', 0, 'in_tank', 'low');",
        [],
    )
    .unwrap();

    let summary = seed_sample_data(&mut conn).unwrap();
    assert!(summary.is_empty());
    assert_eq!(
        SqliteTankLogRepository::new(&conn).list_logs().unwrap().len(),
        0
    );
}
