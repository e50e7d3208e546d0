use cyber_drill::storage::LEADERBOARD_CAP;
use cyber_drill::{DataStore, Difficulty, GameSettings, Profile};
use tempfile::TempDir;

fn store() -> (TempDir, DataStore) {
    let dir = TempDir::new().unwrap();
    let store = DataStore::new(dir.path().join("data"));
    store.ensure_dirs().unwrap();
    (dir, store)
}

#[test]
fn corrupt_settings_are_backed_up_and_reset() {
    let (_dir, store) = store();
    let garbage = b"\x00{not json at all";
    std::fs::write(store.settings_path(), garbage).unwrap();

    assert_eq!(store.load_settings(), GameSettings::default());

    let backups: Vec<_> = std::fs::read_dir(store.backups_dir())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    let name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("settings-") && name.ends_with(".bak"), "{name}");
    assert_eq!(std::fs::read(&backups[0]).unwrap(), garbage);

    // the file was healed, so the next load is clean
    assert_eq!(store.load_settings(), GameSettings::default());
    assert_eq!(std::fs::read_dir(store.backups_dir()).unwrap().count(), 1);
}

#[test]
fn settings_round_trip() {
    let (_dir, store) = store();
    let mut settings = store.load_settings();
    settings.difficulty = Difficulty::Hard;
    settings.timer_enabled = false;
    settings.accent = "green".into();
    store.save_settings(&settings).unwrap();
    assert_eq!(store.load_settings(), settings);
}

#[test]
fn missing_profile_is_created_with_defaults() {
    let (_dir, store) = store();
    assert!(!store.profile_path().exists());
    assert_eq!(store.load_profile(), Profile::default());
    assert!(store.profile_path().exists());
}

#[test]
fn corrupt_profile_does_not_propagate() {
    let (_dir, store) = store();
    std::fs::write(store.profile_path(), "[1, 2").unwrap();
    let profile = store.load_profile();
    assert_eq!(profile.name, "Player");
    assert!(profile.unlocked_badges.is_empty());
}

#[test]
fn leaderboard_stays_sorted_and_capped() {
    let (_dir, store) = store();
    let scores = [120, -30, 480, 55, 900, 310, 0, 75, 640, 210, 15, 999, 330];
    for (i, score) in scores.iter().enumerate() {
        let board = store.append_leaderboard(&format!("p{i}"), *score).unwrap();
        assert!(board.len() <= LEADERBOARD_CAP);
    }

    let board = store.get_leaderboard();
    assert_eq!(board.len(), LEADERBOARD_CAP);
    assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(board[0].name, "p11");
    assert!(board.iter().all(|e| e.score > 0));
}

#[test]
fn feedback_log_keeps_one_record_per_line() {
    let (_dir, store) = store();
    store
        .log_feedback("Player", "phish-invoice", "Choice 2, not 3,\nis wrong")
        .unwrap();

    let log = std::fs::read_to_string(store.feedback_path()).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines[0], "timestamp,player,scenario_id,message");
    assert_eq!(lines.len(), 2);
    let fields: Vec<_> = lines[1].split(',').collect();
    assert_eq!(fields.len(), 4);
    assert_eq!(&fields[1..], ["Player", "phish-invoice", "Choice 2; not 3; is wrong"]);
}

#[test]
fn reports_land_in_reports_dir() {
    let (_dir, store) = store();
    let path = store.save_report("# Summary\n").unwrap();
    assert!(path.starts_with(store.reports_dir()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "# Summary\n");
}

#[test]
fn feedback_player_name_stays_in_its_column() {
    let (_dir, store) = store();
    store.log_feedback("Doe, John", "pw-reuse", "typo").unwrap();

    let log = std::fs::read_to_string(store.feedback_path()).unwrap();
    let record = log.lines().nth(1).unwrap();
    let fields: Vec<_> = record.split(',').collect();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[1], "Doe; John");
    assert_eq!(fields[2], "pw-reuse");
}

#[test]
fn reports_saved_back_to_back_do_not_overwrite() {
    let (_dir, store) = store();
    let first = store.save_report("# One\n").unwrap();
    let second = store.save_report("# Two\n").unwrap();
    assert_ne!(first, second);
    assert_eq!(std::fs::read_to_string(first).unwrap(), "# One\n");
    assert_eq!(std::fs::read_to_string(second).unwrap(), "# Two\n");
    assert_eq!(std::fs::read_dir(store.reports_dir()).unwrap().count(), 2);
}
