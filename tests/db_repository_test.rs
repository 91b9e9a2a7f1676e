//! Tests for database repository operations.

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::NamedTempFile;

use pickem::{
    DbErrorKind, GameResultUpdate, GameStatus, NewGame, NewGroup, NewPick, NewSession, NewUser,
    NflWeek, PickResult, PoolRepository, User, WeekFilter, WeekRegrade,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, PoolRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = PoolRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn kickoff(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid kickoff")
}

fn create_user(repo: &PoolRepository, username: &str) -> User {
    repo.create_user(NewUser::new(
        username.to_string(),
        format!("{} Name", username),
        "not-a-real-hash".to_string(),
    ))
    .expect("Create user failed")
}

fn week_one_game(external_id: &str, spread: Option<f64>) -> NewGame {
    NewGame::new(
        external_id.to_string(),
        1,
        2025,
        "Philadelphia Eagles".to_string(),
        "Dallas Cowboys".to_string(),
        spread,
        Some(47.5),
        kickoff(4, 20),
        Some(GameStatus::Scheduled.to_string()),
    )
}

#[test]
fn test_create_user() {
    let (_db, repo) = setup_test_db();
    let user = create_user(&repo, "alice");
    assert_eq!(user.username(), "alice");
    assert!(*user.id() > 0);
}

#[test]
fn test_duplicate_username_is_conflict() {
    let (_db, repo) = setup_test_db();
    create_user(&repo, "bob");
    let err = repo
        .create_user(NewUser::new(
            "bob".to_string(),
            "Other Bob".to_string(),
            "hash".to_string(),
        ))
        .expect_err("Duplicate username should fail");
    assert_eq!(DbErrorKind::Conflict, err.kind);
}

#[test]
fn test_get_user_by_username_not_found() {
    let (_db, repo) = setup_test_db();
    let found = repo.get_user_by_username("nobody").expect("Query failed");
    assert!(found.is_none());
}

#[test]
fn test_session_round_trip() {
    let (_db, repo) = setup_test_db();
    let user = create_user(&repo, "carol");
    repo.create_session(NewSession::new("token-1".to_string(), *user.id()))
        .expect("Create session failed");

    let found = repo.user_for_token("token-1").expect("Query failed");
    assert_eq!(Some(*user.id()), found.map(|u| *u.id()));

    assert_eq!(1, repo.delete_session("token-1").expect("Delete failed"));
    assert!(repo.user_for_token("token-1").expect("Query failed").is_none());
}

#[test]
fn test_create_group_enrols_creator() {
    let (_db, repo) = setup_test_db();
    let owner = create_user(&repo, "owner");
    let group = repo
        .create_group(NewGroup::new(
            "Sunday Crew".to_string(),
            None,
            None,
            *owner.id(),
        ))
        .expect("Create group failed");

    assert!(repo.is_member(*owner.id(), *group.id()).expect("Query failed"));
    let groups = repo.list_groups().expect("List failed");
    assert_eq!(1, groups.len());
    assert_eq!(1, groups[0].1);
}

#[test]
fn test_add_member_twice_is_conflict() {
    let (_db, repo) = setup_test_db();
    let owner = create_user(&repo, "owner");
    let guest = create_user(&repo, "guest");
    let group = repo
        .create_group(NewGroup::new("Crew".to_string(), None, None, *owner.id()))
        .expect("Create group failed");

    repo.add_member(*guest.id(), *group.id())
        .expect("First join failed");
    let err = repo
        .add_member(*guest.id(), *group.id())
        .expect_err("Second join should fail");
    assert!(err.is_conflict());

    let members = repo.list_members(*group.id()).expect("List failed");
    assert_eq!(2, members.len());
    assert_eq!(owner.id(), members[0].1.id());
}

#[test]
fn test_upsert_games_refreshes_by_external_id() {
    let (_db, repo) = setup_test_db();
    let first = repo
        .upsert_games(vec![week_one_game("espn-1", Some(-7.0))])
        .expect("Insert failed");
    let second = repo
        .upsert_games(vec![week_one_game("espn-1", Some(-8.5))])
        .expect("Refresh failed");

    assert_eq!(first[0].id(), second[0].id());
    assert_eq!(Some(-8.5), *second[0].spread());
    let week = repo
        .games_for_week(NflWeek::new(2025, 1))
        .expect("Query failed");
    assert_eq!(1, week.len());
}

#[test]
fn test_record_result_for_missing_game_is_not_found() {
    let (_db, repo) = setup_test_db();
    let err = repo
        .record_result(
            999,
            GameResultUpdate::new(
                Some(1),
                Some(2),
                GameStatus::Final.to_string(),
                kickoff(5, 0),
            ),
        )
        .expect_err("Missing game should fail");
    assert!(err.is_not_found());
}

#[test]
fn test_final_games_need_both_scores() {
    let (_db, repo) = setup_test_db();
    let games = repo
        .upsert_games(vec![week_one_game("a", None), week_one_game("b", None)])
        .expect("Insert failed");
    repo.record_result(
        *games[0].id(),
        GameResultUpdate::new(Some(0), Some(0), "final".to_string(), kickoff(5, 0)),
    )
    .expect("Record failed");
    repo.record_result(
        *games[1].id(),
        GameResultUpdate::new(Some(10), None, "final".to_string(), kickoff(5, 0)),
    )
    .expect("Record failed");

    let finals = repo
        .final_games_for_week(NflWeek::new(2025, 1))
        .expect("Query failed");
    assert_eq!(1, finals.len());
    assert_eq!(games[0].id(), finals[0].id());
}

#[test]
fn test_upsert_without_status_keeps_final() {
    let (_db, repo) = setup_test_db();
    let game = repo
        .upsert_games(vec![week_one_game("g1", Some(-3.0))])
        .expect("Insert failed")
        .remove(0);
    repo.record_result(
        *game.id(),
        GameResultUpdate::new(Some(24), Some(20), "final".to_string(), kickoff(5, 0)),
    )
    .expect("Record failed");

    let refreshed = NewGame::new(
        "g1".to_string(),
        1,
        2025,
        "Philadelphia Eagles".to_string(),
        "Dallas Cowboys".to_string(),
        Some(-3.5),
        Some(47.5),
        kickoff(4, 20),
        None,
    );
    let stored = repo
        .upsert_games(vec![refreshed])
        .expect("Refresh failed")
        .remove(0);

    assert_eq!("final", stored.status());
    assert_eq!(Some(-3.5), *stored.spread());
    assert_eq!((Some(24), Some(20)), (*stored.home_score(), *stored.away_score()));
}

#[test]
fn test_save_picks_replaces_and_clears_result() {
    let (_db, repo) = setup_test_db();
    let user = create_user(&repo, "dave");
    let group = repo
        .create_group(NewGroup::new("Crew".to_string(), None, None, *user.id()))
        .expect("Create group failed");
    let game = repo
        .upsert_games(vec![week_one_game("g1", Some(-3.0))])
        .expect("Insert failed")
        .remove(0);
    let week = NflWeek::new(2025, 1);

    let pick = |selection: &str| {
        NewPick::new(*user.id(), *game.id(), *group.id(), selection.to_string(), None)
    };
    repo.save_picks(vec![pick("home")]).expect("Save failed");
    repo.regrade_week(week, WeekFilter::group(*group.id()), |_, _| {
        Ok(PickResult::Correct)
    })
    .expect("Grade failed");
    let graded = repo
        .picks_for_member(*user.id(), *group.id())
        .expect("Query failed");
    assert_eq!(Some("correct"), graded[0].result().as_deref());

    repo.save_picks(vec![pick("away")]).expect("Resave failed");
    let picks = repo
        .picks_for_member(*user.id(), *group.id())
        .expect("Query failed");
    assert_eq!(1, picks.len());
    assert_eq!("away", picks[0].selection());
    assert!(picks[0].result().is_none());
}

#[test]
fn test_regrade_week_is_idempotent() {
    let (_db, repo) = setup_test_db();
    let user = create_user(&repo, "erin");
    let group = repo
        .create_group(NewGroup::new("Crew".to_string(), None, None, *user.id()))
        .expect("Create group failed");
    let games = repo
        .upsert_games(vec![
            week_one_game("g1", Some(-3.0)),
            week_one_game("g2", Some(2.5)),
            week_one_game("g3", None),
        ])
        .expect("Insert failed");
    repo.save_picks(
        games
            .iter()
            .map(|g| NewPick::new(*user.id(), *g.id(), *group.id(), "home".to_string(), None))
            .collect(),
    )
    .expect("Save failed");

    let week = NflWeek::new(2025, 1);
    let results = [PickResult::Correct, PickResult::Incorrect, PickResult::Tie];
    let by_game = |game: &pickem::Game| {
        games
            .iter()
            .position(|g| g.id() == game.id())
            .map(|i| results[i])
            .unwrap_or(PickResult::Pending)
    };

    for _ in 0..2 {
        let regrade = repo
            .regrade_week(week, WeekFilter::group(*group.id()), |game, _| Ok(by_game(game)))
            .expect("Regrade failed");
        assert_eq!(3, regrade.picks_graded);
        assert_eq!(1, regrade.records_written);
        assert_eq!(0, regrade.records_removed);
    }

    let scores = repo
        .weekly_scores(week, Some(*group.id()))
        .expect("Query failed");
    assert_eq!(1, scores.len());
    let (score, _, _) = &scores[0];
    assert_eq!((1, 1, 1), (*score.wins(), *score.losses(), *score.ties()));
}

#[test]
fn test_regrade_week_drops_records_with_no_grades_left() {
    let (_db, repo) = setup_test_db();
    let user = create_user(&repo, "gina");
    let group = repo
        .create_group(NewGroup::new("Crew".to_string(), None, None, *user.id()))
        .expect("Create group failed");
    let game = repo
        .upsert_games(vec![week_one_game("g1", Some(-3.0))])
        .expect("Insert failed")
        .remove(0);
    repo.save_picks(vec![NewPick::new(
        *user.id(),
        *game.id(),
        *group.id(),
        "home".to_string(),
        None,
    )])
    .expect("Save failed");
    let week = NflWeek::new(2025, 1);

    repo.regrade_week(week, WeekFilter::default(), |_, _| Ok(PickResult::Correct))
        .expect("Grade failed");
    assert_eq!(1, repo.weekly_scores(week, None).expect("Query failed").len());

    let regrade = repo
        .regrade_week(week, WeekFilter::default(), |_, _| Ok(PickResult::Pending))
        .expect("Regrade failed");
    assert_eq!(
        WeekRegrade {
            final_games: 0,
            picks_graded: 0,
            records_written: 0,
            records_removed: 1,
        },
        regrade
    );
    assert!(repo.weekly_scores(week, None).expect("Query failed").is_empty());
    let picks = repo
        .picks_for_member(*user.id(), *group.id())
        .expect("Query failed");
    assert!(picks[0].result().is_none());
}

#[test]
fn test_delete_group_cascades() {
    let (_db, repo) = setup_test_db();
    let user = create_user(&repo, "frank");
    let group = repo
        .create_group(NewGroup::new("Crew".to_string(), None, None, *user.id()))
        .expect("Create group failed");
    let game = repo
        .upsert_games(vec![week_one_game("g1", Some(-3.0))])
        .expect("Insert failed")
        .remove(0);
    repo.save_picks(vec![NewPick::new(
        *user.id(),
        *game.id(),
        *group.id(),
        "home".to_string(),
        Some(3),
    )])
    .expect("Save failed");

    assert_eq!(1, repo.delete_group(*group.id()).expect("Delete failed"));
    assert!(repo.get_group(*group.id()).expect("Query failed").is_none());
    assert!(
        repo.picks_for_member(*user.id(), *group.id())
            .expect("Query failed")
            .is_empty()
    );
}
