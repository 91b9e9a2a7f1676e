//! Tests for the service layer against a real database.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tempfile::NamedTempFile;

use pickem::{
    AuthService, CreateGroupRequest, GameInput, GameResultInput, GameService, GameStatus,
    GroupService, NflWeek, PasswordHasher, PickInput, PickResult, PickService, PoolRepository,
    ScoringService, ScoringSummary, Selection, ServiceError, SignInRequest, SignUpRequest,
    StandingsService, SubmitPicksRequest, User, WeekFilter,
};

struct Pool {
    _db: NamedTempFile,
    repo: PoolRepository,
    auth: AuthService,
    groups: GroupService,
    games: GameService,
    picks: PickService,
    scoring: ScoringService,
    standings: StandingsService,
}

fn setup() -> Pool {
    let db = NamedTempFile::new().expect("Failed to create temp file");
    let path = db.path().to_str().expect("Invalid path").to_string();
    let repo = PoolRepository::new(path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");

    let hasher = PasswordHasher::new(4);
    let groups = GroupService::new(repo.clone(), hasher);
    Pool {
        auth: AuthService::new(repo.clone(), hasher),
        games: GameService::new(repo.clone()),
        picks: PickService::new(repo.clone(), groups.clone()),
        scoring: ScoringService::new(repo.clone()),
        standings: StandingsService::new(repo.clone(), groups.clone()),
        groups,
        repo,
        _db: db,
    }
}

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid time")
}

fn utc(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at(month, day, hour))
}

fn week_one() -> NflWeek {
    NflWeek::new(2025, 1)
}

impl Pool {
    fn sign_up(&self, username: &str) -> User {
        let session = self
            .auth
            .sign_up(SignUpRequest {
                username: username.to_string(),
                name: format!("{} Name", username),
                password: "secret1".to_string(),
                confirm_password: "secret1".to_string(),
            })
            .expect("Sign up failed");
        self.auth
            .authenticate(&session.token)
            .expect("Fresh token should authenticate")
    }

    fn group(&self, owner: &User, password: Option<&str>) -> i32 {
        let group = self
            .groups
            .create_group(
                owner,
                CreateGroupRequest {
                    name: "Sunday Crew".to_string(),
                    description: Some("  ".to_string()),
                    password: password.map(str::to_string),
                },
            )
            .expect("Create group failed");
        *group.id()
    }

    /// Eagles (-8.5, total 47.5) host the Cowboys Thursday night; a late
    /// Sunday game has no line yet.
    fn slate(&self) -> (i32, i32) {
        let game = |id: &str, home: &str, away: &str, spread, total, kickoff| GameInput {
            external_id: id.to_string(),
            week: 1,
            season: 2025,
            home_team: home.to_string(),
            away_team: away.to_string(),
            spread,
            over_under: total,
            game_time: kickoff,
            status: None,
        };
        let games = self
            .games
            .ingest_slate(vec![
                game(
                    "nfl-1",
                    "Philadelphia Eagles",
                    "Dallas Cowboys",
                    Some(-8.5),
                    Some(47.5),
                    utc(9, 4, 20),
                ),
                game(
                    "nfl-2",
                    "Los Angeles Chargers",
                    "Kansas City Chiefs",
                    None,
                    None,
                    utc(9, 7, 20),
                ),
            ])
            .expect("Slate failed");
        (*games[0].id(), *games[1].id())
    }

    fn submit(
        &self,
        user: &User,
        group_id: i32,
        picks: &[(i32, &str)],
        now: NaiveDateTime,
    ) -> Result<usize, ServiceError> {
        self.picks.submit(
            user,
            SubmitPicksRequest {
                group_id,
                picks: picks
                    .iter()
                    .map(|(game_id, pick)| PickInput {
                        game_id: *game_id,
                        pick: pick.to_string(),
                        confidence: None,
                    })
                    .collect(),
            },
            now,
        )
    }

    fn finish(&self, game_id: i32, home: i32, away: i32) {
        self.games
            .record_result(
                game_id,
                GameResultInput {
                    home_score: Some(home),
                    away_score: Some(away),
                    status: GameStatus::Final,
                },
            )
            .expect("Record result failed");
    }
}

#[test]
fn test_sign_in_and_out() {
    let pool = setup();
    pool.sign_up("alice");

    let wrong = pool
        .auth
        .sign_in(SignInRequest {
            username: "alice".to_string(),
            password: "nope123".to_string(),
        })
        .expect_err("Wrong password should fail");
    assert!(matches!(wrong, ServiceError::Unauthorized(_)));
    assert_eq!("Invalid username or password", wrong.to_string());

    let unknown = pool
        .auth
        .sign_in(SignInRequest {
            username: "nobody".to_string(),
            password: "secret1".to_string(),
        })
        .expect_err("Unknown user should fail");
    assert_eq!(wrong.to_string(), unknown.to_string());

    let session = pool
        .auth
        .sign_in(SignInRequest {
            username: "alice".to_string(),
            password: "secret1".to_string(),
        })
        .expect("Sign in failed");
    assert_eq!("alice", session.user.username());

    pool.auth.sign_out(&session.token).expect("Sign out failed");
    assert!(matches!(
        pool.auth.authenticate(&session.token),
        Err(ServiceError::Unauthorized(_))
    ));
}

#[test]
fn test_duplicate_username_is_conflict() {
    let pool = setup();
    pool.sign_up("alice");
    let err = pool
        .auth
        .sign_up(SignUpRequest {
            username: "alice".to_string(),
            name: "Second Alice".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        })
        .expect_err("Duplicate should fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn test_only_creator_deletes_group() {
    let pool = setup();
    let owner = pool.sign_up("owner");
    let other = pool.sign_up("other");
    let group_id = pool.group(&owner, None);

    let err = pool
        .groups
        .delete_group(&other, group_id)
        .expect_err("Non-creator delete should fail");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    pool.groups
        .delete_group(&owner, group_id)
        .expect("Creator delete failed");
    assert!(matches!(
        pool.groups.require_group(group_id),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn test_join_checks_password_and_membership() {
    let pool = setup();
    let owner = pool.sign_up("owner");
    let guest = pool.sign_up("guest");
    let group_id = pool.group(&owner, Some("letmein"));

    let listed = pool.groups.list_groups().expect("List failed");
    assert!(listed[0].has_password);
    assert_eq!(None, *listed[0].group.description());

    assert!(matches!(
        pool.groups.join_group(&guest, group_id, Some("wrong")),
        Err(ServiceError::Unauthorized(_))
    ));
    assert!(matches!(
        pool.groups.join_group(&guest, group_id, None),
        Err(ServiceError::Unauthorized(_))
    ));
    pool.groups
        .join_group(&guest, group_id, Some("letmein"))
        .expect("Join failed");
    assert!(matches!(
        pool.groups.join_group(&guest, group_id, Some("letmein")),
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        pool.groups.join_group(&owner, group_id, Some("letmein")),
        Err(ServiceError::Conflict(_))
    ));

    let detail = pool
        .groups
        .group_detail(group_id, at(9, 10, 12))
        .expect("Detail failed");
    assert_eq!(2, detail.summary.member_count);
    assert_eq!(NflWeek::new(2025, 2), detail.current_week);
}

#[test]
fn test_non_member_cannot_pick() {
    let pool = setup();
    let owner = pool.sign_up("owner");
    let outsider = pool.sign_up("outsider");
    let group_id = pool.group(&owner, None);
    let (eagles, _) = pool.slate();

    let err = pool
        .submit(&outsider, group_id, &[(eagles, "home")], at(9, 1, 12))
        .expect_err("Outsider pick should fail");
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[test]
fn test_picks_resolve_team_names() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, chargers) = pool.slate();

    let saved = pool
        .submit(
            &user,
            group_id,
            &[(eagles, "dallas cowboys"), (chargers, "Los Angeles Chargers")],
            at(9, 1, 12),
        )
        .expect("Submit failed");
    assert_eq!(2, saved);

    let picks = pool
        .picks
        .group_picks(group_id, week_one())
        .expect("Query failed");
    assert_eq!(Selection::Away, picks[0].selection);
    assert_eq!("Dallas Cowboys", picks[0].pick);
    assert_eq!(Selection::Home, picks[1].selection);
}

#[test]
fn test_unknown_team_and_missing_games_are_rejected() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, _) = pool.slate();

    let err = pool
        .submit(&user, group_id, &[(eagles, "Green Bay Packers")], at(9, 1, 12))
        .expect_err("Unknown team should fail");
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = pool
        .submit(&user, group_id, &[(eagles, "home"), (4242, "home")], at(9, 1, 12))
        .expect_err("Missing game should fail");
    match err {
        ServiceError::GamesMissing(ids) => assert_eq!(vec![4242], ids),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_started_game_rejects_whole_batch() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, chargers) = pool.slate();

    // Thursday game under way, Sunday game still open.
    let err = pool
        .submit(
            &user,
            group_id,
            &[(eagles, "home"), (chargers, "away")],
            at(9, 4, 21),
        )
        .expect_err("Locked game should fail");
    match err {
        ServiceError::GamesLocked(ids) => assert_eq!(vec![eagles], ids),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(
        pool.picks
            .my_picks(&user, group_id)
            .expect("Query failed")
            .is_empty()
    );
}

#[test]
fn test_scoring_is_idempotent() {
    let pool = setup();
    let alice = pool.sign_up("alice");
    let bob = pool.sign_up("bob");
    let group_id = pool.group(&alice, None);
    pool.groups
        .join_group(&bob, group_id, None)
        .expect("Join failed");
    let (eagles, chargers) = pool.slate();

    pool.submit(&alice, group_id, &[(eagles, "Philadelphia Eagles")], at(9, 1, 12))
        .expect("Alice submit failed");
    pool.submit(
        &bob,
        group_id,
        &[(eagles, "home"), (chargers, "home")],
        at(9, 1, 12),
    )
    .expect("Bob submit failed");
    let resubmitted = pool
        .submit(&bob, group_id, &[(eagles, "away")], at(9, 2, 12))
        .expect("Bob resubmit failed");
    assert_eq!(1, resubmitted);

    pool.finish(eagles, 34, 30);

    let first = pool
        .scoring
        .score_week(week_one(), None)
        .expect("Scoring failed");
    assert_eq!(
        ScoringSummary {
            games_processed: 1,
            picks_graded: 2,
            scores_updated: 2,
        },
        first
    );
    let second = pool
        .scoring
        .score_week(week_one(), None)
        .expect("Rescoring failed");
    assert_eq!(first, second);

    let board = pool
        .standings
        .leaderboard(week_one(), Some(group_id))
        .expect("Leaderboard failed");
    let rows: Vec<(&str, i32, i32, i32)> = board
        .scores
        .iter()
        .map(|s| (s.user_name.as_str(), s.wins, s.losses, s.win_percentage))
        .collect();
    assert_eq!(
        vec![("bob Name", 1, 0, 100), ("alice Name", 0, 1, 0)],
        rows
    );

    let stored = pool
        .repo
        .picks_for_week(week_one(), WeekFilter::group(group_id))
        .expect("Query failed");
    let chargers_pick = stored
        .iter()
        .find(|(_, game, _)| *game.id() == chargers)
        .expect("Chargers pick stored");
    assert!(chargers_pick.0.result().is_none());
}

#[test]
fn test_game_picked_twice_in_one_batch_is_rejected() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, _) = pool.slate();

    let err = pool
        .submit(
            &user,
            group_id,
            &[(eagles, "home"), (eagles, "away")],
            at(9, 1, 12),
        )
        .expect_err("Duplicate game should be rejected");
    assert!(matches!(err, ServiceError::Validation(_)), "{err:?}");
    assert!(
        pool.picks
            .my_picks(&user, group_id)
            .expect("Query failed")
            .is_empty()
    );
}

#[test]
fn test_reingesting_slate_keeps_final_games() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, _) = pool.slate();
    pool.submit(&user, group_id, &[(eagles, "away")], at(9, 1, 12))
        .expect("Submit failed");
    pool.finish(eagles, 34, 30);
    pool.scoring
        .score_week(week_one(), None)
        .expect("Scoring failed");

    pool.slate();

    let games = pool
        .games
        .games_for_week(week_one())
        .expect("Games failed");
    let game = games
        .iter()
        .find(|g| *g.id() == eagles)
        .expect("Eagles game kept");
    assert_eq!("final", game.status());
    assert_eq!((Some(34), Some(30)), (*game.home_score(), *game.away_score()));

    let results = pool
        .picks
        .pick_results(week_one(), WeekFilter::group(group_id))
        .expect("Results failed");
    assert_eq!(PickResult::Correct, results.picks[0].grade);
    let rescore = pool
        .scoring
        .score_week(week_one(), None)
        .expect("Rescoring failed");
    assert_eq!(1, rescore.games_processed);
}

#[test]
fn test_rescoring_after_result_is_withdrawn() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, _) = pool.slate();
    pool.submit(&user, group_id, &[(eagles, "away")], at(9, 1, 12))
        .expect("Submit failed");
    pool.finish(eagles, 34, 30);
    pool.scoring
        .score_week(week_one(), None)
        .expect("Scoring failed");

    pool.games
        .record_result(
            eagles,
            GameResultInput {
                home_score: None,
                away_score: None,
                status: GameStatus::InProgress,
            },
        )
        .expect("Record result failed");
    let summary = pool
        .scoring
        .score_week(week_one(), None)
        .expect("Rescoring failed");
    assert_eq!(ScoringSummary::default(), summary);

    let board = pool
        .standings
        .leaderboard(week_one(), Some(group_id))
        .expect("Leaderboard failed");
    assert!(board.scores.is_empty());
    let stored = pool
        .repo
        .picks_for_week(week_one(), WeekFilter::group(group_id))
        .expect("Query failed");
    assert!(stored[0].0.result().is_none());
}

#[test]
fn test_scoring_without_finals_is_empty() {
    let pool = setup();
    pool.slate();
    let summary = pool
        .scoring
        .score_week(week_one(), None)
        .expect("Scoring failed");
    assert_eq!(ScoringSummary::default(), summary);
}

#[test]
fn test_pick_results_grade_live() {
    let pool = setup();
    let user = pool.sign_up("alice");
    let group_id = pool.group(&user, None);
    let (eagles, chargers) = pool.slate();
    pool.submit(
        &user,
        group_id,
        &[(eagles, "home"), (chargers, "over")],
        at(9, 1, 12),
    )
    .expect("Submit failed");
    pool.finish(eagles, 34, 30);

    let results = pool
        .picks
        .pick_results(week_one(), WeekFilter::group(group_id))
        .expect("Results failed");
    assert_eq!(PickResult::Incorrect, results.picks[0].grade);
    assert_eq!(PickResult::Pending, results.picks[1].grade);
    assert!(results.picks[0].pick.result.is_none(), "live grading stores nothing");
}

#[test]
fn test_members_week_and_past_weeks() {
    let pool = setup();
    let alice = pool.sign_up("alice");
    let bob = pool.sign_up("bob");
    let carl = pool.sign_up("carl");
    let group_id = pool.group(&alice, None);
    for user in [&bob, &carl] {
        pool.groups
            .join_group(user, group_id, None)
            .expect("Join failed");
    }
    let (eagles, _) = pool.slate();
    pool.submit(&alice, group_id, &[(eagles, "home")], at(9, 1, 12))
        .expect("Submit failed");
    pool.submit(&bob, group_id, &[(eagles, "under")], at(9, 1, 12))
        .expect("Submit failed");
    pool.finish(eagles, 34, 30);
    pool.scoring
        .score_week(week_one(), Some(group_id))
        .expect("Scoring failed");

    let members = pool
        .groups
        .members_for_week(group_id, week_one())
        .expect("Members failed");
    let carl_row = members
        .members
        .iter()
        .find(|m| m.username == "carl")
        .expect("Carl listed");
    assert!(!carl_row.has_picks);
    assert_eq!(0, carl_row.pick_count);
    let alice_row = members
        .members
        .iter()
        .find(|m| m.username == "alice")
        .expect("Alice listed");
    assert_eq!((1, 0, 1), (alice_row.pick_count, alice_row.wins, alice_row.losses));

    let history = pool
        .standings
        .past_weeks(group_id, NflWeek::new(2025, 3))
        .expect("Past weeks failed");
    assert_eq!(1, history.total_weeks);
    let week = &history.weeks[0];
    assert_eq!(1, week.week);
    assert_eq!(3, week.members.len());
    // bob's under (64 > 47.5) lost too, so nobody won a pick.
    assert!(week.overall_winner.is_none());
    assert!(week.members.iter().any(|m| m.name == "carl Name" && m.wins == 0));

    let none_yet = pool
        .standings
        .past_weeks(group_id, week_one())
        .expect("Past weeks failed");
    assert!(none_yet.weeks.is_empty());
}
