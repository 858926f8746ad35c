//! Pipeline tests for SessionStateMachine

use crate::clock::FixedClock;
use crate::*;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap()
}

/// Helper to create a catalog record aged relative to `now()`
fn mock_record(id: &str, source: RecordSource, keywords: &[&str], age_days: i64) -> ContextRecord {
    ContextRecord {
        id: id.to_string(),
        source,
        title: format!("Title of {}", id),
        content: format!("Content of {}", id),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        timestamp: (now() - Duration::days(age_days)).to_rfc3339(),
        author: "alice".to_string(),
        relevance_score: 0.0,
        url: format!("https://example.com/{}", id),
    }
}

fn team_catalog() -> Vec<ContextRecord> {
    vec![
        mock_record(
            "auth-decision",
            RecordSource::Teams,
            &["authentication", "auth", "jwt", "token", "security"],
            30,
        ),
        mock_record(
            "rate-limit",
            RecordSource::GitHubIssue,
            &["rate limit", "api", "throttle", "redis"],
            40,
        ),
        mock_record(
            "db-migration",
            RecordSource::SharePoint,
            &["database", "migration", "schema", "sql"],
            50,
        ),
        mock_record(
            "error-handling",
            RecordSource::GitHubPr,
            &["error", "exception", "logging", "handling"],
            300,
        ),
        mock_record(
            "testing",
            RecordSource::SharePoint,
            &["test", "testing", "vitest", "coverage"],
            20,
        ),
    ]
}

fn machine_with(catalog: Vec<ContextRecord>) -> SessionStateMachine {
    SessionStateMachine::with_parts(
        Box::new(StaticCatalog::new(catalog)),
        Box::new(FixedClock(now())),
        ScoreWeights::default(),
    )
}

const CYCLE: [(State, State, &str); 4] = [
    (State::Idle, State::Trigger, "text-selected"),
    (State::Trigger, State::Retrieval, "metadata-extracted"),
    (State::Retrieval, State::Display, "context-retrieved"),
    (State::Display, State::Idle, "context-displayed"),
];

fn assert_full_cycle(history: &[StateTransition]) {
    assert_eq!(history.len() % 4, 0, "history must hold whole cycles");
    for chunk in history.chunks(4) {
        for (transition, (from, to, trigger)) in chunk.iter().zip(CYCLE.iter()) {
            assert_eq!(transition.from, *from);
            assert_eq!(transition.to, *to);
            assert_eq!(transition.trigger, *trigger);
        }
    }
}

struct BrokenCatalog;

impl CatalogSource for BrokenCatalog {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn load(&self) -> Result<Vec<ContextRecord>, CatalogError> {
        Err(CatalogError::MissingContexts {
            path: "contextDatabase.json".into(),
        })
    }
}

#[test]
fn test_initial_state_is_idle() {
    let machine = SessionStateMachine::default();

    assert_eq!(machine.state(), State::Idle);
    assert!(machine.state_history().is_empty());
    assert_eq!(machine.cache_len(), 0);
}

#[test]
fn test_process_selection_builds_context_map() {
    let mut machine = machine_with(team_catalog());

    let map = machine.process_selection("validate the jwt token", "auth.ts", "typescript", 10);

    assert_eq!(map.metadata.selected_text, "validate the jwt token");
    assert_eq!(map.metadata.file_name, "auth.ts");
    assert_eq!(map.metadata.line_number, 10);
    assert_eq!(map.metadata.timestamp, now().timestamp_millis());
    assert_eq!(map.cached_at, now().timestamp_millis());
    assert!(map.session_id.starts_with("session-"));
    assert_eq!(map.nuggets[0].id, "auth-decision");
}

#[test]
fn test_every_run_completes_the_cycle() {
    let mut machine = machine_with(team_catalog());

    let selections = ["database schema", "", "nonexistent_keyword_12345", "throttle api"];
    for (idx, text) in selections.iter().enumerate() {
        let map = machine.process_selection(text, "file.ts", "typescript", 1);

        assert!(map.nuggets.len() <= 3);
        assert_eq!(machine.state(), State::Idle);
        assert_eq!(machine.state_history().len(), (idx + 1) * 4);
    }

    assert_full_cycle(machine.state_history());
    assert!(machine
        .state_history()
        .iter()
        .all(|t| t.data.timestamp == now().timestamp_millis()));
}

#[test]
fn test_no_match_still_caches_empty_result() {
    let mut machine = machine_with(team_catalog());

    let map = machine.process_selection("nonexistent_keyword_12345", "test.ts", "typescript", 1);

    assert!(map.nuggets.is_empty());
    assert_eq!(machine.state_history().len(), 4);
    assert_eq!(machine.cached_context(&map.session_id), Some(&map));
}

#[test]
fn test_empty_selection_does_not_fail() {
    let mut machine = machine_with(team_catalog());

    let map = machine.process_selection("", "empty.ts", "typescript", 1);

    assert_eq!(map.metadata.selected_text, "");
    assert!(map.nuggets.is_empty());
    assert_full_cycle(machine.state_history());
}

#[test]
fn test_catalog_failure_degrades_to_empty() {
    let mut machine = SessionStateMachine::new(Box::new(BrokenCatalog));

    let map = machine.process_selection("database migration", "db.ts", "typescript", 4);

    assert!(map.nuggets.is_empty());
    assert_eq!(machine.state(), State::Idle);
    assert_full_cycle(machine.state_history());
    assert_eq!(machine.cache_len(), 1);
}

#[test]
fn test_line_zero_is_recorded_as_first_line() {
    let mut machine = machine_with(team_catalog());

    let map = machine.process_selection("database schema", "db.ts", "typescript", 0);

    assert_eq!(map.metadata.line_number, 1);
    assert_eq!(machine.cached_context(&map.session_id), Some(&map));
}

#[test]
fn test_huge_recency_window_completes_the_cycle() {
    for days in [1_000_000_000, i64::MAX] {
        let mut machine = SessionStateMachine::with_parts(
            Box::new(StaticCatalog::new(team_catalog())),
            Box::new(FixedClock(now())),
            ScoreWeights {
                recency_window_days: days,
                ..ScoreWeights::default()
            },
        );

        let map = machine.process_selection("database migration", "db.ts", "sql", 3);

        assert_eq!(map.nuggets[0].id, "db-migration");
        assert_eq!(machine.state(), State::Idle);
        assert_eq!(machine.state_history().len(), 4);
        assert_full_cycle(machine.state_history());
    }
}

#[test]
fn test_recent_build_outranks_old_build() {
    let mut machine = machine_with(vec![
        mock_record("x2", RecordSource::GitHubPr, &["build", "legacy"], 400),
        mock_record("x1", RecordSource::GitHubPr, &["build", "ci"], 0),
        mock_record("x3", RecordSource::Teams, &["patterns"], 0),
    ]);

    let map = machine.process_selection("build", "build.ts", "typescript", 1);
    let ids: Vec<&str> = map.nuggets.iter().map(|n| n.id.as_str()).collect();

    assert_eq!(ids, vec!["x1", "x2"]);
}

#[test]
fn test_same_inputs_same_ranking() {
    let mut machine = machine_with(team_catalog());

    let first = machine.process_selection("error logging for the api", "log.ts", "typescript", 2);
    let second = machine.process_selection("error logging for the api", "log.ts", "typescript", 2);

    assert_eq!(first.nuggets, second.nuggets);
    assert_ne!(first.session_id, second.session_id);
    assert_eq!(machine.cache_len(), 2);
}

#[test]
fn test_clear_session_cache_keeps_state_and_history() {
    let mut machine = machine_with(team_catalog());
    machine.process_selection("test coverage", "spec.ts", "typescript", 1);
    machine.process_selection("sql schema", "db.sql", "sql", 8);

    let history_len = machine.state_history().len();
    machine.clear_session_cache();

    assert_eq!(machine.cache_len(), 0);
    assert_eq!(machine.state(), State::Idle);
    assert_eq!(machine.state_history().len(), history_len);
}

#[test]
fn test_nuggets_serialize_without_score() {
    let mut machine = machine_with(team_catalog());

    let map =
        machine.process_selection("authentication token security", "auth.ts", "typescript", 1);
    let value = serde_json::to_value(&map).unwrap();

    for nugget in value["nuggets"].as_array().unwrap() {
        assert!(nugget.get("calculatedScore").is_none());
        assert!(nugget.get("id").is_some());
    }
    assert!(value.get("sessionId").is_some());
    assert!(value.get("cachedAt").is_some());
}

#[test]
fn test_generate_context_map() {
    let machine = machine_with(vec![]);
    let metadata = extractor::extract_intent_metadata("test", "test.ts", "typescript", 1, 5);

    let map = machine.generate_context_map(metadata.clone(), vec![]);

    assert_eq!(map.metadata, metadata);
    assert!(map.nuggets.is_empty());
    assert_eq!(map.cached_at, now().timestamp_millis());
    // not cached until a full run writes it
    assert!(machine.cached_context(&map.session_id).is_none());
}

#[test]
fn test_reserved_states_have_no_transitions() {
    assert!(State::Validation.successor().is_none());
    assert!(State::Persistence.successor().is_none());

    let mut machine = machine_with(team_catalog());
    machine.process_selection("redis throttle", "limit.ts", "typescript", 1);

    assert!(machine
        .state_history()
        .iter()
        .all(|t| !matches!(t.to, State::Validation | State::Persistence)));
}

#[test]
fn test_state_wire_names() {
    assert_eq!(serde_json::to_value(State::Idle).unwrap(), "State_Idle");
    assert_eq!(serde_json::to_value(State::Retrieval).unwrap(), "State_Retrieval");
    assert_eq!(serde_json::to_value(RecordSource::GitHubPr).unwrap(), "GitHub PR");
}
