//! The demo scenarios.
//!
//! Each scenario starts from the configured seed user, exercises one part of
//! the aggregate, checks the outcome, and returns a [`ScenarioReport`]. A
//! report with `passed: false` means the aggregate misbehaved; an `Err` means
//! the scenario itself could not run.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use sourced_aggregate::{User, UserRepository};
use sourced_types::{EventType, RawEvent, UnknownEventPolicy, UserField, UserProfile};

use crate::config::DemoConfig;
use crate::error::DemoError;

/// Email the valid-change scenario moves the seed user to.
pub const NEW_EMAIL: &str = "alice.smith@example.com";

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: &'static str,
    /// Whether every check held.
    pub passed: bool,
    /// Aggregate version at the end of the scenario.
    pub version: u64,
    /// Aggregate state at the end of the scenario.
    pub state: UserProfile,
    /// The aggregate's log, as raw envelopes.
    pub log: Vec<RawEvent>,
    /// Error the aggregate reported, if the scenario expected one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unknown events skipped during raw replay.
    pub skipped: usize,
}

impl ScenarioReport {
    fn new(name: &'static str, passed: bool, user: &User) -> Self {
        if passed {
            info!(scenario = name, version = user.version(), "Scenario passed");
        } else {
            warn!(scenario = name, version = user.version(), "Scenario failed");
        }
        Self {
            name,
            passed,
            version: user.version(),
            state: user.state().clone(),
            log: user.export(),
            error: None,
            skipped: 0,
        }
    }

    fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    const fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

fn seed_user(config: &DemoConfig) -> User {
    User::create(config.seed.user_id(), config.seed.profile())
}

/// A valid email change appends one `EmailChanged` event and touches only
/// the email. Returns the user as well, for the replay scenario.
pub fn valid_change(config: &DemoConfig) -> Result<(ScenarioReport, User), DemoError> {
    let mut user = seed_user(config);
    user.change_with(UserField::Email, NEW_EMAIL, &config.validation)?;

    let first = user.log().get(1).map(|r| &r.event);
    let passed = user.log().len() == 1
        && first.map(|e| e.event_type()) == Some(EventType::EmailChanged)
        && first.map(|e| e.payload()) == Some(NEW_EMAIL)
        && user.state().email == NEW_EMAIL
        && user.state().name == config.seed.name;

    Ok((ScenarioReport::new("valid_change", passed, &user), user))
}

/// An empty email is rejected and leaves the user untouched.
pub fn rejected_change(config: &DemoConfig) -> ScenarioReport {
    let mut user = seed_user(config);
    match user.change_with(UserField::Email, "", &config.validation) {
        Ok(_) => ScenarioReport::new("rejected_change", false, &user),
        Err(e) => {
            let passed = user.log().is_empty() && user.state().email == config.seed.email;
            ScenarioReport::new("rejected_change", passed, &user).with_error(e)
        }
    }
}

/// A fresh user replaying `original`'s log reaches `original`'s state.
pub fn replay(config: &DemoConfig, original: &User) -> ScenarioReport {
    let mut fresh = seed_user(config);
    fresh.replay(original.log().events().cloned());
    let passed = fresh.state() == original.state() && fresh.verify();
    ScenarioReport::new("replay", passed, &fresh)
}

/// Replays a raw history containing one unrecognised event type under the
/// configured policy.
///
/// With `reject` the replay must fail and apply nothing; with `skip` the
/// known events must apply and exactly one event must be skipped.
pub fn raw_replay(config: &DemoConfig) -> ScenarioReport {
    let policy = config.replay.unknown_event_policy;
    let history = vec![
        RawEvent::new(EventType::EmailChanged.as_str(), json!(NEW_EMAIL)),
        RawEvent::new("AccountLocked", json!({ "reason": "too many attempts" })),
        RawEvent::new(EventType::NameChanged.as_str(), json!("Alicia")),
    ];

    let mut user = seed_user(config);
    match (policy, user.replay_raw(&history, policy)) {
        (UnknownEventPolicy::Reject, Err(e)) => {
            let passed = user.log().is_empty() && user.state() == user.initial();
            ScenarioReport::new("raw_replay", passed, &user).with_error(e)
        }
        (UnknownEventPolicy::Skip, Ok(skipped)) => {
            let passed = skipped == 1 && user.version() == 2 && user.verify();
            ScenarioReport::new("raw_replay", passed, &user).with_skipped(skipped)
        }
        (_, Ok(skipped)) => {
            ScenarioReport::new("raw_replay", false, &user).with_skipped(skipped)
        }
        (_, Err(e)) => ScenarioReport::new("raw_replay", false, &user).with_error(e),
    }
}

/// Many tasks change the same user through one shared handle; the log must
/// stay contiguous and consistent with the state.
pub async fn concurrent_writers(config: &DemoConfig) -> Result<ScenarioReport, DemoError> {
    let mut repository = UserRepository::new();
    let handle = repository.insert(seed_user(config))?;

    let mut tasks = Vec::new();
    for i in 0..config.concurrency.writers {
        let handle = handle.clone();
        let rules = config.validation.clone();
        tasks.push(tokio::spawn(async move {
            handle
                .change(UserField::Name, &format!("Writer {i}"), &rules)
                .await
        }));
    }

    let mut accepted: u64 = 0;
    for task in tasks {
        let outcome = task.await.map_err(|e| DemoError::Task {
            message: e.to_string(),
        })?;
        if outcome.is_ok() {
            accepted = accepted.saturating_add(1);
        }
    }

    let user = handle.to_aggregate().await;
    let contiguous = user
        .log()
        .records()
        .iter()
        .zip(1_u64..)
        .all(|(record, expected)| record.sequence == expected);
    let passed = user.version() == accepted && contiguous && user.verify();

    Ok(ScenarioReport::new("concurrent_writers", passed, &user))
}

/// Run every scenario in order.
pub async fn run_all(config: &DemoConfig) -> Result<Vec<ScenarioReport>, DemoError> {
    let (changed, user) = valid_change(config)?;
    let reports = vec![
        changed,
        rejected_change(config),
        replay(config, &user),
        raw_replay(config),
        concurrent_writers(config).await?,
    ];
    Ok(reports)
}
