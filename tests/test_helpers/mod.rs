//! Shared fixtures for integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use taskflow::config::EngineConfig;
use taskflow::notification::adapters::memory::InMemoryNotificationRepository;
use taskflow::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Role, TeamCategory, UserId, UserProfile},
    services::WorkflowEngine,
};
use taskflow::timer::adapters::memory::InMemoryTimerRepository;

/// Clock advanced explicitly by the test.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Starts the clock at a fixed Monday morning.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 5, 4, 8, 30, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves time forward by whole minutes.
    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += chrono::Duration::minutes(minutes);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Engine wired over in-memory adapters.
pub type TestEngine = WorkflowEngine<
    InMemoryTaskRepository,
    InMemoryTimerRepository,
    InMemoryNotificationRepository,
    InMemoryUserDirectory,
    ManualClock,
>;

/// One person per role, with leads for two teams.
#[derive(Debug, Clone)]
pub struct Staff {
    pub admin: UserProfile,
    pub manager: UserProfile,
    pub lead: UserProfile,
    pub other_lead: UserProfile,
    pub developer: UserProfile,
    pub qa: UserProfile,
    pub second_qa: UserProfile,
}

/// Engine, its notification store, clock, and the seeded staff.
pub struct Workspace {
    pub engine: Arc<TestEngine>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub clock: Arc<ManualClock>,
    pub staff: Staff,
}

/// Builds an engine over a directory seeded with [`Staff`].
///
/// # Errors
///
/// Returns an error when the directory rejects a seed user.
pub fn workspace() -> Result<Workspace, eyre::Report> {
    let staff = Staff {
        admin: UserProfile::new(UserId::new(), "Avery Admin", Role::Admin),
        manager: UserProfile::new(UserId::new(), "Morgan Manager", Role::ProjectManager),
        lead: UserProfile::new(UserId::new(), "Logan Lead", Role::TeamLead)
            .with_team(TeamCategory::Programming),
        other_lead: UserProfile::new(UserId::new(), "Riley Lead", Role::TeamLead)
            .with_team(TeamCategory::Design),
        developer: UserProfile::new(UserId::new(), "Casey Coder", Role::Programmer)
            .with_team(TeamCategory::Programming),
        qa: UserProfile::new(UserId::new(), "Quinn Review", Role::Qa),
        second_qa: UserProfile::new(UserId::new(), "Sam Review", Role::Qa),
    };
    let directory = InMemoryUserDirectory::new();
    for user in [
        &staff.admin,
        &staff.manager,
        &staff.lead,
        &staff.other_lead,
        &staff.developer,
        &staff.qa,
        &staff.second_qa,
    ] {
        directory.insert(user.clone())?;
    }

    let clock = Arc::new(ManualClock::new());
    let notifications = Arc::new(InMemoryNotificationRepository::new());
    let engine = Arc::new(WorkflowEngine::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(directory),
        Arc::new(InMemoryTimerRepository::new()),
        Arc::clone(&notifications),
        Arc::clone(&clock),
        &EngineConfig::default(),
    ));
    Ok(Workspace {
        engine,
        notifications,
        clock,
        staff,
    })
}
