//! Fixtures shared by unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::EngineConfig;
use crate::notification::{
    adapters::memory::InMemoryNotificationRepository, domain::NotificationKind,
    ports::NotificationRepository,
};
use crate::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Actor, ProjectId, Role, Task, TaskId, TeamCategory, UserId, UserProfile},
    services::{CreateTaskRequest, TransitionTaskRequest, WorkflowEngine, WorkflowError},
};
use crate::timer::adapters::memory::InMemoryTimerRepository;

/// Clock whose time only moves when a test advances it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, step: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(chrono::Duration::minutes(minutes));
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

/// Users seeded into every test directory.
#[derive(Debug, Clone)]
pub struct Staff {
    pub admin: UserProfile,
    pub manager: UserProfile,
    pub development_lead: UserProfile,
    pub design_lead: UserProfile,
    pub developer: UserProfile,
    pub second_developer: UserProfile,
    pub designer: UserProfile,
    pub qa: UserProfile,
    pub second_qa: UserProfile,
}

impl Staff {
    fn new() -> Self {
        Self {
            admin: UserProfile::new(UserId::new(), "Ada Admin", Role::Admin),
            manager: UserProfile::new(UserId::new(), "Pat Manager", Role::ProjectManager),
            development_lead: UserProfile::new(UserId::new(), "Lee Lead", Role::TeamLead)
                .with_team(TeamCategory::Development),
            design_lead: UserProfile::new(UserId::new(), "Dana Lead", Role::TeamLead)
                .with_team(TeamCategory::Design),
            developer: UserProfile::new(UserId::new(), "Dev One", Role::Developer)
                .with_team(TeamCategory::Development),
            second_developer: UserProfile::new(UserId::new(), "Dev Two", Role::Developer)
                .with_team(TeamCategory::Development),
            designer: UserProfile::new(UserId::new(), "Desi Gner", Role::Designer)
                .with_team(TeamCategory::Design),
            qa: UserProfile::new(UserId::new(), "Quinn Checker", Role::Qa),
            second_qa: UserProfile::new(UserId::new(), "Quincy Checker", Role::Qa),
        }
    }

    fn all(&self) -> [&UserProfile; 9] {
        [
            &self.admin,
            &self.manager,
            &self.development_lead,
            &self.design_lead,
            &self.developer,
            &self.second_developer,
            &self.designer,
            &self.qa,
            &self.second_qa,
        ]
    }
}

/// Directory pre-populated with [`Staff`].
pub fn seeded_directory() -> (InMemoryUserDirectory, Staff) {
    let staff = Staff::new();
    let directory = InMemoryUserDirectory::new();
    for user in staff.all() {
        directory.insert(user.clone()).expect("seed user");
    }
    (directory, staff)
}

/// Engine type wired over in-memory adapters.
pub type TestEngine = WorkflowEngine<
    InMemoryTaskRepository,
    InMemoryTimerRepository,
    InMemoryNotificationRepository,
    InMemoryUserDirectory,
    ManualClock,
>;

/// Engine plus handles on its repositories and clock.
pub struct Harness {
    pub engine: Arc<TestEngine>,
    pub clock: Arc<ManualClock>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub timers: Arc<InMemoryTimerRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub directory: Arc<InMemoryUserDirectory>,
    pub staff: Staff,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        let (directory, staff) = seeded_directory();
        let clock = Arc::new(ManualClock::new());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let timers = Arc::new(InMemoryTimerRepository::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let shared_directory = Arc::new(directory);
        let engine = Arc::new(WorkflowEngine::new(
            Arc::clone(&tasks),
            Arc::clone(&shared_directory),
            Arc::clone(&timers),
            Arc::clone(&notifications),
            Arc::clone(&clock),
            &EngineConfig::default(),
        ));
        Self {
            engine,
            clock,
            tasks,
            timers,
            notifications,
            directory: shared_directory,
            staff,
        }
    }

    /// Builds a second engine over the same repositories, as another
    /// process sharing the store would.
    pub fn sibling_engine(&self) -> Arc<TestEngine> {
        Arc::new(WorkflowEngine::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.directory),
            Arc::clone(&self.timers),
            Arc::clone(&self.notifications),
            Arc::clone(&self.clock),
            &EngineConfig::default(),
        ))
    }

    /// Creates a development task owned by the seeded developer.
    pub async fn create_task(&self, estimate: Option<u32>) -> Task {
        let mut request = CreateTaskRequest::new(
            ProjectId::new(),
            TeamCategory::Development,
            "Build login form",
            self.staff.developer.id(),
        );
        request.estimated_minutes = estimate;
        self.engine
            .create_task(&self.staff.manager.as_actor(), request)
            .await
            .expect("create task")
    }

    /// Drives a fresh task to `WAITING_FOR_QA`.
    pub async fn submitted_task(&self) -> Task {
        let task = self.create_task(Some(60)).await;
        let developer = self.staff.developer.as_actor();
        self.transition(&developer, task.id(), "IN_PROGRESS")
            .await
            .expect("start work");
        self.transition(&developer, task.id(), "WAITING_FOR_QA")
            .await
            .expect("submit for QA")
    }

    pub async fn transition(
        &self,
        actor: &Actor,
        task_id: TaskId,
        target: &str,
    ) -> Result<Task, WorkflowError> {
        self.engine
            .transition_status(actor, &TransitionTaskRequest::new(task_id, target))
            .await
    }

    /// Notifications stored for a task as `(recipient, kind)` pairs.
    pub async fn deliveries_for(&self, task_id: TaskId) -> Vec<(UserId, NotificationKind)> {
        let mut pairs: Vec<_> = self
            .notifications
            .find_by_task(task_id)
            .await
            .expect("list notifications")
            .iter()
            .map(|notification| (notification.user_id(), notification.kind()))
            .collect();
        pairs.sort_by_key(|(user, kind)| (*user, kind.as_str()));
        pairs
    }

    /// Number of notifications stored for a task.
    pub async fn delivery_count(&self, task_id: TaskId) -> usize {
        self.deliveries_for(task_id).await.len()
    }
}
