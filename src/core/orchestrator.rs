//! Batch orchestration
//!
//! Runs one task table over every record in store order. Records that are
//! not marked for build are skipped; resolution and execution failures are
//! recorded for that record and the batch moves on. Every record yields
//! exactly one [`Notification`].
//!
//! The orchestrator only borrows the store immutably: nothing it runs can
//! change `markedForBuild`, so a successful build leaves the record stale
//! until the next version sync clears it.

use std::fmt;

use crate::core::record::TaskKind;
use crate::core::registry::TaskTable;
use crate::core::store::PackageStore;
use crate::error::TaskError;

/// Result of processing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not marked for build
    Skipped,
    /// Task ran to completion
    Completed,
    /// No procedure registered under the record's task name
    TaskNotFound,
    /// Task ran and failed
    Failed {
        /// Human-readable cause from the procedure
        cause: String,
    },
}

impl Outcome {
    /// Whether this outcome counts as a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::TaskNotFound | Self::Failed { .. })
    }
}

/// Per-record notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Package name
    pub package: String,
    /// Task name the record declares for this table
    pub task: String,
    /// What happened
    pub outcome: Outcome,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Skipped => write!(f, "Skipping package || Not marked for build!"),
            Outcome::Completed => write!(f, "Executed {}", self.task),
            Outcome::TaskNotFound => write!(f, "No task registered as '{}'", self.task),
            Outcome::Failed { cause } => write!(f, "Error while running {} || {cause}", self.task),
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One notification per record, in store order
    pub notifications: Vec<Notification>,
}

impl BatchReport {
    /// Number of records whose task completed
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Completed))
    }

    /// Number of skipped records
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    /// Number of records that failed to resolve or execute
    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    /// Outcome for one package
    pub fn outcome(&self, package: &str) -> Option<&Outcome> {
        self.notifications
            .iter()
            .find(|n| n.package == package)
            .map(|n| &n.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.notifications.iter().filter(|n| pred(&n.outcome)).count()
    }
}

/// Runs one task table over a store
#[derive(Debug)]
pub struct BatchOrchestrator<'a> {
    table: &'a TaskTable,
    store: &'a PackageStore,
}

impl<'a> BatchOrchestrator<'a> {
    /// Bind a task table to a store
    pub fn new(table: &'a TaskTable, store: &'a PackageStore) -> Self {
        Self { table, store }
    }

    /// Which table this orchestrator runs
    pub fn kind(&self) -> TaskKind {
        self.table.kind()
    }

    /// Run every stale record's task
    pub async fn run_all(&self) -> BatchReport {
        self.run_all_with(|_| {}).await
    }

    /// Run every stale record's task, reporting each outcome as it is decided
    pub async fn run_all_with(&self, mut observer: impl FnMut(&Notification)) -> BatchReport {
        let kind = self.kind();
        let mut report = BatchReport::default();

        for record in self.store.list() {
            let task = record.task(kind).to_string();

            let outcome = if record.is_marked_for_build() {
                match self.table.resolve(&task) {
                    Ok(procedure) => {
                        tracing::info!("Running {kind} task {task} for {}", record.name);
                        match procedure.execute(&record).await {
                            Ok(()) => Outcome::Completed,
                            Err(TaskError::Execution { cause, .. }) => Outcome::Failed { cause },
                            Err(e) => Outcome::Failed {
                                cause: e.to_string(),
                            },
                        }
                    }
                    Err(e) => {
                        tracing::warn!("{e} (package {})", record.name);
                        Outcome::TaskNotFound
                    }
                }
            } else {
                tracing::debug!("Skipping {}: not marked for build", record.name);
                Outcome::Skipped
            };

            if let Outcome::Failed { cause } = &outcome {
                tracing::warn!("{kind} task {task} failed for {}: {cause}", record.name);
            }

            let notification = Notification {
                package: record.name,
                task,
                outcome,
            };
            observer(&notification);
            report.notifications.push(notification);
        }

        report
    }
}
