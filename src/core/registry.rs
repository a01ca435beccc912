//! Task registry
//!
//! Two independent name → procedure tables, one for prepare procedures and
//! one for build procedures. Records name their procedures by string; the
//! registry turns that name into something executable or a typed
//! [`TaskError::NotFound`].

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::core::record::{PackageRecord, TaskKind};
use crate::error::TaskError;

/// A prepare or build procedure
///
/// Implementations perform side effects for one package and must not touch
/// the record's `markedForBuild` flag; they only receive a copy of it.
#[async_trait]
pub trait Task: Send + Sync {
    /// Run the procedure for `record`
    async fn execute(&self, record: &PackageRecord) -> Result<(), TaskError>;
}

/// One table of named procedures
pub struct TaskTable {
    kind: TaskKind,
    tasks: BTreeMap<String, Box<dyn Task>>,
}

impl TaskTable {
    /// Create an empty table
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            tasks: BTreeMap::new(),
        }
    }

    /// Which table this is
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Register a procedure, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, task: impl Task + 'static) {
        self.tasks.insert(name.into(), Box::new(task));
    }

    /// Builder form of [`TaskTable::register`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, task: impl Task + 'static) -> Self {
        self.register(name, task);
        self
    }

    /// Look up a procedure by name
    pub fn resolve(&self, name: &str) -> Result<&dyn Task, TaskError> {
        self.tasks
            .get(name)
            .map(|task| &**task)
            .ok_or_else(|| TaskError::NotFound {
                kind: self.kind,
                task: name.to_string(),
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for TaskTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTable")
            .field("kind", &self.kind)
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Prepare and build tables
#[derive(Debug)]
pub struct TaskRegistry {
    prepare: TaskTable,
    build: TaskTable,
}

impl TaskRegistry {
    /// Create a registry from pre-populated tables
    pub fn from_tables(prepare: TaskTable, build: TaskTable) -> Self {
        debug_assert_eq!(prepare.kind(), TaskKind::Prepare);
        debug_assert_eq!(build.kind(), TaskKind::Build);
        Self { prepare, build }
    }

    /// The table for `kind`
    pub fn table(&self, kind: TaskKind) -> &TaskTable {
        match kind {
            TaskKind::Prepare => &self.prepare,
            TaskKind::Build => &self.build,
        }
    }

    /// Resolve a task name in the table for `kind`
    pub fn resolve(&self, kind: TaskKind, name: &str) -> Result<&dyn Task, TaskError> {
        self.table(kind).resolve(name)
    }
}
