//! Milestone entity + CRUD service.
//!
//! A milestone is a milestone-flagged task record plus a read model rolled
//! up from its dependent tasks: the dependency list (id + alias summaries),
//! a completion percentage, and a forecast date (max over dependents).
//! Completion weights: Done 1.0, InProgress 0.5, otherwise 0.0.
//!
//! The record's scheduled/start fields are not exposed on the entity (a
//! scheduler would own them); update preserves whatever the record holds,
//! and the shared status derivation still reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EntityKind, Error, Result};
use crate::record::{forecast_from_offset, TaskRecord};
use crate::status::{derive_status, Status};
use crate::store::Datastore;
use crate::task::{depends_on_ids, sync_dependencies};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u32,
    pub description: String,
    pub alias: String,
    /// Derived on read; ignored on write.
    pub status: Status,
    pub created_at: DateTime<Utc>,
    /// Derived: latest forecast date among dependent tasks.
    pub forecast: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub complete: Option<DateTime<Utc>>,
    /// Derived: mean dependent completion, 0..=100. Absent without
    /// dependents.
    pub completion_percentage: Option<f64>,
    pub remarks: Option<String>,
    /// Ordered dependent-task summaries. On write only the ids matter.
    pub dependencies: Vec<TaskRef>,
}

/// Dependent-task summary embedded in a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: u32,
    pub alias: String,
}

impl Milestone {
    pub fn new(id: u32, alias: impl Into<String>) -> Self {
        Self {
            id,
            description: String::new(),
            alias: alias.into(),
            status: Status::Unscheduled,
            created_at: Utc::now(),
            forecast: None,
            deadline: None,
            complete: None,
            completion_percentage: None,
            remarks: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_deadline(mut self, at: DateTime<Utc>) -> Self {
        self.deadline = Some(at);
        self
    }

    pub fn with_complete(mut self, at: DateTime<Utc>) -> Self {
        self.complete = Some(at);
        self
    }

    pub fn with_dependency(mut self, task_id: u32) -> Self {
        self.dependencies.push(TaskRef { id: task_id, alias: String::new() });
        self
    }

    fn dependency_ids(&self) -> Vec<u32> {
        self.dependencies.iter().map(|d| d.id).collect()
    }
}

fn validate(milestone: &Milestone) -> Result<()> {
    let fail = |reason: &str| Error::InvalidInput {
        kind: EntityKind::Milestone,
        reason: reason.to_string(),
    };
    if milestone.id == 0 {
        return Err(fail("id must be positive"));
    }
    if milestone.alias.trim().is_empty() {
        return Err(fail("alias must not be empty"));
    }
    Ok(())
}

fn completion_fraction(rec: &TaskRecord) -> f64 {
    match derive_status(rec.scheduled, rec.start, rec.complete) {
        Status::Done => 1.0,
        Status::InProgress => 0.5,
        Status::Scheduled | Status::Unscheduled => 0.0,
    }
}

pub struct MilestoneService<'d, D: Datastore> {
    dal: &'d mut D,
}

impl<'d, D: Datastore> MilestoneService<'d, D> {
    pub fn new(dal: &'d mut D) -> Self {
        Self { dal }
    }

    pub fn create(&mut self, milestone: &Milestone) -> Result<u32> {
        validate(milestone)?;
        let rec = TaskRecord {
            id: milestone.id,
            description: milestone.description.clone(),
            alias: milestone.alias.clone(),
            milestone: true,
            created_at: milestone.created_at,
            forecast_offset_secs: None,
            start: None,
            scheduled: None,
            deadline: milestone.deadline,
            complete: milestone.complete,
            deliverables: None,
            remarks: milestone.remarks.clone(),
            engineer_id: None,
            complexity: None,
        };
        let id = self
            .dal
            .tasks_mut()
            .create(rec)
            .map_err(|e| Error::from_store(e, EntityKind::Milestone))?;
        sync_dependencies(self.dal, id, &milestone.dependency_ids())?;
        Ok(id)
    }

    /// Read a milestone. `Ok(None)` means the record exists but is a plain
    /// task, mirroring the task path's treatment of flagged records.
    pub fn read(&self, id: u32) -> Result<Option<Milestone>> {
        let rec = self
            .dal
            .tasks()
            .read(id)
            .ok_or(Error::NotFound { kind: EntityKind::Milestone, id })?;
        if !rec.milestone {
            return Ok(None);
        }

        let mut dependencies = Vec::new();
        let mut fractions = Vec::new();
        let mut forecast: Option<DateTime<Utc>> = None;
        for dep_id in depends_on_ids(self.dal, id) {
            // A dependent deleted out from under us is skipped, not fatal.
            let Some(dep) = self.dal.tasks().read(dep_id) else { continue };
            fractions.push(completion_fraction(&dep));
            if let Some(f) = forecast_from_offset(dep.scheduled, dep.forecast_offset_secs) {
                forecast = Some(forecast.map_or(f, |cur| cur.max(f)));
            }
            dependencies.push(TaskRef { id: dep.id, alias: dep.alias });
        }
        let completion_percentage = if fractions.is_empty() {
            None
        } else {
            Some(100.0 * fractions.iter().sum::<f64>() / fractions.len() as f64)
        };

        Ok(Some(Milestone {
            id: rec.id,
            description: rec.description,
            alias: rec.alias,
            status: derive_status(rec.scheduled, rec.start, rec.complete),
            created_at: rec.created_at,
            forecast,
            deadline: rec.deadline,
            complete: rec.complete,
            completion_percentage,
            remarks: rec.remarks,
            dependencies,
        }))
    }

    /// First milestone matching the predicate, by ascending id. A miss is
    /// `Ok(None)`, not an error.
    pub fn read_where(&self, pred: impl Fn(&Milestone) -> bool) -> Result<Option<Milestone>> {
        Ok(self.read_all()?.into_iter().find(|m| pred(m)))
    }

    /// All milestones, by ascending id. Plain-task records are skipped.
    pub fn read_all(&self) -> Result<Vec<Milestone>> {
        let mut recs = self.dal.tasks().read_all();
        recs.sort_by_key(|r| r.id);
        let mut out = Vec::new();
        for rec in recs {
            if !rec.milestone {
                continue;
            }
            if let Some(m) = self.read(rec.id)? {
                out.push(m);
            }
        }
        Ok(out)
    }

    pub fn read_all_where(&self, pred: impl Fn(&Milestone) -> bool) -> Result<Vec<Milestone>> {
        let mut all = self.read_all()?;
        all.retain(|m| pred(m));
        Ok(all)
    }

    /// Update a milestone. Creation date and the record's scheduled/start
    /// fields are preserved.
    pub fn update(&mut self, milestone: &Milestone) -> Result<()> {
        validate(milestone)?;
        let existing = self
            .dal
            .tasks()
            .read(milestone.id)
            .ok_or(Error::NotFound { kind: EntityKind::Milestone, id: milestone.id })?;
        let rec = TaskRecord {
            id: milestone.id,
            description: milestone.description.clone(),
            alias: milestone.alias.clone(),
            milestone: true,
            created_at: existing.created_at,
            forecast_offset_secs: existing.forecast_offset_secs,
            start: existing.start,
            scheduled: existing.scheduled,
            deadline: milestone.deadline,
            complete: milestone.complete,
            deliverables: existing.deliverables,
            remarks: milestone.remarks.clone(),
            engineer_id: existing.engineer_id,
            complexity: existing.complexity,
        };
        self.dal
            .tasks_mut()
            .update(rec)
            .map_err(|e| Error::from_store(e, EntityKind::Milestone))?;
        sync_dependencies(self.dal, milestone.id, &milestone.dependency_ids())?;
        Ok(())
    }

    /// Delete a milestone and its outgoing dependency edges.
    pub fn delete(&mut self, id: u32) -> Result<()> {
        self.dal
            .tasks_mut()
            .delete(id)
            .map_err(|e| Error::from_store(e, EntityKind::Milestone))?;
        let edges: Vec<_> = self
            .dal
            .dependencies()
            .read_all()
            .into_iter()
            .filter(|d| d.task_id == id)
            .collect();
        for edge in edges {
            self.dal
                .dependencies_mut()
                .delete(edge.id)
                .map_err(|e| Error::from_store(e, EntityKind::Dependency))?;
        }
        debug!(milestone_id = id, "deleted milestone and outgoing edges");
        Ok(())
    }
}
