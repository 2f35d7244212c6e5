//! Engineer entity + CRUD service.
//!
//! The assigned-task relationship is not stored on the engineer row: it is
//! discovered on read by scanning task records for a matching engineer
//! reference (first match by ascending task id). Writes that carry an
//! assigned-task reference re-point that task record here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EntityKind, Error, Result};
use crate::level::ExperienceLevel;
use crate::record::EngineerRecord;
use crate::store::Datastore;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engineer {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub level: ExperienceLevel,
    pub cost: f64,
    /// Derived: the task currently assigned to this engineer, if any.
    pub task: Option<AssignedTask>,
}

/// Minimal task view embedded in an engineer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub id: u32,
    pub alias: String,
}

impl Engineer {
    pub fn new(id: u32, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            level: ExperienceLevel::Beginner,
            cost: 0.0,
            task: None,
        }
    }

    pub fn with_level(mut self, level: ExperienceLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_task(mut self, id: u32, alias: impl Into<String>) -> Self {
        self.task = Some(AssignedTask { id, alias: alias.into() });
        self
    }
}

fn validate(engineer: &Engineer) -> Result<()> {
    let fail = |reason: &str| Error::InvalidInput {
        kind: EntityKind::Engineer,
        reason: reason.to_string(),
    };
    if engineer.id == 0 {
        return Err(fail("id must be positive"));
    }
    if engineer.name.trim().is_empty() {
        return Err(fail("name must not be empty"));
    }
    if !EMAIL_RE.is_match(&engineer.email) {
        return Err(fail("email is malformed"));
    }
    if engineer.cost < 0.0 {
        return Err(fail("cost must not be negative"));
    }
    Ok(())
}

fn to_record(engineer: &Engineer) -> EngineerRecord {
    EngineerRecord {
        id: engineer.id,
        name: engineer.name.clone(),
        email: engineer.email.clone(),
        grade: engineer.level.into(),
        cost: engineer.cost,
    }
}

pub struct EngineerService<'d, D: Datastore> {
    dal: &'d mut D,
}

impl<'d, D: Datastore> EngineerService<'d, D> {
    pub fn new(dal: &'d mut D) -> Self {
        Self { dal }
    }

    /// Create an engineer. If the input carries an assigned-task reference,
    /// the referenced task record is re-pointed at this engineer.
    pub fn create(&mut self, engineer: &Engineer) -> Result<u32> {
        validate(engineer)?;
        let id = self
            .dal
            .engineers_mut()
            .create(to_record(engineer))
            .map_err(|e| Error::from_store(e, EntityKind::Engineer))?;
        if let Some(assigned) = &engineer.task {
            self.link_assigned_task(assigned.id, engineer.id)?;
        }
        Ok(id)
    }

    pub fn read(&self, id: u32) -> Result<Engineer> {
        let rec = self
            .dal
            .engineers()
            .read(id)
            .ok_or(Error::NotFound { kind: EntityKind::Engineer, id })?;
        Ok(Engineer {
            id: rec.id,
            name: rec.name,
            email: rec.email,
            level: rec.grade.into(),
            cost: rec.cost,
            task: self.assigned_task(id),
        })
    }

    /// First engineer matching the predicate, by ascending id. A miss is
    /// `Ok(None)`, not an error.
    pub fn read_where(&self, pred: impl Fn(&Engineer) -> bool) -> Result<Option<Engineer>> {
        Ok(self.read_all()?.into_iter().find(|e| pred(e)))
    }

    /// All engineers, by ascending id. Each row is mapped through
    /// [`Self::read`], so this scans the task table once per engineer.
    pub fn read_all(&self) -> Result<Vec<Engineer>> {
        let mut recs = self.dal.engineers().read_all();
        recs.sort_by_key(|r| r.id);
        recs.into_iter().map(|r| self.read(r.id)).collect()
    }

    pub fn read_all_where(&self, pred: impl Fn(&Engineer) -> bool) -> Result<Vec<Engineer>> {
        let mut all = self.read_all()?;
        all.retain(|e| pred(e));
        Ok(all)
    }

    pub fn update(&mut self, engineer: &Engineer) -> Result<()> {
        validate(engineer)?;
        self.dal
            .engineers_mut()
            .update(to_record(engineer))
            .map_err(|e| Error::from_store(e, EntityKind::Engineer))?;
        if let Some(assigned) = &engineer.task {
            self.link_assigned_task(assigned.id, engineer.id)?;
        }
        Ok(())
    }

    /// Delete an engineer and clear the engineer reference on any task
    /// record still pointing at it.
    pub fn delete(&mut self, id: u32) -> Result<()> {
        self.dal
            .engineers_mut()
            .delete(id)
            .map_err(|e| Error::from_store(e, EntityKind::Engineer))?;
        let referencing: Vec<_> = self
            .dal
            .tasks()
            .read_all()
            .into_iter()
            .filter(|r| r.engineer_id == Some(id))
            .collect();
        for mut rec in referencing {
            rec.engineer_id = None;
            let task_id = rec.id;
            self.dal
                .tasks_mut()
                .update(rec)
                .map_err(|e| Error::from_store(e, EntityKind::Task))?;
            debug!(engineer_id = id, task_id, "cleared engineer reference on task");
        }
        Ok(())
    }

    /// The task currently pointing at this engineer, if any: first match by
    /// ascending task id over a full scan of the task table.
    fn assigned_task(&self, engineer_id: u32) -> Option<AssignedTask> {
        let mut recs = self.dal.tasks().read_all();
        recs.sort_by_key(|r| r.id);
        recs.into_iter()
            .find(|r| r.engineer_id == Some(engineer_id))
            .map(|r| AssignedTask { id: r.id, alias: r.alias })
    }

    fn link_assigned_task(&mut self, task_id: u32, engineer_id: u32) -> Result<()> {
        // Missing task records are skipped, matching the write-path contract:
        // the back-reference is best effort, the engineer row is the payload.
        if let Some(mut rec) = self.dal.tasks().read(task_id) {
            rec.engineer_id = Some(engineer_id);
            self.dal
                .tasks_mut()
                .update(rec)
                .map_err(|e| Error::from_store(e, EntityKind::Task))?;
            debug!(task_id, engineer_id, "re-pointed task at engineer");
        }
        Ok(())
    }
}
