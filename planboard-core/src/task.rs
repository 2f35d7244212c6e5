//! Task entity + CRUD service.
//!
//! Mapping rules on the write path:
//! - the stored milestone flag is derived: true iff the input carries a
//!   milestone reference;
//! - the forecast date is stored as an offset from the scheduled date and
//!   reconstituted on read;
//! - complexity converts between the business and storage experience enums;
//! - the `depends_on` list is synced into dependency records.
//!
//! Milestone-flagged records are not valid plain tasks: the read path
//! surfaces them as absent, and ReadAll filters them out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EntityKind, Error, Result};
use crate::level::ExperienceLevel;
use crate::record::{forecast_from_offset, forecast_to_offset, DependencyRecord, TaskRecord};
use crate::status::{derive_status, Status};
use crate::store::Datastore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub description: String,
    pub alias: String,
    /// Set at creation, preserved across updates.
    pub created_at: DateTime<Utc>,
    /// Derived on read; ignored on write.
    pub status: Status,
    pub scheduled: Option<DateTime<Utc>>,
    /// Absolute forecast date. Persisted as an offset from `scheduled`, so
    /// it only survives a round trip when a scheduled date is present.
    pub forecast: Option<DateTime<Utc>>,
    pub start: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub complete: Option<DateTime<Utc>>,
    pub deliverables: Option<String>,
    pub remarks: Option<String>,
    pub engineer: Option<EngineerRef>,
    pub complexity: Option<ExperienceLevel>,
    /// Weak milestone reference; its presence alone drives the stored flag.
    pub milestone: Option<u32>,
    pub depends_on: Vec<u32>,
}

/// Minimal engineer view embedded in a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineerRef {
    pub id: u32,
    pub name: String,
}

impl Task {
    pub fn new(id: u32, alias: impl Into<String>) -> Self {
        Self {
            id,
            description: String::new(),
            alias: alias.into(),
            created_at: Utc::now(),
            status: Status::Unscheduled,
            scheduled: None,
            forecast: None,
            start: None,
            deadline: None,
            complete: None,
            deliverables: None,
            remarks: None,
            engineer: None,
            complexity: None,
            milestone: None,
            depends_on: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scheduled(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled = Some(at);
        self
    }

    pub fn with_forecast(mut self, at: DateTime<Utc>) -> Self {
        self.forecast = Some(at);
        self
    }

    pub fn with_start(mut self, at: DateTime<Utc>) -> Self {
        self.start = Some(at);
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

    pub fn with_engineer(mut self, engineer_id: u32) -> Self {
        self.engineer = Some(EngineerRef { id: engineer_id, name: String::new() });
        self
    }

    pub fn with_complexity(mut self, level: ExperienceLevel) -> Self {
        self.complexity = Some(level);
        self
    }

    pub fn with_depends_on(mut self, ids: impl Into<Vec<u32>>) -> Self {
        self.depends_on = ids.into();
        self
    }
}

fn validate(task: &Task) -> Result<()> {
    let fail = |reason: &str| Error::InvalidInput {
        kind: EntityKind::Task,
        reason: reason.to_string(),
    };
    if task.id == 0 {
        return Err(fail("id must be positive"));
    }
    if task.alias.trim().is_empty() {
        return Err(fail("alias must not be empty"));
    }
    Ok(())
}

fn to_record(task: &Task, created_at: DateTime<Utc>) -> TaskRecord {
    TaskRecord {
        id: task.id,
        description: task.description.clone(),
        alias: task.alias.clone(),
        milestone: task.milestone.is_some(),
        created_at,
        forecast_offset_secs: forecast_to_offset(task.scheduled, task.forecast),
        start: task.start,
        scheduled: task.scheduled,
        deadline: task.deadline,
        complete: task.complete,
        deliverables: task.deliverables.clone(),
        remarks: task.remarks.clone(),
        engineer_id: task.engineer.as_ref().map(|e| e.id),
        complexity: task.complexity.map(Into::into),
    }
}

/// Replace the outgoing dependency edges of `dependent_id` with `targets`,
/// in order. Every target must resolve to an existing task record.
pub(crate) fn sync_dependencies<D: Datastore>(
    dal: &mut D,
    dependent_id: u32,
    targets: &[u32],
) -> Result<()> {
    for &target in targets {
        if dal.tasks().read(target).is_none() {
            return Err(Error::NotFound { kind: EntityKind::Task, id: target });
        }
    }
    let existing: Vec<_> = dal
        .dependencies()
        .read_all()
        .into_iter()
        .filter(|d| d.task_id == dependent_id)
        .collect();
    for dep in existing {
        dal.dependencies_mut()
            .delete(dep.id)
            .map_err(|e| Error::from_store(e, EntityKind::Dependency))?;
    }
    let mut next_id = dal
        .dependencies()
        .read_all()
        .iter()
        .map(|d| d.id)
        .max()
        .unwrap_or(0)
        + 1;
    for &target in targets {
        dal.dependencies_mut()
            .create(DependencyRecord { id: next_id, task_id: dependent_id, depends_on_id: target })
            .map_err(|e| Error::from_store(e, EntityKind::Dependency))?;
        next_id += 1;
    }
    if !targets.is_empty() {
        debug!(dependent_id, count = targets.len(), "synced dependency edges");
    }
    Ok(())
}

/// Outgoing dependency targets of `dependent_id`, in edge-creation order.
pub(crate) fn depends_on_ids<D: Datastore>(dal: &D, dependent_id: u32) -> Vec<u32> {
    let mut edges: Vec<_> = dal
        .dependencies()
        .read_all()
        .into_iter()
        .filter(|d| d.task_id == dependent_id)
        .collect();
    edges.sort_by_key(|d| d.id);
    edges.into_iter().map(|d| d.depends_on_id).collect()
}

pub struct TaskService<'d, D: Datastore> {
    dal: &'d mut D,
}

impl<'d, D: Datastore> TaskService<'d, D> {
    pub fn new(dal: &'d mut D) -> Self {
        Self { dal }
    }

    pub fn create(&mut self, task: &Task) -> Result<u32> {
        validate(task)?;
        let id = self
            .dal
            .tasks_mut()
            .create(to_record(task, task.created_at))
            .map_err(|e| Error::from_store(e, EntityKind::Task))?;
        sync_dependencies(self.dal, id, &task.depends_on)?;
        Ok(id)
    }

    /// Read a task. `Ok(None)` means the record exists but is
    /// milestone-flagged and therefore not a plain task.
    pub fn read(&self, id: u32) -> Result<Option<Task>> {
        let rec = self
            .dal
            .tasks()
            .read(id)
            .ok_or(Error::NotFound { kind: EntityKind::Task, id })?;
        if rec.milestone {
            return Ok(None);
        }
        let engineer = match rec.engineer_id {
            Some(eid) => {
                let e = self
                    .dal
                    .engineers()
                    .read(eid)
                    .ok_or(Error::NotFound { kind: EntityKind::Engineer, id: eid })?;
                Some(EngineerRef { id: e.id, name: e.name })
            }
            None => None,
        };
        Ok(Some(Task {
            id: rec.id,
            description: rec.description,
            alias: rec.alias,
            created_at: rec.created_at,
            status: derive_status(rec.scheduled, rec.start, rec.complete),
            scheduled: rec.scheduled,
            forecast: forecast_from_offset(rec.scheduled, rec.forecast_offset_secs),
            start: rec.start,
            deadline: rec.deadline,
            complete: rec.complete,
            deliverables: rec.deliverables,
            remarks: rec.remarks,
            engineer,
            complexity: rec.complexity.map(Into::into),
            milestone: None,
            depends_on: depends_on_ids(self.dal, id),
        }))
    }

    /// First task matching the predicate, by ascending id. A miss is
    /// `Ok(None)`, not an error.
    pub fn read_where(&self, pred: impl Fn(&Task) -> bool) -> Result<Option<Task>> {
        Ok(self.read_all()?.into_iter().find(|t| pred(t)))
    }

    /// All plain tasks, by ascending id. Milestone-flagged records are
    /// filtered out.
    pub fn read_all(&self) -> Result<Vec<Task>> {
        let mut recs = self.dal.tasks().read_all();
        recs.sort_by_key(|r| r.id);
        let mut out = Vec::new();
        for rec in recs {
            if rec.milestone {
                continue;
            }
            if let Some(task) = self.read(rec.id)? {
                out.push(task);
            }
        }
        Ok(out)
    }

    pub fn read_all_where(&self, pred: impl Fn(&Task) -> bool) -> Result<Vec<Task>> {
        let mut all = self.read_all()?;
        all.retain(|t| pred(t));
        Ok(all)
    }

    /// Update a task. The stored creation date is preserved.
    pub fn update(&mut self, task: &Task) -> Result<()> {
        validate(task)?;
        let existing = self
            .dal
            .tasks()
            .read(task.id)
            .ok_or(Error::NotFound { kind: EntityKind::Task, id: task.id })?;
        self.dal
            .tasks_mut()
            .update(to_record(task, existing.created_at))
            .map_err(|e| Error::from_store(e, EntityKind::Task))?;
        sync_dependencies(self.dal, task.id, &task.depends_on)?;
        Ok(())
    }

    /// Delete delegates straight to the store; outgoing dependency edges
    /// are left behind (milestone rollups skip unresolvable dependents).
    pub fn delete(&mut self, id: u32) -> Result<()> {
        self.dal
            .tasks_mut()
            .delete(id)
            .map_err(|e| Error::from_store(e, EntityKind::Task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use chrono::TimeZone;

    fn d(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn status_follows_the_date_fields() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        svc.create(&Task::new(1, "t1")).unwrap();
        assert_eq!(svc.read(1).unwrap().unwrap().status, Status::Unscheduled);

        svc.update(&Task::new(1, "t1").with_scheduled(d(1, 9))).unwrap();
        assert_eq!(svc.read(1).unwrap().unwrap().status, Status::Scheduled);

        svc.update(&Task::new(1, "t1").with_scheduled(d(1, 9)).with_start(d(2, 9)))
            .unwrap();
        assert_eq!(svc.read(1).unwrap().unwrap().status, Status::InProgress);

        svc.update(
            &Task::new(1, "t1")
                .with_scheduled(d(1, 9))
                .with_start(d(2, 9))
                .with_complete(d(3, 17)),
        )
        .unwrap();
        assert_eq!(svc.read(1).unwrap().unwrap().status, Status::Done);
    }

    #[test]
    fn forecast_round_trips_through_the_offset_encoding() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        let task = Task::new(1, "t1").with_scheduled(d(1, 8)).with_forecast(d(9, 16));
        svc.create(&task).unwrap();
        let got = svc.read(1).unwrap().unwrap();
        assert_eq!(got.forecast, Some(d(9, 16)));
        assert_eq!(got.scheduled, Some(d(1, 8)));
    }

    #[test]
    fn milestone_flagged_record_reads_as_absent() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        let mut m = Task::new(4, "release");
        m.milestone = Some(99);
        svc.create(&m).unwrap();
        svc.create(&Task::new(5, "plain")).unwrap();

        assert!(svc.read(4).unwrap().is_none());
        let all = svc.read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 5);
    }

    #[test]
    fn read_resolves_engineer_reference() {
        let mut dal = MemStore::new();
        {
            let mut engineers = crate::engineer::EngineerService::new(&mut dal);
            engineers
                .create(&crate::engineer::Engineer::new(1, "Ada", "ada@example.com"))
                .unwrap();
        }
        let mut svc = TaskService::new(&mut dal);
        svc.create(&Task::new(5, "t5").with_engineer(1)).unwrap();
        let got = svc.read(5).unwrap().unwrap();
        assert_eq!(got.engineer, Some(EngineerRef { id: 1, name: "Ada".into() }));
    }

    #[test]
    fn dangling_engineer_reference_is_not_found() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        svc.create(&Task::new(5, "t5").with_engineer(42)).unwrap();
        let err = svc.read(5).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: EntityKind::Engineer, id: 42 }));
    }

    #[test]
    fn depends_on_syncs_and_requires_existing_targets() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        svc.create(&Task::new(1, "a")).unwrap();
        svc.create(&Task::new(2, "b")).unwrap();
        svc.create(&Task::new(3, "c").with_depends_on([2, 1])).unwrap();
        assert_eq!(svc.read(3).unwrap().unwrap().depends_on, vec![2, 1]);

        svc.update(&Task::new(3, "c").with_depends_on([1])).unwrap();
        assert_eq!(svc.read(3).unwrap().unwrap().depends_on, vec![1]);

        let err = svc.create(&Task::new(4, "d").with_depends_on([77])).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: EntityKind::Task, id: 77 }));
    }

    #[test]
    fn update_preserves_created_at() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        let mut task = Task::new(1, "t1");
        task.created_at = d(1, 0);
        svc.create(&task).unwrap();

        let mut rewrite = Task::new(1, "t1-renamed");
        rewrite.created_at = d(20, 0);
        svc.update(&rewrite).unwrap();

        let got = svc.read(1).unwrap().unwrap();
        assert_eq!(got.created_at, d(1, 0));
        assert_eq!(got.alias, "t1-renamed");
    }

    #[test]
    fn duplicate_create_and_missing_delete_map_to_service_errors() {
        let mut dal = MemStore::new();
        let mut svc = TaskService::new(&mut dal);
        svc.create(&Task::new(1, "t1")).unwrap();
        assert!(matches!(
            svc.create(&Task::new(1, "t1")),
            Err(Error::AlreadyExists { kind: EntityKind::Task, id: 1 })
        ));
        assert!(matches!(
            svc.delete(9),
            Err(Error::NotFound { kind: EntityKind::Task, id: 9 })
        ));
    }
}
