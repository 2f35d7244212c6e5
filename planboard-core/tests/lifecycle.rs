//! Cross-service lifecycle flows against the in-memory store.

use chrono::{DateTime, TimeZone, Utc};
use planboard_core::{
    Engineer, EngineerService, Error, ExperienceLevel, MemStore, Milestone, MilestoneService,
    Status, Task, TaskService,
};

fn d(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, 10, 0, 0).unwrap()
}

#[test]
fn assigning_a_task_surfaces_on_the_engineer() {
    let mut dal = MemStore::new();
    {
        let mut engineers = EngineerService::new(&mut dal);
        engineers
            .create(
                &Engineer::new(1, "A", "a@example.com")
                    .with_level(ExperienceLevel::Beginner)
                    .with_cost(10.0),
            )
            .unwrap();
    }
    {
        let mut tasks = TaskService::new(&mut dal);
        tasks.create(&Task::new(5, "t5")).unwrap();
        tasks.update(&Task::new(5, "t5").with_engineer(1)).unwrap();
    }
    let engineers = EngineerService::new(&mut dal);
    let eng = engineers.read(1).unwrap();
    assert_eq!(eng.task.as_ref().map(|t| t.id), Some(5));
}

#[test]
fn deleting_an_engineer_unlinks_its_task() {
    let mut dal = MemStore::new();
    {
        let mut engineers = EngineerService::new(&mut dal);
        engineers.create(&Engineer::new(1, "A", "a@example.com")).unwrap();
    }
    {
        let mut tasks = TaskService::new(&mut dal);
        tasks.create(&Task::new(5, "t5").with_engineer(1)).unwrap();
    }
    {
        let mut engineers = EngineerService::new(&mut dal);
        engineers.delete(1).unwrap();
    }
    let tasks = TaskService::new(&mut dal);
    let task = tasks.read(5).unwrap().unwrap();
    assert!(task.engineer.is_none());
}

#[test]
fn milestone_rollup_tracks_task_progress() {
    let mut dal = MemStore::new();
    {
        let mut tasks = TaskService::new(&mut dal);
        tasks.create(&Task::new(1, "build").with_scheduled(d(1))).unwrap();
        tasks.create(&Task::new(2, "test").with_scheduled(d(2))).unwrap();
    }
    {
        let mut milestones = MilestoneService::new(&mut dal);
        milestones
            .create(&Milestone::new(10, "ship").with_dependency(1).with_dependency(2))
            .unwrap();
    }

    {
        let milestones = MilestoneService::new(&mut dal);
        let m = milestones.read(10).unwrap().unwrap();
        assert_eq!(m.completion_percentage, Some(0.0));
    }

    {
        let mut tasks = TaskService::new(&mut dal);
        tasks
            .update(
                &Task::new(1, "build")
                    .with_scheduled(d(1))
                    .with_start(d(3))
                    .with_complete(d(4)),
            )
            .unwrap();
    }

    let milestones = MilestoneService::new(&mut dal);
    let m = milestones.read(10).unwrap().unwrap();
    assert_eq!(m.completion_percentage, Some(50.0));
}

#[test]
fn milestones_and_tasks_do_not_leak_into_each_other() {
    let mut dal = MemStore::new();
    {
        let mut tasks = TaskService::new(&mut dal);
        tasks.create(&Task::new(1, "plain")).unwrap();
    }
    {
        let mut milestones = MilestoneService::new(&mut dal);
        milestones.create(&Milestone::new(2, "flagged")).unwrap();
    }

    let tasks_seen: Vec<u32> = {
        let tasks = TaskService::new(&mut dal);
        assert!(tasks.read(2).unwrap().is_none());
        tasks.read_all().unwrap().iter().map(|t| t.id).collect()
    };
    assert_eq!(tasks_seen, vec![1]);

    let milestones = MilestoneService::new(&mut dal);
    assert!(milestones.read(1).unwrap().is_none());
    let milestones_seen: Vec<u32> = milestones.read_all().unwrap().iter().map(|m| m.id).collect();
    assert_eq!(milestones_seen, vec![2]);
}

#[test]
fn task_lifecycle_walks_every_status() {
    let mut dal = MemStore::new();
    let mut tasks = TaskService::new(&mut dal);
    tasks.create(&Task::new(1, "t")).unwrap();
    assert_eq!(tasks.read(1).unwrap().unwrap().status, Status::Unscheduled);

    tasks.update(&Task::new(1, "t").with_scheduled(d(1))).unwrap();
    assert_eq!(tasks.read(1).unwrap().unwrap().status, Status::Scheduled);

    tasks
        .update(&Task::new(1, "t").with_scheduled(d(1)).with_start(d(2)))
        .unwrap();
    assert_eq!(tasks.read(1).unwrap().unwrap().status, Status::InProgress);

    tasks
        .update(
            &Task::new(1, "t")
                .with_scheduled(d(1))
                .with_start(d(2))
                .with_complete(d(3)),
        )
        .unwrap();
    assert_eq!(tasks.read(1).unwrap().unwrap().status, Status::Done);

    // no terminal state: clearing the complete date reverts
    tasks
        .update(&Task::new(1, "t").with_scheduled(d(1)).with_start(d(2)))
        .unwrap();
    assert_eq!(tasks.read(1).unwrap().unwrap().status, Status::InProgress);
}

#[test]
fn failed_create_leaves_no_extra_record() {
    let mut dal = MemStore::new();
    let mut engineers = EngineerService::new(&mut dal);
    engineers.create(&Engineer::new(1, "A", "a@example.com")).unwrap();
    let err = engineers.create(&Engineer::new(1, "B", "b@example.com")).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
    let all = engineers.read_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "A");
}
