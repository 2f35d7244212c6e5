//! planboard-core: entities, status derivation, and CRUD services for
//! tracking engineers, tasks, and milestones in a single project.
//!
//! Services translate between the exposed business entities and the flat
//! records a [`store::Datastore`] persists. Storage durability lives behind
//! that trait: `MemStore` here for tests, `planboard-store` for flat files.

pub mod engineer;
pub mod error;
pub mod level;
pub mod milestone;
pub mod record;
pub mod status;
pub mod store;
pub mod task;
pub mod time;

pub use engineer::{AssignedTask, Engineer, EngineerService};
pub use error::{EntityKind, Error, Result};
pub use level::ExperienceLevel;
pub use milestone::{Milestone, MilestoneService, TaskRef};
pub use record::{DependencyRecord, EngineerRecord, ExperienceGrade, Record, TaskRecord};
pub use status::{derive_status, Status};
pub use store::{Datastore, MemStore, MemTable, RecordStore, StoreError};
pub use task::{EngineerRef, Task, TaskService};
pub use time::parse_local_to_utc;
