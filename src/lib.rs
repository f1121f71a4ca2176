pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliArgs, Command};
pub use config::EngineConfig;

pub use adapters::{Dataset, InMemoryStore};
pub use core::{
    engine::{ProfileSummary, RecordsEngine},
    prerequisites::PrerequisiteChecker,
    qualification::QualificationResolver,
    record::AcademicRecordAggregator,
};
pub use domain::ports::ReadSnapshot;
pub use utils::error::{RecordsError, Result};
