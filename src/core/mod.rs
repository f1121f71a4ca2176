pub mod engine;
pub mod prerequisites;
pub mod qualification;
pub mod record;

pub use crate::domain::model::{
    hundredths_from_ratio, AcademicRecord, Career, CareerId, EnrollmentId, EnrollmentStatus,
    FinalGrade, GradeStatus, PublishedGrade, StatusFilter, StudentId, StudyPlanId, Subject,
    SubjectEnrollment, SubjectGroupId, SubjectId, TeacherId, UserId,
};
pub use crate::domain::ports::{
    AcademicBackend, ConfigProvider, CurriculumStore, EnrollmentStore, GradeStore, ProfileStore,
    QualificationStore, ReadSnapshot, SnapshotProvider,
};
pub use crate::utils::error::Result;
