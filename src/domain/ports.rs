use crate::domain::model::{
    Career, CareerId, PublishedGrade, StatusFilter, StudentId, StudyPlanId, Subject,
    SubjectEnrollment, SubjectId, TeacherId, UserId,
};
use crate::domain::profile::UserProfile;
use crate::domain::services::AggregationPolicy;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which version of the backing data a read is served from. All reads issued
/// for one top-level computation carry the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadSnapshot {
    #[default]
    Latest,
    Version(u64),
}

#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn snapshot(&self) -> Result<ReadSnapshot>;
}

#[async_trait]
pub trait QualificationStore: Send + Sync {
    async fn list_direct_grants(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<SubjectId>>;

    async fn list_career_grants(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<CareerId>>;

    /// Keyed lookup of a single (teacher, subject) grant.
    async fn has_direct_grant(
        &self,
        teacher: TeacherId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<bool> {
        Ok(self.list_direct_grants(teacher, at).await?.contains(&subject))
    }
}

#[async_trait]
pub trait CurriculumStore: Send + Sync {
    async fn subjects_of_career(
        &self,
        career: CareerId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<SubjectId>>;

    async fn careers_of_subject(
        &self,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<CareerId>>;

    async fn get_subject(&self, subject: SubjectId, at: ReadSnapshot) -> Result<Option<Subject>>;

    async fn get_career(&self, career: CareerId, at: ReadSnapshot) -> Result<Option<Career>>;

    /// `None` when the subject is not part of the study plan.
    async fn prerequisites_of(
        &self,
        plan: StudyPlanId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<Option<Vec<SubjectId>>>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn list_enrollments(
        &self,
        student: StudentId,
        filter: StatusFilter,
        at: ReadSnapshot,
    ) -> Result<Vec<SubjectEnrollment>>;
}

#[async_trait]
pub trait GradeStore: Send + Sync {
    async fn list_published_grades(
        &self,
        student: StudentId,
        at: ReadSnapshot,
    ) -> Result<Vec<PublishedGrade>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Unknown users resolve to a profile of kind `None`.
    async fn profile_of(&self, user: UserId, at: ReadSnapshot) -> Result<UserProfile>;
}

pub trait ConfigProvider: Send + Sync {
    fn aggregation_policy(&self) -> AggregationPolicy;
    fn max_concurrent_records(&self) -> usize;
    fn retained_snapshots(&self) -> usize;
}

/// Everything the engine reads from, served by one backend.
pub trait AcademicBackend:
    SnapshotProvider + QualificationStore + CurriculumStore + EnrollmentStore + GradeStore + ProfileStore
{
}

impl<T> AcademicBackend for T where
    T: SnapshotProvider
        + QualificationStore
        + CurriculumStore
        + EnrollmentStore
        + GradeStore
        + ProfileStore
        + ?Sized
{
}
