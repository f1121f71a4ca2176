use crate::core::prerequisites::PrerequisiteChecker;
use crate::core::qualification::QualificationResolver;
use crate::core::record::AcademicRecordAggregator;
use crate::core::{
    AcademicRecord, Career, Result, StudentId, StudyPlanId, Subject, SubjectEnrollment, SubjectId,
    TeacherId, UserId,
};
use crate::domain::ports::{AcademicBackend, ConfigProvider, ReadSnapshot};
use crate::domain::profile::{ProfileKind, StudentProfile, TeacherProfile};
use crate::utils::error::RecordsError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileSummary {
    Student {
        profile: StudentProfile,
        record: AcademicRecord,
        current_subjects: Vec<SubjectEnrollment>,
    },
    Teacher {
        profile: TeacherProfile,
        careers: Vec<Career>,
        subjects: Vec<Subject>,
    },
    None {
        user_id: UserId,
    },
}

/// Entry point tying the resolver, aggregator and prerequisite checker to one
/// backend. Every public call takes a single snapshot from the backend and
/// serves all of its reads from it.
pub struct RecordsEngine<B: ?Sized> {
    backend: Arc<B>,
    resolver: QualificationResolver<B, B>,
    aggregator: AcademicRecordAggregator<B, B>,
    prerequisites: PrerequisiteChecker<B, B>,
    max_concurrent_records: usize,
}

impl<B: AcademicBackend + ?Sized + 'static> RecordsEngine<B> {
    pub fn new<C: ConfigProvider>(backend: Arc<B>, config: &C) -> Self {
        Self {
            resolver: QualificationResolver::new(Arc::clone(&backend), Arc::clone(&backend)),
            aggregator: AcademicRecordAggregator::with_policy(
                Arc::clone(&backend),
                Arc::clone(&backend),
                config.aggregation_policy(),
            ),
            prerequisites: PrerequisiteChecker::new(Arc::clone(&backend), Arc::clone(&backend)),
            max_concurrent_records: config.max_concurrent_records().max(1),
            backend,
        }
    }

    pub fn resolver(&self) -> &QualificationResolver<B, B> {
        &self.resolver
    }

    pub fn aggregator(&self) -> &AcademicRecordAggregator<B, B> {
        &self.aggregator
    }

    pub fn prerequisites(&self) -> &PrerequisiteChecker<B, B> {
        &self.prerequisites
    }

    pub async fn snapshot(&self) -> Result<ReadSnapshot> {
        self.backend
            .snapshot()
            .await
            .map_err(|e| e.into_data_source("snapshot_provider"))
    }

    pub async fn effective_subjects(&self, teacher: TeacherId) -> Result<Vec<Subject>> {
        let at = self.snapshot().await?;
        tracing::info!("Resolving effective subjects for teacher {} at {:?}", teacher, at);
        self.resolver.effective_subjects(teacher, at).await
    }

    pub async fn can_teach(&self, teacher: TeacherId, subject: SubjectId) -> Result<bool> {
        let at = self.snapshot().await?;
        let allowed = self.resolver.can_teach(teacher, subject, at).await?;
        tracing::info!("Teacher {} qualified for subject {}: {}", teacher, subject, allowed);
        Ok(allowed)
    }

    pub async fn qualified_careers(&self, teacher: TeacherId) -> Result<Vec<Career>> {
        let at = self.snapshot().await?;
        self.resolver.qualified_careers(teacher, at).await
    }

    pub async fn compute_record(&self, student: StudentId) -> Result<AcademicRecord> {
        let at = self.snapshot().await?;
        tracing::info!("Computing academic record for student {} at {:?}", student, at);
        self.aggregator.compute_record(student, at).await
    }

    pub async fn current_subjects(&self, student: StudentId) -> Result<Vec<SubjectEnrollment>> {
        let at = self.snapshot().await?;
        self.aggregator.current_subjects(student, at).await
    }

    pub async fn missing_prerequisites(
        &self,
        student: StudentId,
        plan: StudyPlanId,
        subject: SubjectId,
    ) -> Result<Vec<Subject>> {
        let at = self.snapshot().await?;
        self.prerequisites
            .missing_prerequisites(student, plan, subject, at)
            .await
    }

    /// Resolves the user's profile once and summarizes it by kind.
    pub async fn profile_summary(&self, user: UserId) -> Result<ProfileSummary> {
        let at = self.snapshot().await?;
        let profile = self
            .backend
            .profile_of(user, at)
            .await
            .map_err(|e| e.into_data_source("profile_store"))?;

        match profile.profile {
            ProfileKind::Student(student) => {
                let (record, current_subjects) = tokio::try_join!(
                    self.aggregator.compute_record(student.student_id, at),
                    self.aggregator.current_subjects(student.student_id, at)
                )?;
                Ok(ProfileSummary::Student {
                    profile: student,
                    record,
                    current_subjects,
                })
            }
            ProfileKind::Teacher(teacher) => {
                let (careers, subjects) = tokio::try_join!(
                    self.resolver.qualified_careers(teacher.teacher_id, at),
                    self.resolver.effective_subjects(teacher.teacher_id, at)
                )?;
                Ok(ProfileSummary::Teacher {
                    profile: teacher,
                    careers,
                    subjects,
                })
            }
            ProfileKind::None => {
                tracing::debug!("User {} has no student or teacher profile", user);
                Ok(ProfileSummary::None { user_id: user })
            }
        }
    }

    /// Computes records for many students against one snapshot, at most
    /// `max_concurrent_records` at a time. Results follow input order; any
    /// failure fails the whole batch and aborts the remaining tasks.
    pub async fn compute_records(
        &self,
        students: &[StudentId],
    ) -> Result<Vec<(StudentId, AcademicRecord)>> {
        let at = self.snapshot().await?;
        tracing::info!(
            "Computing {} academic records at {:?} (concurrency {})",
            students.len(),
            at,
            self.max_concurrent_records
        );

        let limit = Arc::new(Semaphore::new(self.max_concurrent_records));
        let mut tasks = JoinSet::new();
        for (index, &student) in students.iter().enumerate() {
            let aggregator = self.aggregator.clone();
            let limit = Arc::clone(&limit);
            tasks.spawn(async move {
                let _permit = limit
                    .acquire_owned()
                    .await
                    .map_err(|e| RecordsError::ProcessingError {
                        message: e.to_string(),
                    })?;
                let record = aggregator.compute_record(student, at).await?;
                Ok::<_, RecordsError>((index, record))
            });
        }

        let mut records: Vec<Option<AcademicRecord>> = vec![None; students.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, record) = joined.map_err(|e| RecordsError::ProcessingError {
                message: format!("record task failed: {}", e),
            })??;
            records[index] = Some(record);
        }

        students
            .iter()
            .zip(records)
            .map(|(&student, record)| {
                record
                    .map(|record| (student, record))
                    .ok_or_else(|| RecordsError::ProcessingError {
                        message: format!("no record computed for student {}", student),
                    })
            })
            .collect()
    }
}
