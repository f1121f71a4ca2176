use crate::core::{Career, CareerId, Result, Subject, SubjectId, TeacherId};
use crate::domain::ports::{CurriculumStore, QualificationStore, ReadSnapshot};
use std::collections::BTreeSet;
use std::sync::Arc;

const QUALIFICATION_STORE: &str = "qualification_store";
const CURRICULUM_STORE: &str = "curriculum_store";

/// Answers which subjects and careers a teacher is qualified to teach.
///
/// Holds no state besides the two store handles, so one resolver can serve any
/// number of concurrent callers.
pub struct QualificationResolver<Q: ?Sized, C: ?Sized> {
    qualifications: Arc<Q>,
    curriculum: Arc<C>,
}

impl<Q: ?Sized, C: ?Sized> Clone for QualificationResolver<Q, C> {
    fn clone(&self) -> Self {
        Self {
            qualifications: Arc::clone(&self.qualifications),
            curriculum: Arc::clone(&self.curriculum),
        }
    }
}

impl<Q, C> QualificationResolver<Q, C>
where
    Q: QualificationStore + ?Sized,
    C: CurriculumStore + ?Sized,
{
    pub fn new(qualifications: Arc<Q>, curriculum: Arc<C>) -> Self {
        Self {
            qualifications,
            curriculum,
        }
    }

    /// Union of directly granted subjects and every subject of every granted
    /// career, before resolving ids against the curriculum.
    pub async fn effective_subject_ids(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<SubjectId>> {
        let (direct, careers) = tokio::try_join!(
            self.direct_grants(teacher, at),
            self.career_grants(teacher, at)
        )?;

        if direct.is_empty() && careers.is_empty() {
            tracing::debug!("Teacher {} holds no grants", teacher);
            return Ok(BTreeSet::new());
        }

        let mut subjects = direct;
        for career in careers {
            let reachable = self
                .curriculum
                .subjects_of_career(career, at)
                .await
                .map_err(|e| e.into_data_source(CURRICULUM_STORE))?;
            subjects.extend(reachable);
        }

        Ok(subjects)
    }

    /// Subjects the teacher may teach, ordered by id. Grant ids that no longer
    /// resolve in the curriculum are left out.
    pub async fn effective_subjects(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<Vec<Subject>> {
        let ids = self.effective_subject_ids(teacher, at).await?;

        let mut subjects = Vec::with_capacity(ids.len());
        for id in ids {
            match self.subject(id, at).await? {
                Some(subject) => subjects.push(subject),
                None => tracing::warn!("Skipping unresolvable subject {} for teacher {}", id, teacher),
            }
        }

        tracing::debug!("Teacher {} has {} effective subjects", teacher, subjects.len());
        Ok(subjects)
    }

    pub async fn can_teach(
        &self,
        teacher: TeacherId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<bool> {
        let direct = self
            .qualifications
            .has_direct_grant(teacher, subject, at)
            .await
            .map_err(|e| e.into_data_source(QUALIFICATION_STORE))?;

        if direct {
            return Ok(self.subject(subject, at).await?.is_some());
        }

        let careers = self.career_grants(teacher, at).await?;
        if careers.is_empty() {
            return Ok(false);
        }

        let owning = self
            .curriculum
            .careers_of_subject(subject, at)
            .await
            .map_err(|e| e.into_data_source(CURRICULUM_STORE))?;

        if owning.is_disjoint(&careers) {
            return Ok(false);
        }

        Ok(self.subject(subject, at).await?.is_some())
    }

    pub async fn qualified_careers(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<Vec<Career>> {
        let ids = self.career_grants(teacher, at).await?;

        let mut careers = Vec::with_capacity(ids.len());
        for id in ids {
            let career = self
                .curriculum
                .get_career(id, at)
                .await
                .map_err(|e| e.into_data_source(CURRICULUM_STORE))?;
            match career {
                Some(career) => careers.push(career),
                None => tracing::warn!("Skipping unresolvable career {} for teacher {}", id, teacher),
            }
        }

        Ok(careers)
    }

    async fn direct_grants(&self, teacher: TeacherId, at: ReadSnapshot) -> Result<BTreeSet<SubjectId>> {
        self.qualifications
            .list_direct_grants(teacher, at)
            .await
            .map_err(|e| e.into_data_source(QUALIFICATION_STORE))
    }

    async fn career_grants(&self, teacher: TeacherId, at: ReadSnapshot) -> Result<BTreeSet<CareerId>> {
        self.qualifications
            .list_career_grants(teacher, at)
            .await
            .map_err(|e| e.into_data_source(QUALIFICATION_STORE))
    }

    async fn subject(&self, id: SubjectId, at: ReadSnapshot) -> Result<Option<Subject>> {
        self.curriculum
            .get_subject(id, at)
            .await
            .map_err(|e| e.into_data_source(CURRICULUM_STORE))
    }
}
