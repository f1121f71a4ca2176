use crate::core::{GradeStatus, Result, StudentId, StudyPlanId, Subject, SubjectId};
use crate::domain::ports::{CurriculumStore, GradeStore, ReadSnapshot};
use std::collections::HashSet;
use std::sync::Arc;

const CURRICULUM_STORE: &str = "curriculum_store";
const GRADE_STORE: &str = "grade_store";

/// Checks a student's published passes against a subject's prerequisites in a
/// given study plan.
pub struct PrerequisiteChecker<C: ?Sized, G: ?Sized> {
    curriculum: Arc<C>,
    grades: Arc<G>,
}

impl<C: ?Sized, G: ?Sized> Clone for PrerequisiteChecker<C, G> {
    fn clone(&self) -> Self {
        Self {
            curriculum: Arc::clone(&self.curriculum),
            grades: Arc::clone(&self.grades),
        }
    }
}

impl<C, G> PrerequisiteChecker<C, G>
where
    C: CurriculumStore + ?Sized,
    G: GradeStore + ?Sized,
{
    pub fn new(curriculum: Arc<C>, grades: Arc<G>) -> Self {
        Self { curriculum, grades }
    }

    /// Prerequisites the student has not passed yet, in plan order. A subject
    /// outside the plan has nothing missing.
    pub async fn missing_prerequisites(
        &self,
        student: StudentId,
        plan: StudyPlanId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<Vec<Subject>> {
        let prerequisites = self
            .curriculum
            .prerequisites_of(plan, subject, at)
            .await
            .map_err(|e| e.into_data_source(CURRICULUM_STORE))?;

        let prerequisites = match prerequisites {
            Some(list) if !list.is_empty() => list,
            Some(_) => return Ok(Vec::new()),
            None => {
                tracing::debug!("Subject {} is not part of study plan {}", subject, plan);
                return Ok(Vec::new());
            }
        };

        let passed: HashSet<SubjectId> = self
            .grades
            .list_published_grades(student, at)
            .await
            .map_err(|e| e.into_data_source(GRADE_STORE))?
            .into_iter()
            .filter(|g| g.status == GradeStatus::Passed)
            .map(|g| g.subject_id)
            .collect();

        let mut missing = Vec::new();
        for id in prerequisites {
            if passed.contains(&id) {
                continue;
            }
            let resolved = self
                .curriculum
                .get_subject(id, at)
                .await
                .map_err(|e| e.into_data_source(CURRICULUM_STORE))?;
            match resolved {
                Some(prerequisite) => missing.push(prerequisite),
                None => tracing::warn!("Skipping unresolvable prerequisite {} of subject {}", id, subject),
            }
        }

        Ok(missing)
    }

    pub async fn meets_prerequisites(
        &self,
        student: StudentId,
        plan: StudyPlanId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<bool> {
        Ok(self
            .missing_prerequisites(student, plan, subject, at)
            .await?
            .is_empty())
    }
}
