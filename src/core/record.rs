use crate::core::{
    hundredths_from_ratio, AcademicRecord, EnrollmentStatus, PublishedGrade, Result, StatusFilter,
    StudentId, SubjectEnrollment,
};
use crate::domain::ports::{EnrollmentStore, GradeStore, ReadSnapshot};
use crate::domain::services::AggregationPolicy;
use std::sync::Arc;

const ENROLLMENT_STORE: &str = "enrollment_store";
const GRADE_STORE: &str = "grade_store";

/// Scores are averaged as integer millionths.
const SCORE_SCALE: f64 = 1_000_000.0;
const SCALED_UNITS_PER_HUNDREDTH: i128 = 10_000;

/// Computes a student's academic record from enrollment and grade history.
/// Nothing is cached; every call reads the stores again.
pub struct AcademicRecordAggregator<E: ?Sized, G: ?Sized> {
    enrollments: Arc<E>,
    grades: Arc<G>,
    policy: AggregationPolicy,
}

impl<E: ?Sized, G: ?Sized> Clone for AcademicRecordAggregator<E, G> {
    fn clone(&self) -> Self {
        Self {
            enrollments: Arc::clone(&self.enrollments),
            grades: Arc::clone(&self.grades),
            policy: self.policy,
        }
    }
}

impl<E, G> AcademicRecordAggregator<E, G>
where
    E: EnrollmentStore + ?Sized,
    G: GradeStore + ?Sized,
{
    pub fn new(enrollments: Arc<E>, grades: Arc<G>) -> Self {
        Self::with_policy(enrollments, grades, AggregationPolicy::default())
    }

    pub fn with_policy(enrollments: Arc<E>, grades: Arc<G>, policy: AggregationPolicy) -> Self {
        Self {
            enrollments,
            grades,
            policy,
        }
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    pub async fn compute_record(&self, student: StudentId, at: ReadSnapshot) -> Result<AcademicRecord> {
        let (terminal, published) = tokio::try_join!(
            async {
                self.enrollments
                    .list_enrollments(student, StatusFilter::Terminal, at)
                    .await
                    .map_err(|e| e.into_data_source(ENROLLMENT_STORE))
            },
            async {
                self.grades
                    .list_published_grades(student, at)
                    .await
                    .map_err(|e| e.into_data_source(GRADE_STORE))
            }
        )?;

        tracing::debug!(
            "Student {}: {} terminal enrollments, {} published grades",
            student,
            terminal.len(),
            published.len()
        );

        Ok(summarize(terminal, &published, self.policy))
    }

    /// Enrollments still in progress, in store order.
    pub async fn current_subjects(
        &self,
        student: StudentId,
        at: ReadSnapshot,
    ) -> Result<Vec<SubjectEnrollment>> {
        self.enrollments
            .list_enrollments(student, StatusFilter::Only(EnrollmentStatus::Enrolled), at)
            .await
            .map_err(|e| e.into_data_source(ENROLLMENT_STORE))
    }
}

/// Builds the record from already-fetched data.
///
/// The grade average covers every published grade with a score, including
/// grades whose enrollment is not terminal, while the counts, credits and
/// completion rate only cover terminal enrollments. The two scopes are kept
/// apart on purpose; callers comparing them should not assume they agree.
pub fn summarize(
    enrollments: Vec<SubjectEnrollment>,
    published: &[PublishedGrade],
    policy: AggregationPolicy,
) -> AcademicRecord {
    // stores may hand back more than asked for
    let enrollments: Vec<SubjectEnrollment> = enrollments
        .into_iter()
        .filter(|e| e.status.is_terminal())
        .collect();

    let total_subjects = u32::try_from(enrollments.len()).unwrap_or(u32::MAX);
    let mut passed_subjects = 0u32;
    let mut total_credits = 0u32;
    for enrollment in &enrollments {
        if enrollment.is_passed(policy.require_published_outcome) {
            passed_subjects = passed_subjects.saturating_add(1);
            total_credits = total_credits.saturating_add(enrollment.credits);
        }
    }

    // percent in hundredths: passed * 100 * 100 / total
    let completion_rate = if total_subjects == 0 {
        0.0
    } else {
        hundredths_from_ratio(
            i128::from(passed_subjects) * 10_000,
            i128::from(total_subjects),
        )
    };

    AcademicRecord {
        total_subjects,
        passed_subjects,
        failed_subjects: total_subjects.saturating_sub(passed_subjects),
        average_grade: average_score(published),
        total_credits,
        completion_rate,
        enrollments,
    }
}

/// Mean of the non-null scores, rounded half to even to two decimals. The sum
/// is taken on integers, so it does not depend on store iteration order.
pub fn average_score(published: &[PublishedGrade]) -> Option<f64> {
    let scaled: Vec<i128> = published
        .iter()
        .filter_map(|g| g.score)
        .map(|score| (score * SCORE_SCALE).round() as i128)
        .collect();
    if scaled.is_empty() {
        return None;
    }

    let sum: i128 = scaled.iter().sum();
    let count = scaled.len() as i128;
    Some(hundredths_from_ratio(sum, count * SCALED_UNITS_PER_HUNDREDTH))
}
