use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

macro_rules! id_type {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u64> for $name {
                fn from(value: u64) -> Self {
                    Self(value)
                }
            }
        )*
    };
}

id_type!(
    UserId,
    TeacherId,
    StudentId,
    SubjectId,
    CareerId,
    StudyPlanId,
    SubjectGroupId,
    EnrollmentId,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    pub credits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Career {
    pub id: CareerId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: StudyPlanId,
    pub career_id: CareerId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanMembership {
    pub study_plan_id: StudyPlanId,
    pub subject_id: SubjectId,
    pub course_year: u8,
    #[serde(default)]
    pub prerequisites: Vec<SubjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectGroup {
    pub id: SubjectGroupId,
    pub subject_id: SubjectId,
    pub period_code: String,
    pub code: String,
}

/// A teacher's explicit qualification for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectGrant {
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub granted_on: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

/// A blanket qualification covering every subject in the career's study plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerGrant {
    pub teacher_id: TeacherId,
    pub career_id: CareerId,
    pub granted_on: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Failed,
    #[serde(alias = "dropped")]
    Withdrawn,
}

impl EnrollmentStatus {
    pub const TERMINAL: [EnrollmentStatus; 2] = [EnrollmentStatus::Completed, EnrollmentStatus::Failed];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }
}

/// Which enrollments a store read should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Terminal,
    Only(EnrollmentStatus),
}

impl StatusFilter {
    pub fn matches(self, status: EnrollmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Terminal => status.is_terminal(),
            StatusFilter::Only(wanted) => status == wanted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeStatus {
    Passed,
    Failed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalGrade {
    pub enrollment_id: EnrollmentId,
    pub score: Option<f64>,
    pub status: GradeStatus,
    #[serde(default)]
    pub is_published: bool,
}

/// An enrollment as served by the enrollment store, joined with its subject
/// credits and linked final grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectEnrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub subject_group_id: SubjectGroupId,
    pub subject_id: SubjectId,
    pub period_code: String,
    pub credits: u32,
    pub status: EnrollmentStatus,
    pub final_grade: Option<FinalGrade>,
}

impl SubjectEnrollment {
    /// `require_published` controls whether an unpublished passing grade counts.
    pub fn is_passed(&self, require_published: bool) -> bool {
        self.final_grade.as_ref().is_some_and(|grade| {
            grade.status == GradeStatus::Passed && (grade.is_published || !require_published)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedGrade {
    pub enrollment_id: EnrollmentId,
    pub subject_id: SubjectId,
    pub score: Option<f64>,
    pub status: GradeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub total_subjects: u32,
    pub passed_subjects: u32,
    pub failed_subjects: u32,
    pub average_grade: Option<f64>,
    pub total_credits: u32,
    pub completion_rate: f64,
    pub enrollments: Vec<SubjectEnrollment>,
}

/// Rounds `numerator / denominator` to the nearest integer, ties to even.
/// `denominator` must be positive.
fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let twice_remainder = 2 * numerator.rem_euclid(denominator);
    match twice_remainder.cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}

/// Reads `numerator / denominator` as a count of hundredths and returns it as a
/// two-decimal value, rounding ties to even. Computed on integers, so `.xx5`
/// ties are exact. A non-positive denominator yields 0.
pub fn hundredths_from_ratio(numerator: i128, denominator: i128) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    div_round_half_even(numerator, denominator) as f64 / 100.0
}
