use crate::domain::model::{StudentId, TeacherId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub student_code: String,
    pub current_year: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub teacher_id: TeacherId,
    pub employee_code: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// The role-specific profile attached to a user, resolved once by the profile
/// store instead of being probed field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileKind {
    Student(StudentProfile),
    Teacher(TeacherProfile),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub profile: ProfileKind,
}

impl UserProfile {
    pub fn without_profile(user_id: UserId) -> Self {
        Self {
            user_id,
            profile: ProfileKind::None,
        }
    }

    pub fn as_student(&self) -> Option<&StudentProfile> {
        match &self.profile {
            ProfileKind::Student(student) => Some(student),
            _ => None,
        }
    }

    pub fn as_teacher(&self) -> Option<&TeacherProfile> {
        match &self.profile {
            ProfileKind::Teacher(teacher) => Some(teacher),
            _ => None,
        }
    }
}
