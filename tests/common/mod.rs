#![allow(dead_code)]

use academic_records::adapters::{Dataset, EnrollmentRow};
use academic_records::domain::model::{
    Career, CareerGrant, CareerId, EnrollmentId, EnrollmentStatus, FinalGrade, GradeStatus,
    StudentId, StudyPlan, StudyPlanId, StudyPlanMembership, Subject, SubjectGrant, SubjectGroup,
    SubjectGroupId, SubjectId, TeacherId, UserId,
};
use academic_records::domain::profile::{ProfileKind, StudentProfile, TeacherProfile, UserProfile};
use chrono::NaiveDate;

pub const CALCULUS: SubjectId = SubjectId(1);
pub const ALGEBRA: SubjectId = SubjectId(2);
pub const PHYSICS: SubjectId = SubjectId(3);
pub const PROGRAMMING: SubjectId = SubjectId(4);
pub const DATABASES: SubjectId = SubjectId(5);
pub const CHEMISTRY: SubjectId = SubjectId(6);

pub const ENGINEERING: CareerId = CareerId(10);
pub const COMPUTER_SCIENCE: CareerId = CareerId(20);
pub const CHEMISTRY_DEGREE: CareerId = CareerId(30);

pub const CS_PLAN: StudyPlanId = StudyPlanId(201);

fn subject(id: SubjectId, code: &str, name: &str, credits: u32) -> Subject {
    Subject {
        id,
        code: code.to_string(),
        name: name.to_string(),
        credits,
    }
}

fn career(id: CareerId, code: &str, name: &str) -> Career {
    Career {
        id,
        code: code.to_string(),
        name: name.to_string(),
    }
}

fn plan(id: u64, career_id: CareerId) -> StudyPlan {
    StudyPlan {
        id: StudyPlanId(id),
        career_id,
        code: format!("P{id}"),
        name: format!("Plan {id}"),
    }
}

fn member(plan: u64, subject: SubjectId, course_year: u8, prerequisites: &[SubjectId]) -> StudyPlanMembership {
    StudyPlanMembership {
        study_plan_id: StudyPlanId(plan),
        subject_id: subject,
        course_year,
        prerequisites: prerequisites.to_vec(),
    }
}

fn granted_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
}

fn subject_grant(teacher: u64, subject: SubjectId) -> SubjectGrant {
    SubjectGrant {
        teacher_id: TeacherId(teacher),
        subject_id: subject,
        granted_on: granted_on(),
        notes: "certified".to_string(),
    }
}

fn career_grant(teacher: u64, career: CareerId) -> CareerGrant {
    CareerGrant {
        teacher_id: TeacherId(teacher),
        career_id: career,
        granted_on: granted_on(),
        notes: String::new(),
    }
}

pub fn group_of(subject: SubjectId) -> SubjectGroupId {
    SubjectGroupId(1000 + subject.0)
}

fn enrollment(id: u64, student: u64, subject: SubjectId, status: EnrollmentStatus) -> EnrollmentRow {
    EnrollmentRow {
        id: EnrollmentId(id),
        student_id: StudentId(student),
        subject_group_id: group_of(subject),
        status,
    }
}

fn grade(enrollment: u64, score: Option<f64>, status: GradeStatus, is_published: bool) -> FinalGrade {
    FinalGrade {
        enrollment_id: EnrollmentId(enrollment),
        score,
        status,
        is_published,
    }
}

/// Teachers:
/// 1 direct Algebra + career Computer Science, 2 no grants, 3 career Engineering only,
/// 4 direct Calculus + career Engineering, 5 only unresolvable grants.
///
/// Students:
/// 1 passed Programming (4cr) and Databases (3cr), failed Physics (5cr), enrolled in Calculus;
/// 2 passed Calculus at 7.333, failed Physics without score, enrolled in Algebra with a
///   published 8.667; 3 has no history; 4 passed Calculus with an unpublished grade.
pub fn campus_dataset() -> Dataset {
    let subjects = vec![
        subject(CALCULUS, "MAT101", "Calculus I", 6),
        subject(ALGEBRA, "MAT102", "Linear Algebra", 4),
        subject(PHYSICS, "FIS101", "Physics I", 5),
        subject(PROGRAMMING, "INF101", "Programming", 4),
        subject(DATABASES, "INF201", "Databases", 3),
        subject(CHEMISTRY, "QUI101", "General Chemistry", 5),
    ];
    let subject_groups = subjects
        .iter()
        .map(|s| SubjectGroup {
            id: group_of(s.id),
            subject_id: s.id,
            period_code: "2024-1".to_string(),
            code: "A".to_string(),
        })
        .collect();

    Dataset {
        subjects,
        careers: vec![
            career(ENGINEERING, "ENG", "Engineering"),
            career(COMPUTER_SCIENCE, "CS", "Computer Science"),
            career(CHEMISTRY_DEGREE, "CHE", "Chemistry"),
        ],
        study_plans: vec![
            plan(101, ENGINEERING),
            plan(102, ENGINEERING),
            plan(201, COMPUTER_SCIENCE),
            plan(301, CHEMISTRY_DEGREE),
        ],
        memberships: vec![
            member(101, CALCULUS, 1, &[]),
            member(101, ALGEBRA, 1, &[]),
            member(101, PHYSICS, 2, &[CALCULUS]),
            member(102, CALCULUS, 1, &[]),
            member(102, PHYSICS, 1, &[]),
            member(201, CALCULUS, 1, &[]),
            member(201, PROGRAMMING, 1, &[CALCULUS]),
            member(201, DATABASES, 2, &[PROGRAMMING, SubjectId(99)]),
            member(301, CHEMISTRY, 1, &[]),
        ],
        subject_groups,
        subject_grants: vec![
            subject_grant(1, ALGEBRA),
            subject_grant(4, CALCULUS),
            subject_grant(5, SubjectId(99)),
        ],
        career_grants: vec![
            career_grant(1, COMPUTER_SCIENCE),
            career_grant(3, ENGINEERING),
            career_grant(4, ENGINEERING),
            career_grant(5, CareerId(77)),
        ],
        enrollments: vec![
            enrollment(1, 1, PROGRAMMING, EnrollmentStatus::Completed),
            enrollment(2, 1, DATABASES, EnrollmentStatus::Completed),
            enrollment(3, 1, PHYSICS, EnrollmentStatus::Failed),
            enrollment(4, 1, CALCULUS, EnrollmentStatus::Enrolled),
            enrollment(5, 1, CHEMISTRY, EnrollmentStatus::Withdrawn),
            enrollment(6, 2, CALCULUS, EnrollmentStatus::Completed),
            enrollment(7, 2, PHYSICS, EnrollmentStatus::Failed),
            enrollment(8, 2, ALGEBRA, EnrollmentStatus::Enrolled),
            enrollment(9, 4, CALCULUS, EnrollmentStatus::Completed),
        ],
        final_grades: vec![
            grade(1, Some(9.0), GradeStatus::Passed, true),
            grade(2, Some(7.0), GradeStatus::Passed, true),
            grade(3, Some(4.0), GradeStatus::Failed, true),
            grade(6, Some(7.333), GradeStatus::Passed, true),
            grade(7, None, GradeStatus::Failed, true),
            grade(8, Some(8.667), GradeStatus::Passed, true),
            grade(9, Some(9.5), GradeStatus::Passed, false),
        ],
        profiles: vec![
            UserProfile {
                user_id: UserId(100),
                profile: ProfileKind::Student(StudentProfile {
                    student_id: StudentId(1),
                    student_code: "2024-0001".to_string(),
                    current_year: 2,
                }),
            },
            UserProfile {
                user_id: UserId(200),
                profile: ProfileKind::Teacher(TeacherProfile {
                    teacher_id: TeacherId(1),
                    employee_code: "EMP-001".to_string(),
                    department: Some("Informatics".to_string()),
                }),
            },
        ],
    }
}

/// Adds a completed enrollment with a published passing grade.
pub fn add_published_pass(dataset: &mut Dataset, enrollment_id: u64, student: u64, subject: SubjectId, score: f64) {
    dataset
        .enrollments
        .push(enrollment(enrollment_id, student, subject, EnrollmentStatus::Completed));
    dataset
        .final_grades
        .push(grade(enrollment_id, Some(score), GradeStatus::Passed, true));
}
