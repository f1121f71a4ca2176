use crate::domain::model::{
    AcademicRecord, Career, EnrollmentStatus, GradeStatus, StudentId, Subject, SubjectEnrollment,
};
use crate::utils::error::{RecordsError, Result};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = RecordsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(RecordsError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Supported formats: json, csv".to_string(),
            }),
        }
    }
}

/// A flat row type with a fixed CSV header, written even when there are no rows.
pub trait CsvRecord: Serialize {
    const HEADERS: &'static [&'static str];
}

impl<T: CsvRecord + ?Sized> CsvRecord for &T {
    const HEADERS: &'static [&'static str] = T::HEADERS;
}

impl CsvRecord for Subject {
    const HEADERS: &'static [&'static str] = &["id", "code", "name", "credits"];
}

impl CsvRecord for Career {
    const HEADERS: &'static [&'static str] = &["id", "code", "name"];
}

#[derive(Debug, Serialize)]
struct RecordRow {
    student_id: StudentId,
    total_subjects: u32,
    passed_subjects: u32,
    failed_subjects: u32,
    average_grade: Option<f64>,
    total_credits: u32,
    completion_rate: f64,
}

impl CsvRecord for RecordRow {
    const HEADERS: &'static [&'static str] = &[
        "student_id",
        "total_subjects",
        "passed_subjects",
        "failed_subjects",
        "average_grade",
        "total_credits",
        "completion_rate",
    ];
}

impl RecordRow {
    fn new(student_id: StudentId, record: &AcademicRecord) -> Self {
        Self {
            student_id,
            total_subjects: record.total_subjects,
            passed_subjects: record.passed_subjects,
            failed_subjects: record.failed_subjects,
            average_grade: record.average_grade,
            total_credits: record.total_credits,
            completion_rate: record.completion_rate,
        }
    }
}

#[derive(Debug, Serialize)]
struct KeyedRecord<'a> {
    student_id: StudentId,
    record: &'a AcademicRecord,
}

#[derive(Debug, Serialize)]
struct EnrollmentLine<'a> {
    enrollment_id: u64,
    subject_id: u64,
    period_code: &'a str,
    credits: u32,
    status: EnrollmentStatus,
    grade_status: Option<GradeStatus>,
    score: Option<f64>,
    published: Option<bool>,
}

impl CsvRecord for EnrollmentLine<'_> {
    const HEADERS: &'static [&'static str] = &[
        "enrollment_id",
        "subject_id",
        "period_code",
        "credits",
        "status",
        "grade_status",
        "score",
        "published",
    ];
}

impl<'a> From<&'a SubjectEnrollment> for EnrollmentLine<'a> {
    fn from(enrollment: &'a SubjectEnrollment) -> Self {
        let grade = enrollment.final_grade.as_ref();
        Self {
            enrollment_id: enrollment.id.0,
            subject_id: enrollment.subject_id.0,
            period_code: &enrollment.period_code,
            credits: enrollment.credits,
            status: enrollment.status,
            grade_status: grade.map(|g| g.status),
            score: grade.and_then(|g| g.score),
            published: grade.map(|g| g.is_published),
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `T::HEADERS` first, then one line per row.
pub fn to_csv<T, I>(rows: I) -> Result<String>
where
    T: CsvRecord,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| RecordsError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RecordsError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Renders a flat list (subjects, careers, prerequisite subjects).
pub fn render_list<T: CsvRecord>(items: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(items),
        OutputFormat::Csv => to_csv(items.iter()),
    }
}

pub fn render_records(
    records: &[(StudentId, AcademicRecord)],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let keyed: Vec<KeyedRecord<'_>> = records
                .iter()
                .map(|(student_id, record)| KeyedRecord {
                    student_id: *student_id,
                    record,
                })
                .collect();
            to_json(&keyed)
        }
        OutputFormat::Csv => to_csv(
            records
                .iter()
                .map(|(student, record)| RecordRow::new(*student, record)),
        ),
    }
}

pub fn render_enrollments(enrollments: &[SubjectEnrollment], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(enrollments),
        OutputFormat::Csv => to_csv(enrollments.iter().map(EnrollmentLine::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnrollmentId, FinalGrade, SubjectGroupId, SubjectId};

    #[test]
    fn test_parse_format() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_subjects_as_csv() {
        let subjects = vec![Subject {
            id: SubjectId(1),
            code: "MAT101".to_string(),
            name: "Calculus I".to_string(),
            credits: 6,
        }];

        let csv = render_list(&subjects, OutputFormat::Csv).unwrap();
        assert_eq!(csv, "id,code,name,credits\n1,MAT101,Calculus I,6\n");
    }

    #[test]
    fn test_empty_lists_keep_csv_header() {
        let subjects: Vec<Subject> = Vec::new();
        assert_eq!(
            render_list(&subjects, OutputFormat::Csv).unwrap(),
            "id,code,name,credits\n"
        );

        let careers: Vec<Career> = Vec::new();
        assert_eq!(render_list(&careers, OutputFormat::Csv).unwrap(), "id,code,name\n");

        let current = render_enrollments(&[], OutputFormat::Csv).unwrap();
        assert_eq!(
            current,
            "enrollment_id,subject_id,period_code,credits,status,grade_status,score,published\n"
        );
    }

    #[test]
    fn test_career_rows_match_header() {
        let careers = vec![Career {
            id: crate::domain::model::CareerId(20),
            code: "CS".to_string(),
            name: "Computer Science".to_string(),
        }];

        let csv = render_list(&careers, OutputFormat::Csv).unwrap();
        assert_eq!(csv, "id,code,name\n20,CS,Computer Science\n");
    }

    #[test]
    fn test_record_csv_leaves_missing_average_empty() {
        let record = AcademicRecord {
            total_subjects: 0,
            passed_subjects: 0,
            failed_subjects: 0,
            average_grade: None,
            total_credits: 0,
            completion_rate: 0.0,
            enrollments: Vec::new(),
        };

        let csv = render_records(&[(StudentId(5), record)], OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("student_id,total_subjects,passed_subjects,failed_subjects,average_grade,total_credits,completion_rate")
        );
        assert_eq!(lines.next(), Some("5,0,0,0,,0,0.0"));
    }

    #[test]
    fn test_enrollments_csv_flattens_grade() {
        let enrollments = vec![SubjectEnrollment {
            id: EnrollmentId(3),
            student_id: StudentId(1),
            subject_group_id: SubjectGroupId(8),
            subject_id: SubjectId(2),
            period_code: "2024-2".to_string(),
            credits: 4,
            status: EnrollmentStatus::Completed,
            final_grade: Some(FinalGrade {
                enrollment_id: EnrollmentId(3),
                score: Some(8.5),
                status: GradeStatus::Passed,
                is_published: true,
            }),
        }];

        let csv = render_enrollments(&enrollments, OutputFormat::Csv).unwrap();
        assert!(csv.contains("3,2,2024-2,4,completed,passed,8.5,true"));
    }
}
