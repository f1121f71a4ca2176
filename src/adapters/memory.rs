use crate::domain::model::{
    Career, CareerGrant, CareerId, EnrollmentId, EnrollmentStatus, FinalGrade, PublishedGrade,
    StatusFilter, StudentId, StudyPlan, StudyPlanId, StudyPlanMembership, Subject,
    SubjectEnrollment, SubjectGrant, SubjectGroup, SubjectGroupId, SubjectId, TeacherId, UserId,
};
use crate::domain::ports::{
    CurriculumStore, EnrollmentStore, GradeStore, ProfileStore, QualificationStore, ReadSnapshot,
    SnapshotProvider,
};
use crate::domain::profile::UserProfile;
use crate::utils::error::{RecordsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::path::Path;
use std::sync::{Arc, RwLock};

const SOURCE: &str = "in_memory_store";

pub const DEFAULT_RETAINED_SNAPSHOTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRow {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub subject_group_id: SubjectGroupId,
    pub status: EnrollmentStatus,
}

/// Raw rows as exported by the owning CRUD subsystems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub careers: Vec<Career>,
    #[serde(default)]
    pub study_plans: Vec<StudyPlan>,
    #[serde(default)]
    pub memberships: Vec<StudyPlanMembership>,
    #[serde(default)]
    pub subject_groups: Vec<SubjectGroup>,
    #[serde(default)]
    pub subject_grants: Vec<SubjectGrant>,
    #[serde(default)]
    pub career_grants: Vec<CareerGrant>,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentRow>,
    #[serde(default)]
    pub final_grades: Vec<FinalGrade>,
    #[serde(default)]
    pub profiles: Vec<UserProfile>,
}

impl Dataset {
    /// 依副檔名載入 JSON 或 TOML 資料集
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => toml::from_str(&content).map_err(|e| RecordsError::ValidationError {
                message: format!("TOML dataset parsing error: {}", e),
            }),
            _ => Err(RecordsError::InvalidConfigValueError {
                field: "data.path".to_string(),
                value: path.display().to_string(),
                reason: "Dataset must be a .json or .toml file".to_string(),
            }),
        }
    }

    /// Rejects duplicated keys, including a second grant for the same
    /// (teacher, subject) or (teacher, career) pair.
    pub fn validate(&self) -> Result<()> {
        ensure_unique("subject", self.subjects.iter().map(|s| s.id))?;
        ensure_unique("career", self.careers.iter().map(|c| c.id))?;
        ensure_unique("study plan", self.study_plans.iter().map(|p| p.id))?;
        ensure_unique(
            "study plan membership",
            self.memberships.iter().map(|m| (m.study_plan_id, m.subject_id)),
        )?;
        ensure_unique("subject group", self.subject_groups.iter().map(|g| g.id))?;
        ensure_unique(
            "subject grant",
            self.subject_grants.iter().map(|g| (g.teacher_id, g.subject_id)),
        )?;
        ensure_unique(
            "career grant",
            self.career_grants.iter().map(|g| (g.teacher_id, g.career_id)),
        )?;
        ensure_unique("enrollment", self.enrollments.iter().map(|e| e.id))?;
        ensure_unique("final grade", self.final_grades.iter().map(|g| g.enrollment_id))?;
        ensure_unique("user profile", self.profiles.iter().map(|p| p.user_id))?;
        Ok(())
    }
}

fn ensure_unique<K, I>(what: &str, keys: I) -> Result<()>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
    I: IntoIterator<Item = K>,
{
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(RecordsError::ValidationError {
                message: format!("duplicate {} {:?}", what, key),
            });
        }
    }
    Ok(())
}

/// One immutable, indexed version of a dataset.
#[derive(Debug, Default)]
struct DatasetIndex {
    subjects: HashMap<SubjectId, Subject>,
    careers: HashMap<CareerId, Career>,
    career_subjects: HashMap<CareerId, BTreeSet<SubjectId>>,
    subject_careers: HashMap<SubjectId, BTreeSet<CareerId>>,
    prerequisites: HashMap<(StudyPlanId, SubjectId), Vec<SubjectId>>,
    direct_grants: HashMap<TeacherId, BTreeSet<SubjectId>>,
    direct_pairs: HashSet<(TeacherId, SubjectId)>,
    career_grants: HashMap<TeacherId, BTreeSet<CareerId>>,
    groups: HashMap<SubjectGroupId, SubjectGroup>,
    enrollments: HashMap<StudentId, Vec<EnrollmentRow>>,
    final_grades: HashMap<EnrollmentId, FinalGrade>,
    profiles: HashMap<UserId, UserProfile>,
}

impl DatasetIndex {
    fn build(dataset: Dataset) -> Result<Self> {
        dataset.validate()?;

        let mut index = DatasetIndex::default();
        let plan_careers: HashMap<StudyPlanId, CareerId> = dataset
            .study_plans
            .iter()
            .map(|plan| (plan.id, plan.career_id))
            .collect();

        for membership in dataset.memberships {
            match plan_careers.get(&membership.study_plan_id) {
                Some(&career) => {
                    index
                        .career_subjects
                        .entry(career)
                        .or_default()
                        .insert(membership.subject_id);
                    index
                        .subject_careers
                        .entry(membership.subject_id)
                        .or_default()
                        .insert(career);
                }
                None => tracing::warn!(
                    "Membership of subject {} references unknown study plan {}",
                    membership.subject_id,
                    membership.study_plan_id
                ),
            }
            index.prerequisites.insert(
                (membership.study_plan_id, membership.subject_id),
                membership.prerequisites,
            );
        }

        for grant in dataset.subject_grants {
            index
                .direct_grants
                .entry(grant.teacher_id)
                .or_default()
                .insert(grant.subject_id);
            index.direct_pairs.insert((grant.teacher_id, grant.subject_id));
        }
        for grant in dataset.career_grants {
            index
                .career_grants
                .entry(grant.teacher_id)
                .or_default()
                .insert(grant.career_id);
        }
        for row in dataset.enrollments {
            index.enrollments.entry(row.student_id).or_default().push(row);
        }

        index.subjects = dataset.subjects.into_iter().map(|s| (s.id, s)).collect();
        index.careers = dataset.careers.into_iter().map(|c| (c.id, c)).collect();
        index.groups = dataset.subject_groups.into_iter().map(|g| (g.id, g)).collect();
        index.final_grades = dataset
            .final_grades
            .into_iter()
            .map(|g| (g.enrollment_id, g))
            .collect();
        index.profiles = dataset.profiles.into_iter().map(|p| (p.user_id, p)).collect();

        Ok(index)
    }

    fn rows(&self, student: StudentId) -> &[EnrollmentRow] {
        self.enrollments.get(&student).map(Vec::as_slice).unwrap_or(&[])
    }

    fn group_of(&self, row: &EnrollmentRow) -> Result<&SubjectGroup> {
        self.groups.get(&row.subject_group_id).ok_or_else(|| {
            RecordsError::data_source(
                SOURCE,
                format!(
                    "enrollment {} references unknown subject group {}",
                    row.id, row.subject_group_id
                ),
            )
        })
    }

    fn join(&self, row: &EnrollmentRow) -> Result<SubjectEnrollment> {
        let group = self.group_of(row)?;
        let subject = self.subjects.get(&group.subject_id).ok_or_else(|| {
            RecordsError::data_source(
                SOURCE,
                format!(
                    "subject group {} references unknown subject {}",
                    group.id, group.subject_id
                ),
            )
        })?;

        Ok(SubjectEnrollment {
            id: row.id,
            student_id: row.student_id,
            subject_group_id: group.id,
            subject_id: subject.id,
            period_code: group.period_code.clone(),
            credits: subject.credits,
            status: row.status,
            final_grade: self.final_grades.get(&row.id).cloned(),
        })
    }
}

/// Store adapter serving every read port from versioned in-memory datasets.
/// Published versions are never modified; a pinned snapshot keeps reading the
/// same data until it is evicted.
#[derive(Debug)]
pub struct InMemoryStore {
    versions: RwLock<BTreeMap<u64, Arc<DatasetIndex>>>,
    retained: usize,
}

impl InMemoryStore {
    pub fn new(dataset: Dataset) -> Result<Self> {
        Self::with_retention(dataset, DEFAULT_RETAINED_SNAPSHOTS)
    }

    pub fn with_retention(dataset: Dataset, retained: usize) -> Result<Self> {
        let mut versions = BTreeMap::new();
        versions.insert(1, Arc::new(DatasetIndex::build(dataset)?));
        Ok(Self {
            versions: RwLock::new(versions),
            retained: retained.max(1),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, retained: usize) -> Result<Self> {
        Self::with_retention(Dataset::from_file(path)?, retained)
    }

    /// Installs a new version and evicts the oldest ones beyond the retention
    /// limit. Returns the new version number.
    pub fn publish(&self, dataset: Dataset) -> Result<u64> {
        let index = Arc::new(DatasetIndex::build(dataset)?);
        let mut versions = self
            .versions
            .write()
            .map_err(|_| RecordsError::data_source(SOURCE, "version table lock poisoned"))?;

        let version = versions.keys().next_back().copied().unwrap_or(0) + 1;
        versions.insert(version, index);
        while versions.len() > self.retained {
            versions.pop_first();
        }

        tracing::info!("Published dataset version {} ({} retained)", version, versions.len());
        Ok(version)
    }

    pub fn latest_version(&self) -> Result<u64> {
        let versions = self
            .versions
            .read()
            .map_err(|_| RecordsError::data_source(SOURCE, "version table lock poisoned"))?;
        versions
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| RecordsError::data_source(SOURCE, "no dataset published"))
    }

    fn at(&self, at: ReadSnapshot) -> Result<Arc<DatasetIndex>> {
        let versions = self
            .versions
            .read()
            .map_err(|_| RecordsError::data_source(SOURCE, "version table lock poisoned"))?;

        let found = match at {
            ReadSnapshot::Latest => versions.values().next_back(),
            ReadSnapshot::Version(version) => versions.get(&version),
        };

        found.cloned().ok_or_else(|| {
            RecordsError::data_source(SOURCE, format!("snapshot {:?} is no longer retained", at))
        })
    }
}

#[async_trait]
impl SnapshotProvider for InMemoryStore {
    async fn snapshot(&self) -> Result<ReadSnapshot> {
        Ok(ReadSnapshot::Version(self.latest_version()?))
    }
}

#[async_trait]
impl QualificationStore for InMemoryStore {
    async fn list_direct_grants(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<SubjectId>> {
        Ok(self.at(at)?.direct_grants.get(&teacher).cloned().unwrap_or_default())
    }

    async fn list_career_grants(
        &self,
        teacher: TeacherId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<CareerId>> {
        Ok(self.at(at)?.career_grants.get(&teacher).cloned().unwrap_or_default())
    }

    async fn has_direct_grant(
        &self,
        teacher: TeacherId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<bool> {
        Ok(self.at(at)?.direct_pairs.contains(&(teacher, subject)))
    }
}

#[async_trait]
impl CurriculumStore for InMemoryStore {
    async fn subjects_of_career(
        &self,
        career: CareerId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<SubjectId>> {
        Ok(self.at(at)?.career_subjects.get(&career).cloned().unwrap_or_default())
    }

    async fn careers_of_subject(
        &self,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<BTreeSet<CareerId>> {
        Ok(self.at(at)?.subject_careers.get(&subject).cloned().unwrap_or_default())
    }

    async fn get_subject(&self, subject: SubjectId, at: ReadSnapshot) -> Result<Option<Subject>> {
        Ok(self.at(at)?.subjects.get(&subject).cloned())
    }

    async fn get_career(&self, career: CareerId, at: ReadSnapshot) -> Result<Option<Career>> {
        Ok(self.at(at)?.careers.get(&career).cloned())
    }

    async fn prerequisites_of(
        &self,
        plan: StudyPlanId,
        subject: SubjectId,
        at: ReadSnapshot,
    ) -> Result<Option<Vec<SubjectId>>> {
        Ok(self.at(at)?.prerequisites.get(&(plan, subject)).cloned())
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryStore {
    async fn list_enrollments(
        &self,
        student: StudentId,
        filter: StatusFilter,
        at: ReadSnapshot,
    ) -> Result<Vec<SubjectEnrollment>> {
        let index = self.at(at)?;
        index
            .rows(student)
            .iter()
            .filter(|row| filter.matches(row.status))
            .map(|row| index.join(row))
            .collect()
    }
}

#[async_trait]
impl GradeStore for InMemoryStore {
    async fn list_published_grades(
        &self,
        student: StudentId,
        at: ReadSnapshot,
    ) -> Result<Vec<PublishedGrade>> {
        let index = self.at(at)?;
        let mut published = Vec::new();
        for row in index.rows(student) {
            let Some(grade) = index.final_grades.get(&row.id) else {
                continue;
            };
            if !grade.is_published {
                continue;
            }
            published.push(PublishedGrade {
                enrollment_id: row.id,
                subject_id: index.group_of(row)?.subject_id,
                score: grade.score,
                status: grade.status,
            });
        }
        Ok(published)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn profile_of(&self, user: UserId, at: ReadSnapshot) -> Result<UserProfile> {
        Ok(self
            .at(at)?
            .profiles
            .get(&user)
            .cloned()
            .unwrap_or_else(|| UserProfile::without_profile(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::Builder;

    fn subject(id: u64, credits: u32) -> Subject {
        Subject {
            id: SubjectId(id),
            code: format!("MAT{id}"),
            name: format!("Subject {id}"),
            credits,
        }
    }

    fn grant(teacher: u64, subject: u64) -> SubjectGrant {
        SubjectGrant {
            teacher_id: TeacherId(teacher),
            subject_id: SubjectId(subject),
            granted_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_duplicate_grant_is_rejected() {
        let dataset = Dataset {
            subjects: vec![subject(1, 4)],
            subject_grants: vec![grant(1, 1), grant(1, 1)],
            ..Dataset::default()
        };

        let err = InMemoryStore::new(dataset).unwrap_err();
        assert!(err.to_string().contains("duplicate subject grant"));
    }

    #[tokio::test]
    async fn test_pinned_snapshot_survives_publish() {
        let store = InMemoryStore::with_retention(
            Dataset {
                subjects: vec![subject(1, 4)],
                subject_grants: vec![grant(1, 1)],
                ..Dataset::default()
            },
            2,
        )
        .unwrap();

        let pinned = store.snapshot().await.unwrap();
        store
            .publish(Dataset {
                subjects: vec![subject(1, 4)],
                ..Dataset::default()
            })
            .unwrap();

        assert!(store.has_direct_grant(TeacherId(1), SubjectId(1), pinned).await.unwrap());
        assert!(!store
            .has_direct_grant(TeacherId(1), SubjectId(1), ReadSnapshot::Latest)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_evicted_snapshot_is_unavailable() {
        let store = InMemoryStore::with_retention(Dataset::default(), 1).unwrap();
        let pinned = store.snapshot().await.unwrap();
        assert_eq!(store.publish(Dataset::default()).unwrap(), 2);

        let err = store.get_subject(SubjectId(1), pinned).await.unwrap_err();
        assert!(err.is_data_source_failure());
    }

    #[tokio::test]
    async fn test_dangling_group_is_malformed() {
        let store = InMemoryStore::new(Dataset {
            enrollments: vec![EnrollmentRow {
                id: EnrollmentId(1),
                student_id: StudentId(1),
                subject_group_id: SubjectGroupId(42),
                status: EnrollmentStatus::Completed,
            }],
            ..Dataset::default()
        })
        .unwrap();

        let err = store
            .list_enrollments(StudentId(1), StatusFilter::All, ReadSnapshot::Latest)
            .await
            .unwrap_err();
        assert!(err.is_data_source_failure());
        assert!(err.to_string().contains("unknown subject group 42"));
    }

    #[test]
    fn test_dataset_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            br#"
[[subjects]]
id = 1
code = "MAT101"
name = "Calculus"
credits = 6

[[subject_grants]]
teacher_id = 3
subject_id = 1
granted_on = "2023-09-01"
"#,
        )
        .unwrap();

        let dataset = Dataset::from_file(file.path()).unwrap();
        assert_eq!(dataset.subjects.len(), 1);
        assert_eq!(dataset.subject_grants[0].teacher_id, TeacherId(3));
    }

    #[test]
    fn test_dataset_rejects_unknown_extension() {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(Dataset::from_file(file.path()).is_err());
    }
}
