use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub department: String,
    pub unit: Option<String>,
    pub hire_date: NaiveDate,
    pub in_role_since: NaiveDate,
}

/// Candidate returned by the mentor search. `days_in_role` is tenure in the
/// current role, used for ordering (ascending, newest first).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorCandidate {
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub days_in_role: i64,
}

/// One specialization scored against an employee's current skill set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecializationMatch {
    pub specialization_name: String,
    pub overlap_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub kind: String,
    pub organization: Option<String>,
    pub program: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub focus: Option<String>,
}

/// Editable slice of a profile, exposed by the details/update endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetails {
    pub skills: Vec<String>,
    pub experiences: Vec<ExperienceRecord>,
}
