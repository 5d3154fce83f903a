use async_trait::async_trait;
use thiserror::Error;

use compass_core::domain::employee::{
    Employee, EmployeeDetails, EmployeeId, MentorCandidate, SpecializationMatch,
};
use compass_core::leadership::{LeadershipFeatures, TrainingSample};

pub mod employee;
pub mod memory;

pub use employee::SqlEmployeeRepository;
pub use memory::InMemoryEmployeeRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read/write access to the employee directory. The conversation engine and
/// the HTTP surface consume this trait; production wires the SQL
/// implementation, tests wire the in-memory one.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError>;

    /// Whether the employee has any skill recorded at all.
    async fn has_skills(&self, id: &EmployeeId) -> Result<bool, RepositoryError>;

    async fn skills_for(&self, id: &EmployeeId) -> Result<Vec<String>, RepositoryError>;

    /// Get-or-create each skill by name and link it to the employee.
    /// Already-linked skills are left untouched.
    async fn add_skills(&self, id: &EmployeeId, skills: &[String]) -> Result<(), RepositoryError>;

    /// Fuzzy lookup of a target role: resolves to the closest specialization
    /// and its required skill list, or `None` when nothing matches.
    async fn required_skills_for(
        &self,
        role: &str,
    ) -> Result<Option<(String, Vec<String>)>, RepositoryError>;

    /// Overlap percentage of the employee's skills against every
    /// specialization they share at least one skill with.
    async fn specialization_matches(
        &self,
        id: &EmployeeId,
    ) -> Result<Vec<SpecializationMatch>, RepositoryError>;

    /// Employees whose skill names contain `term` (case-insensitive),
    /// excluding the requester.
    async fn mentor_candidates(
        &self,
        term: &str,
        exclude: &EmployeeId,
    ) -> Result<Vec<MentorCandidate>, RepositoryError>;

    /// The three scorer features, or `None` for an unknown employee.
    /// Promotion count is position-history rows minus one, unclamped.
    async fn leadership_features(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<LeadershipFeatures>, RepositoryError>;

    async fn details_for(&self, id: &EmployeeId) -> Result<EmployeeDetails, RepositoryError>;

    /// Replace the employee's editable profile slice wholesale.
    async fn replace_details(
        &self,
        id: &EmployeeId,
        details: &EmployeeDetails,
    ) -> Result<(), RepositoryError>;

    /// One labeled row per employee for offline model training. An employee
    /// is labeled a leader when their job title contains any of
    /// `leader_keywords`.
    async fn training_samples(
        &self,
        leader_keywords: &[&str],
    ) -> Result<Vec<TrainingSample>, RepositoryError>;
}
