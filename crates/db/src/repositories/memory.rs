//! In-memory directory used by conversation-engine tests, where spinning up
//! a SQLite pool per case would add nothing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use compass_core::domain::employee::{
    Employee, EmployeeDetails, EmployeeId, ExperienceRecord, MentorCandidate, SpecializationMatch,
};
use compass_core::leadership::{LeadershipFeatures, TrainingSample};

use super::{EmployeeRepository, RepositoryError};

#[derive(Default)]
struct DirectoryState {
    employees: HashMap<String, Employee>,
    skills: HashMap<String, Vec<String>>,
    experiences: HashMap<String, Vec<ExperienceRecord>>,
    specializations: HashMap<String, Vec<String>>,
    mentors: HashMap<String, Vec<MentorCandidate>>,
    features: HashMap<String, LeadershipFeatures>,
}

#[derive(Default)]
pub struct InMemoryEmployeeRepository {
    state: Mutex<DirectoryState>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut DirectoryState) -> T) -> T {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    pub fn insert_employee(&self, employee: Employee) {
        self.with_state(|s| {
            s.employees.insert(employee.id.0.clone(), employee);
        });
    }

    pub fn set_skills(&self, id: &EmployeeId, skills: Vec<String>) {
        self.with_state(|s| {
            s.skills.insert(id.0.clone(), skills);
        });
    }

    pub fn set_specialization(&self, name: &str, required: Vec<String>) {
        self.with_state(|s| {
            s.specializations.insert(name.to_string(), required);
        });
    }

    pub fn set_mentors(&self, term: &str, candidates: Vec<MentorCandidate>) {
        self.with_state(|s| {
            s.mentors.insert(term.to_lowercase(), candidates);
        });
    }

    pub fn set_features(&self, id: &EmployeeId, features: LeadershipFeatures) {
        self.with_state(|s| {
            s.features.insert(id.0.clone(), features);
        });
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Ok(self.with_state(|s| s.employees.get(&id.0).cloned()))
    }

    async fn has_skills(&self, id: &EmployeeId) -> Result<bool, RepositoryError> {
        Ok(self.with_state(|s| s.skills.get(&id.0).is_some_and(|v| !v.is_empty())))
    }

    async fn skills_for(&self, id: &EmployeeId) -> Result<Vec<String>, RepositoryError> {
        Ok(self.with_state(|s| s.skills.get(&id.0).cloned().unwrap_or_default()))
    }

    async fn add_skills(&self, id: &EmployeeId, skills: &[String]) -> Result<(), RepositoryError> {
        self.with_state(|s| {
            let entry = s.skills.entry(id.0.clone()).or_default();
            for raw in skills {
                let name = raw.trim();
                if name.is_empty() {
                    continue;
                }
                if !entry.iter().any(|have| have.eq_ignore_ascii_case(name)) {
                    entry.push(name.to_string());
                }
            }
        });
        Ok(())
    }

    async fn required_skills_for(
        &self,
        role: &str,
    ) -> Result<Option<(String, Vec<String>)>, RepositoryError> {
        let needle = role.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(self.with_state(|s| {
            s.specializations
                .iter()
                .find(|(name, _)| name.to_lowercase().contains(&needle))
                .map(|(name, skills)| (name.clone(), skills.clone()))
        }))
    }

    async fn specialization_matches(
        &self,
        id: &EmployeeId,
    ) -> Result<Vec<SpecializationMatch>, RepositoryError> {
        Ok(self.with_state(|s| {
            let have = s.skills.get(&id.0).cloned().unwrap_or_default();
            s.specializations
                .iter()
                .filter_map(|(name, required)| {
                    if required.is_empty() {
                        return None;
                    }
                    let overlap = required
                        .iter()
                        .filter(|req| have.iter().any(|h| h.eq_ignore_ascii_case(req)))
                        .count();
                    if overlap == 0 {
                        return None;
                    }
                    Some(SpecializationMatch {
                        specialization_name: name.clone(),
                        overlap_pct: overlap as f64 * 100.0 / required.len() as f64,
                    })
                })
                .collect()
        }))
    }

    async fn mentor_candidates(
        &self,
        term: &str,
        exclude: &EmployeeId,
    ) -> Result<Vec<MentorCandidate>, RepositoryError> {
        let excluded_name =
            self.with_state(|s| s.employees.get(&exclude.0).map(|e| e.name.clone()));
        Ok(self.with_state(|s| {
            s.mentors
                .get(&term.trim().to_lowercase())
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|c| Some(&c.name) != excluded_name.as_ref())
                .collect()
        }))
    }

    async fn leadership_features(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<LeadershipFeatures>, RepositoryError> {
        Ok(self.with_state(|s| s.features.get(&id.0).cloned()))
    }

    async fn details_for(&self, id: &EmployeeId) -> Result<EmployeeDetails, RepositoryError> {
        Ok(self.with_state(|s| EmployeeDetails {
            skills: s.skills.get(&id.0).cloned().unwrap_or_default(),
            experiences: s.experiences.get(&id.0).cloned().unwrap_or_default(),
        }))
    }

    async fn replace_details(
        &self,
        id: &EmployeeId,
        details: &EmployeeDetails,
    ) -> Result<(), RepositoryError> {
        self.with_state(|s| {
            s.skills.insert(id.0.clone(), details.skills.clone());
            s.experiences.insert(id.0.clone(), details.experiences.clone());
        });
        Ok(())
    }

    async fn training_samples(
        &self,
        leader_keywords: &[&str],
    ) -> Result<Vec<TrainingSample>, RepositoryError> {
        Ok(self.with_state(|s| {
            s.employees
                .values()
                .filter_map(|e| {
                    let features = s.features.get(&e.id.0).cloned()?;
                    Some(TrainingSample {
                        features,
                        is_leader: leader_keywords.iter().any(|k| e.job_title.contains(k)),
                    })
                })
                .collect()
        }))
    }
}
