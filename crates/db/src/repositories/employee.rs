use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;

use compass_core::domain::employee::{
    Employee, EmployeeDetails, EmployeeId, ExperienceRecord, MentorCandidate, SpecializationMatch,
};
use compass_core::leadership::{LeadershipFeatures, TrainingSample};

use super::{EmployeeRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEmployeeRepository {
    pool: DbPool,
}

impl SqlEmployeeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn link_skills(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        id: &EmployeeId,
        skills: &[String],
    ) -> Result<(), RepositoryError> {
        for raw_name in skills {
            let name = raw_name.trim();
            if name.is_empty() {
                continue;
            }

            let existing =
                sqlx::query("SELECT skill_id FROM skills WHERE skill_name = ? COLLATE NOCASE")
                    .bind(name)
                    .fetch_optional(&mut **tx)
                    .await?;

            let skill_id: i64 = match existing {
                Some(row) => row.try_get("skill_id")?,
                None => {
                    sqlx::query("INSERT INTO skills (skill_name) VALUES (?) RETURNING skill_id")
                        .bind(name)
                        .fetch_one(&mut **tx)
                        .await?
                        .try_get("skill_id")?
                }
            };

            sqlx::query(
                "INSERT OR IGNORE INTO employee_skills (employee_id, skill_id) VALUES (?, ?)",
            )
            .bind(&id.0)
            .bind(skill_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn find_by_id(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        let row = sqlx::query(
            "SELECT employee_id, name, email, job_title, department, unit, hire_date, in_role_since
             FROM employees WHERE employee_id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Employee {
            id: EmployeeId(row.try_get("employee_id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            job_title: row.try_get("job_title")?,
            department: row.try_get("department")?,
            unit: row.try_get("unit")?,
            hire_date: row.try_get::<NaiveDate, _>("hire_date")?,
            in_role_since: row.try_get::<NaiveDate, _>("in_role_since")?,
        }))
    }

    async fn has_skills(&self, id: &EmployeeId) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 AS present FROM employee_skills WHERE employee_id = ? LIMIT 1")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn skills_for(&self, id: &EmployeeId) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT sk.skill_name FROM skills sk
             JOIN employee_skills es ON es.skill_id = sk.skill_id
             WHERE es.employee_id = ?
             ORDER BY sk.skill_name",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|row| row.try_get("skill_name").map_err(Into::into)).collect()
    }

    async fn add_skills(&self, id: &EmployeeId, skills: &[String]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        Self::link_skills(&mut tx, id, skills).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn required_skills_for(
        &self,
        role: &str,
    ) -> Result<Option<(String, Vec<String>)>, RepositoryError> {
        let term = role.trim();
        if term.is_empty() {
            return Ok(None);
        }

        // Shortest matching name is treated as the closest match.
        let specialization = sqlx::query(
            "SELECT specialization_id, specialization_name FROM specializations
             WHERE specialization_name LIKE '%' || ? || '%' COLLATE NOCASE
             ORDER BY length(specialization_name) ASC
             LIMIT 1",
        )
        .bind(term)
        .fetch_optional(&self.pool)
        .await?;

        let Some(specialization) = specialization else {
            return Ok(None);
        };

        let specialization_id: i64 = specialization.try_get("specialization_id")?;
        let specialization_name: String = specialization.try_get("specialization_name")?;

        let rows = sqlx::query(
            "SELECT skill_name FROM skills WHERE specialization_id = ? ORDER BY skill_name",
        )
        .bind(specialization_id)
        .fetch_all(&self.pool)
        .await?;

        let skills = rows
            .into_iter()
            .map(|row| row.try_get("skill_name").map_err(RepositoryError::from))
            .collect::<Result<Vec<String>, _>>()?;

        Ok(Some((specialization_name, skills)))
    }

    async fn specialization_matches(
        &self,
        id: &EmployeeId,
    ) -> Result<Vec<SpecializationMatch>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT s.specialization_name,
                    COUNT(sk.skill_id) * 100.0
                        / (SELECT COUNT(*) FROM skills
                           WHERE specialization_id = s.specialization_id) AS overlap_pct
             FROM specializations s
             JOIN skills sk ON sk.specialization_id = s.specialization_id
             WHERE sk.skill_id IN (SELECT skill_id FROM employee_skills WHERE employee_id = ?)
             GROUP BY s.specialization_id, s.specialization_name",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SpecializationMatch {
                    specialization_name: row.try_get("specialization_name")?,
                    overlap_pct: row.try_get("overlap_pct")?,
                })
            })
            .collect()
    }

    async fn mentor_candidates(
        &self,
        term: &str,
        exclude: &EmployeeId,
    ) -> Result<Vec<MentorCandidate>, RepositoryError> {
        let term = term.trim();
        if term.is_empty() {
            // A blank pattern would LIKE-match every skilled employee.
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT DISTINCT e.name, e.email, e.job_title,
                    CAST(julianday('now') - julianday(e.in_role_since) AS INTEGER) AS days_in_role
             FROM employees e
             JOIN employee_skills es ON es.employee_id = e.employee_id
             JOIN skills sk ON sk.skill_id = es.skill_id
             WHERE sk.skill_name LIKE '%' || ? || '%' COLLATE NOCASE
               AND e.employee_id <> ?",
        )
        .bind(term)
        .bind(&exclude.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(MentorCandidate {
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    job_title: row.try_get("job_title")?,
                    days_in_role: row.try_get("days_in_role")?,
                })
            })
            .collect()
    }

    async fn leadership_features(
        &self,
        id: &EmployeeId,
    ) -> Result<Option<LeadershipFeatures>, RepositoryError> {
        let row = sqlx::query(
            "SELECT CAST(julianday('now') - julianday(e.hire_date) AS INTEGER) AS tenure_days,
                    (SELECT COUNT(*) - 1 FROM position_history ph
                     WHERE ph.employee_id = e.employee_id) AS promotions,
                    (SELECT COUNT(*) FROM employee_skills es
                     WHERE es.employee_id = e.employee_id) AS skill_count
             FROM employees e
             WHERE e.employee_id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(LeadershipFeatures {
            tenure_days: row.try_get("tenure_days")?,
            promotions: row.try_get("promotions")?,
            skill_count: row.try_get("skill_count")?,
        }))
    }

    async fn details_for(&self, id: &EmployeeId) -> Result<EmployeeDetails, RepositoryError> {
        let skills = self.skills_for(id).await?;

        let rows = sqlx::query(
            "SELECT kind, organization, program, start_date, end_date, focus
             FROM experiences WHERE employee_id = ?
             ORDER BY start_date",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        let experiences = rows
            .into_iter()
            .map(|row| {
                Ok(ExperienceRecord {
                    kind: row.try_get("kind")?,
                    organization: row.try_get("organization")?,
                    program: row.try_get("program")?,
                    start_date: row.try_get::<NaiveDate, _>("start_date")?,
                    end_date: row.try_get::<Option<NaiveDate>, _>("end_date")?,
                    focus: row.try_get("focus")?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(EmployeeDetails { skills, experiences })
    }

    async fn replace_details(
        &self,
        id: &EmployeeId,
        details: &EmployeeDetails,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM employee_skills WHERE employee_id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        Self::link_skills(&mut tx, id, &details.skills).await?;

        sqlx::query("DELETE FROM experiences WHERE employee_id = ?")
            .bind(&id.0)
            .execute(&mut *tx)
            .await?;
        for experience in &details.experiences {
            sqlx::query(
                "INSERT INTO experiences
                     (employee_id, kind, organization, program, start_date, end_date, focus)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&id.0)
            .bind(&experience.kind)
            .bind(&experience.organization)
            .bind(&experience.program)
            .bind(experience.start_date)
            .bind(experience.end_date)
            .bind(&experience.focus)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn training_samples(
        &self,
        leader_keywords: &[&str],
    ) -> Result<Vec<TrainingSample>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT e.job_title,
                    CAST(julianday('now') - julianday(e.hire_date) AS INTEGER) AS tenure_days,
                    (SELECT COUNT(*) FROM position_history ph
                     WHERE ph.employee_id = e.employee_id) AS history_rows,
                    (SELECT COUNT(*) FROM employee_skills es
                     WHERE es.employee_id = e.employee_id) AS skill_count
             FROM employees e",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let job_title: String = row.try_get("job_title")?;
                let history_rows: i64 = row.try_get("history_rows")?;
                // Employees with no recorded history count as zero
                // promotions; with history, rows minus one.
                let promotions = if history_rows == 0 { 0 } else { history_rows - 1 };

                Ok(TrainingSample {
                    features: LeadershipFeatures {
                        tenure_days: row.try_get("tenure_days")?,
                        promotions,
                        skill_count: row.try_get("skill_count")?,
                    },
                    is_leader: leader_keywords
                        .iter()
                        .any(|keyword| job_title.contains(keyword)),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use compass_core::domain::employee::{EmployeeDetails, EmployeeId, ExperienceRecord};
    use compass_core::skills::shortlist_recommendations;

    use super::SqlEmployeeRepository;
    use crate::repositories::EmployeeRepository;
    use crate::{connect_with_settings, migrations, DbPool, DemoDataset};

    // Named in-memory databases keep tests isolated; the anonymous shared
    // `:memory:` handle is process-wide.
    async fn seeded_pool(name: &str) -> DbPool {
        let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
        let pool = connect_with_settings(&url, 1, 5)
            .await
            .expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");
        DemoDataset::load(&pool).await.expect("fixtures should load");
        pool
    }

    fn id(raw: &str) -> EmployeeId {
        EmployeeId(raw.to_string())
    }

    #[tokio::test]
    async fn finds_known_employee_and_misses_unknown() {
        let pool = seeded_pool("repo_find").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let employee =
            repo.find_by_id(&id("E001")).await.expect("query").expect("E001 should exist");
        assert_eq!(employee.name, "Aisha Rahman");
        assert_eq!(employee.job_title, "Engineering Manager");

        assert!(repo.find_by_id(&id("E999")).await.expect("query").is_none());
        pool.close().await;
    }

    #[tokio::test]
    async fn skill_presence_tracks_employee_skill_rows() {
        let pool = seeded_pool("repo_has_skills").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        assert!(repo.has_skills(&id("E001")).await.expect("query"));
        // E005 is seeded without any skills (first-time user path).
        assert!(!repo.has_skills(&id("E005")).await.expect("query"));
        pool.close().await;
    }

    #[tokio::test]
    async fn add_skills_creates_and_links_without_duplicates() {
        let pool = seeded_pool("repo_add_skills").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        repo.add_skills(
            &id("E005"),
            &["Rust".to_string(), "SQL".to_string(), "rust".to_string(), "  ".to_string()],
        )
        .await
        .expect("skills should persist");

        let skills = repo.skills_for(&id("E005")).await.expect("query");
        assert_eq!(skills.len(), 2);
        assert!(skills.iter().any(|s| s.eq_ignore_ascii_case("rust")));
        pool.close().await;
    }

    #[tokio::test]
    async fn required_skills_match_is_fuzzy_and_case_insensitive() {
        let pool = seeded_pool("repo_required_skills").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let (name, skills) = repo
            .required_skills_for("data engineer")
            .await
            .expect("query")
            .expect("specialization should resolve");
        assert_eq!(name, "Data Engineering");
        assert!(skills.contains(&"Airflow".to_string()));

        assert!(repo.required_skills_for("Basket Weaving").await.expect("query").is_none());
        pool.close().await;
    }

    #[tokio::test]
    async fn specialization_matches_rank_by_overlap() {
        let pool = seeded_pool("repo_matches").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let matches = repo.specialization_matches(&id("E002")).await.expect("query");
        assert!(!matches.is_empty());

        let shortlist = shortlist_recommendations(matches);
        assert!(shortlist.len() <= 3);
        for window in shortlist.windows(2) {
            assert!(window[0].overlap_pct >= window[1].overlap_pct);
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn mentor_search_excludes_requester() {
        let pool = seeded_pool("repo_mentors").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let candidates = repo.mentor_candidates("python", &id("E002")).await.expect("query");
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|c| c.name != "Ben Tan"));

        let none = repo.mentor_candidates("underwater basket", &id("E002")).await.expect("query");
        assert!(none.is_empty());
        pool.close().await;
    }

    #[tokio::test]
    async fn mentor_search_with_blank_term_matches_nobody() {
        let pool = seeded_pool("repo_mentors_blank").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let blank = repo.mentor_candidates("   ", &id("E002")).await.expect("query");
        assert!(blank.is_empty());
        pool.close().await;
    }

    #[tokio::test]
    async fn leadership_features_reflect_history_and_skills() {
        let pool = seeded_pool("repo_features").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let features = repo
            .leadership_features(&id("E001"))
            .await
            .expect("query")
            .expect("E001 should exist");
        // E001 is seeded with three position-history rows.
        assert_eq!(features.promotions, 2);
        assert!(features.tenure_days > 0);
        assert!(features.skill_count > 0);

        // No history rows yields the unclamped minus-one value.
        let fresh = repo
            .leadership_features(&id("E005"))
            .await
            .expect("query")
            .expect("E005 should exist");
        assert_eq!(fresh.promotions, -1);

        assert!(repo.leadership_features(&id("E999")).await.expect("query").is_none());
        pool.close().await;
    }

    #[tokio::test]
    async fn replace_details_is_wholesale() {
        let pool = seeded_pool("repo_replace_details").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let details = EmployeeDetails {
            skills: vec!["Kubernetes".to_string()],
            experiences: vec![ExperienceRecord {
                kind: "Program".to_string(),
                organization: Some("PSA Singapore".to_string()),
                program: "Leadership Accelerator".to_string(),
                start_date: "2024-01-15".parse().expect("date"),
                end_date: None,
                focus: Some("People management".to_string()),
            }],
        };

        repo.replace_details(&id("E002"), &details).await.expect("update should persist");

        let stored = repo.details_for(&id("E002")).await.expect("query");
        assert_eq!(stored.skills, vec!["Kubernetes".to_string()]);
        assert_eq!(stored.experiences.len(), 1);
        assert_eq!(stored.experiences[0].program, "Leadership Accelerator");
        pool.close().await;
    }

    #[tokio::test]
    async fn training_samples_label_leaders_by_title() {
        let pool = seeded_pool("repo_training").await;
        let repo = SqlEmployeeRepository::new(pool.clone());

        let samples =
            repo.training_samples(&["Manager", "Lead", "Architect"]).await.expect("query");
        assert!(samples.len() >= 5);
        assert!(samples.iter().any(|s| s.is_leader));
        assert!(samples.iter().any(|s| !s.is_leader));
        // The no-history fill rule keeps training promotions non-negative.
        assert!(samples.iter().all(|s| s.features.promotions >= 0));
        pool.close().await;
    }
}
