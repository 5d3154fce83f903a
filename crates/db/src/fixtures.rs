//! Demo directory used by `compass seed` and the repository tests.
//!
//! The dataset is small but exercises every query path: managers and
//! individual contributors, an employee with no recorded skills, and
//! specializations with partial overlap against seeded skill sets.

use sqlx::Row;

use crate::DbPool;

struct SeedEmployee {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    job_title: &'static str,
    department: &'static str,
    unit: Option<&'static str>,
    hire_date: &'static str,
    in_role_since: &'static str,
    skills: &'static [&'static str],
    history: &'static [(&'static str, &'static str, Option<&'static str>)],
}

const EMPLOYEES: &[SeedEmployee] = &[
    SeedEmployee {
        id: "E001",
        name: "Aisha Rahman",
        email: "aisha.rahman@example.com",
        job_title: "Engineering Manager",
        department: "Engineering",
        unit: Some("Platform"),
        hire_date: "2015-03-02",
        in_role_since: "2021-06-01",
        skills: &["Python", "SQL", "System Design", "Leadership"],
        history: &[
            ("Software Engineer", "2015-03-02", Some("2018-01-15")),
            ("Senior Software Engineer", "2018-01-15", Some("2021-06-01")),
            ("Engineering Manager", "2021-06-01", None),
        ],
    },
    SeedEmployee {
        id: "E002",
        name: "Ben Tan",
        email: "ben.tan@example.com",
        job_title: "Software Engineer",
        department: "Engineering",
        unit: Some("Payments"),
        hire_date: "2021-08-16",
        in_role_since: "2023-04-03",
        skills: &["Python", "SQL", "Git"],
        history: &[
            ("Graduate Engineer", "2021-08-16", Some("2023-04-03")),
            ("Software Engineer", "2023-04-03", None),
        ],
    },
    SeedEmployee {
        id: "E003",
        name: "Chloe Lim",
        email: "chloe.lim@example.com",
        job_title: "Data Engineer",
        department: "Data",
        unit: None,
        hire_date: "2019-11-04",
        in_role_since: "2022-02-14",
        skills: &["Python", "SQL", "Airflow", "Spark"],
        history: &[
            ("Analyst", "2019-11-04", Some("2022-02-14")),
            ("Data Engineer", "2022-02-14", None),
        ],
    },
    SeedEmployee {
        id: "E004",
        name: "Divya Nair",
        email: "divya.nair@example.com",
        job_title: "Solutions Architect",
        department: "Engineering",
        unit: Some("Cloud"),
        hire_date: "2017-07-10",
        in_role_since: "2020-09-21",
        skills: &["AWS", "Terraform", "System Design", "Networking"],
        history: &[
            ("Systems Engineer", "2017-07-10", Some("2020-09-21")),
            ("Solutions Architect", "2020-09-21", None),
        ],
    },
    SeedEmployee {
        id: "E005",
        name: "Ethan Koh",
        email: "ethan.koh@example.com",
        job_title: "Junior Developer",
        department: "Engineering",
        unit: Some("Payments"),
        hire_date: "2025-01-06",
        in_role_since: "2025-01-06",
        skills: &[],
        history: &[],
    },
];

const SPECIALIZATIONS: &[(&str, &[&str])] = &[
    ("Data Engineering", &["Python", "SQL", "Airflow", "Spark", "ETL Design"]),
    ("Cloud Architecture", &["AWS", "Terraform", "Networking", "System Design"]),
    ("Machine Learning", &["Python", "Statistics", "PyTorch", "MLOps"]),
    ("Frontend Development", &["JavaScript", "React", "CSS"]),
];

const EXPERIENCES: &[(&str, &str, Option<&str>, &str, &str, Option<&str>, Option<&str>)] = &[
    (
        "E001",
        "Program",
        Some("National University of Singapore"),
        "Executive Leadership Certificate",
        "2020-02-01",
        Some("2020-11-30"),
        Some("People management"),
    ),
    (
        "E003",
        "Secondment",
        Some("GovTech"),
        "Data Platform Exchange",
        "2023-05-01",
        None,
        Some("Streaming pipelines"),
    ),
];

pub struct DemoDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetCounts {
    pub employees: i64,
    pub skills: i64,
    pub specializations: i64,
}

impl DemoDataset {
    /// Loads the demo directory. A no-op when employees already exist, so
    /// `compass seed` can be re-run safely.
    pub async fn load(pool: &DbPool) -> Result<DatasetCounts, sqlx::Error> {
        let existing: i64 = sqlx::query("SELECT COUNT(*) AS n FROM employees")
            .fetch_one(pool)
            .await?
            .try_get("n")?;
        if existing > 0 {
            return Self::verify(pool).await;
        }

        let mut tx = pool.begin().await?;

        for (name, skills) in SPECIALIZATIONS {
            let specialization_id: i64 = sqlx::query(
                "INSERT INTO specializations (specialization_name) VALUES (?)
                 RETURNING specialization_id",
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?
            .try_get("specialization_id")?;

            for skill in *skills {
                sqlx::query(
                    "INSERT INTO skills (skill_name, specialization_id) VALUES (?, ?)
                     ON CONFLICT(skill_name) DO NOTHING",
                )
                .bind(skill)
                .bind(specialization_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        for employee in EMPLOYEES {
            sqlx::query(
                "INSERT INTO employees
                     (employee_id, name, email, job_title, department, unit,
                      hire_date, in_role_since)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(employee.id)
            .bind(employee.name)
            .bind(employee.email)
            .bind(employee.job_title)
            .bind(employee.department)
            .bind(employee.unit)
            .bind(employee.hire_date)
            .bind(employee.in_role_since)
            .execute(&mut *tx)
            .await?;

            for skill in employee.skills {
                // Skills outside every specialization still exist, unattached.
                sqlx::query(
                    "INSERT INTO skills (skill_name) VALUES (?)
                     ON CONFLICT(skill_name) DO NOTHING",
                )
                .bind(skill)
                .execute(&mut *tx)
                .await?;

                sqlx::query(
                    "INSERT INTO employee_skills (employee_id, skill_id)
                     SELECT ?, skill_id FROM skills WHERE skill_name = ?",
                )
                .bind(employee.id)
                .bind(skill)
                .execute(&mut *tx)
                .await?;
            }

            for (title, start, end) in employee.history {
                sqlx::query(
                    "INSERT INTO position_history (employee_id, job_title, start_date, end_date)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(employee.id)
                .bind(title)
                .bind(start)
                .bind(*end)
                .execute(&mut *tx)
                .await?;
            }
        }

        for (employee_id, kind, organization, program, start, end, focus) in EXPERIENCES {
            sqlx::query(
                "INSERT INTO experiences
                     (employee_id, kind, organization, program, start_date, end_date, focus)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(employee_id)
            .bind(kind)
            .bind(*organization)
            .bind(program)
            .bind(start)
            .bind(*end)
            .bind(*focus)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::verify(pool).await
    }

    pub async fn verify(pool: &DbPool) -> Result<DatasetCounts, sqlx::Error> {
        let row = sqlx::query(
            "SELECT (SELECT COUNT(*) FROM employees) AS employees,
                    (SELECT COUNT(*) FROM skills) AS skills,
                    (SELECT COUNT(*) FROM specializations) AS specializations",
        )
        .fetch_one(pool)
        .await?;

        Ok(DatasetCounts {
            employees: row.try_get("employees")?,
            skills: row.try_get("skills")?,
            specializations: row.try_get("specializations")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DemoDataset;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn load_is_idempotent() {
        let pool =
            connect_with_settings("sqlite:file:fixtures_load_test?mode=memory&cache=shared", 1, 5)
                .await
                .expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");

        let first = DemoDataset::load(&pool).await.expect("initial load");
        let second = DemoDataset::load(&pool).await.expect("repeat load");

        assert_eq!(first, second);
        assert_eq!(first.employees, 5);
        assert!(first.skills >= 10);
        pool.close().await;
    }
}
