//! System prompts for the two generative flows. The coach persona carries
//! the employee's structured context; the support persona is deliberately
//! constrained to listening.

use compass_core::domain::employee::Employee;

pub fn coach_prompt(employee: &Employee, skills: &[String]) -> String {
    let skill_summary = if skills.is_empty() {
        "not recorded yet".to_string()
    } else {
        skills.join(", ")
    };

    format!(
        "You are a helpful career coach for PSA. You are speaking with {name} \
         (employee {id}), a {job_title} in the {department} department. \
         Their recorded skills are: {skills}. \
         Keep replies concise, practical, and grounded in the employee's context.",
        name = employee.name,
        id = employee.id,
        job_title = employee.job_title,
        department = employee.department,
        skills = skill_summary,
    )
}

pub fn support_prompt(employee_name: &str) -> String {
    format!(
        "You are an empathetic listener supporting {employee_name}, a PSA employee \
         who is going through a difficult moment. Listen, acknowledge their feelings, \
         and ask gentle open questions. Do not offer career advice, action plans, or \
         solutions unless they explicitly ask for them. Where appropriate, remind them \
         that confidential help is available through the Employee Assistance Programme."
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use compass_core::domain::employee::{Employee, EmployeeId};

    use super::{coach_prompt, support_prompt};

    fn employee() -> Employee {
        Employee {
            id: EmployeeId("E010".to_string()),
            name: "Mei Ling".to_string(),
            email: "mei.ling@example.com".to_string(),
            job_title: "Operations Analyst".to_string(),
            department: "Operations".to_string(),
            unit: None,
            hire_date: NaiveDate::from_ymd_opt(2022, 5, 9).unwrap(),
            in_role_since: NaiveDate::from_ymd_opt(2022, 5, 9).unwrap(),
        }
    }

    #[test]
    fn coach_prompt_carries_employee_context() {
        let prompt = coach_prompt(&employee(), &["Excel".to_string(), "SQL".to_string()]);
        assert!(prompt.contains("Mei Ling"));
        assert!(prompt.contains("E010"));
        assert!(prompt.contains("Operations Analyst"));
        assert!(prompt.contains("Excel, SQL"));
    }

    #[test]
    fn coach_prompt_handles_missing_skills() {
        let prompt = coach_prompt(&employee(), &[]);
        assert!(prompt.contains("not recorded yet"));
    }

    #[test]
    fn support_prompt_forbids_advice() {
        let prompt = support_prompt("Mei Ling");
        assert!(prompt.contains("Do not offer career advice"));
        assert!(prompt.contains("Employee Assistance Programme"));
    }
}
