use tracing::{debug, info};

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, col};
use crate::model::project::{NewProjectStatus, ProjectAllocation, ProjectStatus, status_col};
use crate::model::{format_hours, format_sheet_date, to_cells};
use crate::sheets::{CellRange, EMPLOYEES, PROJECT_STATUS, data_row_number};

impl Repository {
    /// Allocations of employees in `department` (all departments when `None`).
    ///
    /// Reading consumes hours: every allocation whose remaining hours dropped since
    /// its stored snapshot is written back as `[remaining, today]`, so the next read
    /// starts from the new snapshot.
    pub async fn list_projects(&self, department: Option<&str>) -> AppResult<Vec<ProjectAllocation>> {
        let filter = department.map(str::trim).filter(|d| !d.is_empty());
        let today = self.today();

        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::LAST).await?;

        let mut projects = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let Some(employee) = Employee::from_row(row) else {
                continue;
            };
            if filter.is_some_and(|d| !employee.department.eq_ignore_ascii_case(d)) {
                continue;
            }
            let Some(mut allocation) = ProjectAllocation::from_employee(&employee, today) else {
                continue;
            };

            if allocation.remaining_hours != allocation.allocated_hours {
                let row_number = data_row_number(index);
                self.write_hours(row_number, allocation.remaining_hours).await?;
                debug!(
                    email = %allocation.employee_email,
                    project = %allocation.project_name,
                    from = allocation.allocated_hours,
                    to = allocation.remaining_hours,
                    row = row_number,
                    "Remaining hours synced"
                );
                allocation.allocated_hours = allocation.remaining_hours;
                allocation.start_date = format_sheet_date(today);
            }
            projects.push(allocation);
        }
        Ok(projects)
    }

    pub async fn list_department_projects(&self, department: &str) -> AppResult<Vec<ProjectAllocation>> {
        validation::required(department, "Department")?;
        self.list_projects(Some(department)).await
    }

    /// Overwrite the remaining hours of every allocation of `project_name` in
    /// `department`. Returns how many allocations were updated.
    pub async fn update_project_hours(&self, department: &str, project_name: &str, hours: f64) -> AppResult<usize> {
        validation::required(department, "Department")?;
        validation::required(project_name, "Project name")?;
        if !(hours.is_finite() && hours >= 0.0) {
            return Err(AppError::validation("Remaining hours must be zero or more."));
        }
        let (department, project_name) = (department.trim(), project_name.trim());

        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::LAST).await?;
        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| Employee::from_row(row).map(|e| (i, e)))
            .filter(|(_, e)| {
                e.department.eq_ignore_ascii_case(department)
                    && e.project_name
                        .as_deref()
                        .is_some_and(|p| p.trim().eq_ignore_ascii_case(project_name))
            })
            .map(|(i, _)| i)
            .collect();

        if targets.is_empty() {
            return Err(AppError::not_found(format!(
                "Project '{project_name}' not found in {department}."
            )));
        }
        for &index in &targets {
            self.write_hours(data_row_number(index), hours).await?;
        }
        info!(department = %department, project = %project_name, hours, updated = targets.len(), "Project hours updated");
        Ok(targets.len())
    }

    async fn write_hours(&self, row_number: u32, hours: f64) -> AppResult<()> {
        self.store
            .update_range(
                EMPLOYEES,
                CellRange::row(col::ALLOCATED_HOURS, col::START_DATE, row_number),
                vec![to_cells([format_hours(hours), format_sheet_date(self.today())])],
            )
            .await
    }

    pub async fn add_project_status(&self, new: &NewProjectStatus) -> AppResult<ProjectStatus> {
        validation::required(&new.employee_email, "Employee email")?;
        validation::required(&new.project_name, "Project name")?;

        if self.resolve_department(&new.employee_email).await?.is_none() {
            return Err(AppError::not_found("Employee not found."));
        }

        let timestamp = new
            .timestamp
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.clock.timestamp());
        let row = new.to_row(&timestamp);
        let status = ProjectStatus::from_row(&row)
            .ok_or_else(|| AppError::validation("Employee email is required."))?;

        self.store.append_row(PROJECT_STATUS, row).await?;
        info!(email = %status.employee_email, project = %status.project_name, "Project status added");
        Ok(status)
    }

    pub async fn list_project_status(&self, email: &str) -> AppResult<Vec<ProjectStatus>> {
        let email = email.trim();
        let rows = self.data_rows(PROJECT_STATUS, status_col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(ProjectStatus::from_row)
            .filter(|s| s.employee_email == email)
            .collect())
    }

    pub async fn list_all_project_status(&self, department: Option<&str>) -> AppResult<Vec<ProjectStatus>> {
        let directory = self.directory().await?;
        let rows = self.data_rows(PROJECT_STATUS, status_col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(ProjectStatus::from_row)
            .filter(|s| directory.matches(&s.employee_email, department))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{fixture, today};
    use super::*;
    use crate::model::project::NewAllocation;
    use chrono::NaiveDate;

    async fn allocate(repo: &Repository, email: &str, project: &str, hours: f64) {
        repo.allocate_project(&NewAllocation {
            employee_email: email.into(),
            project_name: project.into(),
            allocated_hours: hours,
            // Monday; the fixture's today is the Thursday after.
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            department: None,
        })
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn reading_consumes_elapsed_weekdays_once() {
        let f = fixture().await;
        allocate(&f.repo, "asha@company.com", "Payments", 160.0).await;

        let projects = f.repo.list_department_projects("Engineering").await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].remaining_hours, 136.0);
        assert_eq!(projects[0].start_date, format_sheet_date(today()));

        // The snapshot moved forward, so a second read on the same day deducts nothing.
        let again = f.repo.list_department_projects("engineering").await.unwrap();
        assert_eq!(again[0].remaining_hours, 136.0);
        assert_eq!(again[0].allocated_hours, 136.0);

        let stored = f.repo.find_employee("asha@company.com").await.unwrap();
        assert_eq!(stored.allocated_hours, Some(136.0));
        assert_eq!(stored.start_date.as_deref(), Some("2026-03-05"));
    }

    #[actix_web::test]
    async fn only_allocated_employees_of_the_department_are_listed() {
        let f = fixture().await;
        allocate(&f.repo, "asha@company.com", "Payments", 40.0).await;
        allocate(&f.repo, "meera@company.com", "Ledger", 40.0).await;

        let eng = f.repo.list_department_projects("Engineering").await.unwrap();
        assert_eq!(eng.len(), 1);
        assert_eq!(eng[0].employee_email, "asha@company.com");
        assert_eq!(f.repo.list_projects(None).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn manual_hours_update_targets_department_and_project() {
        let f = fixture().await;
        allocate(&f.repo, "asha@company.com", "Payments", 160.0).await;
        allocate(&f.repo, "ravi@company.com", "Payments", 160.0).await;
        allocate(&f.repo, "meera@company.com", "Payments", 160.0).await;

        let updated = f.repo.update_project_hours("Engineering", "payments", 50.0).await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(
            f.repo.find_employee("ravi@company.com").await.unwrap().allocated_hours,
            Some(50.0)
        );
        assert_eq!(
            f.repo.find_employee("meera@company.com").await.unwrap().allocated_hours,
            Some(160.0)
        );

        assert!(matches!(
            f.repo.update_project_hours("Engineering", "Unknown", 1.0).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.repo.update_project_hours("Engineering", "Payments", -1.0).await,
            Err(AppError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn status_log_defaults_timestamp_and_filters_by_department() {
        let f = fixture().await;
        let added = f
            .repo
            .add_project_status(&NewProjectStatus {
                employee_email: "asha@company.com".into(),
                project_name: "Payments".into(),
                timestamp: None,
                screenshot_url: None,
                feedback: "Checkout flow done".into(),
            })
            .await
            .unwrap();
        assert_eq!(added.timestamp, "2026-03-05T00:00:00");

        assert_eq!(f.repo.list_project_status("asha@company.com").await.unwrap(), vec![added]);
        assert_eq!(f.repo.list_all_project_status(Some("Engineering")).await.unwrap().len(), 1);
        assert!(f.repo.list_all_project_status(Some("Finance")).await.unwrap().is_empty());
    }
}
