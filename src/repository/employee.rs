use tracing::info;

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee, col};
use crate::model::project::NewAllocation;
use crate::model::{department, format_hours, format_sheet_date, same_email, to_cells};
use crate::sheets::{CellRange, DEPARTMENTS, EMPLOYEES, Row, data_row_number};

const EMPLOYEE_NOT_FOUND: &str = "User not found.";

/// First data row whose email matches, case-insensitively.
fn position(rows: &[Row], email: &str) -> Option<(usize, Employee)> {
    rows.iter().enumerate().find_map(|(i, row)| {
        Employee::from_row(row)
            .filter(|e| same_email(&e.email, email))
            .map(|e| (i, e))
    })
}

impl Repository {
    pub async fn find_employee(&self, email: &str) -> AppResult<Employee> {
        let rows = self.data_rows(EMPLOYEES, col::LAST).await?;
        position(&rows, email)
            .map(|(_, employee)| employee)
            .ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))
    }

    /// Look up by email and check the stored role against the one the caller picked.
    pub async fn login(&self, email: &str, selected_role: &str) -> AppResult<Employee> {
        validation::required(email, "Email")?;
        validation::required(selected_role, "Role")?;

        let employee = self.find_employee(email).await?;
        if !employee.role.matches(selected_role) {
            info!(email = %email, stored = %employee.role, selected = %selected_role, "Role mismatch on login");
            return Err(AppError::RoleMismatch);
        }
        Ok(employee)
    }

    pub async fn list_employees(&self, department: Option<&str>) -> AppResult<Vec<Employee>> {
        let filter = department.map(str::trim).filter(|d| !d.is_empty());
        let rows = self.data_rows(EMPLOYEES, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(Employee::from_row)
            .filter(|e| filter.is_none_or(|d| e.department.eq_ignore_ascii_case(d)))
            .collect())
    }

    pub async fn list_departments(&self) -> AppResult<Vec<String>> {
        let rows = self
            .store
            .read_range(DEPARTMENTS, CellRange::data(department::NAME, department::NAME))
            .await?;
        Ok(rows.iter().filter_map(department::from_row).collect())
    }

    pub async fn add_employee(&self, new: &NewEmployee) -> AppResult<()> {
        let departments = self.list_departments().await?;
        let role = validation::new_employee(new, &departments)?;

        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::EMAIL).await?;
        if position(&rows, &new.email).is_some() {
            return Err(AppError::validation("An employee with this email already exists."));
        }

        self.store.append_row(EMPLOYEES, new.to_row(role)).await?;
        info!(email = %new.email.trim(), department = %new.department.trim(), "Employee added");
        Ok(())
    }

    /// Merge the non-blank fields of `update` into the stored row. Photo and project
    /// columns are left as they are.
    pub async fn update_employee(&self, email: &str, update: &EmployeeUpdate) -> AppResult<Employee> {
        let role = match update.role.as_deref().filter(|r| !r.trim().is_empty()) {
            Some(r) => Some(validation::role(r)?),
            None => None,
        };
        if let Some(d) = update.department.as_deref().filter(|d| !d.trim().is_empty()) {
            validation::department(d, &self.list_departments().await?)?;
        }

        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::LAST).await?;
        let (index, _) = position(&rows, email).ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))?;

        if let Some(new_email) = update.email.as_deref().filter(|e| !e.trim().is_empty()) {
            let taken = rows
                .iter()
                .enumerate()
                .any(|(i, row)| i != index && Employee::from_row(row).is_some_and(|e| same_email(&e.email, new_email)));
            if taken {
                return Err(AppError::validation("An employee with this email already exists."));
            }
        }

        let stored = &rows[index];
        let merged = update.merge(stored, role);
        let row_number = data_row_number(index);
        self.store
            .update_range(EMPLOYEES, CellRange::row(col::EMAIL, col::ROLE, row_number), vec![merged.clone()])
            .await?;
        info!(email = %email, row = row_number, "Employee updated");

        // Keep the untouched project columns in the returned record.
        let mut full = merged;
        full.extend(stored.iter().skip(col::ROLE + 1).cloned());
        Employee::from_row(&full).ok_or_else(|| AppError::store("updated employee row has no email"))
    }

    pub async fn delete_employee(&self, email: &str) -> AppResult<()> {
        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::EMAIL).await?;
        let (index, _) = position(&rows, email).ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))?;

        let row_number = data_row_number(index);
        self.store.delete_row(EMPLOYEES, row_number).await?;
        info!(email = %email, row = row_number, "Employee deleted");
        Ok(())
    }

    /// Store the uploaded photo's URL. Drive links are rewritten on read.
    pub async fn set_photo_url(&self, email: &str, url: &str) -> AppResult<()> {
        validation::required(url, "Photo URL")?;

        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::EMAIL).await?;
        let (index, _) = position(&rows, email).ok_or_else(|| AppError::not_found(EMPLOYEE_NOT_FOUND))?;

        self.store
            .update_range(
                EMPLOYEES,
                CellRange::cell(col::PHOTO_URL, data_row_number(index)),
                vec![to_cells([url.trim()])],
            )
            .await?;
        info!(email = %email, "Photo URL updated");
        Ok(())
    }

    /// Write project name, hours and start date into the employee's allocation columns.
    pub async fn allocate_project(&self, allocation: &NewAllocation) -> AppResult<()> {
        validation::required(&allocation.employee_email, "Employee email")?;
        validation::required(&allocation.project_name, "Project name")?;
        if !(allocation.allocated_hours.is_finite() && allocation.allocated_hours > 0.0) {
            return Err(AppError::validation("Allocated hours must be a positive number."));
        }

        let _guard = self.lock(EMPLOYEES).await;
        let rows = self.data_rows(EMPLOYEES, col::LAST).await?;
        let (index, employee) = position(&rows, &allocation.employee_email)
            .ok_or_else(|| AppError::not_found("Employee not found for project allocation."))?;

        if let Some(d) = allocation.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            if !employee.department.eq_ignore_ascii_case(d) {
                return Err(AppError::validation(format!(
                    "{} is not in the {d} department.",
                    employee.email
                )));
            }
        }

        self.store
            .update_range(
                EMPLOYEES,
                CellRange::row(col::PROJECT_NAME, col::START_DATE, data_row_number(index)),
                vec![to_cells([
                    allocation.project_name.trim().to_string(),
                    format_hours(allocation.allocated_hours),
                    format_sheet_date(allocation.start_date),
                ])],
            )
            .await?;
        info!(
            email = %employee.email,
            project = %allocation.project_name.trim(),
            hours = allocation.allocated_hours,
            "Project allocated"
        );
        Ok(())
    }
}
