use tracing::info;

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::same_email;
use crate::model::timesheet::{NewTimesheet, TimesheetEntry, col};
use crate::notify::Notification;
use crate::sheets::TIMESHEET;

impl Repository {
    /// Entries logged for `email`, compared exactly as stored.
    pub async fn list_timesheets(&self, email: &str) -> AppResult<Vec<TimesheetEntry>> {
        let email = email.trim();
        let rows = self.data_rows(TIMESHEET, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(TimesheetEntry::from_row)
            .filter(|t| t.email == email)
            .collect())
    }

    pub async fn list_department_timesheets(
        &self,
        department: Option<&str>,
    ) -> AppResult<Vec<TimesheetEntry>> {
        let directory = self.directory().await?;
        let rows = self.data_rows(TIMESHEET, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(TimesheetEntry::from_row)
            .filter(|t| directory.matches(&t.email, department))
            .collect())
    }

    /// Append an entry dated today. Returns the stored entry.
    pub async fn submit_timesheet(&self, new: &NewTimesheet) -> AppResult<TimesheetEntry> {
        validation::new_timesheet(new)?;
        let email = new
            .target_email()
            .ok_or_else(|| AppError::validation("Email is required."))?;

        let department = self
            .resolve_department(email)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found."))?;

        let row = new.to_row(email, self.today(), &department);
        let entry = TimesheetEntry::from_row(&row)
            .ok_or_else(|| AppError::validation("Email is required."))?;
        self.store.append_row(TIMESHEET, row).await?;
        info!(email = %email, project = %entry.project, hours = new.duration, "Timesheet submitted");
        Ok(entry)
    }

    /// Whether `email` logged positive hours today. Email case is ignored here so a
    /// reminder is never sent for a differently cased entry.
    pub async fn has_submitted_today(&self, email: &str) -> AppResult<bool> {
        let today = self.today();
        let rows = self.data_rows(TIMESHEET, col::DURATION).await?;
        Ok(rows
            .iter()
            .filter_map(TimesheetEntry::from_row)
            .any(|t| same_email(&t.email, email) && t.counts_for(today)))
    }

    /// Queue a reminder for every employee without a timesheet today. Returns how
    /// many were queued.
    pub async fn queue_timesheet_reminders(&self) -> AppResult<usize> {
        let today = self.today();
        let missing = self.employees_missing_timesheet(today).await?;
        for employee in &missing {
            self.notify(Notification::timesheet_reminder(&employee.email));
        }
        info!(date = %today, queued = missing.len(), "Timesheet reminders queued");
        Ok(missing.len())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{fixture, today};
    use super::*;
    use crate::model::format_sheet_date;

    fn entry(email: &str, hours: f64) -> NewTimesheet {
        NewTimesheet {
            employee_email: None,
            email: Some(email.into()),
            project: "Payments".into(),
            task: "Review".into(),
            duration: hours,
        }
    }

    #[actix_web::test]
    async fn submission_is_dated_today_and_stamped_with_department() {
        let f = fixture().await;
        let stored = f.repo.submit_timesheet(&entry("asha@company.com", 7.5)).await.unwrap();
        assert_eq!(stored.date, format_sheet_date(today()));
        assert_eq!(stored.department.as_deref(), Some("Engineering"));

        let listed = f.repo.list_timesheets("asha@company.com").await.unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[actix_web::test]
    async fn admin_can_log_for_someone_else() {
        let f = fixture().await;
        let mut ts = entry("ravi@company.com", 2.0);
        ts.employee_email = Some("meera@company.com".into());
        f.repo.submit_timesheet(&ts).await.unwrap();

        assert!(f.repo.list_timesheets("ravi@company.com").await.unwrap().is_empty());
        let finance = f.repo.list_department_timesheets(Some("Finance")).await.unwrap();
        assert_eq!(finance.len(), 1);
        assert_eq!(finance[0].email, "meera@company.com");
    }

    #[actix_web::test]
    async fn rejects_invalid_entries() {
        let f = fixture().await;
        assert!(matches!(
            f.repo.submit_timesheet(&entry("asha@company.com", 0.0)).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            f.repo.submit_timesheet(&entry("ghost@company.com", 1.0)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn submitted_today_ignores_other_days_and_case() {
        let f = fixture().await;
        f.store
            .push_raw(TIMESHEET, &["asha@company.com", "2026-03-04", "P", "T", "8"])
            .await;
        assert!(!f.repo.has_submitted_today("asha@company.com").await.unwrap());

        f.store
            .push_raw(TIMESHEET, &["ASHA@company.com", "3/5/2026", "P", "T", "1"])
            .await;
        assert!(f.repo.has_submitted_today("asha@company.com").await.unwrap());
    }

    #[actix_web::test]
    async fn reminders_go_to_everyone_who_has_not_logged_today() {
        let mut f = fixture().await;
        f.repo.submit_timesheet(&entry("asha@company.com", 8.0)).await.unwrap();

        assert_eq!(f.repo.queue_timesheet_reminders().await.unwrap(), 2);
        let mut to: Vec<_> = f.sent().into_iter().map(|n| n.to).collect();
        to.sort();
        assert_eq!(to, ["meera@company.com", "ravi@company.com"]);
    }
}
