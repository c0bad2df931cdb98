use tracing::{info, warn};

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeave, col};
use crate::model::to_cells;
use crate::notify::Notification;
use crate::sheets::{CellRange, LEAVE, Row, data_row_number};

fn parse_all(rows: &[Row]) -> Vec<(usize, LeaveRequest)> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| LeaveRequest::from_row(row).map(|l| (i, l)))
        .collect()
}

impl Repository {
    /// Leave requests filed by `email`. The owner column is compared exactly as
    /// stored, unlike employee lookup.
    pub async fn list_leaves(&self, email: &str) -> AppResult<Vec<LeaveRequest>> {
        let email = email.trim();
        let rows = self.data_rows(LEAVE, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(LeaveRequest::from_row)
            .filter(|l| l.email == email)
            .collect())
    }

    /// All requests, optionally limited to employees currently in `department`.
    pub async fn list_leave_requests(&self, department: Option<&str>) -> AppResult<Vec<LeaveRequest>> {
        let directory = self.directory().await?;
        let rows = self.data_rows(LEAVE, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(LeaveRequest::from_row)
            .filter(|l| directory.matches(&l.email, department))
            .collect())
    }

    pub async fn apply_leave(&self, new: &NewLeave) -> AppResult<()> {
        validation::new_leave(new)?;

        let department = self
            .resolve_department(&new.email)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found."))?;

        let _guard = self.lock(LEAVE).await;
        let rows = self.data_rows(LEAVE, col::LAST).await?;
        let existing: Vec<LeaveRequest> = rows.iter().filter_map(LeaveRequest::from_row).collect();
        validation::casual_leave_available(&existing, new)?;

        self.store.append_row(LEAVE, new.to_row(&department)).await?;
        info!(
            email = %new.email.trim(),
            leave_type = %new.leave_type,
            start = %new.start_date,
            end = %new.end_date,
            "Leave applied"
        );
        Ok(())
    }

    /// Decide a pending request keyed by (email, startDate). With duplicate keys the
    /// first pending row in sheet order is the one decided.
    pub async fn update_leave_status(
        &self,
        email: &str,
        start_date: &str,
        status: LeaveStatus,
    ) -> AppResult<LeaveRequest> {
        let (email, start_date) = (email.trim(), start_date.trim());

        let _guard = self.lock(LEAVE).await;
        let rows = self.data_rows(LEAVE, col::LAST).await?;
        let matches: Vec<_> = parse_all(&rows)
            .into_iter()
            .filter(|(_, l)| l.has_key(email, start_date))
            .collect();

        let pending = matches
            .iter()
            .find(|(_, l)| l.status == Some(LeaveStatus::Pending))
            .cloned();
        let Some((index, mut leave)) = pending else {
            let (_, first) = matches
                .first()
                .ok_or_else(|| AppError::not_found("Leave request not found."))?;
            validation::leave_transition(first.status, status)?;
            return Err(AppError::validation("Leave request is not pending."));
        };
        validation::leave_transition(leave.status, status)?;

        let row_number = data_row_number(index);
        self.store
            .update_range(LEAVE, CellRange::cell(col::STATUS, row_number), vec![to_cells([status.as_ref()])])
            .await?;
        leave.status = Some(status);
        info!(email = %email, start = %start_date, status = %status, row = row_number, "Leave status updated");

        self.notify(Notification::leave_status(
            &leave.email,
            &leave.start_date,
            &leave.end_date,
            &leave.reason,
            status.as_ref(),
        ));
        Ok(leave)
    }

    /// Remove the first request keyed by (email, startDate).
    pub async fn delete_leave(&self, email: &str, start_date: &str) -> AppResult<()> {
        let (email, start_date) = (email.trim(), start_date.trim());

        let _guard = self.lock(LEAVE).await;
        let rows = self.data_rows(LEAVE, col::LAST).await?;
        let Some((index, _)) = parse_all(&rows)
            .into_iter()
            .find(|(_, l)| l.has_key(email, start_date))
        else {
            warn!(email = %email, start = %start_date, "No leave request to delete");
            return Err(AppError::not_found("Leave request not found."));
        };

        let row_number = data_row_number(index);
        self.store.delete_row(LEAVE, row_number).await?;
        info!(email = %email, start = %start_date, row = row_number, "Leave request deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;
    use crate::model::leave_request::LeaveType;
    use chrono::NaiveDate;

    fn casual(email: &str, month: u32, day: u32) -> NewLeave {
        let date = NaiveDate::from_ymd_opt(2026, month, day).unwrap();
        NewLeave {
            email: email.into(),
            leave_type: LeaveType::Casual,
            start_date: date,
            end_date: date,
            reason: "family".into(),
        }
    }

    #[actix_web::test]
    async fn apply_stamps_department_and_starts_pending() {
        let f = fixture().await;
        f.repo.apply_leave(&casual("meera@company.com", 3, 9)).await.unwrap();

        let leaves = f.repo.list_leaves("meera@company.com").await.unwrap();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].status, Some(LeaveStatus::Pending));
        assert_eq!(leaves[0].department.as_deref(), Some("Finance"));
    }

    #[actix_web::test]
    async fn unknown_employee_cannot_apply() {
        let f = fixture().await;
        assert!(matches!(
            f.repo.apply_leave(&casual("ghost@company.com", 3, 9)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn second_casual_leave_in_a_month_is_rejected() {
        let f = fixture().await;
        f.repo.apply_leave(&casual("asha@company.com", 3, 9)).await.unwrap();

        let again = f.repo.apply_leave(&casual("asha@company.com", 3, 20)).await;
        assert_eq!(again, Err(AppError::validation(validation::CASUAL_LEAVE_TAKEN)));

        // Next month is fine.
        f.repo.apply_leave(&casual("asha@company.com", 4, 6)).await.unwrap();

        // So is the same month once the earlier request was rejected.
        f.repo
            .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Rejected)
            .await
            .unwrap();
        f.repo.apply_leave(&casual("asha@company.com", 3, 20)).await.unwrap();
    }

    #[actix_web::test]
    async fn owner_listing_is_case_sensitive() {
        let f = fixture().await;
        f.repo.apply_leave(&casual("Asha@Company.com", 3, 9)).await.unwrap();

        // Employee lookup resolved the department despite the different case...
        let all = f.repo.list_leave_requests(Some("Engineering")).await.unwrap();
        assert_eq!(all.len(), 1);
        // ...but owner queries compare the stored email exactly.
        assert!(f.repo.list_leaves("asha@company.com").await.unwrap().is_empty());
        assert_eq!(f.repo.list_leaves("Asha@Company.com").await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn department_filter_uses_current_department() {
        let f = fixture().await;
        f.repo.apply_leave(&casual("asha@company.com", 3, 9)).await.unwrap();
        f.repo.apply_leave(&casual("meera@company.com", 3, 9)).await.unwrap();

        assert_eq!(f.repo.list_leave_requests(None).await.unwrap().len(), 2);
        let finance = f.repo.list_leave_requests(Some("finance")).await.unwrap();
        assert_eq!(finance.len(), 1);
        assert_eq!(finance[0].email, "meera@company.com");
    }

    #[actix_web::test]
    async fn status_update_writes_cell_and_queues_one_notification() {
        let mut f = fixture().await;
        f.repo.apply_leave(&casual("asha@company.com", 3, 9)).await.unwrap();

        let leave = f
            .repo
            .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Approved)
            .await
            .unwrap();
        assert_eq!(leave.status, Some(LeaveStatus::Approved));

        let rows = f.store.data_rows(LEAVE).await;
        assert_eq!(rows[0][col::STATUS].as_deref(), Some("Approved"));

        let sent = f.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "asha@company.com");
        assert_eq!(sent[0].subject, "Leave Request Approved");
    }

    #[actix_web::test]
    async fn status_update_errors() {
        let mut f = fixture().await;
        assert!(matches!(
            f.repo
                .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Approved)
                .await,
            Err(AppError::NotFound(_))
        ));

        f.repo.apply_leave(&casual("asha@company.com", 3, 9)).await.unwrap();
        f.repo
            .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Approved)
            .await
            .unwrap();
        assert!(matches!(
            f.repo
                .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Rejected)
                .await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(f.sent().len(), 1);
    }

    #[actix_web::test]
    async fn duplicate_keys_decide_the_first_pending_row() {
        let f = fixture().await;
        for status in ["Rejected", "Pending", "Pending"] {
            f.store
                .push_raw(LEAVE, &["asha@company.com", "Sick", "2026-03-09", "2026-03-09", "flu", status])
                .await;
        }

        f.repo
            .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Approved)
            .await
            .unwrap();
        let statuses: Vec<_> = f
            .store
            .data_rows(LEAVE)
            .await
            .iter()
            .map(|r| r[col::STATUS].clone().unwrap_or_default())
            .collect();
        assert_eq!(statuses, ["Rejected", "Approved", "Pending"]);
    }

    #[actix_web::test]
    async fn delete_removes_first_match_only() {
        let f = fixture().await;
        f.repo.apply_leave(&casual("asha@company.com", 3, 9)).await.unwrap();
        f.repo.apply_leave(&casual("meera@company.com", 3, 9)).await.unwrap();

        f.repo.delete_leave("asha@company.com", "2026-03-09").await.unwrap();
        let left = f.repo.list_leave_requests(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].email, "meera@company.com");

        assert!(matches!(
            f.repo.delete_leave("asha@company.com", "2026-03-09").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn concurrent_update_and_delete_leave_no_partial_row() {
        let f = fixture().await;
        f.repo.apply_leave(&casual("asha@company.com", 3, 9)).await.unwrap();
        f.repo.apply_leave(&casual("meera@company.com", 3, 9)).await.unwrap();
        let bystander = f.store.data_rows(LEAVE).await[1].clone();

        let (updated, deleted) = futures::join!(
            f.repo
                .update_leave_status("asha@company.com", "2026-03-09", LeaveStatus::Approved),
            f.repo.delete_leave("asha@company.com", "2026-03-09"),
        );

        // Either order is acceptable; the delete always finds the row, the update
        // only if it ran first.
        assert!(deleted.is_ok());
        assert!(matches!(updated, Ok(_) | Err(AppError::NotFound(_))));

        let rows = f.store.data_rows(LEAVE).await;
        assert_eq!(rows, vec![bystander]);
    }
}
