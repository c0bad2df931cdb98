use tracing::info;

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::payslip::{NewPayslip, Payslip, col};
use crate::sheets::PAYSLIPS;

impl Repository {
    pub async fn list_payslips(&self, email: &str) -> AppResult<Vec<Payslip>> {
        let email = email.trim();
        let rows = self.data_rows(PAYSLIPS, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(Payslip::from_row)
            .filter(|p| p.email == email)
            .collect())
    }

    pub async fn list_all_payslips(&self, department: Option<&str>) -> AppResult<Vec<Payslip>> {
        let directory = self.directory().await?;
        let rows = self.data_rows(PAYSLIPS, col::LAST).await?;
        Ok(rows
            .iter()
            .filter_map(Payslip::from_row)
            .filter(|p| directory.matches(&p.email, department))
            .collect())
    }

    /// Append a payslip. (email, month, year) is not checked for duplicates.
    pub async fn add_payslip(&self, new: &NewPayslip) -> AppResult<()> {
        validation::new_payslip(new)?;

        let department = self
            .resolve_department(&new.email)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found."))?;

        self.store.append_row(PAYSLIPS, new.to_row(&department)).await?;
        info!(email = %new.email.trim(), month = %new.month.trim(), year = %new.year.trim(), "Payslip added");
        Ok(())
    }
}
