use chrono::NaiveDate;
use tracing::{info, warn};

use super::{Repository, validation};
use crate::error::{AppError, AppResult};
use crate::model::holiday::{Holiday, NewHoliday, col};
use crate::model::parse_sheet_date;
use crate::sheets::{HOLIDAYS, data_row_number};

fn same_day(stored: &str, date: NaiveDate) -> bool {
    parse_sheet_date(stored) == Some(date)
}

impl Repository {
    pub async fn list_holidays(&self) -> AppResult<Vec<Holiday>> {
        let rows = self.data_rows(HOLIDAYS, col::LAST).await?;
        Ok(rows.iter().filter_map(Holiday::from_row).collect())
    }

    /// One holiday per date.
    pub async fn add_holiday(&self, new: &NewHoliday) -> AppResult<()> {
        validation::required(&new.name, "Holiday name")?;

        let _guard = self.lock(HOLIDAYS).await;
        let rows = self.data_rows(HOLIDAYS, col::LAST).await?;
        if rows
            .iter()
            .filter_map(Holiday::from_row)
            .any(|h| same_day(&h.date, new.date))
        {
            return Err(AppError::validation(format!("A holiday on {} already exists.", new.date)));
        }

        self.store.append_row(HOLIDAYS, new.to_row()).await?;
        info!(date = %new.date, name = %new.name.trim(), "Holiday added");
        Ok(())
    }

    /// Delete the holiday on `date`. A date with no holiday is `NotFound`.
    pub async fn delete_holiday(&self, date: &str) -> AppResult<()> {
        let date = date.trim();
        let parsed = parse_sheet_date(date);

        let _guard = self.lock(HOLIDAYS).await;
        let rows = self.data_rows(HOLIDAYS, col::LAST).await?;
        let index = rows.iter().position(|row| {
            Holiday::from_row(row).is_some_and(|h| match parsed {
                Some(d) => same_day(&h.date, d),
                None => h.date.trim() == date,
            })
        });

        let Some(index) = index else {
            warn!(date = %date, "No holiday to delete");
            return Err(AppError::not_found(format!("No holiday on {date}.")));
        };

        let row_number = data_row_number(index);
        self.store.delete_row(HOLIDAYS, row_number).await?;
        info!(date = %date, row = row_number, "Holiday deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::fixture;
    use super::*;

    fn holiday(m: u32, d: u32, name: &str) -> NewHoliday {
        NewHoliday {
            date: NaiveDate::from_ymd_opt(2026, m, d).unwrap(),
            name: name.into(),
        }
    }

    #[actix_web::test]
    async fn add_list_delete() {
        let f = fixture().await;
        f.repo.add_holiday(&holiday(8, 15, "Independence Day")).await.unwrap();
        f.repo.add_holiday(&holiday(10, 2, "Gandhi Jayanti")).await.unwrap();
        assert!(matches!(
            f.repo.add_holiday(&holiday(8, 15, "Duplicate")).await,
            Err(AppError::Validation(_))
        ));

        f.repo.delete_holiday("2026-08-15").await.unwrap();
        let left = f.repo.list_holidays().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].name, "Gandhi Jayanti");
    }

    #[actix_web::test]
    async fn deleting_a_missing_date_is_not_found() {
        let f = fixture().await;
        f.repo.add_holiday(&holiday(8, 15, "Independence Day")).await.unwrap();
        assert!(matches!(
            f.repo.delete_holiday("2026-12-25").await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(f.repo.list_holidays().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn delete_matches_older_date_layout() {
        let f = fixture().await;
        f.store.push_raw(HOLIDAYS, &["1/26/2026", "Republic Day"]).await;
        f.repo.delete_holiday("2026-01-26").await.unwrap();
        assert!(f.repo.list_holidays().await.unwrap().is_empty());
    }
}
