//! Payroll runs plus the bonuses and penalties that adjust them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::client::gateway::ApiClient;
use crate::client::query::QueryParams;
use crate::client::resource::{Listing, Resource};
use crate::error::{ApiError, ApiResult};

pub const PAYROLL_PATH: &str = "/Payroll";
pub const BONUS_PATH: &str = "/Bonus";
pub const PENALTY_PATH: &str = "/Penalty";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    pub month: u32,
    pub year: i32,
    pub base_salary: f64,
    #[serde(default)]
    pub total_bonuses: f64,
    #[serde(default)]
    pub total_penalties: f64,
    #[serde(default)]
    pub net_salary: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PayrollRecord {
    pub fn net(&self) -> f64 { self.net_salary.unwrap_or(self.base_salary + self.total_bonuses - self.total_penalties) }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayrollFilter {
    pub user_id: Option<i64>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PayrollFilter {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new().opt("userId", self.user_id).opt("month", self.month).opt("year", self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRun {
    pub user_id: i64,
    pub month: u32,
    pub year: i32,
}

/// A bonus or a penalty as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentForm {
    pub user_id: i64,
    pub amount: f64,
    pub reason: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentDto {
    pub user_id: i64,
    pub amount: f64,
    pub reason: String,
    pub date: String,
}

impl AdjustmentForm {
    pub fn to_dto(&self) -> ApiResult<AdjustmentDto> {
        if !(self.amount > 0.0) {
            return Err(ApiError::Validation("amount must be positive".into()));
        }
        Ok(AdjustmentDto {
            user_id: self.user_id,
            amount: self.amount,
            reason: self.reason.clone().unwrap_or_default(),
            date: self.date.format("%Y-%m-%d").to_string(),
        })
    }
}

impl PayrollRun {
    fn validate(&self) -> ApiResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(ApiError::Validation(format!("month {} out of range", self.month)));
        }
        Ok(())
    }
}

impl ApiClient {
    pub fn payroll(&self) -> Resource<'_, PayrollRecord> { Resource::new(self, PAYROLL_PATH) }
    pub fn bonuses(&self) -> Resource<'_, Adjustment> { Resource::new(self, BONUS_PATH) }
    pub fn penalties(&self) -> Resource<'_, Adjustment> { Resource::new(self, PENALTY_PATH) }

    pub async fn list_payroll(&self, filter: &PayrollFilter) -> ApiResult<Listing<PayrollRecord>> {
        self.payroll().list(filter.to_params()).await
    }

    pub async fn get_payroll(&self, id: i64) -> ApiResult<PayrollRecord> { self.payroll().get(id).await }

    pub async fn create_payroll(&self, run: &PayrollRun) -> ApiResult<PayrollRecord> {
        run.validate()?;
        self.payroll().create(run).await
    }

    pub async fn list_bonuses(&self, user_id: Option<i64>) -> ApiResult<Vec<Adjustment>> {
        Ok(self.bonuses().list(QueryParams::new().opt("userId", user_id)).await?.into_items())
    }

    pub async fn create_bonus(&self, form: &AdjustmentForm) -> ApiResult<Adjustment> { self.bonuses().create(&form.to_dto()?).await }

    pub async fn delete_bonus(&self, id: i64) -> ApiResult<()> { self.bonuses().delete(id).await }

    pub async fn list_penalties(&self, user_id: Option<i64>) -> ApiResult<Vec<Adjustment>> {
        Ok(self.penalties().list(QueryParams::new().opt("userId", user_id)).await?.into_items())
    }

    pub async fn create_penalty(&self, form: &AdjustmentForm) -> ApiResult<Adjustment> { self.penalties().create(&form.to_dto()?).await }

    pub async fn delete_penalty(&self, id: i64) -> ApiResult<()> { self.penalties().delete(id).await }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_salary_fallback() {
        let p: PayrollRecord = serde_json::from_str(r#"{"id":1,"userId":2,"month":5,"year":2024,"baseSalary":1000,"totalBonuses":150,"totalPenalties":50}"#).unwrap();
        assert_eq!(p.net(), 1100.0);
    }

    #[test]
    fn adjustment_validation() {
        let f = AdjustmentForm { user_id: 1, amount: 0.0, reason: None, date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap() };
        assert!(f.to_dto().is_err());
        let f = AdjustmentForm { amount: f64::NAN, ..f };
        assert!(f.to_dto().is_err());
        let f = AdjustmentForm { amount: 250.0, ..f };
        assert_eq!(f.to_dto().unwrap().date, "2024-01-31");
    }

    #[test]
    fn payroll_month_range() {
        assert!(PayrollRun { user_id: 1, month: 13, year: 2024 }.validate().is_err());
        assert!(PayrollRun { user_id: 1, month: 12, year: 2024 }.validate().is_ok());
    }
}
