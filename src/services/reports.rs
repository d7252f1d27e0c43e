use crate::{
    db::DbPool,
    entities::{completed_work_act, employee, payment_visit, visit},
    errors::ServiceError,
    services::format_date,
};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

/// Size of the unfiltered completed-work listing
const RECENT_ACTS_LIMIT: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
    pub payments_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeVisits {
    pub employee_id: i32,
    pub full_name: String,
    pub position: String,
    pub visits_count: usize,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkAct {
    pub id: i32,
    pub visit_id: Option<i32>,
    pub date_creation: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ActQuery {
    #[serde(default)]
    pub id: Option<i32>,
}

/// First day of the month two months before `today`'s month.
fn window_start(today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?.checked_sub_months(Months::new(2))
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Groups payments into the three-month window ending at `today`, oldest month first.
/// Months without payments are reported with zero revenue.
pub fn monthly_buckets(
    today: NaiveDate,
    payments: impl IntoIterator<Item = (NaiveDate, Decimal)>,
) -> Vec<MonthlyRevenue> {
    let Some(start) = window_start(today) else {
        return Vec::new();
    };

    let mut buckets: BTreeMap<String, (Decimal, usize)> = (0..3)
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .map(|month| (month_key(month), (Decimal::ZERO, 0)))
        .collect();

    for (paid_on, amount) in payments {
        if let Some(bucket) = buckets.get_mut(&month_key(paid_on)) {
            bucket.0 += amount;
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(month, (revenue, payments_count))| MonthlyRevenue {
            month,
            revenue: revenue.round_dp(2),
            payments_count,
        })
        .collect()
}

/// Revenue and activity aggregates
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn revenue_last_3_months(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyRevenue>, ServiceError> {
        let start = window_start(today)
            .ok_or_else(|| ServiceError::InternalError("revenue window out of range".into()))?;
        let payments = payment_visit::Entity::find()
            .filter(payment_visit::Column::PaidAt.gte(start.and_time(chrono::NaiveTime::MIN)))
            .all(&*self.db_pool)
            .await?;

        Ok(monthly_buckets(
            today,
            payments.into_iter().map(|p| (p.paid_at.date(), p.amount)),
        ))
    }

    /// Visit count and billed total per employee; employees without visits report zero.
    #[instrument(skip(self))]
    pub async fn visits_by_employees(&self) -> Result<Vec<EmployeeVisits>, ServiceError> {
        let db = &*self.db_pool;
        let employees = employee::Entity::find()
            .order_by_asc(employee::Column::LastName)
            .order_by_asc(employee::Column::FirstName)
            .all(db)
            .await?;

        let mut per_employee: HashMap<i32, (usize, Decimal)> = HashMap::new();
        for (employee_id, final_amount) in visit::Entity::find()
            .select_only()
            .column(visit::Column::EmployeeId)
            .column(visit::Column::FinalAmount)
            .into_tuple::<(i32, Decimal)>()
            .all(db)
            .await?
        {
            let entry = per_employee
                .entry(employee_id)
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += final_amount;
        }

        let mut rows: Vec<EmployeeVisits> = employees
            .into_iter()
            .map(|e| {
                let (visits_count, revenue) =
                    per_employee.remove(&e.id).unwrap_or((0, Decimal::ZERO));
                EmployeeVisits {
                    employee_id: e.id,
                    full_name: e.full_name(),
                    position: e.position,
                    visits_count,
                    revenue: revenue.round_dp(2),
                }
            })
            .collect();
        rows.sort_by(|a, b| b.visits_count.cmp(&a.visits_count));
        Ok(rows)
    }

    /// One act when `id` is given (empty when unknown), otherwise the most recent acts.
    #[instrument(skip(self))]
    pub async fn completed_work_acts(
        &self,
        query: &ActQuery,
    ) -> Result<Vec<CompletedWorkAct>, ServiceError> {
        let db = &*self.db_pool;
        let acts = match query.id {
            Some(id) => completed_work_act::Entity::find_by_id(id)
                .one(db)
                .await?
                .into_iter()
                .collect(),
            None => {
                completed_work_act::Entity::find()
                    .order_by_desc(completed_work_act::Column::CreatedOn)
                    .order_by_desc(completed_work_act::Column::Id)
                    .limit(RECENT_ACTS_LIMIT)
                    .all(db)
                    .await?
            }
        };

        Ok(acts
            .into_iter()
            .map(|a: completed_work_act::Model| CompletedWorkAct {
                id: a.id,
                visit_id: a.visit_id,
                date_creation: format_date(a.created_on),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn buckets_are_zero_filled_and_ordered() {
        let buckets = monthly_buckets(day(2024, 3, 15), vec![(day(2024, 3, 2), dec!(1500.00))]);
        let months: Vec<_> = buckets.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(buckets[0].revenue, Decimal::ZERO);
        assert_eq!(buckets[1].payments_count, 0);
        assert_eq!(buckets[2].revenue, dec!(1500.00));
    }

    #[test]
    fn window_crosses_year_boundary() {
        let buckets = monthly_buckets(
            day(2024, 1, 31),
            vec![
                (day(2023, 11, 1), dec!(100)),
                (day(2023, 12, 24), dec!(250.50)),
                (day(2023, 12, 31), dec!(49.50)),
                (day(2023, 10, 31), dec!(999)),
            ],
        );
        assert_eq!(buckets[0].month, "2023-11");
        assert_eq!(buckets[0].revenue, dec!(100));
        assert_eq!(buckets[1].revenue, dec!(300.00));
        assert_eq!(buckets[1].payments_count, 2);
        assert_eq!(buckets[2].month, "2024-01");
        assert_eq!(buckets[2].revenue, Decimal::ZERO);
    }
}
