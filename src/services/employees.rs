use crate::{
    db::{DbPool, Transaction},
    entities::{employee, work_schedule},
    errors::ServiceError,
    services::{format_date, non_empty, parse_optional_date, parse_time, required_text},
};
use chrono::{Datelike, Months, NaiveDate, NaiveTime, Utc, Weekday};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Position keywords that mark an employee as clinical staff.
const CLINICAL_POSITIONS: &[&str] = &[
    "врач",
    "стоматолог",
    "хирург",
    "ортодонт",
    "ортопед",
    "терапевт",
    "пародонтолог",
    "имплантолог",
    "гигиенист",
    "doctor",
    "dentist",
    "surgeon",
    "orthodontist",
    "hygienist",
];

const DEFAULT_SHIFT_START: &str = "09:00";
const DEFAULT_SHIFT_END: &str = "18:00";

pub fn is_clinical_position(position: &str) -> bool {
    let position = position.to_lowercase();
    CLINICAL_POSITIONS.iter().any(|p| position.contains(p))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddEmployeeCommand {
    #[serde(default, alias = "lastname", alias = "last_name")]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[serde(default, alias = "firstname", alias = "first_name")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "access_level")]
    #[validate(range(min = 0, max = 10))]
    pub access_level: Option<i32>,
    #[serde(default, alias = "hired_on")]
    pub hired_on: Option<String>,
    /// Seed one shift per weekday of `schedule_month`
    #[serde(default, alias = "generate_schedule")]
    pub generate_schedule: bool,
    /// `YYYY-MM`, defaults to the current month
    #[serde(default, alias = "schedule_month")]
    pub schedule_month: Option<String>,
    #[serde(default, alias = "shift_start")]
    pub shift_start: Option<String>,
    #[serde(default, alias = "shift_end")]
    pub shift_end: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddEmployeeResult {
    pub employee_id: i32,
    pub schedule_days: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: Option<String>,
    pub full_name: String,
    pub position: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub access_level: i32,
    pub hired_on: Option<String>,
}

impl From<employee::Model> for EmployeeView {
    fn from(e: employee::Model) -> Self {
        Self {
            full_name: e.full_name(),
            id: e.id,
            last_name: e.last_name,
            first_name: e.first_name,
            patronymic: e.patronymic,
            position: e.position,
            phone: e.phone,
            email: e.email,
            access_level: e.access_level,
            hired_on: e.hired_on.map(format_date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchedulePlan {
    month_start: NaiveDate,
    shift_start: NaiveTime,
    shift_end: NaiveTime,
}

/// Monday to Friday dates of the month starting at `month_start`.
pub fn weekdays_of_month(month_start: NaiveDate) -> Vec<NaiveDate> {
    let Some(next_month) = month_start.checked_add_months(Months::new(1)) else {
        return Vec::new();
    };
    month_start
        .iter_days()
        .take_while(|d| *d < next_month)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

fn parse_month(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").map_err(
            |_| {
                ServiceError::ValidationError(format!(
                    "scheduleMonth must be in YYYY-MM format, got '{}'",
                    value
                ))
            },
        ),
        None => NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .ok_or_else(|| ServiceError::InternalError("invalid current month".into())),
    }
}

/// Staff records and their work schedules
#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DbPool>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_employees(&self) -> Result<Vec<EmployeeView>, ServiceError> {
        let employees = employee::Entity::find()
            .order_by_asc(employee::Column::LastName)
            .order_by_asc(employee::Column::FirstName)
            .all(&*self.db_pool)
            .await?;
        Ok(employees.into_iter().map(EmployeeView::from).collect())
    }

    /// Employees whose position is clinical, matched case-insensitively
    #[instrument(skip(self))]
    pub async fn list_doctors(&self) -> Result<Vec<EmployeeView>, ServiceError> {
        Ok(self
            .list_employees()
            .await?
            .into_iter()
            .filter(|e| is_clinical_position(&e.position))
            .collect())
    }

    #[instrument(skip(self, command))]
    pub async fn add_employee(
        &self,
        command: AddEmployeeCommand,
    ) -> Result<AddEmployeeResult, ServiceError> {
        let today = Utc::now().date_naive();
        let last_name = required_text(command.last_name.as_deref(), "lastname")?;
        let first_name = required_text(command.first_name.as_deref(), "firstname")?;
        let position = required_text(command.position.as_deref(), "position")?;
        let hired_on = parse_optional_date(command.hired_on.as_deref(), "hiredOn")?;

        let plan = if command.generate_schedule {
            let shift_start = parse_time(
                command.shift_start.as_deref().unwrap_or(DEFAULT_SHIFT_START),
                "shiftStart",
            )?;
            let shift_end = parse_time(
                command.shift_end.as_deref().unwrap_or(DEFAULT_SHIFT_END),
                "shiftEnd",
            )?;
            if shift_end <= shift_start {
                return Err(ServiceError::ValidationError(
                    "shiftEnd must be later than shiftStart".into(),
                ));
            }
            Some(SchedulePlan {
                month_start: parse_month(command.schedule_month.as_deref(), today)?,
                shift_start,
                shift_end,
            })
        } else {
            None
        };

        let model = employee::ActiveModel {
            last_name: Set(last_name),
            first_name: Set(first_name),
            patronymic: Set(non_empty(command.patronymic)),
            position: Set(position),
            phone: Set(non_empty(command.phone)),
            email: Set(non_empty(command.email)),
            access_level: Set(command.access_level.unwrap_or(0)),
            hired_on: Set(hired_on),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        let tx = Transaction::begin(&self.db_pool, "add_employee").await?;
        let result = Self::add_employee_in(tx.conn(), model, plan).await;
        let created = tx.finish(result).await?;

        info!(
            employee_id = created.employee_id,
            schedule_days = created.schedule_days,
            "Employee added"
        );
        Ok(created)
    }

    async fn add_employee_in<C: ConnectionTrait>(
        conn: &C,
        model: employee::ActiveModel,
        plan: Option<SchedulePlan>,
    ) -> Result<AddEmployeeResult, ServiceError> {
        let saved = model.insert(conn).await?;

        let mut schedule_days = 0;
        if let Some(plan) = plan {
            let rows: Vec<work_schedule::ActiveModel> = weekdays_of_month(plan.month_start)
                .into_iter()
                .map(|day| work_schedule::ActiveModel {
                    employee_id: Set(saved.id),
                    work_date: Set(day),
                    start_time: Set(plan.shift_start),
                    end_time: Set(plan.shift_end),
                    ..Default::default()
                })
                .collect();
            schedule_days = rows.len();
            if !rows.is_empty() {
                work_schedule::Entity::insert_many(rows).exec(conn).await?;
            }
        }

        Ok(AddEmployeeResult {
            employee_id: saved.id,
            schedule_days,
        })
    }
}
