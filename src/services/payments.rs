use crate::{
    db::{DbPool, Transaction},
    entities::{payment_receipt, payment_visit, visit},
    errors::ServiceError,
    models::VisitStatus,
};
use chrono::{NaiveDateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentCommand {
    #[serde(default, alias = "visit_id")]
    pub visit_id: Option<i32>,
    #[serde(default, alias = "payment_method", alias = "method")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub receipt_id: i32,
    pub receipt_number: String,
    pub visit_id: i32,
    pub amount: Decimal,
    pub payment_method: String,
}

/// `R-{visit}-{yyyymmddHHMMSS}`
pub fn receipt_number(visit_id: i32, at: NaiveDateTime) -> String {
    format!("R-{}-{}", visit_id, at.format("%Y%m%d%H%M%S"))
}

/// Records payments against visits
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Issues a receipt, records the paid amount and links both to the visit.
    ///
    /// The amount is not reconciled against the visit total; paying again
    /// relinks the visit to the newest receipt.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        command: RecordPaymentCommand,
    ) -> Result<PaymentResult, ServiceError> {
        let visit_id = command
            .visit_id
            .ok_or_else(|| ServiceError::ValidationError("visitId is required".into()))?;
        let amount = command
            .amount
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| ServiceError::ValidationError("amount must be greater than 0".into()))?
            .round_dp(2);
        let payment_method = command
            .payment_method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::ValidationError("paymentMethod is required".into()))?;

        let tx = Transaction::begin(&self.db_pool, "record_payment").await?;
        let result = Self::record_payment_in(tx.conn(), visit_id, amount, payment_method).await;
        let payment = tx.finish(result).await?;

        counter!("clinic.payments.recorded", 1);
        info!(
            visit_id,
            receipt_id = payment.receipt_id,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    async fn record_payment_in<C: ConnectionTrait>(
        conn: &C,
        visit_id: i32,
        amount: Decimal,
        payment_method: String,
    ) -> Result<PaymentResult, ServiceError> {
        let existing = visit::Entity::find_by_id(visit_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("visit {} does not exist", visit_id)))?;

        let now = Utc::now().naive_utc();
        let number = receipt_number(visit_id, now);
        let receipt = payment_receipt::ActiveModel {
            visit_id: Set(visit_id),
            receipt_number: Set(number.clone()),
            issued_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        payment_visit::ActiveModel {
            receipt_id: Set(receipt.id),
            visit_id: Set(visit_id),
            amount: Set(amount),
            payment_method: Set(payment_method.clone()),
            paid_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        let mut model: visit::ActiveModel = existing.into();
        model.receipt_id = Set(Some(receipt.id));
        model.payment_amount = Set(Some(amount));
        model.status = Set(VisitStatus::Paid);
        model.updated_at = Set(now);
        model.update(conn).await?;

        Ok(PaymentResult {
            receipt_id: receipt.id,
            receipt_number: number,
            visit_id,
            amount,
            payment_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn receipt_number_embeds_visit_and_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        assert_eq!(receipt_number(17, at), "R-17-20240307140509");
    }
}
