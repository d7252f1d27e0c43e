use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lifecycle of a visit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[default]
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl VisitStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scheduled => "Запланирован",
            Self::Completed => "Завершён",
            Self::Paid => "Оплачен",
            Self::Cancelled => "Отменён",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    #[default]
    #[sea_orm(string_value = "primary")]
    Primary,
    #[sea_orm(string_value = "repeat")]
    Repeat,
    #[sea_orm(string_value = "consultation")]
    Consultation,
}

impl VisitType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "Первичный",
            Self::Repeat => "Повторный",
            Self::Consultation => "Консультация",
        }
    }
}

/// Supplier order lifecycle: `draft -> in_progress -> shipped -> delivered`,
/// with `cancelled` reachable from any non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SupplierOrderStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl SupplierOrderStatus {
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Draft => Some(0),
            Self::InProgress => Some(1),
            Self::Shipped => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Same-status saves are always allowed; terminal states accept nothing else.
    pub fn can_transition_to(&self, next: SupplierOrderStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Черновик",
            Self::InProgress => "В работе",
            Self::Shipped => "Отгружен",
            Self::Delivered => "Доставлен",
            Self::Cancelled => "Отменён",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SupplierOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierOrderStatus {
    type Err = String;

    /// Accepts the stored values plus the hyphenated and display spellings
    /// older clients send.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "draft" | "черновик" => Ok(Self::Draft),
            "in_progress" | "в_работе" => Ok(Self::InProgress),
            "shipped" | "отгружен" => Ok(Self::Shipped),
            "delivered" | "доставлен" => Ok(Self::Delivered),
            "cancelled" | "canceled" | "отменён" | "отменен" => Ok(Self::Cancelled),
            _ => Err(format!("unknown supplier order status '{}'", s)),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[sea_orm(string_value = "in_stock")]
    InStock,
    #[sea_orm(string_value = "out_of_stock")]
    OutOfStock,
}

impl StockStatus {
    pub fn for_amount(amount: i32) -> Self {
        if amount > 0 {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InStock => "В наличии",
            Self::OutOfStock => "Нет в наличии",
        }
    }
}
