pub mod status;

pub use status::{StockStatus, SupplierOrderStatus, VisitStatus, VisitType};
