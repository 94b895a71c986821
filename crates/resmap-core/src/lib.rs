//! # Resmap Core
//!
//! 資源配置追溯引擎的核心資料模型與類型定義

pub mod bom;
pub mod config;
pub mod order;
pub mod resource;

// Re-export 主要類型
pub use bom::{BomEntry, BomTable};
pub use config::{MapperConfig, PriorityMap, TimeDirection};
pub use order::{DemandOrder, OrderType};
pub use resource::{
    MovementRow, ProcurementRow, ProductionRow, ResourceId, ResourceKind, StockDraw, StockRow,
};

/// 資源配置錯誤類型
///
/// 只有配置/結構錯誤是致命的；單筆訂單無法滿足屬於輸出狀態，不在此列。
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error("未知的資源種類鍵名: {0}")]
    UnknownResourceKind(String),

    #[error("無效的門檻值（必須為正數）: {0}")]
    InvalidThreshold(rust_decimal::Decimal),
}

pub type Result<T> = std::result::Result<T, MapperError>;
