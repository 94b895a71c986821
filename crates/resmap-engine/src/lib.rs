//! # Resmap Engine
//!
//! 資源配置追溯引擎：資源池、BOM 展開、配置演算法與追溯帳冊

pub mod allocator;
pub mod expander;
pub mod ledger;
pub mod pool;

// Re-export 主要類型
pub use allocator::ResourceMapper;
pub use expander::BomExpander;
pub use ledger::{
    LedgerBuilder, MappedLedgers, MappedMovement, MappedProcurement, MappedProduction, MappedSale,
    MappedStock,
};
pub use pool::{ResourcePool, Spend, StockSpend};

/// 配置結果
#[derive(Debug, Clone)]
pub struct MapResult {
    /// 追溯帳冊（四張資源帳冊 + 銷售帳冊）
    pub ledgers: MappedLedgers,

    /// 配置後的資源池（未消耗剩餘量的稽核來源）
    pub pool: ResourcePool,

    /// 處理的根訂單數
    pub orders_processed: usize,

    /// 未解決（殘餘非零）的根訂單數
    pub unresolved_orders: usize,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}
