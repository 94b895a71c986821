//! 追溯帳冊
//!
//! 每次扣帳追加一筆紀錄：訂單身份、資源座標、扣帳量、扣帳後剩餘、
//! 扣帳後未滿足量。四種資源各一張帳冊，外加一張銷售帳冊記錄每筆
//! 根訂單的最終未滿足量。下游的成本彙總以這些帳冊為 join 對象。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resmap_core::DemandOrder;

/// 庫存扣帳紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedStock {
    pub order_id: u64,
    pub label: String,
    pub product: String,
    pub location: String,
    pub period: i64,
    pub initialstock: Decimal,
    pub solutionvalue: Decimal,
    pub period_spent: Decimal,
    /// 扣帳量
    pub spend: Decimal,
    /// 扣帳後各池剩餘
    pub is_leftover: Decimal,
    pub sv_leftover: Decimal,
    pub ps_leftover: Decimal,
    pub er_leftover: Decimal,
    /// 扣帳後訂單未滿足量
    pub residual: Decimal,
}

/// 生產扣帳紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedProduction {
    pub order_id: u64,
    pub label: String,
    pub product: String,
    pub location: String,
    pub bomnum: i64,
    pub period: i64,
    pub solutionvalue: Decimal,
    pub leadtime: i64,
    pub spend: Decimal,
    pub leftover: Decimal,
    pub residual: Decimal,
}

/// 調撥扣帳紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedMovement {
    pub order_id: u64,
    pub label: String,
    pub product: String,
    pub loc_from: String,
    pub loc_to: String,
    pub transport_type: String,
    pub period: i64,
    pub solutionvalue: Decimal,
    pub leadtime: i64,
    pub spend: Decimal,
    pub leftover: Decimal,
    pub residual: Decimal,
}

/// 採購扣帳紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedProcurement {
    pub order_id: u64,
    pub label: String,
    pub product: String,
    pub location: String,
    pub supplier: String,
    pub period: i64,
    pub solutionvalue: Decimal,
    pub spend: Decimal,
    pub leftover: Decimal,
    pub residual: Decimal,
}

/// 銷售結案紀錄（每筆根訂單一列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedSale {
    pub order_id: u64,
    pub label: String,
    pub product: String,
    pub location: String,
    pub client: String,
    pub period: i64,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total_value: Decimal,
    /// 最終未滿足量（非零即為未解決需求）
    pub residual: Decimal,
    pub unsatisfied: bool,
}

impl MappedSale {
    /// 由結案的根訂單建立紀錄
    pub fn from_order(order: &DemandOrder, threshold: Decimal) -> Self {
        Self {
            order_id: order.order_id,
            label: order.label.clone(),
            product: order.product.clone(),
            location: order.loc_from.clone(),
            client: order.client.clone(),
            period: order.period,
            quantity: order.quantity,
            price: order.price,
            total_value: order.total_value(),
            residual: order.residual,
            unsatisfied: !order.is_fulfilled(threshold),
        }
    }
}

/// 配置結果帳冊（追加完成後的最終形態）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedLedgers {
    pub stock: Vec<MappedStock>,
    pub production: Vec<MappedProduction>,
    pub movement: Vec<MappedMovement>,
    pub procurement: Vec<MappedProcurement>,
    pub sales: Vec<MappedSale>,
}

impl MappedLedgers {
    /// 所有帳冊的紀錄總數（不含銷售帳冊）
    pub fn entry_count(&self) -> usize {
        self.stock.len() + self.production.len() + self.movement.len() + self.procurement.len()
    }
}

/// 帳冊累積器（僅追加）
#[derive(Debug, Clone, Default)]
pub struct LedgerBuilder {
    ledgers: MappedLedgers,
}

impl LedgerBuilder {
    /// 創建空的累積器
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_stock(&mut self, record: MappedStock) {
        self.ledgers.stock.push(record);
    }

    pub fn append_production(&mut self, record: MappedProduction) {
        self.ledgers.production.push(record);
    }

    pub fn append_movement(&mut self, record: MappedMovement) {
        self.ledgers.movement.push(record);
    }

    pub fn append_procurement(&mut self, record: MappedProcurement) {
        self.ledgers.procurement.push(record);
    }

    pub fn append_sale(&mut self, record: MappedSale) {
        self.ledgers.sales.push(record);
    }

    /// 結束累積，取出帳冊
    pub fn finalize(self) -> MappedLedgers {
        self.ledgers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_finalize() {
        let mut builder = LedgerBuilder::new();

        builder.append_production(MappedProduction {
            order_id: 1,
            label: "SO-1".to_string(),
            product: "P-001".to_string(),
            location: "LOC-A".to_string(),
            bomnum: 77,
            period: 2,
            solutionvalue: Decimal::from(100),
            leadtime: 0,
            spend: Decimal::from(40),
            leftover: Decimal::from(60),
            residual: Decimal::ZERO,
        });

        let ledgers = builder.finalize();
        assert_eq!(ledgers.entry_count(), 1);
        assert_eq!(ledgers.production[0].spend, Decimal::from(40));
        assert!(ledgers.sales.is_empty());
    }

    #[test]
    fn test_mapped_sale_flags_unsatisfied() {
        let mut order = DemandOrder::new(
            4,
            "P-001".to_string(),
            "LOC-A".to_string(),
            "CLIENT-1".to_string(),
            2,
            Decimal::from(100),
            Decimal::from(3),
        );
        order.residual = Decimal::from(20);

        let record = MappedSale::from_order(&order, Decimal::new(10, 2));
        assert!(record.unsatisfied);
        assert_eq!(record.residual, Decimal::from(20));
        assert_eq!(record.total_value, Decimal::from(300));
    }
}
