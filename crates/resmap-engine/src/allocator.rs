//! 配置引擎
//!
//! 對每筆根訂單執行優先序驅動的貪婪扣帳：依配置的種類優先序查找
//! 候選資源列，逐列扣帳直到訂單滿足或候選耗盡。扣帳可能衍生新的
//! 追溯需求（BOM 投入、庫存結轉、調撥來源），衍生需求以顯式工作
//! 堆疊深度優先處理，不使用原生遞迴，堆疊深度與 BOM 階數無關。
//!
//! 訂單逐筆處理、共享同一個資源池，因此輸入順序會影響稀缺供給的
//! 歸屬；排序固定時結果完全可重現。

use std::time::Instant;

use resmap_core::{
    BomTable, DemandOrder, MapperConfig, OrderType, ResourceId, ResourceKind, StockDraw,
};

use crate::expander::BomExpander;
use crate::ledger::{
    LedgerBuilder, MappedMovement, MappedProcurement, MappedProduction, MappedSale, MappedStock,
};
use crate::pool::ResourcePool;
use crate::MapResult;

/// 資源配置器
pub struct ResourceMapper {
    pool: ResourcePool,
    expander: BomExpander,
    config: MapperConfig,
}

impl ResourceMapper {
    /// 創建新的配置器
    pub fn new(pool: ResourcePool, bom_table: BomTable, config: MapperConfig) -> Self {
        Self {
            pool,
            expander: BomExpander::new(bom_table),
            config,
        }
    }

    /// 主配置入口
    ///
    /// 根訂單依（期間, 總價值）排序後逐筆配置；配置完成後回傳帳冊、
    /// 配置後的資源池與統計。配置錯誤只會發生在任何扣帳之前。
    pub fn map(mut self, mut orders: Vec<DemandOrder>) -> resmap_core::Result<MapResult> {
        self.config.validate()?;

        self.sort_orders(&mut orders);

        tracing::info!(
            "開始資源配置：訂單 {} 筆，庫存 {} 列，生產 {} 列，調撥 {} 列，採購 {} 列",
            orders.len(),
            self.pool.stock_rows().len(),
            self.pool.production_rows().len(),
            self.pool.movement_rows().len(),
            self.pool.procurement_rows().len()
        );

        let start_time = Instant::now();
        let mut ledgers = LedgerBuilder::new();
        let mut unresolved_orders = 0;
        let orders_processed = orders.len();

        for mut order in orders {
            tracing::debug!(
                "配置訂單 {}：{} @ {} 期 {}，需求 {}",
                order.order_id,
                order.product,
                order.loc_from,
                order.period,
                order.quantity
            );

            self.allocate(&mut order, &mut ledgers);

            if !order.is_fulfilled(self.config.threshold) {
                unresolved_orders += 1;
                tracing::warn!(
                    "訂單 {} 未解決：{} @ {} 期 {}，未滿足量 {}",
                    order.order_id,
                    order.product,
                    order.loc_from,
                    order.period,
                    order.residual
                );
            }

            ledgers.append_sale(MappedSale::from_order(&order, self.config.threshold));
        }

        let elapsed = start_time.elapsed();
        tracing::info!(
            "資源配置完成，耗時 {:?}，未解決訂單 {} 筆",
            elapsed,
            unresolved_orders
        );

        let ledgers = ledgers.finalize();
        tracing::info!("追溯紀錄 {} 筆", ledgers.entry_count());

        Ok(MapResult {
            ledgers,
            pool: self.pool,
            orders_processed,
            unresolved_orders,
            calculation_time_ms: Some(elapsed.as_millis()),
        })
    }

    /// 根訂單排序：backward 為期間由晚至早，期間內總價值由高至低
    fn sort_orders(&self, orders: &mut [DemandOrder]) {
        match self.config.time_direction {
            resmap_core::TimeDirection::Backward => orders.sort_by(|a, b| {
                b.period
                    .cmp(&a.period)
                    .then_with(|| b.total_value().cmp(&a.total_value()))
            }),
            resmap_core::TimeDirection::Forward => orders.sort_by(|a, b| {
                a.period
                    .cmp(&b.period)
                    .then_with(|| b.total_value().cmp(&a.total_value()))
            }),
        }
    }

    /// 配置單筆根訂單與其所有衍生需求
    ///
    /// 工作堆疊每次取出一筆訂單，執行至多一次扣帳；扣帳後父訂單壓回
    /// 堆疊底下、衍生子訂單壓在其上，子訂單因此先於父訂單的下一次
    /// 扣帳處理（深度優先）。
    fn allocate(&mut self, root: &mut DemandOrder, ledgers: &mut LedgerBuilder) {
        let threshold = self.config.threshold;
        let mut frames: Vec<DemandOrder> = vec![root.clone()];

        while let Some(mut order) = frames.pop() {
            if order.is_fulfilled(threshold) {
                if order.is_root() {
                    root.residual = order.residual;
                }
                continue;
            }

            let Some(candidate) = self.next_candidate(&order) else {
                // 候選耗盡：未解決是輸出狀態，不是錯誤
                if order.is_root() {
                    root.residual = order.residual;
                } else {
                    tracing::debug!(
                        "訂單 {} 的衍生需求（{}）無法追溯：{} @ {} 期 {}，殘餘 {}",
                        order.order_id,
                        order.order_type.as_str(),
                        order.product,
                        order.loc_from,
                        order.period,
                        order.residual
                    );
                }
                continue;
            };

            let children = self.draw(&mut order, candidate, ledgers);

            frames.push(order);
            for child in children.into_iter().rev() {
                frames.push(child);
            }
        }
    }

    /// 依優先序找出下一個候選列
    ///
    /// 空清單直接跳過；回傳最高優先種類中期間最近的列。
    fn next_candidate(&self, order: &DemandOrder) -> Option<ResourceId> {
        for kind in self.config.priority.sorted_kinds() {
            let candidates = self.pool.find_candidates(order, kind, &self.config);
            if let Some(&id) = candidates.first() {
                return Some(id);
            }
        }
        None
    }

    /// 對候選列執行一次扣帳，追加帳冊紀錄並回傳衍生訂單
    fn draw(
        &mut self,
        order: &mut DemandOrder,
        id: ResourceId,
        ledgers: &mut LedgerBuilder,
    ) -> Vec<DemandOrder> {
        let threshold = self.config.threshold;
        let mut children = Vec::new();

        match id.kind {
            ResourceKind::Stock => {
                // 同期列扣當期消耗池；前一期列與結轉追溯一律扣期末池
                let draw_kind = if order.order_type != OrderType::Stock
                    && self.pool.stock_rows()[id.index].period == order.period
                {
                    StockDraw::CrossType
                } else {
                    StockDraw::CarryForward
                };
                let result =
                    self.pool
                        .consume_stock(id.index, order.residual, draw_kind, threshold);
                order.settle(result.spend, threshold);

                let row = &self.pool.stock_rows()[id.index];
                tracing::debug!(
                    "訂單 {} 扣庫存 {} @ {} 期 {}：扣帳 {}，剩餘 {}",
                    order.order_id,
                    row.product,
                    row.location,
                    row.period,
                    result.spend,
                    result.leftover_after
                );

                ledgers.append_stock(MappedStock {
                    order_id: order.order_id,
                    label: order.label.clone(),
                    product: row.product.clone(),
                    location: row.location.clone(),
                    period: row.period,
                    initialstock: row.initialstock,
                    solutionvalue: row.solutionvalue,
                    period_spent: row.period_spent,
                    spend: result.spend,
                    is_leftover: row.is_leftover,
                    sv_leftover: row.sv_leftover,
                    ps_leftover: row.ps_leftover,
                    er_leftover: row.er_leftover,
                    residual: order.residual,
                });

                // 主池扣出的量有上游來源，衍生結轉追溯；期初庫存部分到此為止
                if result.from_pool >= threshold {
                    children.push(DemandOrder::derived(
                        order,
                        OrderType::Stock,
                        row.product.clone(),
                        row.location.clone(),
                        row.period,
                        result.from_pool,
                        id,
                    ));
                }
            }
            ResourceKind::Production => {
                let result = self.pool.consume(id, order.residual, threshold);
                order.settle(result.spend, threshold);

                let row = &self.pool.production_rows()[id.index];
                tracing::debug!(
                    "訂單 {} 扣生產 {} @ {} 期 {}（BOM {}）：扣帳 {}，剩餘 {}",
                    order.order_id,
                    row.product,
                    row.location,
                    row.period,
                    row.bomnum,
                    result.spend,
                    result.leftover_after
                );

                ledgers.append_production(MappedProduction {
                    order_id: order.order_id,
                    label: order.label.clone(),
                    product: row.product.clone(),
                    location: row.location.clone(),
                    bomnum: row.bomnum,
                    period: row.period,
                    solutionvalue: row.solutionvalue,
                    leadtime: row.leadtime,
                    spend: result.spend,
                    leftover: result.leftover_after,
                    residual: order.residual,
                });

                if self.config.map_bom {
                    children = self
                        .expander
                        .explode(order, row, id, result.spend, threshold);
                }
            }
            ResourceKind::Movement => {
                let result = self.pool.consume(id, order.residual, threshold);
                order.settle(result.spend, threshold);

                let row = &self.pool.movement_rows()[id.index];
                tracing::debug!(
                    "訂單 {} 扣調撥 {} {} → {} 期 {}：扣帳 {}，剩餘 {}",
                    order.order_id,
                    row.product,
                    row.loc_from,
                    row.loc_to,
                    row.period,
                    result.spend,
                    result.leftover_after
                );

                ledgers.append_movement(MappedMovement {
                    order_id: order.order_id,
                    label: order.label.clone(),
                    product: row.product.clone(),
                    loc_from: row.loc_from.clone(),
                    loc_to: row.loc_to.clone(),
                    transport_type: row.transport_type.clone(),
                    period: row.period,
                    solutionvalue: row.solutionvalue,
                    leadtime: row.leadtime,
                    spend: result.spend,
                    leftover: result.leftover_after,
                    residual: order.residual,
                });

                // 追溯發運量的來源：起運地在發運期的同量需求
                if result.spend >= threshold {
                    children.push(DemandOrder::derived(
                        order,
                        OrderType::Movement,
                        row.product.clone(),
                        row.loc_from.clone(),
                        row.period,
                        result.spend,
                        id,
                    ));
                }
            }
            ResourceKind::Procurement => {
                // 採購來自外部供應商，追溯到此為止
                let result = self.pool.consume(id, order.residual, threshold);
                order.settle(result.spend, threshold);

                let row = &self.pool.procurement_rows()[id.index];
                tracing::debug!(
                    "訂單 {} 扣採購 {} @ {}（供應商 {}）期 {}：扣帳 {}，剩餘 {}",
                    order.order_id,
                    row.product,
                    row.location,
                    row.supplier,
                    row.period,
                    result.spend,
                    result.leftover_after
                );

                ledgers.append_procurement(MappedProcurement {
                    order_id: order.order_id,
                    label: order.label.clone(),
                    product: row.product.clone(),
                    location: row.location.clone(),
                    supplier: row.supplier.clone(),
                    period: row.period,
                    solutionvalue: row.solutionvalue,
                    spend: result.spend,
                    leftover: result.leftover_after,
                    residual: order.residual,
                });
            }
        }

        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resmap_core::{PriorityMap, ProcurementRow, ProductionRow, StockRow};
    use rust_decimal::Decimal;

    fn sale(order_id: u64, product: &str, location: &str, period: i64, qty: i64) -> DemandOrder {
        DemandOrder::new(
            order_id,
            product.to_string(),
            location.to_string(),
            "CLIENT-1".to_string(),
            period,
            Decimal::from(qty),
            Decimal::ONE,
        )
    }

    fn stock(product: &str, location: &str, period: i64, ps: i64) -> StockRow {
        StockRow::new(
            product.to_string(),
            location.to_string(),
            period,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::from(ps),
        )
    }

    #[test]
    fn test_priority_respected_over_quantity() {
        // 庫存優先於生產時，即使生產剩餘更多也先扣庫存
        let pool = ResourcePool::new(
            vec![stock("P-001", "LOC-A", 2, 30)],
            vec![ProductionRow::new(
                "P-001".to_string(),
                "LOC-A".to_string(),
                2,
                77,
                Decimal::from(500),
            )],
            vec![],
            vec![],
        );
        let config = MapperConfig::new()
            .with_priority(PriorityMap::new(0, 1, 2, 3))
            .with_map_bom(false);

        let mapper = ResourceMapper::new(pool, BomTable::new(), config);
        let result = mapper.map(vec![sale(0, "P-001", "LOC-A", 2, 100)]).unwrap();

        // 第一筆扣帳必為庫存
        assert_eq!(result.ledgers.stock.len(), 1);
        assert_eq!(result.ledgers.stock[0].spend, Decimal::from(30));
        assert_eq!(result.ledgers.production.len(), 1);
        assert_eq!(result.ledgers.production[0].spend, Decimal::from(70));
        assert_eq!(result.unresolved_orders, 0);
    }

    #[test]
    fn test_unresolved_order_reported_not_failed() {
        let pool = ResourcePool::new(vec![], vec![], vec![], vec![]);
        let mapper = ResourceMapper::new(pool, BomTable::new(), MapperConfig::new());

        let result = mapper.map(vec![sale(0, "P-001", "LOC-A", 2, 100)]).unwrap();

        assert_eq!(result.unresolved_orders, 1);
        assert_eq!(result.ledgers.sales.len(), 1);
        assert!(result.ledgers.sales[0].unsatisfied);
        assert_eq!(result.ledgers.sales[0].residual, Decimal::from(100));
    }

    #[test]
    fn test_invalid_threshold_is_fatal_before_allocation() {
        let pool = ResourcePool::new(vec![], vec![], vec![], vec![]);
        let config = MapperConfig::new().with_threshold(Decimal::ZERO);
        let mapper = ResourceMapper::new(pool, BomTable::new(), config);

        assert!(mapper.map(vec![sale(0, "P-001", "LOC-A", 2, 10)]).is_err());
    }

    #[test]
    fn test_backward_sort_allocates_late_periods_first() {
        // 期 2 與期 1 的訂單競爭同一筆採購；backward 下期 2 先佔用
        let pool = ResourcePool::new(
            vec![],
            vec![],
            vec![],
            vec![ProcurementRow::new(
                "P-001".to_string(),
                "LOC-A".to_string(),
                0,
                "SUP-1".to_string(),
                Decimal::from(50),
            )],
        );
        let mapper = ResourceMapper::new(pool, BomTable::new(), MapperConfig::new());

        let orders = vec![
            sale(0, "P-001", "LOC-A", 1, 50),
            sale(1, "P-001", "LOC-A", 2, 50),
        ];
        let result = mapper.map(orders).unwrap();

        assert_eq!(result.ledgers.procurement.len(), 1);
        assert_eq!(result.ledgers.procurement[0].order_id, 1);
        assert_eq!(result.unresolved_orders, 1);

        // 銷售帳冊依處理順序：期 2 在前且已滿足
        assert_eq!(result.ledgers.sales[0].order_id, 1);
        assert!(!result.ledgers.sales[0].unsatisfied);
        assert!(result.ledgers.sales[1].unsatisfied);
    }

    #[test]
    fn test_movement_draw_traces_origin() {
        // LOC-A 的需求由 LOC-B → LOC-A 的調撥滿足，
        // 發運量再追溯到 LOC-B 的庫存
        let movement = resmap_core::MovementRow::new(
            "P-001".to_string(),
            "LOC-B".to_string(),
            "LOC-A".to_string(),
            2,
            Decimal::from(40),
        )
        .with_transport_type("TRUCK".to_string());

        let pool = ResourcePool::new(
            vec![stock("P-001", "LOC-B", 2, 40)],
            vec![],
            vec![movement],
            vec![],
        );
        let mapper = ResourceMapper::new(pool, BomTable::new(), MapperConfig::new());

        let result = mapper.map(vec![sale(0, "P-001", "LOC-A", 2, 40)]).unwrap();

        assert_eq!(result.ledgers.movement.len(), 1);
        assert_eq!(result.ledgers.movement[0].spend, Decimal::from(40));
        // 衍生的調撥追溯訂單在起運地扣了庫存
        assert_eq!(result.ledgers.stock.len(), 1);
        assert_eq!(result.ledgers.stock[0].location, "LOC-B");
        assert_eq!(result.ledgers.stock[0].spend, Decimal::from(40));
        assert_eq!(result.unresolved_orders, 0);
    }
}
