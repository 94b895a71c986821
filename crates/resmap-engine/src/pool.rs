//! 資源池
//!
//! 四種資源列各放一個 arena 向量，配置期間列不會被移除，耗盡的列由
//! 門檻測試濾除。查找不做全表掃描：每種資源依（產品, 地點）建桶，
//! 桶內依插入順序保存索引，候選結果依期間由近至遠排序，順序可重現。

use rust_decimal::Decimal;
use std::collections::HashMap;

use resmap_core::{
    DemandOrder, MapperConfig, MovementRow, OrderType, ProcurementRow, ProductionRow, ResourceId,
    ResourceKind, StockDraw, StockRow,
};

/// 單次扣帳結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spend {
    /// 實際扣帳量
    pub spend: Decimal,

    /// 扣帳後剩餘量
    pub leftover_after: Decimal,
}

/// 庫存扣帳結果（拆分各池的扣帳量）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockSpend {
    /// 實際扣帳量合計
    pub spend: Decimal,

    /// 自主池（ps 或 sv，依扣帳來源）扣出的量；此部分有上游來源，需繼續追溯
    pub from_pool: Decimal,

    /// 自期初庫存池扣出的量；期初庫存為外生供給，追溯到此為止
    pub from_initial: Decimal,

    /// 該扣帳來源視角下的剩餘可用量
    pub leftover_after: Decimal,
}

/// 資源池
#[derive(Debug, Clone)]
pub struct ResourcePool {
    stock: Vec<StockRow>,
    production: Vec<ProductionRow>,
    movement: Vec<MovementRow>,
    procurement: Vec<ProcurementRow>,

    // （產品, 地點）→ arena 索引；調撥以到貨地建桶
    stock_index: HashMap<(String, String), Vec<usize>>,
    production_index: HashMap<(String, String), Vec<usize>>,
    movement_index: HashMap<(String, String), Vec<usize>>,
    procurement_index: HashMap<(String, String), Vec<usize>>,
}

impl ResourcePool {
    /// 由四張資源表建池並建立查找索引
    pub fn new(
        stock: Vec<StockRow>,
        production: Vec<ProductionRow>,
        movement: Vec<MovementRow>,
        procurement: Vec<ProcurementRow>,
    ) -> Self {
        let mut pool = Self {
            stock,
            production,
            movement,
            procurement,
            stock_index: HashMap::new(),
            production_index: HashMap::new(),
            movement_index: HashMap::new(),
            procurement_index: HashMap::new(),
        };

        for (i, row) in pool.stock.iter().enumerate() {
            pool.stock_index
                .entry((row.product.clone(), row.location.clone()))
                .or_default()
                .push(i);
        }
        for (i, row) in pool.production.iter().enumerate() {
            pool.production_index
                .entry((row.product.clone(), row.location.clone()))
                .or_default()
                .push(i);
        }
        for (i, row) in pool.movement.iter().enumerate() {
            pool.movement_index
                .entry((row.product.clone(), row.loc_to.clone()))
                .or_default()
                .push(i);
        }
        for (i, row) in pool.procurement.iter().enumerate() {
            pool.procurement_index
                .entry((row.product.clone(), row.location.clone()))
                .or_default()
                .push(i);
        }

        pool
    }

    /// 查找指定種類下可滿足訂單的候選列
    ///
    /// 過濾條件：同產品、地點銜接、種類各自的期間對齊規則、可用量達門檻、
    /// 非自我引用。結果依期間由近至遠排序，同期間依 arena 順序。
    pub fn find_candidates(
        &self,
        order: &DemandOrder,
        kind: ResourceKind,
        config: &MapperConfig,
    ) -> Vec<ResourceId> {
        let threshold = config.threshold;
        let key = (order.product.clone(), order.loc_from.clone());

        let mut candidates: Vec<(i64, usize)> = match kind {
            ResourceKind::Stock => self
                .stock_index
                .get(&key)
                .map(|bucket| bucket.as_slice())
                .unwrap_or(&[])
                .iter()
                .filter(|&&i| {
                    let row = &self.stock[i];
                    match order.order_type {
                        // 庫存型訂單是結轉追溯：只看前一期的期末池
                        OrderType::Stock => {
                            row.period == order.period - 1
                                && row.available_for(StockDraw::CarryForward) >= threshold
                        }
                        // 其他型態：同期列扣當期消耗池，前一期列扣期末結轉池
                        _ => {
                            (row.period == order.period
                                && row.available_for(StockDraw::CrossType) >= threshold)
                                || (row.period == order.period - 1
                                    && row.available_for(StockDraw::CarryForward) >= threshold)
                        }
                    }
                })
                .map(|&i| (self.stock[i].period, i))
                .collect(),
            ResourceKind::Production => self
                .production_index
                .get(&key)
                .map(|bucket| bucket.as_slice())
                .unwrap_or(&[])
                .iter()
                .filter(|&&i| {
                    let row = &self.production[i];
                    let leadtime = config.effective_leadtime(row.leadtime);
                    row.period == order.period - leadtime && row.leftover >= threshold
                })
                .map(|&i| (self.production[i].period, i))
                .collect(),
            ResourceKind::Movement => self
                .movement_index
                .get(&key)
                .map(|bucket| bucket.as_slice())
                .unwrap_or(&[])
                .iter()
                .filter(|&&i| {
                    let row = &self.movement[i];
                    let leadtime = config.effective_leadtime(row.leadtime);
                    row.period == order.period - leadtime && row.leftover >= threshold
                })
                .map(|&i| (self.movement[i].period, i))
                .collect(),
            ResourceKind::Procurement => self
                .procurement_index
                .get(&key)
                .map(|bucket| bucket.as_slice())
                .unwrap_or(&[])
                .iter()
                .filter(|&&i| {
                    let row = &self.procurement[i];
                    row.period <= order.period && row.leftover >= threshold
                })
                .map(|&i| (self.procurement[i].period, i))
                .collect(),
        };

        // 期間由近至遠；stable sort 保證同期間維持 arena 順序
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        candidates
            .into_iter()
            .map(|(_, i)| ResourceId::new(kind, i))
            .filter(|id| order.origin != Some(*id))
            .collect()
    }

    /// 非庫存列扣帳：剩餘量扣減 `amount`（以剩餘量為上限），
    /// 低於門檻即落地為零
    pub fn consume(&mut self, id: ResourceId, amount: Decimal, threshold: Decimal) -> Spend {
        let leftover = match id.kind {
            ResourceKind::Production => &mut self.production[id.index].leftover,
            ResourceKind::Movement => &mut self.movement[id.index].leftover,
            ResourceKind::Procurement => &mut self.procurement[id.index].leftover,
            ResourceKind::Stock => panic!("stock rows must be consumed via consume_stock"),
        };

        let spend = amount.min(*leftover);
        let mut after = *leftover - spend;
        if after < threshold {
            after = Decimal::ZERO;
        }
        *leftover = after;

        Spend {
            spend,
            leftover_after: after,
        }
    }

    /// 庫存列扣帳：先扣主池（跨型扣 ps、同型扣 sv），不足再退回期初庫存池
    pub fn consume_stock(
        &mut self,
        index: usize,
        amount: Decimal,
        draw: StockDraw,
        threshold: Decimal,
    ) -> StockSpend {
        let row = &mut self.stock[index];

        let pool_available = match draw {
            StockDraw::CrossType => row.ps_leftover,
            StockDraw::CarryForward => row.sv_leftover,
        };

        let from_pool = amount.min(pool_available);
        let from_initial = (amount - from_pool).min(row.is_leftover);

        let mut pool_after = pool_available - from_pool;
        if pool_after < threshold {
            pool_after = Decimal::ZERO;
        }
        match draw {
            StockDraw::CrossType => row.ps_leftover = pool_after,
            StockDraw::CarryForward => row.sv_leftover = pool_after,
        }

        let mut initial_after = row.is_leftover - from_initial;
        if initial_after < threshold {
            initial_after = Decimal::ZERO;
        }
        row.is_leftover = initial_after;

        StockSpend {
            spend: from_pool + from_initial,
            from_pool,
            from_initial,
            leftover_after: row.available_for(draw),
        }
    }

    /// 庫存列（配置後稽核用）
    pub fn stock_rows(&self) -> &[StockRow] {
        &self.stock
    }

    /// 生產列
    pub fn production_rows(&self) -> &[ProductionRow] {
        &self.production
    }

    /// 調撥列
    pub fn movement_rows(&self) -> &[MovementRow] {
        &self.movement
    }

    /// 採購列
    pub fn procurement_rows(&self) -> &[ProcurementRow] {
        &self.procurement
    }
}
