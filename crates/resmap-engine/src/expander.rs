//! BOM 展開器
//!
//! 生產列被扣帳時，依其 BOM 編號與開工期查出所有投入係數，
//! 為每個投入品合成一筆衍生需求，回饋給配置引擎繼續追溯。
//! 多階 BOM 由此自然展開：子件需求可能再由帶 BOM 的生產滿足。

use rust_decimal::Decimal;

use resmap_core::{BomTable, DemandOrder, OrderType, ProductionRow, ResourceId};

/// BOM 展開器
#[derive(Debug, Clone, Default)]
pub struct BomExpander {
    table: BomTable,
}

impl BomExpander {
    /// 以 BOM 表創建展開器
    pub fn new(table: BomTable) -> Self {
        Self { table }
    }

    /// 對一次生產扣帳展開投入需求
    ///
    /// 每個投入品產生一筆 `Bom` 型衍生訂單，數量 = `-input_output * spend`，
    /// 需求期間為生產列的開工期，地點為係數列的地點。低於門檻的微量
    /// 需求不展開，避免殘餘噪聲引發微量遞迴。
    pub fn explode(
        &self,
        parent: &DemandOrder,
        row: &ProductionRow,
        row_id: ResourceId,
        spend: Decimal,
        threshold: Decimal,
    ) -> Vec<DemandOrder> {
        let mut children = Vec::new();

        for entry in self.table.inputs_for(row.bomnum, row.period) {
            let quantity = -entry.input_output * spend;
            if quantity < threshold {
                continue;
            }

            children.push(DemandOrder::derived(
                parent,
                OrderType::Bom,
                entry.product.clone(),
                entry.location.clone(),
                row.period,
                quantity,
                row_id,
            ));
        }

        children
    }

    /// BOM 表是否為空（空表時展開必然無子件）
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
