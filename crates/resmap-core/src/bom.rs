//! BOM（物料清單）模型
//!
//! 求解器輸出的 BOM 表是攤平的係數表：每列描述某 BOM 編號在某期間、
//! 某地點下，一單位產出對某投入品的係數。負的 `input_output` 代表投入。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// BOM 係數列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomEntry {
    /// BOM 編號
    pub bomnum: i64,

    /// 地點
    pub location: String,

    /// 產品（投入品或產出品）
    pub product: String,

    /// 期間
    pub period: i64,

    /// 投入/產出係數（負值 = 每單位產出所需的投入量）
    pub input_output: Decimal,
}

impl BomEntry {
    pub fn new(
        bomnum: i64,
        location: String,
        product: String,
        period: i64,
        input_output: Decimal,
    ) -> Self {
        Self {
            bomnum,
            location,
            product,
            period,
            input_output,
        }
    }

    /// 是否為投入列
    pub fn is_input(&self) -> bool {
        self.input_output < Decimal::ZERO
    }
}

/// BOM 表（依 BOM 編號建立索引）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BomTable {
    entries: Vec<BomEntry>,
    index: HashMap<i64, Vec<usize>>,
}

impl BomTable {
    /// 創建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 由係數列建表
    pub fn from_entries(entries: Vec<BomEntry>) -> Self {
        let mut index: HashMap<i64, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.bomnum).or_default().push(i);
        }
        Self { entries, index }
    }

    /// 新增一列並維護索引
    pub fn push(&mut self, entry: BomEntry) {
        self.index
            .entry(entry.bomnum)
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    /// 指定 BOM 編號與期間下的所有投入列
    ///
    /// 索引桶依插入順序迭代，結果順序可重現。
    pub fn inputs_for(&self, bomnum: i64, period: i64) -> impl Iterator<Item = &BomEntry> {
        self.index
            .get(&bomnum)
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.entries[i])
            .filter(move |e| e.period == period && e.is_input())
    }

    /// 是否完全沒有係數列
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 係數列總數
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
