//! 配置模型
//!
//! 門檻、資源種類優先序、BOM 展開與提前期開關。配置檔的讀取在系統
//! 邊界之外，這裡只定義型別與驗證；未知的優先序鍵名屬致命錯誤，
//! 必須在任何配置開始前回報。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::resource::ResourceKind;
use crate::{MapperError, Result};

/// 時間方向（根訂單的排序方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDirection {
    /// 由早期往晚期
    Forward,
    /// 由晚期往早期（預設，晚期需求先佔用資源）
    Backward,
}

/// 資源種類優先序表
///
/// 數值越小優先級越高；同值時依 [`ResourceKind::ALL`] 的固定順序決勝。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityMap {
    ranks: [u32; 4],
}

impl PriorityMap {
    /// 以種類順序（stock, production, movement, procurement）給定優先值
    pub fn new(stock: u32, production: u32, movement: u32, procurement: u32) -> Self {
        Self {
            ranks: [stock, production, movement, procurement],
        }
    }

    /// 由鍵名表建立，未知鍵名回報 [`MapperError::UnknownResourceKind`]
    pub fn from_named(map: &HashMap<String, u32>) -> Result<Self> {
        let mut priority = Self::default();
        for (name, &rank) in map {
            let kind = ResourceKind::from_name(name)
                .ok_or_else(|| MapperError::UnknownResourceKind(name.clone()))?;
            priority.ranks[Self::slot(kind)] = rank;
        }
        Ok(priority)
    }

    /// 指定種類的優先值
    pub fn rank(&self, kind: ResourceKind) -> u32 {
        self.ranks[Self::slot(kind)]
    }

    /// 依優先值由高至低排列的種類清單（同值依固定種類順序）
    pub fn sorted_kinds(&self) -> [ResourceKind; 4] {
        let mut kinds = ResourceKind::ALL;
        kinds.sort_by_key(|&k| self.rank(k));
        kinds
    }

    fn slot(kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Stock => 0,
            ResourceKind::Production => 1,
            ResourceKind::Movement => 2,
            ResourceKind::Procurement => 3,
        }
    }
}

impl Default for PriorityMap {
    /// 預設優先序：production 0、stock 1、movement 2、procurement 3
    fn default() -> Self {
        Self::new(1, 0, 2, 3)
    }
}

/// 資源配置引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// 近零門檻：低於此值的剩餘量/未滿足量視為耗盡/滿足
    pub threshold: Decimal,

    /// 資源種類優先序
    pub priority: PriorityMap,

    /// 是否展開 BOM
    pub map_bom: bool,

    /// 是否採用提前期（false 時一律視為 0）
    pub use_lead_time: bool,

    /// 根訂單排序方向
    pub time_direction: TimeDirection,
}

impl MapperConfig {
    /// 創建預設配置（門檻 0.10，backward，展開 BOM，採用提前期）
    pub fn new() -> Self {
        Self {
            threshold: Decimal::new(10, 2), // 0.10
            priority: PriorityMap::default(),
            map_bom: true,
            use_lead_time: true,
            time_direction: TimeDirection::Backward,
        }
    }

    /// 建構器模式：設置門檻
    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.threshold = threshold;
        self
    }

    /// 建構器模式：設置優先序
    pub fn with_priority(mut self, priority: PriorityMap) -> Self {
        self.priority = priority;
        self
    }

    /// 建構器模式：設置 BOM 展開開關
    pub fn with_map_bom(mut self, map_bom: bool) -> Self {
        self.map_bom = map_bom;
        self
    }

    /// 建構器模式：設置提前期開關
    pub fn with_lead_time(mut self, use_lead_time: bool) -> Self {
        self.use_lead_time = use_lead_time;
        self
    }

    /// 建構器模式：設置時間方向
    pub fn with_time_direction(mut self, direction: TimeDirection) -> Self {
        self.time_direction = direction;
        self
    }

    /// 配置驗證：非正門檻會破壞終止性，屬致命錯誤
    pub fn validate(&self) -> Result<()> {
        if self.threshold <= Decimal::ZERO {
            return Err(MapperError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// 指定列的有效提前期
    pub fn effective_leadtime(&self, leadtime: i64) -> i64 {
        if self.use_lead_time {
            leadtime
        } else {
            0
        }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new()
    }
}
