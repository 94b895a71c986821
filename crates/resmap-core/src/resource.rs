//! 資源列模型
//!
//! 求解器輸出的四種供應資源：庫存、生產、調撥、採購。
//! 每列以穩定的 arena 索引定位（[`ResourceId`]），配置期間不會被刪除，
//! 剩餘量（leftover）歸零即視為耗盡。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 資源種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// 庫存
    Stock,
    /// 生產
    Production,
    /// 調撥（跨地點移動）
    Movement,
    /// 採購
    Procurement,
}

impl ResourceKind {
    /// 所有種類（固定順序，作為同優先級時的決勝序）
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Stock,
        ResourceKind::Production,
        ResourceKind::Movement,
        ResourceKind::Procurement,
    ];

    /// 配置鍵名
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Stock => "stock",
            ResourceKind::Production => "production",
            ResourceKind::Movement => "movement",
            ResourceKind::Procurement => "procurement",
        }
    }

    /// 由配置鍵名解析種類
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stock" => Some(ResourceKind::Stock),
            "production" => Some(ResourceKind::Production),
            "movement" => Some(ResourceKind::Movement),
            "procurement" => Some(ResourceKind::Procurement),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 資源列身份（種類 + arena 索引）
///
/// 自我引用檢查與帳冊記錄都以此為準，不使用指標比較。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub index: usize,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// 庫存扣帳來源
///
/// 庫存列的可用量拆分為多個子計數器，扣哪一池取決於需求的型態：
/// 同型（庫存結轉追溯）扣 `sv_leftover`，跨型（銷售等當期消耗）扣 `ps_leftover`，
/// 兩者耗盡後退回 `is_leftover`（期初庫存）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDraw {
    /// 跨型消耗（當期需求直接吃庫存）
    CrossType,
    /// 同型結轉（庫存型訂單往前期追溯）
    CarryForward,
}

/// 庫存列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRow {
    /// 產品
    pub product: String,

    /// 地點
    pub location: String,

    /// 期間
    pub period: i64,

    /// 期初庫存
    pub initialstock: Decimal,

    /// 求解值（期末庫存水位）
    pub solutionvalue: Decimal,

    /// 當期實際消耗量（由上游載入器計算）
    pub period_spent: Decimal,

    /// 期初庫存剩餘池
    pub is_leftover: Decimal,

    /// 求解值剩餘池（可結轉至次期）
    pub sv_leftover: Decimal,

    /// 當期消耗剩餘池（供同期跨型需求扣帳）
    pub ps_leftover: Decimal,

    /// 超額剩餘（稽核欄位，引擎只回報不扣帳）
    pub er_leftover: Decimal,
}

impl StockRow {
    /// 創建新的庫存列，剩餘池由來源欄位初始化
    pub fn new(
        product: String,
        location: String,
        period: i64,
        initialstock: Decimal,
        solutionvalue: Decimal,
        period_spent: Decimal,
    ) -> Self {
        Self {
            product,
            location,
            period,
            initialstock,
            solutionvalue,
            period_spent,
            is_leftover: initialstock,
            sv_leftover: solutionvalue,
            ps_leftover: period_spent,
            er_leftover: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置超額剩餘
    pub fn with_excess(mut self, excess: Decimal) -> Self {
        self.er_leftover = excess;
        self
    }

    /// 指定扣帳來源下的可用量（主池 + 期初庫存池）
    pub fn available_for(&self, draw: StockDraw) -> Decimal {
        match draw {
            StockDraw::CrossType => self.ps_leftover + self.is_leftover,
            StockDraw::CarryForward => self.sv_leftover + self.is_leftover,
        }
    }

    /// 全部剩餘量（各池合計，不含稽核欄位）
    pub fn total_leftover(&self) -> Decimal {
        self.is_leftover + self.sv_leftover + self.ps_leftover
    }
}

/// 生產列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionRow {
    /// 產品
    pub product: String,

    /// 地點
    pub location: String,

    /// 期間（開工期）
    pub period: i64,

    /// BOM 編號
    pub bomnum: i64,

    /// 提前期（期數）；對照表缺漏時為 0
    pub leadtime: i64,

    /// 求解值（產量）
    pub solutionvalue: Decimal,

    /// 剩餘量
    pub leftover: Decimal,
}

impl ProductionRow {
    /// 創建新的生產列，剩餘量初始化為求解值
    pub fn new(
        product: String,
        location: String,
        period: i64,
        bomnum: i64,
        solutionvalue: Decimal,
    ) -> Self {
        Self {
            product,
            location,
            period,
            bomnum,
            leadtime: 0,
            solutionvalue,
            leftover: solutionvalue,
        }
    }

    /// 建構器模式：設置提前期
    pub fn with_leadtime(mut self, leadtime: i64) -> Self {
        self.leadtime = leadtime;
        self
    }
}

/// 調撥列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRow {
    /// 產品
    pub product: String,

    /// 起運地
    pub loc_from: String,

    /// 到貨地
    pub loc_to: String,

    /// 期間（發運期）
    pub period: i64,

    /// 運輸方式
    pub transport_type: String,

    /// 提前期（在途期數）；對照表缺漏時為 0
    pub leadtime: i64,

    /// 求解值（調撥量）
    pub solutionvalue: Decimal,

    /// 剩餘量
    pub leftover: Decimal,
}

impl MovementRow {
    /// 創建新的調撥列，剩餘量初始化為求解值
    pub fn new(
        product: String,
        loc_from: String,
        loc_to: String,
        period: i64,
        solutionvalue: Decimal,
    ) -> Self {
        Self {
            product,
            loc_from,
            loc_to,
            period,
            transport_type: String::new(),
            leadtime: 0,
            solutionvalue,
            leftover: solutionvalue,
        }
    }

    /// 建構器模式：設置運輸方式
    pub fn with_transport_type(mut self, transport_type: String) -> Self {
        self.transport_type = transport_type;
        self
    }

    /// 建構器模式：設置提前期
    pub fn with_leadtime(mut self, leadtime: i64) -> Self {
        self.leadtime = leadtime;
        self
    }
}

/// 採購列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementRow {
    /// 產品
    pub product: String,

    /// 地點
    pub location: String,

    /// 期間（可用期）
    pub period: i64,

    /// 供應商
    pub supplier: String,

    /// 求解值（採購量）
    pub solutionvalue: Decimal,

    /// 剩餘量
    pub leftover: Decimal,
}

impl ProcurementRow {
    /// 創建新的採購列，剩餘量初始化為求解值
    pub fn new(
        product: String,
        location: String,
        period: i64,
        supplier: String,
        solutionvalue: Decimal,
    ) -> Self {
        Self {
            product,
            location,
            period,
            supplier,
            solutionvalue,
            leftover: solutionvalue,
        }
    }
}
