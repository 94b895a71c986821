//! 需求訂單模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::resource::ResourceId;

/// 訂單型態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// 銷售訂單（輸入的根訂單）
    Sale,
    /// BOM 展開衍生的元件需求
    Bom,
    /// 庫存結轉追溯衍生的需求
    Stock,
    /// 調撥來源追溯衍生的需求
    Movement,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Sale => "sale",
            OrderType::Bom => "bom",
            OrderType::Stock => "stock",
            OrderType::Movement => "movement",
        }
    }
}

/// 需求訂單
///
/// 每筆輸入銷售列對應一筆根訂單；配置過程中只會變動 `residual`，
/// 訂單本身不會被刪除。衍生訂單（BOM 子件、結轉、調撥追溯）沿用
/// 根訂單的 `order_id` 與 `label`，並記錄衍生來源列（`origin`）
/// 以阻止資源列滿足自己衍生的需求。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandOrder {
    /// 訂單ID（根訂單的輸入序號，衍生訂單沿用）
    pub order_id: u64,

    /// 標籤（來源單據描述）
    pub label: String,

    /// 產品
    pub product: String,

    /// 需求地點（供應需到達之處）
    pub loc_from: String,

    /// 交付地點
    pub loc_to: String,

    /// 客戶
    pub client: String,

    /// 期間
    pub period: i64,

    /// 需求數量
    pub quantity: Decimal,

    /// 單價
    pub price: Decimal,

    /// 訂單型態
    pub order_type: OrderType,

    /// 未滿足量（配置過程中遞減）
    pub residual: Decimal,

    /// 衍生當下的來源可用量（衍生訂單稽核用；根訂單等於需求數量）
    pub leftover: Decimal,

    /// 衍生來源資源列（根訂單為 None）
    pub origin: Option<ResourceId>,
}

impl DemandOrder {
    /// 創建新的銷售根訂單
    pub fn new(
        order_id: u64,
        product: String,
        location: String,
        client: String,
        period: i64,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            order_id,
            label: String::new(),
            product,
            loc_from: location.clone(),
            loc_to: location,
            client,
            period,
            quantity,
            price,
            order_type: OrderType::Sale,
            residual: quantity,
            leftover: quantity,
            origin: None,
        }
    }

    /// 建構器模式：設置標籤
    pub fn with_label(mut self, label: String) -> Self {
        self.label = label;
        self
    }

    /// 建構器模式：設置交付地點
    pub fn with_loc_to(mut self, loc_to: String) -> Self {
        self.loc_to = loc_to;
        self
    }

    /// 創建衍生訂單（沿用父訂單的 order_id 與 label）
    pub fn derived(
        parent: &DemandOrder,
        order_type: OrderType,
        product: String,
        location: String,
        period: i64,
        quantity: Decimal,
        origin: ResourceId,
    ) -> Self {
        Self {
            order_id: parent.order_id,
            label: parent.label.clone(),
            product,
            loc_from: location.clone(),
            loc_to: location,
            client: parent.client.clone(),
            period,
            quantity,
            price: Decimal::ZERO,
            order_type,
            residual: quantity,
            leftover: quantity,
            origin: Some(origin),
        }
    }

    /// 排序鍵：總價值（單價 × 數量）
    pub fn total_value(&self) -> Decimal {
        self.price * self.quantity
    }

    /// 是否已滿足（未滿足量低於門檻）
    pub fn is_fulfilled(&self, threshold: Decimal) -> bool {
        self.residual.abs() < threshold
    }

    /// 扣減未滿足量；低於門檻即落地為零，避免殘餘噪聲引發微量遞迴
    pub fn settle(&mut self, spend: Decimal, threshold: Decimal) {
        let mut remaining = self.residual - spend;
        if remaining < threshold {
            remaining = Decimal::ZERO;
        }
        self.residual = remaining;
    }

    /// 是否為根訂單
    pub fn is_root(&self) -> bool {
        self.order_type == OrderType::Sale
    }
}
