use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde::Deserialize;

/// 机器人物品的固定 ID（对应原版的特殊 TypeID）
pub const ROBOT_ITEM_ID: &str = "robot";
/// 现金物品 ID，一键出售时跳过
pub const CASH_ITEM_ID: &str = "cash";
/// 货币类物品的 kind 标记
pub const KIND_CURRENCY: &str = "currency";

/// 物品静态表条目
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ItemEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default = "default_can_be_sold")]
    pub can_be_sold: bool,
    #[serde(default)]
    pub base_price: u32,
}

fn default_can_be_sold() -> bool {
    true
}

#[derive(Asset, TypePath, Deserialize, Debug)]
pub struct ItemList {
    pub items: Vec<ItemEntry>,
}

impl ItemList {
    pub fn find(&self, id: &str) -> Option<&ItemEntry> {
        self.items.iter().find(|e| e.id.eq_ignore_ascii_case(id))
    }
}
