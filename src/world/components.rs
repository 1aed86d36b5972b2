use bevy::prelude::*;

use crate::data::schema::ItemEntry;

/// 运行时物品实例。由世界（容器 / 地面 / 机器人背包）持有，
/// 扫描过程只是搬运，从不销毁。
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInstance {
    /// 实例唯一 ID
    pub uid: u64,
    pub proto_id: String,
    pub name: String,
    pub kind: String,
    pub stackable: bool,
    pub can_be_sold: bool,
    /// 愿望单标记，阻止出售
    pub wishlisted: bool,
    /// 任务需求标记，阻止出售
    pub quest_required: bool,
    pub base_price: u32,
    pub count: u32,
}

impl ItemInstance {
    pub fn from_proto(proto: &ItemEntry, uid: u64, count: u32) -> Self {
        Self {
            uid,
            proto_id: proto.id.clone(),
            name: proto.name.clone(),
            kind: proto.kind.clone(),
            stackable: proto.stackable,
            can_be_sold: proto.can_be_sold,
            wishlisted: false,
            quest_required: false,
            base_price: proto.base_price,
            count,
        }
    }

    /// 可堆叠且同模板、保留标记一致的实例允许合并到同一格
    pub fn can_merge(&self, other: &ItemInstance) -> bool {
        self.stackable
            && other.stackable
            && self.proto_id == other.proto_id
            && self.wishlisted == other.wishlisted
            && self.quest_required == other.quest_required
    }

    #[cfg(test)]
    pub fn for_test(uid: u64, proto_id: &str, count: u32) -> Self {
        Self {
            uid,
            proto_id: proto_id.to_string(),
            name: proto_id.to_string(),
            kind: "loot".to_string(),
            stackable: false,
            can_be_sold: true,
            wishlisted: false,
            quest_required: false,
            base_price: 1,
            count,
        }
    }

    #[cfg(test)]
    pub fn stackable_for_test(uid: u64, proto_id: &str, count: u32) -> Self {
        Self {
            stackable: true,
            ..Self::for_test(uid, proto_id, count)
        }
    }
}

/// 世界中的可搜刮容器
#[derive(Component)]
pub struct Lootbox {
    pub display_name: String,
    pub items: Vec<ItemInstance>,
}

/// 玩家永久仓库标记：扫描遇到它时整轮容器处理中止
#[derive(Component)]
pub struct PlayerStorage;

/// 玩家坟墓标记：内容物不被搜刮
#[derive(Component)]
pub struct GraveMarker;

/// 地面可拾取物
#[derive(Component)]
pub struct GroundItem {
    pub item: Option<ItemInstance>,
}

/// 商店（外部交易端点）
#[derive(Component)]
pub struct Shop {
    pub merchant_id: String,
}

/// 玩家标记组件
#[derive(Component)]
pub struct Player;

/// 本关卡实体标记，换图时统一清理
#[derive(Component)]
pub struct LevelEntity;

/// 玩家随身背包（挂在 Resource，跨关卡保留）
#[derive(Resource)]
pub struct PlayerInventory {
    pub slots: Vec<ItemInstance>,
    pub capacity: usize,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            capacity: 30,
        }
    }
}

impl PlayerInventory {
    /// 第一个空位下标；满了返回 None（对应 GetFirstEmptyPosition < 0）
    pub fn first_empty_position(&self) -> Option<usize> {
        (self.slots.len() < self.capacity).then_some(self.slots.len())
    }

    pub fn has_item(&self, proto_id: &str) -> bool {
        self.slots.iter().any(|s| s.proto_id == proto_id)
    }

    pub fn add(&mut self, item: ItemInstance) -> bool {
        if self.first_empty_position().is_none() {
            return false;
        }
        self.slots.push(item);
        true
    }
}

/// 玩家钱包，出售所得记入这里
#[derive(Resource, Default)]
pub struct Wallet(pub u64);

/// 当前关卡序号，换图自增
#[derive(Resource, Default)]
pub struct LevelIndex(pub u32);

/// 实例 ID 发号器
#[derive(Resource, Default)]
pub struct InstanceIdGen(u64);

impl InstanceIdGen {
    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_inventory_reports_full() {
        let mut inv = PlayerInventory {
            capacity: 2,
            ..Default::default()
        };
        assert_eq!(inv.first_empty_position(), Some(0));
        assert!(inv.add(ItemInstance::for_test(1, "a", 1)));
        assert!(inv.add(ItemInstance::for_test(2, "b", 1)));
        assert_eq!(inv.first_empty_position(), None);
        assert!(!inv.add(ItemInstance::for_test(3, "c", 1)));
    }

    #[test]
    fn merge_key_requires_matching_reserved_flags() {
        let a = ItemInstance::stackable_for_test(1, "scrap", 1);
        let mut b = ItemInstance::stackable_for_test(2, "scrap", 1);
        assert!(a.can_merge(&b));
        b.wishlisted = true;
        assert!(!a.can_merge(&b));
    }
}
