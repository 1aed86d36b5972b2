//! 机器人背包：容量受限、保序、按模板堆叠合并的暂存容器。

use bevy::prelude::*;

use crate::config::RobotConfig;
use crate::world::components::ItemInstance;

/// 暂存容器本体。独立于调度器存在，可被快照 / 恢复整体搬运。
#[derive(Debug, Clone)]
pub struct StagingInventory {
    slots: Vec<ItemInstance>,
    capacity: usize,
}

impl StagingInventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// 先尝试并入可合并的已有格；否则在容量允许时占用新格。
    /// 失败时不产生任何改动。
    pub fn try_add(&mut self, item: ItemInstance) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.can_merge(&item)) {
            slot.count += item.count;
            return true;
        }
        if self.slots.len() < self.capacity {
            self.slots.push(item);
            return true;
        }
        false
    }

    /// 调整容量上限。收缩到低于当前占用时不驱逐已有物品，
    /// 只是在占用降下来之前阻止新增。
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupied(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 插入序稳定的内容视图，供出售 / 打印迭代
    pub fn contents(&self) -> &[ItemInstance] {
        &self.slots
    }

    pub fn remove(&mut self, uid: u64) -> Option<ItemInstance> {
        let pos = self.slots.iter().position(|s| s.uid == uid)?;
        Some(self.slots.remove(pos))
    }
}

/// 机器人背包的持有者。`inv` 懒创建，换图后被整体替换，
/// 任何时刻最多只有一个活动实例。
#[derive(Resource, Default)]
pub struct RobotLootbox {
    pub inv: Option<StagingInventory>,
    pub need_inspect: bool,
}

impl RobotLootbox {
    /// 幂等：已有背包时什么都不做
    pub fn check_or_create(&mut self, cfg: &RobotConfig) -> &mut StagingInventory {
        if self.inv.is_none() {
            info!(
                "创建机器人背包 (容量 {})",
                cfg.robot_inventory_capacity
            );
            self.need_inspect = cfg.robot_inventory_need_inspect;
            self.inv = Some(StagingInventory::new(cfg.robot_inventory_capacity));
        }
        self.inv.as_mut().expect("just created")
    }
}
