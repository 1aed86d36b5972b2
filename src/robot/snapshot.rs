//! 换图前后机器人背包的快照捕获与异步恢复。
//!
//! 捕获是同步的；恢复建模为协作式任务，每帧并入一条快照条目。
//! 快照一经消费（无论成败）立即清空，保证恰好使用一次。

use bevy::prelude::*;
use std::collections::VecDeque;

use super::staging::RobotLootbox;
use crate::config::RobotConfig;
use crate::world::components::ItemInstance;

/// 背包内容的不可变时点拷贝
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    items: Vec<ItemInstance>,
}

impl InventorySnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Default)]
enum RestoreState {
    #[default]
    Idle,
    Restoring(VecDeque<ItemInstance>),
}

/// 单槽位的待定操作持有者：最多一个待恢复快照、一个进行中的恢复任务。
/// 新的捕获请求会先丢弃未完成的恢复（最新通知者获胜）。
#[derive(Resource, Default)]
pub struct SnapshotStore {
    pending: Option<InventorySnapshot>,
    restore: RestoreState,
}

impl SnapshotStore {
    /// 换图开始：同步捕获当前背包内容
    pub fn capture(&mut self, inv: &super::staging::StagingInventory) {
        if matches!(self.restore, RestoreState::Restoring(_)) {
            warn!("上一次恢复尚未完成，丢弃未恢复的条目后重新捕获");
            self.restore = RestoreState::Idle;
        }
        let snapshot = InventorySnapshot {
            items: inv.contents().to_vec(),
        };
        info!("已捕获背包快照 ({} 格)", snapshot.len());
        self.pending = Some(snapshot);
    }

    /// 丢弃一切待定状态（关闭保存开关后换图时使用）
    pub fn discard(&mut self) {
        self.pending = None;
        self.restore = RestoreState::Idle;
    }

    /// 把待恢复快照转入恢复队列。没有快照时为 no-op，返回 false。
    pub fn begin_restore(&mut self) -> bool {
        match self.pending.take() {
            Some(snapshot) => {
                info!("开始恢复背包快照 ({} 格)", snapshot.len());
                self.restore = RestoreState::Restoring(snapshot.items.into());
                true
            }
            None => false,
        }
    }

    pub fn restore_in_progress(&self) -> bool {
        matches!(self.restore, RestoreState::Restoring(_))
    }

    /// 取出下一条待恢复条目；队列耗尽时回到 Idle
    fn next_restore_item(&mut self) -> Option<ItemInstance> {
        let RestoreState::Restoring(queue) = &mut self.restore else {
            return None;
        };
        let item = queue.pop_front();
        if queue.is_empty() {
            self.restore = RestoreState::Idle;
        }
        item
    }

    /// 恢复中途失败：剩余条目放弃，回到 Idle
    fn abort_restore(&mut self) {
        self.restore = RestoreState::Idle;
    }
}

/// 延迟到恢复完成后再执行的外部请求（打开背包 / 一键出售）。
/// 这是系统里唯一的同步点：恢复未完成时请求挂起而不是读到半满背包。
#[derive(Resource, Default)]
pub struct PendingActions {
    pub open: bool,
    pub sell: bool,
}

/// 每帧推进恢复任务一步（协作式 await 点）。
/// 背包已满时剩余条目按尽力而为丢弃并告警，恢复照常结束。
pub fn restore_snapshot_step(
    mut store: ResMut<SnapshotStore>,
    mut lootbox: ResMut<RobotLootbox>,
    cfg: Res<RobotConfig>,
) {
    let Some(item) = store.next_restore_item() else {
        return;
    };
    let inv = lootbox.check_or_create(&cfg);
    if !inv.try_add(item) {
        warn!("恢复快照时机器人背包已满，放弃剩余条目");
        store.abort_restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::staging::StagingInventory;

    fn inv_with(ids: &[&str]) -> StagingInventory {
        let mut inv = StagingInventory::new(64);
        for (i, id) in ids.iter().enumerate() {
            assert!(inv.try_add(ItemInstance::for_test(i as u64, id, 1)));
        }
        inv
    }

    fn drain_restore(store: &mut SnapshotStore, target: &mut StagingInventory) {
        while let Some(item) = store.next_restore_item() {
            if !target.try_add(item) {
                store.abort_restore();
            }
        }
    }

    #[test]
    fn round_trip_restores_equivalent_contents_once() {
        let source = inv_with(&["a", "b", "c"]);
        let mut store = SnapshotStore::default();
        store.capture(&source);

        let mut fresh = StagingInventory::new(64);
        assert!(store.begin_restore());
        drain_restore(&mut store, &mut fresh);

        let ids: Vec<_> = fresh.contents().iter().map(|s| s.proto_id.clone()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(!store.restore_in_progress());

        // 没有新的捕获时，第二次恢复是 no-op
        assert!(!store.begin_restore());
    }

    #[test]
    fn restore_full_target_aborts_without_blocking_idle() {
        let source = inv_with(&["a", "b", "c"]);
        let mut store = SnapshotStore::default();
        store.capture(&source);

        let mut tiny = StagingInventory::new(1);
        assert!(store.begin_restore());
        drain_restore(&mut store, &mut tiny);

        assert_eq!(tiny.occupied(), 1);
        // 失败也要回到 Live，快照不可复用
        assert!(!store.restore_in_progress());
        assert!(!store.begin_restore());
    }

    #[test]
    fn new_capture_discards_outstanding_restore() {
        let first = inv_with(&["a", "b"]);
        let mut store = SnapshotStore::default();
        store.capture(&first);
        assert!(store.begin_restore());
        // 恢复只走了一步，新的换图又开始了
        let mut target = StagingInventory::new(64);
        if let Some(item) = store.next_restore_item() {
            assert!(target.try_add(item));
        }

        let second = inv_with(&["x"]);
        store.capture(&second);
        assert!(!store.restore_in_progress());

        let mut fresh = StagingInventory::new(64);
        assert!(store.begin_restore());
        drain_restore(&mut store, &mut fresh);
        let ids: Vec<_> = fresh.contents().iter().map(|s| s.proto_id.clone()).collect();
        // 恢复的是最新快照，旧任务的残余不会复活
        assert_eq!(ids, ["x"]);
    }

    #[test]
    fn discard_clears_pending_snapshot() {
        let source = inv_with(&["a"]);
        let mut store = SnapshotStore::default();
        store.capture(&source);
        store.discard();
        assert!(!store.begin_restore());
    }
}
