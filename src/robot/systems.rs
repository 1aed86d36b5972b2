//! 定时扫描-搬运循环：节流、候选收集、排除规则、硬停条件。

use bevy::prelude::*;

use super::debug::spawn_detection_markers;
use super::events::*;
use super::snapshot::{PendingActions, SnapshotStore};
use super::staging::RobotLootbox;
use crate::config::RobotConfig;
use crate::core::events::{LogEvent, PopTextEvent};
use crate::data::schema::ROBOT_ITEM_ID;
use crate::world::components::*;

/// 玩家随身背包没有空位，整轮扫描硬停
pub const MSG_BAG_FULL: &str = "背包满了，机器人无法继续拾取";
/// 机器人暂存背包满，本轮剩余物品不再处理
pub const MSG_STAGING_FULL: &str = "机器人背包满了";
pub const MSG_START_COLLECT: &str = "机器人开始收集...";
pub const MSG_STOP_COLLECT: &str = "机器人停止收集!";

/// 单次扫描的候选上限，超出部分静默截断（接受的近似）
const MAX_SCAN_CANDIDATES: usize = 4096;

/// 调度器运行状态
#[derive(Resource)]
pub struct SchedulerState {
    pub collecting: bool,
    /// 上一次成功触发扫描的时间戳
    pub next_collect_time: f32,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            collecting: false,
            next_collect_time: 0.0,
        }
    }
}

/// 开始 / 停止收集。两个触发器互斥，且都要求玩家随身携带机器人。
pub fn handle_start_stop(
    mut ev_start: EventReader<StartCollectEvent>,
    mut ev_stop: EventReader<StopCollectEvent>,
    mut sched: ResMut<SchedulerState>,
    player_inv: Res<PlayerInventory>,
    mut pop: EventWriter<PopTextEvent>,
) {
    for _ in ev_start.read() {
        if !player_inv.has_item(ROBOT_ITEM_ID) {
            warn!("StartCollect: 玩家没有携带收集机器人");
            continue;
        }
        if !sched.collecting {
            sched.collecting = true;
            pop.write(PopTextEvent(MSG_START_COLLECT.into()));
        }
    }
    for _ in ev_stop.read() {
        if !player_inv.has_item(ROBOT_ITEM_ID) {
            warn!("StopCollect: 玩家没有携带收集机器人");
            continue;
        }
        if sched.collecting {
            sched.collecting = false;
            pop.write(PopTextEvent(MSG_STOP_COLLECT.into()));
        }
    }
}

enum Candidate {
    Lootbox(Entity),
    Ground(Entity),
}

/// 每帧调用的调度入口：按配置间隔节流，触发时执行一轮扫描。
/// 无论扫描是否提前中止，时间戳都会被刷新。
pub fn auto_collect_update(
    mut commands: Commands,
    time: Res<Time>,
    cfg: Res<RobotConfig>,
    mut sched: ResMut<SchedulerState>,
    mut lootbox_res: ResMut<RobotLootbox>,
    player_inv: Res<PlayerInventory>,
    player_q: Query<&Transform, With<Player>>,
    mut lootboxes: Query<
        (Entity, &Transform, &mut Lootbox, Has<PlayerStorage>, Has<GraveMarker>),
        Without<Player>,
    >,
    mut grounds: Query<(Entity, &Transform, &mut GroundItem), Without<Lootbox>>,
    mut pop: EventWriter<PopTextEvent>,
) {
    if !sched.collecting {
        return;
    }
    let now = time.elapsed_secs();
    if sched.next_collect_time + cfg.collect_interval > now {
        return;
    }
    sched.next_collect_time = now;

    let Ok(player_tf) = player_q.single() else {
        return;
    };
    let center = player_tf.translation;
    let radius = cfg.collect_radius;

    // 1. 收集半径内的候选，容器在前、地面物品在后，整体截断到上限
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut hits: Vec<Vec3> = Vec::new();
    if cfg.collect_lootbox {
        for (e, tf, ..) in lootboxes.iter() {
            if candidates.len() >= MAX_SCAN_CANDIDATES {
                break;
            }
            if tf.translation.distance(center) <= radius {
                candidates.push(Candidate::Lootbox(e));
                hits.push(tf.translation);
            }
        }
    }
    if cfg.collect_ground_items {
        for (e, tf, _) in grounds.iter() {
            if candidates.len() >= MAX_SCAN_CANDIDATES {
                break;
            }
            if tf.translation.distance(center) <= radius {
                candidates.push(Candidate::Ground(e));
                hits.push(tf.translation);
            }
        }
    }

    if cfg.debug_draw_collect_radius {
        spawn_detection_markers(&mut commands, center, radius, &hits, 0.5);
    }

    // 2. 逐候选处理。单个候选出问题只跳过它自己；
    //    仅有的两个硬停：玩家仓库、玩家背包无空位（以及暂存满）。
    for candidate in candidates {
        match candidate {
            Candidate::Lootbox(e) => {
                let Ok((_, _, mut lb, is_storage, is_grave)) = lootboxes.get_mut(e) else {
                    continue;
                };
                if is_storage {
                    // 玩家永久仓库：本轮到此为止
                    return;
                }
                if is_grave {
                    info!("跳过坟墓容器 {}", lb.display_name);
                    continue;
                }
                if lb.items.is_empty() {
                    continue;
                }

                // 先落一份分离的工作列表，避免边遍历边删除
                let working: Vec<u64> = lb.items.iter().map(|i| i.uid).collect();
                for uid in working {
                    if player_inv.first_empty_position().is_none() {
                        pop.write(PopTextEvent(MSG_BAG_FULL.into()));
                        return;
                    }
                    let inv = lootbox_res.check_or_create(&cfg);
                    let Some(pos) = lb.items.iter().position(|i| i.uid == uid) else {
                        continue;
                    };
                    let item = lb.items.remove(pos);
                    if let Err(item) = try_stage(inv, item) {
                        // 放回原容器，保证物品不丢
                        lb.items.insert(pos, item);
                        pop.write(PopTextEvent(MSG_STAGING_FULL.into()));
                        return;
                    }
                }
            }
            Candidate::Ground(e) => {
                let Ok((entity, _, mut ground)) = grounds.get_mut(e) else {
                    continue;
                };
                if player_inv.first_empty_position().is_none() {
                    pop.write(PopTextEvent(MSG_BAG_FULL.into()));
                    return;
                }
                let Some(item) = ground.item.take() else {
                    continue;
                };
                let inv = lootbox_res.check_or_create(&cfg);
                match try_stage(inv, item) {
                    Ok(()) => {
                        commands.entity(entity).despawn();
                    }
                    Err(item) => {
                        ground.item = Some(item);
                        pop.write(PopTextEvent(MSG_STAGING_FULL.into()));
                        return;
                    }
                }
            }
        }
    }
}

/// 失败时原样归还物品，调用方决定放回哪里
fn try_stage(
    inv: &mut super::staging::StagingInventory,
    item: ItemInstance,
) -> Result<(), ItemInstance> {
    let probe = item.clone();
    if inv.try_add(item) {
        Ok(())
    } else {
        Err(probe)
    }
}

/// 换图开始：停止收集，按配置捕获快照
pub fn on_transition_begin(
    cfg: Res<RobotConfig>,
    mut sched: ResMut<SchedulerState>,
    mut store: ResMut<SnapshotStore>,
    lootbox: Res<RobotLootbox>,
) {
    if sched.collecting {
        info!("换图，自动停止收集");
    }
    sched.collecting = false;

    if cfg.save_robot_inv {
        if let Some(inv) = &lootbox.inv {
            store.capture(inv);
        }
    } else {
        store.discard();
    }
}

/// 换图完成：重建机器人背包，若有待恢复快照则启动异步恢复
pub fn on_environment_ready(
    cfg: Res<RobotConfig>,
    mut lootbox: ResMut<RobotLootbox>,
    mut store: ResMut<SnapshotStore>,
) {
    // 旧背包随关卡一起销毁，这里重建暂存身份
    lootbox.inv = None;
    lootbox.check_or_create(&cfg);

    if cfg.save_robot_inv {
        store.begin_restore();
    } else {
        store.discard();
    }
}

/// 外部请求先挂到待定槽位，等恢复完成再兑现
pub fn queue_staging_requests(
    mut ev_open: EventReader<OpenStagingEvent>,
    mut ev_sell: EventReader<SellAllEvent>,
    mut pending: ResMut<PendingActions>,
) {
    if ev_open.read().next().is_some() {
        pending.open = true;
    }
    if ev_sell.read().next().is_some() {
        pending.sell = true;
    }
}

/// 打开机器人背包（打印内容）。恢复进行中时保持挂起。
pub fn process_open_request(
    mut pending: ResMut<PendingActions>,
    store: Res<SnapshotStore>,
    mut lootbox: ResMut<RobotLootbox>,
    cfg: Res<RobotConfig>,
    mut log: EventWriter<LogEvent>,
) {
    if !pending.open || store.restore_in_progress() {
        return;
    }
    pending.open = false;

    let need_inspect = lootbox.need_inspect;
    let inv = lootbox.check_or_create(&cfg);
    if need_inspect {
        log.write(LogEvent("（搜索中…）".into()));
    }
    log.write(LogEvent(format!(
        "机器人背包 ({}/{}):",
        inv.occupied(),
        inv.capacity()
    )));
    if inv.is_empty() {
        log.write(LogEvent("  (空)".into()));
        return;
    }
    for (idx, slot) in inv.contents().iter().enumerate() {
        log.write(LogEvent(format!(
            "  [{idx}] {} ×{} (id={})",
            slot.name, slot.count, slot.proto_id
        )));
    }
}
