//! 一键出售：把机器人背包里符合条件的物品批量卖给商店。

use bevy::prelude::*;

use super::snapshot::{PendingActions, SnapshotStore};
use super::staging::RobotLootbox;
use crate::core::events::LogEvent;
use crate::data::schema::KIND_CURRENCY;
use crate::world::components::{ItemInstance, Shop, Wallet};

/// 优先选择的商人
pub const MERCHANT_FO: &str = "merchant_fo";
/// 兜底的通用售货机
pub const MERCHANT_NORMAL: &str = "merchant_normal";

fn sellable(item: &ItemInstance) -> bool {
    item.can_be_sold && item.kind != KIND_CURRENCY && !item.wishlisted && !item.quest_required
}

/// 兑现挂起的出售请求。恢复进行中时保持挂起，避免卖到半满的背包。
/// 每件物品独立结算，单件失败不阻塞其它。
pub fn process_sell_request(
    mut pending: ResMut<PendingActions>,
    store: Res<SnapshotStore>,
    mut lootbox: ResMut<RobotLootbox>,
    shops: Query<&Shop>,
    mut wallet: ResMut<Wallet>,
    mut log: EventWriter<LogEvent>,
) {
    if !pending.sell || store.restore_in_progress() {
        return;
    }
    pending.sell = false;

    let Some(shop) = find_shop(&shops, MERCHANT_FO) else {
        warn!("SellAll: 场景里没有任何商店");
        return;
    };
    let Some(inv) = lootbox.inv.as_mut() else {
        warn!("SellAll: 机器人背包尚未创建");
        return;
    };

    // 先落快照，避免边遍历边删除
    let to_sell: Vec<u64> = inv
        .contents()
        .iter()
        .filter(|item| sellable(item))
        .map(|item| item.uid)
        .collect();

    if to_sell.is_empty() {
        info!("SellAll: 没有可出售的物品");
        return;
    }
    info!("向商店 '{}' 出售 {} 件物品", shop.merchant_id, to_sell.len());

    for uid in to_sell {
        let Some(item) = inv.remove(uid) else {
            warn!("SellAll: 物品 {uid} 已不在背包中，跳过");
            continue;
        };
        let gain = item.base_price as u64 * item.count as u64;
        wallet.0 += gain;
        log.write(LogEvent(format!("出售 {} ×{}，+{gain}", item.name, item.count)));
    }
}

/// 按 MerchantID 找商店；找不到时回退到通用售货机
fn find_shop<'a>(shops: &'a Query<&Shop>, preferred: &str) -> Option<&'a Shop> {
    shops
        .iter()
        .find(|s| s.merchant_id.eq_ignore_ascii_case(preferred))
        .or_else(|| {
            shops
                .iter()
                .find(|s| s.merchant_id.eq_ignore_ascii_case(MERCHANT_NORMAL))
        })
}
