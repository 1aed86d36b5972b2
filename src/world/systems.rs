use bevy::prelude::*;

use super::components::*;
use crate::core::states::AppState;
use crate::data::schema::{ItemList, CASH_ITEM_ID, ROBOT_ITEM_ID};
use crate::data::ItemAssets;

/// 换图中转：模拟关卡加载完成后立刻回到 InGame
pub fn finish_transition(mut next: ResMut<NextState<AppState>>) {
    next.set(AppState::InGame);
}

/// 进入关卡时搭一个演示场景：玩家、商店、若干容器和地面物品。
/// 布局随关卡序号略有变化，方便观察换图后的快照恢复。
pub fn spawn_level(
    mut commands: Commands,
    mut level: ResMut<LevelIndex>,
    mut ids: ResMut<InstanceIdGen>,
    mut player_inv: ResMut<PlayerInventory>,
    item_assets: Res<ItemAssets>,
    lists: Res<Assets<ItemList>>,
) {
    level.0 += 1;
    info!("进入关卡 {}", level.0);

    let Some(list) = item_assets.handle.as_ref().and_then(|h| lists.get(h)) else {
        warn!("物品表未加载，关卡生成跳过");
        return;
    };

    let mut make = |id: &str, count: u32| -> Option<ItemInstance> {
        match list.find(id) {
            Some(proto) => Some(ItemInstance::from_proto(proto, ids.next(), count)),
            None => {
                warn!("物品表缺少模板 {id}");
                None
            }
        }
    };

    // 玩家（机器人物品只发一次，跨关卡随身携带）
    commands.spawn((Player, Transform::from_xyz(0.0, 0.0, 0.0), LevelEntity));
    if !player_inv.has_item(ROBOT_ITEM_ID) {
        if let Some(robot) = make(ROBOT_ITEM_ID, 1) {
            player_inv.add(robot);
        }
    }

    // 商店
    commands.spawn((
        Shop {
            merchant_id: "merchant_fo".into(),
        },
        Transform::from_xyz(-4.0, 0.0, 2.0),
        LevelEntity,
    ));
    commands.spawn((
        Shop {
            merchant_id: "merchant_normal".into(),
        },
        Transform::from_xyz(-4.0, 0.0, -2.0),
        LevelEntity,
    ));

    // 普通容器：在收集半径内
    let crate_items: Vec<ItemInstance> = [("scrap", 3), ("cloth", 2), (CASH_ITEM_ID, 50)]
        .into_iter()
        .filter_map(|(id, n)| make(id, n))
        .collect();
    commands.spawn((
        Lootbox {
            display_name: format!("木箱-{}", level.0),
            items: crate_items,
        },
        Transform::from_xyz(3.0, 0.0, 1.0),
        LevelEntity,
    ));

    let mut shelf_items: Vec<ItemInstance> = [("medkit", 1), ("rare_figurine", 1)]
        .into_iter()
        .filter_map(|(id, n)| make(id, n))
        .collect();
    // 手办在愿望单上，出售时会被跳过
    if let Some(fig) = shelf_items.iter_mut().find(|i| i.proto_id == "rare_figurine") {
        fig.wishlisted = true;
    }
    commands.spawn((
        Lootbox {
            display_name: "货架".into(),
            items: shelf_items,
        },
        Transform::from_xyz(-2.0, 0.0, 4.0),
        LevelEntity,
    ));

    // 玩家仓库与坟墓：永远不该被机器人搬空
    commands.spawn((
        Lootbox {
            display_name: "玩家仓库".into(),
            items: [("scrap", 10)].into_iter().filter_map(|(id, n)| make(id, n)).collect(),
        },
        PlayerStorage,
        Transform::from_xyz(6.0, 0.0, -3.0),
        LevelEntity,
    ));
    commands.spawn((
        Lootbox {
            display_name: "阵亡背包".into(),
            items: [("quest_chip", 1)].into_iter().filter_map(|(id, n)| make(id, n)).collect(),
        },
        GraveMarker,
        Transform::from_xyz(2.0, 0.0, -5.0),
        LevelEntity,
    ));

    // 地面物品：半径内外各一
    if let Some(item) = make("scrap", 1) {
        commands.spawn((
            GroundItem { item: Some(item) },
            Transform::from_xyz(1.0, 0.0, -1.0),
            LevelEntity,
        ));
    }
    if let Some(item) = make("medkit", 1) {
        commands.spawn((
            GroundItem { item: Some(item) },
            Transform::from_xyz(80.0, 0.0, 0.0),
            LevelEntity,
        ));
    }
}

/// 换图时清理本关卡实体
pub fn despawn_level(mut commands: Commands, entities: Query<Entity, With<LevelEntity>>) {
    for e in entities.iter() {
        commands.entity(e).despawn();
    }
}
