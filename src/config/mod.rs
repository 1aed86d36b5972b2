pub mod store;

use bevy::prelude::*;

use crate::robot::RobotLootbox;
pub use store::{resolve_config_dir, ConfigStore, RobotConfig, CURRENT_CONFIG_TOKEN};

/// 请求应用一份新配置（设置面板 / CLI 修改都走这一条路）
#[derive(Event)]
pub struct ApplyConfigEvent(pub RobotConfig);

pub struct ConfigPlugin;
impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        let store = ConfigStore::new(resolve_config_dir());
        let cfg = store.load();

        app.insert_resource(store)
            .insert_resource(cfg)
            .add_event::<ApplyConfigEvent>()
            .add_systems(Update, apply_config);
    }
}

/// 统一的配置变更入口：重新校验、落盘，并把副作用推给机器人背包
/// （容量调整不会驱逐已有物品，只限制后续添加）。
pub fn apply_config(
    mut ev_apply: EventReader<ApplyConfigEvent>,
    mut cfg: ResMut<RobotConfig>,
    store: Res<ConfigStore>,
    mut lootbox: ResMut<RobotLootbox>,
) {
    for ApplyConfigEvent(next) in ev_apply.read() {
        let mut next = next.clone();
        next.validate();
        *cfg = next;

        lootbox.need_inspect = cfg.robot_inventory_need_inspect;
        if let Some(inv) = lootbox.inv.as_mut() {
            inv.set_capacity(cfg.robot_inventory_capacity);
        }

        if let Err(e) = store.save(&cfg) {
            warn!("配置保存失败: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::staging::StagingInventory;
    use crate::world::components::ItemInstance;

    fn test_app(dir: &str) -> App {
        let mut app = App::new();
        let store = ConfigStore::new(
            std::env::temp_dir()
                .join("acr_apply_tests")
                .join(format!("{}_{}", dir, std::process::id())),
        );
        app.add_plugins(MinimalPlugins)
            .insert_resource(store)
            .insert_resource(RobotConfig::default())
            .insert_resource(RobotLootbox::default())
            .add_event::<ApplyConfigEvent>()
            .add_systems(Update, apply_config);
        app
    }

    #[test]
    fn apply_revalidates_and_resizes_staging() {
        let mut app = test_app("resize");

        {
            let cfg = app.world().resource::<RobotConfig>().clone();
            let mut lootbox = app.world_mut().resource_mut::<RobotLootbox>();
            let inv = lootbox.check_or_create(&cfg);
            assert!(inv.try_add(ItemInstance::for_test(1, "scrap", 3)));
        }

        let mut next = app.world().resource::<RobotConfig>().clone();
        next.robot_inventory_capacity = 99999;
        next.collect_interval = -5.0;
        app.world_mut().send_event(ApplyConfigEvent(next));
        app.update();

        let cfg = app.world().resource::<RobotConfig>();
        assert_eq!(cfg.robot_inventory_capacity, 2048);
        assert_eq!(cfg.collect_interval, 0.5);

        let lootbox = app.world().resource::<RobotLootbox>();
        let inv = lootbox.inv.as_ref().unwrap();
        assert_eq!(inv.capacity(), 2048);
        assert_eq!(inv.occupied(), 1);
    }

    #[test]
    fn shrinking_capacity_keeps_existing_items() {
        let mut app = test_app("shrink");

        {
            let cfg = app.world().resource::<RobotConfig>().clone();
            let mut lootbox = app.world_mut().resource_mut::<RobotLootbox>();
            let inv = lootbox.check_or_create(&cfg);
            for i in 0..15 {
                assert!(inv.try_add(ItemInstance::for_test(i, &format!("it{i}"), 1)));
            }
        }

        let mut next = app.world().resource::<RobotConfig>().clone();
        next.robot_inventory_capacity = 10;
        app.world_mut().send_event(ApplyConfigEvent(next));
        app.update();

        let lootbox = app.world().resource::<RobotLootbox>();
        let inv: &StagingInventory = lootbox.inv.as_ref().unwrap();
        assert_eq!(inv.capacity(), 10);
        assert_eq!(inv.occupied(), 15);
        // 已超容量：不可再添加不可合并的新物品
        assert!(!inv.clone().try_add(ItemInstance::for_test(99, "new", 1)));
    }
}
