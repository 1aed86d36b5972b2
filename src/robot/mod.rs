pub mod debug;
pub mod events;
pub mod sell;
pub mod snapshot;
pub mod staging;
pub mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use events::*;
pub use staging::RobotLootbox;

pub struct RobotPlugin;

impl Plugin for RobotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RobotLootbox>()
            .init_resource::<snapshot::SnapshotStore>()
            .init_resource::<snapshot::PendingActions>()
            .init_resource::<systems::SchedulerState>()
            .add_event::<StartCollectEvent>()
            .add_event::<StopCollectEvent>()
            .add_event::<OpenStagingEvent>()
            .add_event::<SellAllEvent>()
            .add_systems(
                Update,
                (
                    systems::handle_start_stop,
                    systems::auto_collect_update,
                    snapshot::restore_snapshot_step,
                    systems::queue_staging_requests,
                    systems::process_open_request,
                    sell::process_sell_request,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(Update, debug::tick_debug_markers)
            // 换图钩子：离开 InGame 捕获快照，回到 InGame 重建并恢复
            .add_systems(OnExit(AppState::InGame), systems::on_transition_begin)
            .add_systems(OnEnter(AppState::InGame), systems::on_environment_ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotConfig;
    use crate::world::components::ItemInstance;
    use bevy::state::app::StatesPlugin;

    fn transition_app(cfg: RobotConfig) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .insert_state(AppState::InGame)
            .insert_resource(cfg)
            .init_resource::<RobotLootbox>()
            .init_resource::<snapshot::SnapshotStore>()
            .init_resource::<systems::SchedulerState>()
            .add_systems(Update, snapshot::restore_snapshot_step)
            .add_systems(OnExit(AppState::InGame), systems::on_transition_begin)
            .add_systems(OnEnter(AppState::InGame), systems::on_environment_ready);
        app
    }

    fn set_state(app: &mut App, state: AppState) {
        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(state);
        app.update();
    }

    #[test]
    fn transition_round_trip_preserves_staging_contents() {
        let mut app = transition_app(RobotConfig::default());
        // 先跑一帧，让初始 OnEnter(InGame) 建好空背包
        app.update();

        {
            let cfg = app.world().resource::<RobotConfig>().clone();
            let mut lootbox = app.world_mut().resource_mut::<RobotLootbox>();
            let inv = lootbox.check_or_create(&cfg);
            for (i, id) in ["a", "b", "c"].iter().enumerate() {
                assert!(inv.try_add(ItemInstance::for_test(i as u64, id, 1)));
            }
        }
        app.world_mut()
            .resource_mut::<systems::SchedulerState>()
            .collecting = true;

        set_state(&mut app, AppState::LevelTransition);
        // 换图自动停止收集
        assert!(!app.world().resource::<systems::SchedulerState>().collecting);

        set_state(&mut app, AppState::InGame);
        // 协作式恢复：一帧一条
        for _ in 0..4 {
            app.update();
        }

        let lootbox = app.world().resource::<RobotLootbox>();
        let inv = lootbox.inv.as_ref().unwrap();
        let ids: Vec<_> = inv.contents().iter().map(|s| s.proto_id.clone()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        let store = app.world().resource::<snapshot::SnapshotStore>();
        assert!(!store.restore_in_progress());
    }

    #[test]
    fn transition_with_save_disabled_discards_contents() {
        let cfg = RobotConfig {
            save_robot_inv: false,
            ..Default::default()
        };
        let mut app = transition_app(cfg);
        app.update();

        {
            let cfg = app.world().resource::<RobotConfig>().clone();
            let mut lootbox = app.world_mut().resource_mut::<RobotLootbox>();
            lootbox.check_or_create(&cfg).try_add(ItemInstance::for_test(1, "a", 1));
        }

        set_state(&mut app, AppState::LevelTransition);
        set_state(&mut app, AppState::InGame);
        for _ in 0..2 {
            app.update();
        }

        let lootbox = app.world().resource::<RobotLootbox>();
        assert!(lootbox.inv.as_ref().unwrap().is_empty());
    }
}
