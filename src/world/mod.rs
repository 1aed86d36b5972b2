pub mod components;
pub mod systems;

use crate::core::states::AppState;
use bevy::prelude::*;
use components::*;
use systems::*;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInventory>()
            .init_resource::<Wallet>()
            .init_resource::<LevelIndex>()
            .init_resource::<InstanceIdGen>()
            .add_systems(OnEnter(AppState::InGame), spawn_level)
            .add_systems(OnExit(AppState::InGame), despawn_level)
            .add_systems(OnEnter(AppState::LevelTransition), finish_transition);
    }
}
