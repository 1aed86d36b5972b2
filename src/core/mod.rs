use bevy::prelude::*;

pub mod events;
pub mod states;

/// 核心插件：注册全局事件 / 状态
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        use states::AppState;

        app.init_state::<AppState>()
            .add_event::<events::LogEvent>()
            .add_event::<events::PopTextEvent>()
            .add_systems(Startup, events::on_startup);
    }
}
