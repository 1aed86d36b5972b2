use bevy::prelude::*;

mod config;
mod core;
mod data;
mod interface;
mod robot;
mod world;

use crate::config::ConfigPlugin;
use crate::core::events::{LogEvent, PopTextEvent};
use crate::core::states::AppState;
use crate::core::CorePlugin;
use crate::interface::debug_cli::DebugCliPlugin;
use crate::robot::RobotPlugin;
use crate::world::WorldPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                visible: false,
                ..default()
            }), // 隐藏窗口，纯 CLI 操作
            ..default()
        }))
        .add_plugins(CorePlugin)
        .add_plugins(ConfigPlugin)
        .add_plugins(data::DataPlugin)
        .add_plugins(WorldPlugin)
        .add_plugins(RobotPlugin)
        .add_plugins(DebugCliPlugin)
        .add_systems(Update, (forward_log_event, forward_pop_text))
        .add_systems(Startup, |mut next: ResMut<NextState<AppState>>| {
            next.set(AppState::Loading);
        })
        .run();
}

fn forward_log_event(mut reader: EventReader<LogEvent>) {
    for e in reader.read() {
        println!("> {}", e.0);
    }
}

fn forward_pop_text(mut reader: EventReader<PopTextEvent>) {
    for e in reader.read() {
        println!("!! {}", e.0);
    }
}
