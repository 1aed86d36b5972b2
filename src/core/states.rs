use bevy::prelude::*;

/// 游戏运行的大状态
///
/// `LevelTransition` 对应换图流程：离开 InGame 时捕获机器人背包快照，
/// 重新进入 InGame 时重建背包并异步恢复。
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    Loading,
    InGame,
    LevelTransition,
    Shutdown,
}
