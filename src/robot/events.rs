use bevy::prelude::*;

/// “开始收集”触发器（与停止互斥，由表现层按状态二选一展示）
#[derive(Event)]
pub struct StartCollectEvent;

/// “停止收集”触发器
#[derive(Event)]
pub struct StopCollectEvent;

/// 打开机器人背包（恢复未完成时会挂起等待）
#[derive(Event)]
pub struct OpenStagingEvent;

/// 一键出售机器人背包内容
#[derive(Event)]
pub struct SellAllEvent;
