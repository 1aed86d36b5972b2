use bevy::prelude::*;

/// CLI 输出行
#[derive(Event)]
pub struct LogEvent(pub String);

/// 弹出式提示，对应游戏内 PopText（用户可见的反馈通道）
#[derive(Event)]
pub struct PopTextEvent(pub String);

pub fn on_startup(mut writer: EventWriter<LogEvent>) {
    writer.write(LogEvent("AutoCollectRobot 已加载，输入 help 查看命令".into()));
}
