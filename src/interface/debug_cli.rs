//! 文字 CLI：读取 stdin → 解析命令 → 执行并打印
//!
//! 这里同时扮演表现层：开始/停止收集是一对互斥触发器，
//! `status` 会按当前状态提示哪一个可用。

use bevy::app::AppExit;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::config::{ApplyConfigEvent, RobotConfig};
use crate::core::{events::LogEvent, states::AppState};
use crate::data::{schema::ItemList, ItemAssets};
use crate::robot::events::{OpenStagingEvent, SellAllEvent, StartCollectEvent, StopCollectEvent};
use crate::robot::snapshot::SnapshotStore;
use crate::robot::systems::SchedulerState;
use crate::robot::RobotLootbox;
use crate::world::components::Wallet;

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line_result in stdin.lock().lines() {
                    if let Ok(line) = line_result {
                        let line = line.trim();
                        if !line.is_empty() {
                            let mut buf = buffer.lock().unwrap();
                            buf.push_back(line.to_string());
                        }
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令
            .add_systems(
                Update,
                execute_cli_commands.run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
struct CliLine(String);

/// 我们支持的命令
enum Command {
    Help,
    Status,
    Exit,
    Items(Option<String>), // None=全部；Some(token)=按 id/uuid/name 查询
    Collect(bool),         // true=开始，false=停止
    Bag,
    Sell,
    Level,
    ConfigShow,
    ConfigSet { key: String, value: String },
    Unsupported(String),
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let mut buffer = CLI_BUFFER.lock().unwrap();
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut app_exit: EventWriter<AppExit>,
    mut log: EventWriter<LogEvent>,
    state: Res<State<AppState>>,
    mut next: ResMut<NextState<AppState>>,
    item_assets: Res<ItemAssets>,
    lists: Res<Assets<ItemList>>,
    cfg: Res<RobotConfig>,
    sched: Res<SchedulerState>,
    lootbox: Res<RobotLootbox>,
    store: Res<SnapshotStore>,
    wallet: Res<Wallet>,
    robot_events: (
        EventWriter<StartCollectEvent>,
        EventWriter<StopCollectEvent>,
        EventWriter<OpenStagingEvent>,
        EventWriter<SellAllEvent>,
        EventWriter<ApplyConfigEvent>,
    ),
) {
    let (mut ev_start, mut ev_stop, mut ev_open, mut ev_sell, mut ev_apply) = robot_events;
    for CliLine(input) in line_reader.read() {
        match parse_command(input) {
            Command::Help => {
                log.write(LogEvent(
                    "命令列表:
  help                   查看帮助
  status                 查看当前状态
  exit / quit            退出程序
  items                  列出所有物品
  items <token>          用 id / uuid / 名称 查询单个物品
  collect on|off         开始 / 停止收集
  bag                    打开机器人背包
  sell                   一键出售
  level                  切换关卡（演示快照恢复）
  config                 查看配置
  config set <键> <值>   修改配置并保存
  "
                    .into(),
                ));
            }

            Command::Status => {
                let cnt = item_assets
                    .handle
                    .as_ref()
                    .and_then(|h| lists.get(h))
                    .map_or(0, |list| list.items.len());
                let (occupied, capacity) = lootbox
                    .inv
                    .as_ref()
                    .map_or((0, cfg.robot_inventory_capacity), |inv| {
                        (inv.occupied(), inv.capacity())
                    });
                log.write(LogEvent(format!(
                    "State: {:?}, Items Loaded: {}
收集中: {}（可用操作: collect {}）
机器人背包: {}/{}，恢复中: {}
钱包: {}",
                    state.get(),
                    cnt,
                    if sched.collecting { "是" } else { "否" },
                    if sched.collecting { "off" } else { "on" },
                    occupied,
                    capacity,
                    if store.restore_in_progress() { "是" } else { "否" },
                    wallet.0,
                )));
            }

            Command::Exit => {
                log.write(LogEvent("Bye~".into()));
                app_exit.write(AppExit::Success);
            }

            Command::Items(token) => {
                if let Some(handle) = &item_assets.handle {
                    if let Some(list) = lists.get(handle) {
                        match token {
                            None => {
                                // 全部列出
                                for entry in &list.items {
                                    let uuid = uuid_from_id(&entry.id);
                                    log.write(LogEvent(format!(
                                        "{} | {} | {}",
                                        uuid, entry.id, entry.name
                                    )));
                                }
                            }
                            Some(t) => {
                                // 按三种字段模糊匹配
                                let t_low = t.to_lowercase();
                                if let Some(e) = list.items.iter().find(|e| {
                                    e.id.eq_ignore_ascii_case(&t_low)
                                        || e.name.eq_ignore_ascii_case(&t_low)
                                        || uuid_from_id(&e.id).to_string() == t_low
                                }) {
                                    let uuid = uuid_from_id(&e.id);
                                    log.write(LogEvent(format!(
                                        "==================================================
UUID  : {uuid}
ID    : {}
Name  : {}
Kind  : {}
Price : {}
Sold  : {}
==================================================",
                                        e.id, e.name, e.kind, e.base_price, e.can_be_sold
                                    )));
                                } else {
                                    log.write(LogEvent("未找到匹配物品".into()));
                                }
                            }
                        }
                    }
                }
            }

            Command::Collect(true) => {
                ev_start.write(StartCollectEvent);
            }
            Command::Collect(false) => {
                ev_stop.write(StopCollectEvent);
            }

            Command::Bag => {
                ev_open.write(OpenStagingEvent);
            }

            Command::Sell => {
                ev_sell.write(SellAllEvent);
            }

            Command::Level => {
                log.write(LogEvent("切换关卡…".into()));
                next.set(AppState::LevelTransition);
            }

            Command::ConfigShow => {
                log.write(LogEvent(format!(
                    "interval  = {}
radius    = {}
capacity  = {}
ground    = {}
lootbox   = {}
inspect   = {}
debugdraw = {}
save      = {}",
                    cfg.collect_interval,
                    cfg.collect_radius,
                    cfg.robot_inventory_capacity,
                    cfg.collect_ground_items,
                    cfg.collect_lootbox,
                    cfg.robot_inventory_need_inspect,
                    cfg.debug_draw_collect_radius,
                    cfg.save_robot_inv,
                )));
            }

            Command::ConfigSet { key, value } => match edit_config(&cfg, &key, &value) {
                Some(next_cfg) => {
                    ev_apply.write(ApplyConfigEvent(next_cfg));
                    log.write(LogEvent(format!("已设置 {key} = {value}")));
                }
                None => {
                    log.write(LogEvent(format!("无法设置 {key} = {value}")));
                }
            },

            Command::Unsupported(cmd) => {
                log.write(LogEvent(format!("不支持的命令: {cmd}")));
            }
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "items" | "item" | "i" => {
            let token = parts.next().map(|s| s.to_string());
            Command::Items(token)
        }
        "collect" | "c" => match parts.next().unwrap_or("") {
            "on" | "start" => Command::Collect(true),
            "off" | "stop" => Command::Collect(false),
            other => Command::Unsupported(format!("collect {other}")),
        },
        "bag" | "open" => Command::Bag,
        "sell" => Command::Sell,
        "level" | "warp" => Command::Level,
        "config" | "cfg" => match parts.next() {
            None => Command::ConfigShow,
            Some("set") => {
                let key = parts.next().unwrap_or("").to_string();
                let value = parts.next().unwrap_or("").to_string();
                Command::ConfigSet { key, value }
            }
            Some(other) => Command::Unsupported(format!("config {other}")),
        },
        other => Command::Unsupported(other.into()),
    }
}

/// 用当前配置打底生成修改后的副本；键名或值不合法时返回 None。
/// 数值钳制交给 apply_config 统一处理。
fn edit_config(cfg: &RobotConfig, key: &str, value: &str) -> Option<RobotConfig> {
    let mut next = cfg.clone();
    match key {
        "interval" => next.collect_interval = value.parse().ok()?,
        "radius" => next.collect_radius = value.parse().ok()?,
        "capacity" => next.robot_inventory_capacity = value.parse().ok()?,
        "ground" => next.collect_ground_items = parse_bool(value)?,
        "lootbox" => next.collect_lootbox = parse_bool(value)?,
        "inspect" => next.robot_inventory_need_inspect = parse_bool(value)?,
        "debugdraw" => next.debug_draw_collect_radius = parse_bool(value)?,
        "save" => next.save_robot_inv = parse_bool(value)?,
        _ => return None,
    }
    Some(next)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn uuid_from_id(id: &str) -> Uuid {
    // 用固定 namespace + id 字节生成版本 5 UUID，保证可重复得到同一值
    Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes())
}
