//! 本地配置文件的读写 / 校验 / 迁移。
//!
//! 读取路径上绝不隐式写盘；只有首次创建、修复损坏文件、版本迁移
//! 这三条路径会触发保存。任何 IO / 解析失败都回退到内存默认值。

use anyhow::Context;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 当前配置版本 token，结构变化时更新并触发迁移
pub const CURRENT_CONFIG_TOKEN: &str = "auto_collect_robot_v1";

const FILE_NAME: &str = "auto_collect_robot_config.json";

/// 环境变量覆盖配置目录（便于测试与打包）
pub const CONFIG_DIR_ENV: &str = "ACR_CONFIG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config file is empty")]
    Empty,
}

/// 机器人配置记录
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RobotConfig {
    /// 检测间隔（秒），[0.5, 10]
    pub collect_interval: f32,
    /// 机器人背包打开时是否播放搜索动画（只影响 UI，不影响调度）
    pub robot_inventory_need_inspect: bool,
    /// 机器人背包容量，[10, 2048]
    pub robot_inventory_capacity: usize,
    /// 是否收集地面物品
    pub collect_ground_items: bool,
    /// 是否收集容器内物品
    pub collect_lootbox: bool,
    /// 收集半径，[1, 50]
    pub collect_radius: f32,
    /// 绘制收集范围调试标记
    pub debug_draw_collect_radius: bool,
    /// 换图时保留机器人背包内容
    pub save_robot_inv: bool,
    /// 配置版本 token，用于判断是否需要迁移 / 补全新字段
    pub config_token: String,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            collect_interval: 2.0,
            robot_inventory_need_inspect: false,
            robot_inventory_capacity: 512,
            collect_ground_items: false,
            collect_lootbox: true,
            collect_radius: 10.0,
            debug_draw_collect_radius: false,
            save_robot_inv: true,
            config_token: CURRENT_CONFIG_TOKEN.to_string(),
        }
    }
}

impl RobotConfig {
    /// 逐字段钳制到合法区间，非法值回退默认并告警
    pub fn validate(&mut self) {
        let old_interval = self.collect_interval;
        self.collect_interval = if !old_interval.is_finite() {
            2.0
        } else {
            old_interval.clamp(0.5, 10.0)
        };
        if self.collect_interval != old_interval {
            warn!(
                "collect_interval 非法 ({old_interval})，钳制为 {}",
                self.collect_interval
            );
        }

        let old_radius = self.collect_radius;
        self.collect_radius = if !old_radius.is_finite() {
            10.0
        } else {
            old_radius.clamp(1.0, 50.0)
        };
        if self.collect_radius != old_radius {
            warn!(
                "collect_radius 非法 ({old_radius})，钳制为 {}",
                self.collect_radius
            );
        }

        let old_cap = self.robot_inventory_capacity;
        self.robot_inventory_capacity = old_cap.clamp(10, 2048);
        if self.robot_inventory_capacity != old_cap {
            warn!(
                "robot_inventory_capacity 超界 ({old_cap})，钳制为 {}",
                self.robot_inventory_capacity
            );
        }

        if self.config_token.is_empty() {
            warn!("config_token 缺失，建议重新生成配置以补全新字段");
        }
    }

    /// 版本迁移：把已有字段逐一拷贝到新的默认记录里，重打 token 并重新校验。
    /// 对已是当前版本的记录调用等价于一次 validate。
    pub fn migrate(&self) -> RobotConfig {
        let mut merged = RobotConfig {
            collect_interval: self.collect_interval,
            robot_inventory_need_inspect: self.robot_inventory_need_inspect,
            robot_inventory_capacity: self.robot_inventory_capacity,
            collect_ground_items: self.collect_ground_items,
            collect_lootbox: self.collect_lootbox,
            collect_radius: self.collect_radius,
            debug_draw_collect_radius: self.debug_draw_collect_radius,
            save_robot_inv: self.save_robot_inv,
            config_token: CURRENT_CONFIG_TOKEN.to_string(),
        };
        merged.validate();
        merged
    }

    pub fn is_current_version(&self) -> bool {
        self.config_token == CURRENT_CONFIG_TOKEN
    }
}

/// 配置目录优先逻辑：
/// 1. `ACR_CONFIG_DIR` 环境变量
/// 2. 可执行文件所在目录
/// 3. 回退到系统临时目录下的独立子目录
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    match std::env::current_exe() {
        Ok(exe) => {
            if let Some(parent) = exe.parent() {
                return parent.to_path_buf();
            }
        }
        Err(e) => {
            warn!("无法获取可执行文件路径: {e}");
        }
    }

    std::env::temp_dir().join("auto_collect_robot")
}

/// 配置存取器，持有解析好的配置目录
#[derive(Resource, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(FILE_NAME)
    }

    /// 加载配置。文件缺失 / 空白 / 损坏时写回一份默认配置；
    /// token 不匹配时执行一次迁移并写回。永不向调用方抛错。
    pub fn load(&self) -> RobotConfig {
        match self.try_read() {
            Ok(mut cfg) => {
                cfg.validate();

                if !cfg.is_current_version() {
                    let old_token = cfg.config_token.clone();
                    let migrated = cfg.migrate();
                    if let Err(e) = self.save(&migrated) {
                        warn!("配置迁移写回失败: {e:#}");
                    } else {
                        info!("配置已迁移并保存 (旧 token='{old_token}')");
                    }
                    return migrated;
                }

                info!("已加载配置: {}", self.file_path().display());
                cfg
            }
            Err(e) => {
                warn!("配置读取失败 ({e})，重建默认配置");
                let def = RobotConfig::default();
                if let Err(e) = self.save(&def) {
                    warn!("默认配置写入失败: {e:#}");
                }
                def
            }
        }
    }

    fn try_read(&self) -> Result<RobotConfig, ConfigError> {
        let path = self.file_path();
        let json = fs::read_to_string(&path)?;
        if json.trim().is_empty() {
            return Err(ConfigError::Empty);
        }
        Ok(serde_json::from_str(&json)?)
    }

    /// 把配置写入文件（首次创建、修复、迁移、设置面板保存时使用）
    pub fn save(&self, cfg: &RobotConfig) -> anyhow::Result<()> {
        ensure_dir(&self.dir)?;
        let json = serde_json::to_string_pretty(cfg).context("serialize config")?;
        fs::write(self.file_path(), json)
            .with_context(|| format!("write {}", self.file_path().display()))?;
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    }
    Ok(())
}
