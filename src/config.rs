//! 配置管理模块

use crate::error::{AppError, Result};
use crate::password::{DEFAULT_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 路由器SSH配置
    pub router: RouterConfig,
    /// Telegram Bot配置
    pub telegram: TelegramConfig,
    /// 访客Wi-Fi配置
    pub wifi: WifiConfig,
    /// 生成密码的长度
    #[serde(default = "default_password_length")]
    pub password_length: usize,
}

/// 路由器SSH配置
#[derive(Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// 路由器地址
    pub host: String,
    /// SSH端口
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    /// SSH用户名
    pub username: String,
    /// SSH密码
    pub password: String,
    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Telegram配置
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot Token
    pub bot_token: String,
    /// 唯一授权的聊天ID，同时也是通知目标
    pub chat_id: i64,
}

/// 访客Wi-Fi配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    /// 访客网络SSID
    pub ssid: String,
    /// UCI无线配置中的访客网络section名称
    #[serde(default = "default_guest_section")]
    pub guest_section: String,
}

fn default_password_length() -> usize {
    DEFAULT_PASSWORD_LENGTH
}

fn default_ssh_port() -> u16 {
    22
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_guest_section() -> String {
    "guest2g".to_string()
}

// 凭据不进入日志
impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[hidden]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl AppConfig {
    /// 从JSON文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 从环境变量（及 `.env` 文件）加载配置
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("已加载环境文件: {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键值来源构建配置，变量名与 `.env` 保持一致
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::config(format!("缺少环境变量 {}", key)))
        };

        let port = match lookup("GLINET_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::config(format!("GLINET_PORT 不是有效端口: {}", v)))?,
            None => default_ssh_port(),
        };

        let chat_id = required("TELEGRAM_CHAT_ID")?;
        let chat_id = chat_id
            .parse::<i64>()
            .map_err(|_| AppError::config(format!("TELEGRAM_CHAT_ID 必须是数字: {}", chat_id)))?;

        let password_length = match lookup("WIFI_PASSWORD_LENGTH") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|_| AppError::config(format!("WIFI_PASSWORD_LENGTH 必须是数字: {}", v)))?,
            None => default_password_length(),
        };

        let config = Self {
            router: RouterConfig {
                host: required("GLINET_HOST")?,
                port,
                username: required("GLINET_USER")?,
                password: required("GLINET_PASSWORD")?,
                connect_timeout_secs: default_connect_timeout(),
            },
            telegram: TelegramConfig {
                bot_token: required("TELEGRAM_BOT_TOKEN")?,
                chat_id,
            },
            wifi: WifiConfig {
                ssid: required("GUEST_WIFI_SSID")?,
                guest_section: lookup("GUEST_WIFI_SECTION_NAME")
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(default_guest_section),
            },
            password_length,
        };

        config.validate()?;
        Ok(config)
    }

    /// 加载配置：优先 `CONFIG_PATH` 指向的文件，否则使用环境变量
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            log::info!("📖 加载配置文件: {}", config_path);
            Self::from_file(&config_path)
        } else {
            log::info!("📖 配置文件 {} 不存在，从环境变量加载配置", config_path);
            Self::from_env()
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.router.host.is_empty() {
            return Err(AppError::validation("路由器地址不能为空"));
        }

        if self.router.username.is_empty() || self.router.password.is_empty() {
            return Err(AppError::validation("路由器SSH用户名和密码不能为空"));
        }

        // ssh2会话超时以u32毫秒计
        if self.router.connect_timeout_secs == 0
            || self.router.connect_timeout_secs > u64::from(u32::MAX / 1000)
        {
            return Err(AppError::validation(format!(
                "连接超时必须在1-{}秒之间",
                u32::MAX / 1000
            )));
        }

        if self.telegram.bot_token.is_empty() {
            return Err(AppError::validation("Telegram bot token不能为空"));
        }

        if self.wifi.ssid.is_empty() {
            return Err(AppError::validation("访客网络SSID不能为空"));
        }

        if !is_uci_identifier(&self.wifi.guest_section) {
            return Err(AppError::validation(format!(
                "无效的UCI section名称: {}",
                self.wifi.guest_section
            )));
        }

        if self.password_length < MIN_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "密码长度至少为 {} 位",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(())
    }

    /// 检查聊天是否为授权用户
    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.telegram.chat_id == chat_id
    }
}

/// UCI section名称只允许字母、数字和下划线
pub fn is_uci_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        router: RouterConfig {
            host: "192.168.8.1".to_string(),
            port: 22,
            username: "root".to_string(),
            password: "router-secret".to_string(),
            connect_timeout_secs: 10,
        },
        telegram: TelegramConfig {
            bot_token: "123456789:ABCDEFGHIJKLMNOPQRSTUVWXYZ".to_string(),
            chat_id: 123456789,
        },
        wifi: WifiConfig {
            ssid: "NekoGuest".to_string(),
            guest_section: "guest2g".to_string(),
        },
        password_length: DEFAULT_PASSWORD_LENGTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env_map(&[
            ("GLINET_HOST", "192.168.8.1"),
            ("GLINET_USER", "root"),
            ("GLINET_PASSWORD", "router-secret"),
            ("GUEST_WIFI_SECTION_NAME", "guest5g"),
            ("GUEST_WIFI_SSID", "NekoGuest"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200300"),
        ])
    }

    #[test]
    fn test_config_validation() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.telegram.bot_token.clear();
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.password_length = 11;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.wifi.guest_section = "guest2g.key='x'".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connect_timeout_bounds() {
        let mut config = test_config();
        config.router.connect_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.router.connect_timeout_secs = u64::from(u32::MAX / 1000) + 1;
        assert!(config.validate().is_err());

        config.router.connect_timeout_secs = u64::from(u32::MAX / 1000);
        assert!(config.validate().is_ok());

        config.router.connect_timeout_secs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() -> Result<()> {
        let vars = full_env();
        let config = AppConfig::from_lookup(|k| vars.get(k).cloned())?;

        assert_eq!(config.router.host, "192.168.8.1");
        assert_eq!(config.router.port, 22);
        assert_eq!(config.wifi.guest_section, "guest5g");
        assert_eq!(config.telegram.chat_id, -100200300);
        assert_eq!(config.password_length, DEFAULT_PASSWORD_LENGTH);
        Ok(())
    }

    #[test]
    fn test_from_lookup_missing_variable() {
        let mut vars = full_env();
        vars.remove("GLINET_PASSWORD");

        let err = AppConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("GLINET_PASSWORD"));
    }

    #[test]
    fn test_from_lookup_invalid_values() {
        let mut vars = full_env();
        vars.insert("TELEGRAM_CHAT_ID".to_string(), "not-a-number".to_string());
        assert!(AppConfig::from_lookup(|k| vars.get(k).cloned()).is_err());

        let mut vars = full_env();
        vars.insert("WIFI_PASSWORD_LENGTH".to_string(), "8".to_string());
        assert!(AppConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_default_section_name() -> Result<()> {
        let mut vars = full_env();
        vars.remove("GUEST_WIFI_SECTION_NAME");

        let config = AppConfig::from_lookup(|k| vars.get(k).cloned())?;
        assert_eq!(config.wifi.guest_section, "guest2g");
        Ok(())
    }

    #[test]
    fn test_config_file_operations() -> Result<()> {
        let config = test_config();

        let temp_file = NamedTempFile::new()?;
        config.save_to_file(temp_file.path())?;

        let loaded = AppConfig::from_file(temp_file.path())?;
        assert_eq!(loaded.router.host, config.router.host);
        assert_eq!(loaded.telegram.chat_id, config.telegram.chat_id);
        assert_eq!(loaded.wifi.ssid, config.wifi.ssid);
        Ok(())
    }

    #[test]
    fn test_file_defaults() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(
            temp_file.path(),
            r#"{
                "router": { "host": "10.0.0.1", "username": "root", "password": "pw" },
                "telegram": { "bot_token": "123:abc", "chat_id": 42 },
                "wifi": { "ssid": "Guest" }
            }"#,
        )?;

        let config = AppConfig::from_file(temp_file.path())?;
        assert_eq!(config.router.port, 22);
        assert_eq!(config.router.connect_timeout_secs, 10);
        assert_eq!(config.wifi.guest_section, "guest2g");
        assert_eq!(config.password_length, 18);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_load_prefers_config_file() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        test_config().save_to_file(temp_file.path())?;

        env::set_var("CONFIG_PATH", temp_file.path());
        let result = AppConfig::load();
        env::remove_var("CONFIG_PATH");

        assert_eq!(result?.wifi.ssid, "NekoGuest");
        Ok(())
    }

    #[test]
    fn test_debug_hides_secrets() {
        let output = format!("{:?}", test_config());
        assert!(!output.contains("router-secret"));
        assert!(!output.contains("ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
        assert!(output.contains("192.168.8.1"));
    }

    #[test]
    fn test_authorization() {
        let config = test_config();
        assert!(config.is_authorized(123456789));
        assert!(!config.is_authorized(987654321));
    }
}
