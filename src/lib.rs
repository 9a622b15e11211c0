//! Guest Wi-Fi 密码轮换工具
//!
//! 通过SSH登录GL.iNet路由器修改访客网络密码，并通过Telegram Bot通知管理员：
//! - 基于系统CSPRNG的强密码生成（保证大小写字母与数字覆盖，不含字母O）
//! - UCI命令更新无线配置并重载
//! - Telegram消息与Wi-Fi二维码通知
//! - Bot命令触发轮换（仅限授权聊天）

pub mod config;
pub mod error;
pub mod password;
pub mod router;
pub mod qr;
pub mod notify;
pub mod rotation;
pub mod bot;
pub mod handlers;
pub mod logging;

// 重新导出常用类型
pub use config::{AppConfig, RouterConfig, TelegramConfig, WifiConfig};
pub use error::{AppError, Result};
pub use password::{
    generate_strong_password, CharacterClass, GeneratedPassword, PasswordGenerator, PasswordPolicy,
    DEFAULT_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use notify::{Notifier, TelegramNotifier};
pub use rotation::PasswordRotator;
