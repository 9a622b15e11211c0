//! 访客Wi-Fi密码轮换Bot - 主程序入口

use guest_wifi_rotator::{bot::WifiRotatorBot, logging::init_logger, AppConfig, AppError, Result};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    log::info!("🚀 访客Wi-Fi密码轮换Bot启动中...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("加载配置失败: {}", e);
            print_config_example();
            return Err(e);
        }
    };

    log::info!("✅ 配置验证通过");
    log::info!("📡 路由器: {}:{}", config.router.host, config.router.port);
    log::info!("📶 访客网络: {} (section {})", config.wifi.ssid, config.wifi.guest_section);

    log::info!("🔍 测试网络连接...");
    test_network_connection().await?;

    log::info!("🤖 初始化Telegram Bot...");
    let bot = WifiRotatorBot::new(config).await?;

    log::info!("🎯 系统准备就绪，开始监听消息...");
    bot.run().await?;

    log::info!("👋 访客Wi-Fi密码轮换Bot已停止");
    Ok(())
}

/// 打印配置示例
fn print_config_example() {
    println!(
        r#"
可使用 config.json（路径由 CONFIG_PATH 指定）：
{{
  "router": {{
    "host": "192.168.8.1",
    "port": 22,
    "username": "root",
    "password": "YOUR_ROUTER_PASSWORD"
  }},
  "telegram": {{
    "bot_token": "YOUR_BOT_TOKEN_HERE",
    "chat_id": 1234567890
  }},
  "wifi": {{
    "ssid": "MyGuestWifi",
    "guest_section": "guest2g"
  }},
  "password_length": 18
}}

或在 .env / 环境变量中设置：
GLINET_HOST, GLINET_PORT, GLINET_USER, GLINET_PASSWORD,
GUEST_WIFI_SECTION_NAME, GUEST_WIFI_SSID,
TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID, WIFI_PASSWORD_LENGTH
"#
    );
}

/// 测试到Telegram API的网络连接
async fn test_network_connection() -> Result<()> {
    let client = reqwest::Client::new();
    let url = "https://api.telegram.org/";

    match client.head(url).send().await {
        Ok(response) => {
            log::info!("✅ 网络连接测试成功，状态码: {}", response.status());
        }
        Err(e) => {
            log::error!("❌ 网络连接测试失败: {}", e);
            if let Some(source) = e.source() {
                log::error!("错误源: {:?}", source);
            }
            return Err(AppError::Network(e));
        }
    }

    Ok(())
}
