//! 单次执行访客Wi-Fi密码轮换，适合cron调用

use anyhow::Context;
use guest_wifi_rotator::{logging::init_logger, AppConfig, PasswordRotator};
use std::process::ExitCode;
use teloxide::Bot;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logger();
    log::info!("--- 开始执行访客Wi-Fi密码轮换 ---");

    let config = AppConfig::load().context("加载配置失败")?;
    let bot = Bot::new(&config.telegram.bot_token);
    let rotator = PasswordRotator::from_config(&config, bot);

    if rotator.run().await {
        log::info!("--- 执行成功 ---");
        Ok(ExitCode::SUCCESS)
    } else {
        log::error!("--- 执行结束，存在错误 ---");
        Ok(ExitCode::FAILURE)
    }
}
