//! 通知模块 - 通过Telegram发送新密码和Wi-Fi二维码

use crate::error::Result;
use crate::qr::generate_wifi_qrcode;
use chrono::{DateTime, Local};
use std::future::Future;
use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode},
    utils::html,
};

/// 通知发送方
///
/// 通知均为尽力而为：失败只记录日志，不向调用方抛出错误。
pub trait Notifier: Send + Sync {
    /// 发送新密码，全部送达时返回true
    fn notify(&self, ssid: &str, password: &str) -> impl Future<Output = bool> + Send;

    /// 发送轮换失败通知
    fn notify_failure(&self, error: &str) -> impl Future<Output = ()> + Send;
}

/// Telegram通知
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }

    /// 发送HTML格式文本消息
    pub async fn send_message(&self, text: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        log::info!("Telegram消息发送成功");
        Ok(())
    }

    /// 发送PNG图片
    pub async fn send_photo(&self, png: Vec<u8>, caption: String) -> Result<()> {
        let photo = InputFile::memory(png).file_name("qrcode.png");
        self.bot
            .send_photo(self.chat_id, photo)
            .caption(caption)
            .await?;
        log::info!("Telegram图片发送成功");
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, ssid: &str, password: &str) -> bool {
        let mut delivered = true;

        let text = format_rotation_message(ssid, password, Local::now());
        if let Err(e) = self.send_message(text).await {
            log::error!("发送Telegram消息失败: {}", e);
            delivered = false;
        }

        match generate_wifi_qrcode(ssid, password) {
            Ok(png) => {
                if let Err(e) = self.send_photo(png, qr_caption(ssid)).await {
                    log::error!("发送Telegram图片失败: {}", e);
                    delivered = false;
                }
            }
            Err(e) => {
                log::error!("生成Wi-Fi二维码失败: {}", e);
                delivered = false;
            }
        }

        delivered
    }

    async fn notify_failure(&self, error: &str) {
        if let Err(e) = self.send_message(format_failure_message(error)).await {
            log::error!("无法发送错误通知: {}", e);
        }
    }
}

/// 新密码通知正文
pub fn format_rotation_message(ssid: &str, password: &str, updated_at: DateTime<Local>) -> String {
    format!(
        "🔐 <b>访客Wi-Fi密码已更新</b>\n\n\
         网络 <b>{}</b> 的密码已更换！\n\
         新密码：<code>{}</code>\n\
         更新时间：{}\n\n\
         此消息由Wi-Fi自动管理系统发送。",
        html::escape(ssid),
        html::escape(password),
        updated_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// 轮换失败通知正文
pub fn format_failure_message(error: &str) -> String {
    format!(
        "❌ <b>错误：</b>修改访客Wi-Fi密码时发生错误：<code>{}</code>",
        html::escape(error)
    )
}

/// 二维码图片说明
pub fn qr_caption(ssid: &str) -> String {
    format!("网络 {} 的新密码二维码", ssid)
}
