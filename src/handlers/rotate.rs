//! /rotate命令处理器

use crate::bot::BotState;
use crate::config::AppConfig;
use crate::error::Result;
use crate::handlers::start::unauthorized_message;
use std::sync::Arc;
use teloxide::prelude::*;

/// 轮换请求的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateRequest {
    /// 授权聊天，启动后台轮换
    Accepted,
    /// 未授权聊天，只回复拒绝
    Refused,
}

impl RotateRequest {
    /// 回复给请求方的文本
    pub fn reply(&self) -> &'static str {
        match self {
            RotateRequest::Accepted => acknowledgement_message(),
            RotateRequest::Refused => unauthorized_message(),
        }
    }

    /// 是否需要启动轮换
    pub fn starts_rotation(&self) -> bool {
        matches!(self, RotateRequest::Accepted)
    }
}

/// 判断来自某个聊天的轮换请求
pub fn check_rotate_request(config: &AppConfig, chat_id: ChatId) -> RotateRequest {
    if config.is_authorized(chat_id.0) {
        RotateRequest::Accepted
    } else {
        RotateRequest::Refused
    }
}

/// 处理/rotate命令
///
/// 立即回复确认，轮换流程在后台任务中执行，成功或失败由轮换流程自行通知。
pub async fn rotate_command(bot: Bot, msg: Message, state: BotState) -> Result<()> {
    let chat_id = msg.chat.id;
    let request = check_rotate_request(&state.config, chat_id);

    bot.send_message(chat_id, request.reply()).await?;

    if !request.starts_rotation() {
        log::warn!("未授权的密码更换请求，聊天ID: {}", chat_id);
        return Ok(());
    }

    log::info!("收到授权聊天 {} 的密码更换命令，启动密码轮换", chat_id);

    let rotator = Arc::clone(&state.rotator);
    tokio::spawn(async move {
        rotator.run().await;
    });

    Ok(())
}

/// 收到轮换请求时的确认消息
pub fn acknowledgement_message() -> &'static str {
    "已收到更换密码请求，正在后台更新访客Wi-Fi密码..."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_unauthorized_chat_is_refused() {
        let config = test_config();
        let request = check_rotate_request(&config, ChatId(42));

        assert_eq!(request, RotateRequest::Refused);
        assert!(!request.starts_rotation());
        assert_eq!(request.reply(), unauthorized_message());
    }

    #[test]
    fn test_authorized_chat_starts_rotation() {
        let config = test_config();
        let request = check_rotate_request(&config, ChatId(config.telegram.chat_id));

        assert_eq!(request, RotateRequest::Accepted);
        assert!(request.starts_rotation());
        assert_eq!(request.reply(), acknowledgement_message());
    }

    #[test]
    fn test_acknowledgement_message() {
        assert!(acknowledgement_message().contains("后台"));
    }
}
