//! /start 与 /help 命令处理器

use crate::bot::{BotState, Command};
use crate::error::Result;
use teloxide::{prelude::*, types::User, utils::command::BotCommands};

/// 处理/start命令
pub async fn start_command(bot: Bot, msg: Message, state: BotState) -> Result<()> {
    log::info!(
        "聊天 {} ({}) 发送了/start命令",
        msg.chat.id,
        msg.from().map(get_user_display_name).unwrap_or_default()
    );

    if !state.is_authorized(msg.chat.id) {
        log::warn!("未授权的访问尝试，聊天ID: {}", msg.chat.id);
        bot.send_message(msg.chat.id, unauthorized_message()).await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, welcome_message(&state.config.wifi.ssid))
        .await?;
    Ok(())
}

/// 处理/help命令
pub async fn help_command(bot: Bot, msg: Message, state: BotState) -> Result<()> {
    if !state.is_authorized(msg.chat.id) {
        bot.send_message(msg.chat.id, unauthorized_message()).await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// 授权用户的欢迎消息
pub fn welcome_message(ssid: &str) -> String {
    format!(
        "您好！我是访客Wi-Fi密码管理Bot。\n\n\
         当前管理的访客网络：{}\n\n\
         使用 /rotate 更换访客网络密码，新密码和二维码会发送到本聊天。",
        ssid
    )
}

/// 未授权用户的回复
pub fn unauthorized_message() -> &'static str {
    "抱歉，您无权使用此Bot。"
}

/// 获取用户显示名称
pub fn get_user_display_name(user: &User) -> String {
    if let Some(ref username) = user.username {
        format!("@{}", username)
    } else {
        let last_name = user.last_name.as_deref().unwrap_or("");
        format!("{} {}", user.first_name, last_name).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    fn create_test_user(id: u64, username: Option<String>, first_name: String) -> User {
        User {
            id: UserId(id),
            is_bot: false,
            first_name,
            last_name: None,
            username,
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[test]
    fn test_get_user_display_name() {
        let user_with_username = create_test_user(123, Some("testuser".to_string()), "Test".to_string());
        assert_eq!(get_user_display_name(&user_with_username), "@testuser");

        let user_without_username = create_test_user(456, None, "Test".to_string());
        assert_eq!(get_user_display_name(&user_without_username), "Test");
    }

    #[test]
    fn test_welcome_message() {
        let text = welcome_message("NekoGuest");
        assert!(text.contains("NekoGuest"));
        assert!(text.contains("/rotate"));
    }
}
