//! Telegram Bot主体结构

use crate::config::AppConfig;
use crate::error::Result;
use crate::notify::TelegramNotifier;
use crate::rotation::PasswordRotator;
use crate::router::SshConnector;
use std::sync::Arc;
use teloxide::{
    dispatching::{HandlerExt, UpdateHandler},
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::Me,
    utils::command::BotCommands,
};
use tokio::sync::RwLock;

/// Bot使用的轮换器类型
pub type SshRotator = PasswordRotator<SshConnector, TelegramNotifier>;

/// Bot状态
#[derive(Clone)]
pub struct BotState {
    pub config: AppConfig,
    pub rotator: Arc<SshRotator>,
    pub bot_info: Arc<RwLock<Option<Me>>>,
}

impl BotState {
    pub fn new(config: AppConfig, bot: Bot) -> Self {
        let rotator = Arc::new(PasswordRotator::from_config(&config, bot));

        Self {
            config,
            rotator,
            bot_info: Arc::new(RwLock::new(None)),
        }
    }

    /// 设置Bot信息
    pub async fn set_bot_info(&self, me: Me) {
        let mut bot_info = self.bot_info.write().await;
        *bot_info = Some(me);
    }

    /// 获取Bot信息
    pub async fn get_bot_info(&self) -> Option<Me> {
        let bot_info = self.bot_info.read().await;
        bot_info.clone()
    }

    /// 检查聊天是否有权操作
    pub fn is_authorized(&self, chat_id: ChatId) -> bool {
        self.config.is_authorized(chat_id.0)
    }
}

/// Wi-Fi密码轮换Bot
pub struct WifiRotatorBot {
    bot: Bot,
    state: BotState,
}

impl WifiRotatorBot {
    /// 创建新的Bot实例
    pub async fn new(config: AppConfig) -> Result<Self> {
        let bot = Bot::new(&config.telegram.bot_token);
        let state = BotState::new(config, bot.clone());

        let me = bot.get_me().await?;
        state.set_bot_info(me.clone()).await;
        log::info!("Bot初始化成功: @{}", me.username.as_deref().unwrap_or("unknown"));

        bot.set_my_commands(Command::bot_commands()).await?;

        Ok(Self { bot, state })
    }

    /// 运行Bot（长轮询，直到收到停止信号）
    pub async fn run(self) -> Result<()> {
        log::info!("--- Telegram Bot 监听启动（polling） ---");

        let handler = Self::create_handler();

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.state])
            .default_handler(|upd| async move {
                log::debug!("Unhandled update: {:?}", upd.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        log::info!("Bot已停止运行");
        Ok(())
    }

    /// 创建消息处理器
    fn create_handler() -> UpdateHandler<crate::error::AppError> {
        Update::filter_message()
            .filter_command::<Command>()
            .endpoint(handle_command)
    }
}

/// 统一命令处理分发器
async fn handle_command(bot: Bot, msg: Message, cmd: Command, state: BotState) -> Result<()> {
    match cmd {
        Command::Start => crate::handlers::start_command(bot, msg, state).await,
        Command::Help => crate::handlers::help_command(bot, msg, state).await,
        Command::Rotate | Command::ChangerMdp => {
            crate::handlers::rotate_command(bot, msg, state).await
        }
    }
}

/// Bot命令枚举
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "可用命令：")]
pub enum Command {
    /// 开始使用Bot
    #[command(description = "开始使用")]
    Start,

    /// 显示帮助
    #[command(description = "显示帮助")]
    Help,

    /// 轮换访客Wi-Fi密码
    #[command(description = "更换访客Wi-Fi密码")]
    Rotate,

    /// 旧版监听程序的命令名，等同于 /rotate
    #[command(description = "更换访客Wi-Fi密码（同 /rotate）")]
    #[command(rename = "changer_mdp")]
    ChangerMdp,
}
