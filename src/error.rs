//! 错误处理模块

use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("密码长度 {length} 过短，至少需要 {minimum} 个字符")]
    InvalidLength { length: usize, minimum: usize },

    #[error("密码长度 {length} 不足以包含全部 {required} 类必需字符")]
    InsufficientLength { length: usize, required: usize },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("SSH错误: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("远程命令 `{command}` 执行失败: {stderr}")]
    RemoteCommand { command: String, stderr: String },

    #[error("Telegram Bot错误: {0}")]
    TelegramBot(#[from] teloxide::RequestError),

    #[error("二维码生成错误: {0}")]
    QrCode(#[from] qrcode::types::QrError),

    #[error("图像编码错误: {0}")]
    Image(#[from] image::ImageError),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("后台任务错误: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("网络错误: {0}")]
    Network(#[from] reqwest::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("业务逻辑错误: {0}")]
    Business(String),
}

impl AppError {
    /// 创建配置错误
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// 创建验证错误
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// 创建业务逻辑错误
    pub fn business<T: Into<String>>(msg: T) -> Self {
        Self::Business(msg.into())
    }

    /// 是否为密码长度类错误（低于强度下限或不足以覆盖必需字符类）
    pub fn is_invalid_length(&self) -> bool {
        matches!(
            self,
            Self::InvalidLength { .. } | Self::InsufficientLength { .. }
        )
    }
}

/// 应用程序Result类型
pub type Result<T> = std::result::Result<T, AppError>;
