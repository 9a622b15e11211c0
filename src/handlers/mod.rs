//! 消息处理器模块

pub mod start;
pub mod rotate;

// 重新导出处理器函数
pub use start::*;
pub use rotate::*;
