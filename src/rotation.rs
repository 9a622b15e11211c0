//! 密码轮换流程：生成密码 → SSH更新路由器 → Telegram通知

use crate::config::{AppConfig, WifiConfig};
use crate::error::Result;
use crate::notify::{Notifier, TelegramNotifier};
use crate::password::{GeneratedPassword, PasswordGenerator};
use crate::router::{GuestWifiUpdater, RouterConnector, SshConnector};
use std::sync::Arc;
use teloxide::Bot;

/// 访客Wi-Fi密码轮换器
pub struct PasswordRotator<C, N> {
    connector: Arc<C>,
    notifier: N,
    generator: PasswordGenerator,
    wifi: WifiConfig,
    password_length: usize,
}

impl PasswordRotator<SshConnector, TelegramNotifier> {
    /// 按应用配置创建SSH + Telegram轮换器
    pub fn from_config(config: &AppConfig, bot: Bot) -> Self {
        Self::new(
            SshConnector::new(config.router.clone()),
            TelegramNotifier::new(bot, config.telegram.chat_id),
            config.wifi.clone(),
            config.password_length,
        )
    }
}

impl<C: RouterConnector, N: Notifier> PasswordRotator<C, N> {
    pub fn new(connector: C, notifier: N, wifi: WifiConfig, password_length: usize) -> Self {
        Self {
            connector: Arc::new(connector),
            notifier,
            generator: PasswordGenerator::default(),
            wifi,
            password_length,
        }
    }

    /// 执行一次轮换，任何一步失败都会中止并返回错误
    pub async fn rotate(&self) -> Result<GeneratedPassword> {
        let password = self.generator.generate(self.password_length)?;
        log::info!("新密码已生成: [hidden]");

        // ssh2是阻塞式的，放到阻塞线程池执行；会话在闭包结束时关闭
        let connector = Arc::clone(&self.connector);
        let section = self.wifi.guest_section.clone();
        let password = tokio::task::spawn_blocking(move || -> Result<GeneratedPassword> {
            let shell = connector.connect()?;
            let mut updater = GuestWifiUpdater::new(shell, &section)?;
            updater.set_guest_wifi_password(password.expose())?;
            Ok(password)
        })
        .await??;

        log::info!("访客网络 {} 的密码已更新", self.wifi.ssid);

        if !self.notifier.notify(&self.wifi.ssid, password.expose()).await {
            log::warn!("密码已更新，但通知未能全部送达");
        }

        Ok(password)
    }

    /// 执行轮换并处理失败，成功返回true
    pub async fn run(&self) -> bool {
        match self.rotate().await {
            Ok(_) => {
                log::info!("✅ 访客Wi-Fi密码轮换完成");
                true
            }
            Err(e) => {
                log::error!("❌ 访客Wi-Fi密码轮换失败: {}", e);
                self.notifier.notify_failure(&e.to_string()).await;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::notify::fakes::RecordingNotifier;
    use crate::router::fakes::{FakeConnector, FakeShell};

    fn wifi() -> WifiConfig {
        WifiConfig {
            ssid: "NekoGuest".to_string(),
            guest_section: "guest2g".to_string(),
        }
    }

    fn rotator(
        shell: FakeShell,
        refuse: bool,
        length: usize,
    ) -> (PasswordRotator<FakeConnector, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let rotator = PasswordRotator::new(
            FakeConnector { shell, refuse },
            notifier.clone(),
            wifi(),
            length,
        );
        (rotator, notifier)
    }

    #[tokio::test]
    async fn test_successful_rotation() -> Result<()> {
        let shell = FakeShell::default();
        let commands = shell.commands.clone();
        let (rotator, notifier) = rotator(shell, false, 18);

        let password = rotator.rotate().await?;
        assert_eq!(password.len(), 18);

        let commands = commands.lock().unwrap().clone();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            format!("uci set wireless.guest2g.key='{}'", password.expose())
        );

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent, vec![("NekoGuest".to_string(), password.expose().to_string())]);
        assert!(notifier.failures.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_failure_sends_error_notification() {
        let (rotator, notifier) = rotator(FakeShell::default(), true, 18);

        assert!(!rotator.run().await);
        assert!(notifier.sent.lock().unwrap().is_empty());

        let failures = notifier.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_command_failure_aborts_rotation() {
        let shell = FakeShell {
            fail_on: Some("uci commit".to_string()),
            ..FakeShell::default()
        };
        let commands = shell.commands.clone();
        let (rotator, notifier) = rotator(shell, false, 18);

        let err = rotator.rotate().await.unwrap_err();
        assert!(matches!(err, AppError::RemoteCommand { .. }));
        assert_eq!(commands.lock().unwrap().len(), 2);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_length_is_fatal() {
        let shell = FakeShell::default();
        let commands = shell.commands.clone();
        let (rotator, notifier) = rotator(shell, false, 11);

        let err = rotator.rotate().await.unwrap_err();
        assert!(err.is_invalid_length());
        assert!(commands.lock().unwrap().is_empty());

        assert!(!rotator.run().await);
        assert_eq!(notifier.failures.lock().unwrap().len(), 1);
    }
}
