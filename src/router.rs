//! 路由器远程配置模块 - 通过SSH执行UCI命令修改访客Wi-Fi密码

use crate::config::{is_uci_identifier, RouterConfig};
use crate::error::{AppError, Result};
use ssh2::Session;
use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// 等待远程输出时的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 读出当前可读的全部数据，返回是否读到内容
fn read_available<R: Read>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    let mut chunk = [0u8; 4096];
    let mut progressed = false;
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(progressed),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                progressed = true;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(progressed),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// 远程命令执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// 远程Shell
pub trait RemoteShell {
    /// 执行一条命令并返回输出
    fn exec(&mut self, command: &str) -> Result<CommandOutput>;
}

/// 建立远程Shell会话
pub trait RouterConnector: Send + Sync + 'static {
    type Shell: RemoteShell;

    fn connect(&self) -> Result<Self::Shell>;
}

/// 基于ssh2的远程Shell
pub struct SshShell {
    session: Session,
    host: String,
}

impl SshShell {
    /// 使用密码认证连接路由器
    pub fn connect(config: &RouterConfig) -> Result<Self> {
        log::info!(
            "尝试SSH连接 {}:{}，用户 {}...",
            config.host,
            config.port,
            config.username
        );

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| AppError::config(format!("无法解析路由器地址: {}", config.host)))?;

        let tcp = TcpStream::connect_timeout(&addr, timeout)?;
        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout.as_millis() as u32);
        session.handshake()?;

        if let Err(e) = session.userauth_password(&config.username, &config.password) {
            log::error!("SSH认证失败，请检查用户名和密码");
            return Err(e.into());
        }
        if !session.authenticated() {
            return Err(AppError::business("SSH认证未通过"));
        }

        log::info!("✅ SSH连接已建立");
        Ok(Self {
            session,
            host: config.host.clone(),
        })
    }
}

impl RemoteShell for SshShell {
    fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        let mut channel = self.session.channel_session()?;
        channel.exec(command)?;

        // 非阻塞交替读取两路输出，避免任一路写满窗口后互相等待
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        self.session.set_blocking(false);
        let drained = (|| -> io::Result<()> {
            loop {
                let mut progressed = read_available(&mut channel, &mut stdout)?;
                progressed |= read_available(&mut channel.stderr(), &mut stderr)?;

                if channel.eof() && !progressed {
                    return Ok(());
                }
                if !progressed {
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        })();
        self.session.set_blocking(true);
        drained?;

        channel.wait_close()?;
        let exit_status = channel.exit_status()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            exit_status,
        })
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "bye", None) {
            log::debug!("关闭SSH会话时出错: {}", e);
        }
        log::info!("SSH连接 {} 已关闭", self.host);
    }
}

/// 以SSH方式连接路由器
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: RouterConfig,
}

impl SshConnector {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }
}

impl RouterConnector for SshConnector {
    type Shell = SshShell;

    fn connect(&self) -> Result<SshShell> {
        SshShell::connect(&self.config)
    }
}

/// 访客Wi-Fi密码更新器
pub struct GuestWifiUpdater<S> {
    shell: S,
    section: String,
}

impl<S: RemoteShell> GuestWifiUpdater<S> {
    pub fn new(shell: S, section: &str) -> Result<Self> {
        if !is_uci_identifier(section) {
            return Err(AppError::validation(format!("无效的UCI section名称: {}", section)));
        }

        Ok(Self {
            shell,
            section: section.to_string(),
        })
    }

    /// 设置新密码、提交配置并重载Wi-Fi
    pub fn set_guest_wifi_password(&mut self, password: &str) -> Result<()> {
        log::info!("修改访客Wi-Fi section {} 的密码", self.section);

        let set_cmd = format!(
            "uci set wireless.{}.key={}",
            self.section,
            shell_quote(password)
        );
        let shown = format!("uci set wireless.{}.key=[hidden]", self.section);
        self.run(&set_cmd, &shown)?;

        self.run("uci commit wireless", "uci commit wireless")?;
        self.run("wifi reload", "wifi reload")?;

        log::info!("✅ 访客Wi-Fi密码已更新，配置已重载");
        Ok(())
    }

    // `shown` 是写入日志和错误信息的命令文本
    fn run(&mut self, command: &str, shown: &str) -> Result<CommandOutput> {
        log::info!("执行SSH命令: '{}'", shown);
        let output = self.shell.exec(command)?;

        if !output.success() {
            log::error!(
                "命令 '{}' 退出码 {}: {}",
                shown,
                output.exit_status,
                output.stderr
            );
            return Err(AppError::RemoteCommand {
                command: shown.to_string(),
                stderr: output.stderr,
            });
        }

        if !output.stderr.is_empty() {
            log::warn!("命令 '{}' 返回错误输出: {}", shown, output.stderr);
        }
        if !output.stdout.is_empty() {
            log::debug!("命令 '{}' 输出: {}", shown, output.stdout);
        }

        Ok(output)
    }
}

/// 用单引号包裹参数，内部单引号转义为 `'\''`
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
