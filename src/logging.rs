//! 日志初始化

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// 初始化日志记录器
///
/// 日志级别取自 `RUST_LOG`（默认 `info`）；始终输出到stderr，设置 `LOG_FILE` 时同时追加写入该文件。
pub fn init_logger() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&log_level));
    builder.format_timestamp_secs();

    if let Ok(path) = env::var("LOG_FILE") {
        match open_log_file(&path) {
            Ok(file) => {
                let tee = Tee::new(file, io::stderr());
                builder.target(env_logger::Target::Pipe(Box::new(tee)));
            }
            Err(e) => eprintln!("无法打开日志文件 {}: {}，仅输出到stderr", path, e),
        }
    }

    builder.init();
    log::info!("📝 日志级别: {}", log_level);
}

/// 以追加方式打开日志文件
pub fn open_log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// 同时写入两个目标
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tee_writes_both_targets() -> io::Result<()> {
        let mut tee = Tee::new(Vec::new(), Vec::new());
        writeln!(tee, "SSH连接已建立")?;
        tee.flush()?;

        assert_eq!(tee.first, "SSH连接已建立\n".as_bytes());
        assert_eq!(tee.first, tee.second);
        Ok(())
    }

    #[test]
    fn test_open_log_file_appends() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("wifi_rotator.log");

        writeln!(open_log_file(&path)?, "first")?;
        writeln!(open_log_file(&path)?, "second")?;

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }
}
