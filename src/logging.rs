//! 日志初始化
//!
//! 日志同时写入控制台和当日日志文件 log/log_YYYY-MM-DD.txt，
//! 格式: `2024-01-02 15:00:00 - INFO - 消息`

use flexi_logger::{DeferredNow, Duplicate, FileSpec, FlexiLoggerError, Logger, LoggerHandle};
use log::Record;
use std::io::{self, Write};
use std::path::Path;

use crate::config::beijing_now;

/// 日志行格式，时间取北京时间
pub fn log_format(w: &mut dyn Write, _now: &mut DeferredNow, record: &Record) -> io::Result<()> {
    write!(
        w,
        "{} - {} - {}",
        beijing_now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// 初始化日志系统
///
/// 返回的 LoggerHandle 需要保持到程序结束；
/// 日志文件打不开时只输出到控制台，同时返回打开失败的原因
pub fn init(level: &str, log_file: &Path) -> (Option<LoggerHandle>, Option<FlexiLoggerError>) {
    let to_file = FileSpec::try_from(log_file).and_then(|spec| {
        Logger::try_with_env_or_str(level)?
            .log_to_file(spec)
            .append()
            .duplicate_to_stdout(Duplicate::All)
            .format(log_format)
            .start()
    });

    let file_error = match to_file {
        Ok(handle) => return (Some(handle), None),
        Err(e) => e,
    };

    let to_stdout = Logger::try_with_env_or_str(level)
        .and_then(|logger| logger.log_to_stdout().format(log_format).start());
    match to_stdout {
        Ok(handle) => (Some(handle), Some(file_error)),
        Err(e) => {
            eprintln!("日志系统初始化失败: {}", e);
            (None, Some(file_error))
        }
    }
}
