use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("logger already initialised")]
    AlreadyInitialised,

    #[error(transparent)]
    SetLogger(#[from] SetLoggerError),
}

// 日志文件在第一条记录写入时才打开
struct LogFile {
    path: PathBuf,
    handle: Mutex<Option<File>>,
}

impl LogFile {
    fn write(&self, msg: &str) {
        let Ok(mut handle) = self.handle.lock() else {
            return;
        };
        if handle.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => *handle = Some(file),
                Err(e) => {
                    eprintln!("Log file {} unavailable: {}", self.path.display(), e);
                    return;
                }
            }
        }
        if let Some(file) = handle.as_mut() {
            if let Err(e) = file.write_all(msg.as_bytes()) {
                eprintln!("Log write error: {}", e);
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut handle) = self.handle.lock() {
            if let Some(file) = handle.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

struct DefaultLogger {
    level_filter: LevelFilter,
    file: Option<LogFile>,
}

impl Log for DefaultLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_filter
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = Local::now();
        let msg = format!(
            "[{}][{}] {}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        );

        // 控制台走 stderr，stdout 留给十六进制输出
        let _ = io::stderr().write_all(msg.as_bytes());

        if let Some(file) = &self.file {
            file.write(&msg);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}

static LOGGER: OnceLock<DefaultLogger> = OnceLock::new();

/// 安装全局日志。`file_path` 给出时追加写入该文件（首条记录时创建）
pub fn init_logger(level: LevelFilter, file_path: Option<&Path>) -> Result<(), LoggerError> {
    let file = file_path.map(|path| LogFile {
        path: path.to_path_buf(),
        handle: Mutex::new(None),
    });

    let logger = DefaultLogger {
        level_filter: level,
        file,
    };

    if LOGGER.set(logger).is_err() {
        return Err(LoggerError::AlreadyInitialised);
    }
    let logger = LOGGER.get().ok_or(LoggerError::AlreadyInitialised)?;
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
