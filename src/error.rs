use thiserror::Error;

use crate::material::KeyRole;

/// 密钥材料生成与持久化的错误类型
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid {role} size: {size} bytes (expected {expected})")]
    InvalidSize {
        role: KeyRole,
        size: usize,
        expected: String,
    },

    #[error("key size is not an integer: {0:?}")]
    InvalidSizeInput(String),

    #[error("secure random source unavailable: {0}")]
    EntropySource(#[from] rand::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid hex token: {0:?}")]
    InvalidHexToken(String),

    #[error("invalid HMAC size bounds: min {min}, max {max}")]
    InvalidHmacBounds { min: usize, max: usize },
}

impl KeyError {
    /// 输入校验类错误（用于决定退出码）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KeyError::InvalidSize { .. }
                | KeyError::InvalidSizeInput(_)
                | KeyError::InvalidHexToken(_)
                | KeyError::InvalidHmacBounds { .. }
        )
    }
}
