mod generator;

use std::fmt;
use std::ops::RangeInclusive;

use aes::cipher::{BlockSizeUser, KeySizeUser};
use aes::{Aes128, Aes192, Aes256};
use zeroize::Zeroizing;

use crate::error::KeyError;

pub use generator::KeyMaterialGenerator;

// HMAC 密钥长度默认区间（可配置）
pub const DEFAULT_HMAC_MIN: usize = 15;
pub const DEFAULT_HMAC_MAX: usize = 50;
// HMAC 密钥长度上限，SHA-512 分组长度（128 字节）的 8 倍
pub const MAX_HMAC_SIZE: usize = 1024;

/// 允许的 AES 密钥长度（字节），取自 aes 库的密码定义
pub fn aes_key_sizes() -> [usize; 3] {
    [Aes128::key_size(), Aes192::key_size(), Aes256::key_size()]
}

/// IV 长度固定为 AES 分组长度
pub fn iv_size() -> usize {
    Aes128::block_size()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyRole {
    AesKey,
    Iv,
    HmacKey,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyRole::AesKey => "AES key",
            KeyRole::Iv => "IV",
            KeyRole::HmacKey => "HMAC key",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub role: KeyRole,
    pub size_bytes: usize,
}

impl KeySpec {
    pub fn new(role: KeyRole, size_bytes: usize) -> Self {
        KeySpec { role, size_bytes }
    }

    pub fn aes(size_bytes: usize) -> Self {
        Self::new(KeyRole::AesKey, size_bytes)
    }

    pub fn iv() -> Self {
        Self::new(KeyRole::Iv, iv_size())
    }

    pub fn hmac(size_bytes: usize) -> Self {
        Self::new(KeyRole::HmacKey, size_bytes)
    }
}

/// 各角色的长度约束。AES 与 IV 固定，HMAC 区间可配置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizePolicy {
    hmac_min: usize,
    hmac_max: usize,
}

impl SizePolicy {
    pub fn new(hmac_min: usize, hmac_max: usize) -> Result<Self, KeyError> {
        if hmac_min == 0 || hmac_min > hmac_max || hmac_max > MAX_HMAC_SIZE {
            return Err(KeyError::InvalidHmacBounds {
                min: hmac_min,
                max: hmac_max,
            });
        }
        Ok(SizePolicy { hmac_min, hmac_max })
    }

    pub fn hmac_range(&self) -> RangeInclusive<usize> {
        self.hmac_min..=self.hmac_max
    }

    pub fn validate(&self, spec: &KeySpec) -> Result<(), KeyError> {
        let size = spec.size_bytes;
        let (ok, expected) = match spec.role {
            KeyRole::AesKey => {
                let sizes = aes_key_sizes();
                (
                    sizes.contains(&size),
                    format!("one of {}, {} or {}", sizes[0], sizes[1], sizes[2]),
                )
            }
            KeyRole::Iv => (size == iv_size(), iv_size().to_string()),
            KeyRole::HmacKey => (
                size > 0 && self.hmac_range().contains(&size),
                format!("{} to {}", self.hmac_min, self.hmac_max),
            ),
        };

        if ok {
            Ok(())
        } else {
            Err(KeyError::InvalidSize {
                role: spec.role,
                size,
                expected,
            })
        }
    }
}

impl Default for SizePolicy {
    fn default() -> Self {
        SizePolicy {
            hmac_min: DEFAULT_HMAC_MIN,
            hmac_max: DEFAULT_HMAC_MAX,
        }
    }
}

/// 一次生成得到的密钥材料。生成后不可变，丢弃时内存清零
pub struct KeyMaterial {
    spec: KeySpec,
    bytes: Zeroizing<Vec<u8>>,
}

impl KeyMaterial {
    pub(crate) fn new(spec: KeySpec, bytes: Zeroizing<Vec<u8>>) -> Self {
        KeyMaterial { spec, bytes }
    }

    pub fn spec(&self) -> KeySpec {
        self.spec
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 原始字节，用于写文件
    pub fn render_binary(&self) -> &[u8] {
        &self.bytes
    }

    /// 每个字节格式化为 "0x1a" 形式，保持顺序
    pub fn render_hex(&self) -> Vec<String> {
        self.bytes.iter().map(|byte| format!("0x{byte:02x}")).collect()
    }
}

// 不输出密钥内容
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("spec", &self.spec)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// `KeyMaterial::render_hex` 的逆操作
pub fn parse_hex<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>, KeyError> {
    tokens
        .iter()
        .map(|token| parse_hex_token(token.as_ref()))
        .collect()
}

fn parse_hex_token(token: &str) -> Result<u8, KeyError> {
    let invalid = || KeyError::InvalidHexToken(token.to_string());

    let digits = token.strip_prefix("0x").ok_or_else(invalid)?;
    let lowercase = digits
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if digits.len() != 2 || !lowercase {
        return Err(invalid());
    }

    let mut out = [0u8; 1];
    hex::decode_to_slice(digits, &mut out).map_err(|_| invalid())?;
    Ok(out[0])
}
