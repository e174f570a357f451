mod file;
mod memory;

use async_trait::async_trait;
use rand::{CryptoRng, RngCore};

use crate::error::KeyError;
use crate::material::{KeyMaterial, KeyMaterialGenerator, KeyRole, KeySpec};

pub use file::FileSink;
pub use memory::MemorySink;

// 用于抽象密钥材料的落地方式
#[async_trait]
pub trait KeySink: Send + Sync {
    /// 以 `render_binary` 的内容整体写入，覆盖已存在的同名目标
    async fn persist(&self, material: &KeyMaterial, file_name: &str) -> Result<(), KeyError>;
}

/// 默认文件名：`AES{bits}CBC_KEY.bin`、`IV.bin`、`HMAC_KEY.bin`
pub fn default_file_name(spec: &KeySpec) -> String {
    match spec.role {
        KeyRole::AesKey => format!("AES{}CBC_KEY.bin", spec.size_bytes * 8),
        KeyRole::Iv => "IV.bin".to_string(),
        KeyRole::HmacKey => "HMAC_KEY.bin".to_string(),
    }
}

/// AES-256 密钥、IV 与 HMAC 密钥的一组材料
#[derive(Debug)]
pub struct KeyBundle {
    pub aes_key: KeyMaterial,
    pub iv: KeyMaterial,
    pub hmac_key: KeyMaterial,
}

impl KeyBundle {
    pub const AES_KEY_SIZE: usize = 32;

    /// 全部生成成功才返回，`hmac_size` 为空时在配置区间内随机抽取
    pub fn generate<R: RngCore + CryptoRng>(
        generator: &mut KeyMaterialGenerator<R>,
        hmac_size: Option<usize>,
    ) -> Result<Self, KeyError> {
        let hmac_size = match hmac_size {
            Some(size) => size,
            None => generator.random_hmac_size()?,
        };
        let hmac_spec = KeySpec::hmac(hmac_size);
        generator.policy().validate(&hmac_spec)?;

        let aes_key = generator.generate(KeySpec::aes(Self::AES_KEY_SIZE))?;
        let iv = generator.generate(KeySpec::iv())?;
        let hmac_key = generator.generate(hmac_spec)?;

        log::info!(
            "Generated key bundle: AES-{} key, {}-byte IV, {}-byte HMAC key",
            Self::AES_KEY_SIZE * 8,
            iv.len(),
            hmac_key.len()
        );
        Ok(KeyBundle {
            aes_key,
            iv,
            hmac_key,
        })
    }

    pub fn materials(&self) -> [&KeyMaterial; 3] {
        [&self.aes_key, &self.iv, &self.hmac_key]
    }

    /// 按默认文件名依次写入，返回写入的文件名
    pub async fn persist<S: KeySink + ?Sized>(&self, sink: &S) -> Result<Vec<String>, KeyError> {
        let mut written = Vec::with_capacity(3);
        for material in self.materials() {
            let name = default_file_name(&material.spec());
            sink.persist(material, &name).await?;
            written.push(name);
        }
        Ok(written)
    }
}
