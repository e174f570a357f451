use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::KeyError;
use crate::material::KeyMaterial;
use crate::persist::KeySink;

/// 将密钥材料写成目录下的二进制文件
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// 目录不存在时创建
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, KeyError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(FileSink { dir })
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

#[async_trait]
impl KeySink for FileSink {
    async fn persist(&self, material: &KeyMaterial, file_name: &str) -> Result<(), KeyError> {
        let path = self.path_for(file_name);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // 仅所有者可读写
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await.map_err(|e| {
            log::error!("Failed to open {}: {}", path.display(), e);
            KeyError::Io(e)
        })?;
        file.write_all(material.render_binary()).await?;
        file.flush().await?;
        file.sync_all().await?;

        log::info!(
            "Wrote {} ({} bytes) to {}",
            material.spec().role,
            material.len(),
            path.display()
        );
        Ok(())
    }
}
