use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::material::KeyMaterial;
use crate::persist::KeySink;

/// 内存中的落地目标，同名写入直接覆盖
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<HashMap<String, Zeroizing<Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .await
            .get(file_name)
            .map(|bytes| bytes.to_vec())
    }

    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl KeySink for MemorySink {
    async fn persist(&self, material: &KeyMaterial, file_name: &str) -> Result<(), KeyError> {
        let bytes = Zeroizing::new(material.render_binary().to_vec());
        self.entries
            .lock()
            .await
            .insert(file_name.to_string(), bytes);
        Ok(())
    }
}
