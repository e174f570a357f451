use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::material::{KeyMaterial, KeySpec, SizePolicy};

/// 密钥材料生成器。随机源必须是 CSPRNG（由 `CryptoRng` 约束），默认使用系统随机源
pub struct KeyMaterialGenerator<R = OsRng> {
    rng: R,
    policy: SizePolicy,
}

impl KeyMaterialGenerator<OsRng> {
    pub fn new() -> Self {
        Self::with_policy(SizePolicy::default())
    }

    pub fn with_policy(policy: SizePolicy) -> Self {
        Self::from_rng(OsRng, policy)
    }
}

impl Default for KeyMaterialGenerator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> KeyMaterialGenerator<R> {
    pub fn from_rng(rng: R, policy: SizePolicy) -> Self {
        KeyMaterialGenerator { rng, policy }
    }

    pub fn policy(&self) -> &SizePolicy {
        &self.policy
    }

    /// 先校验长度，再一次性取满 `size_bytes` 个随机字节
    pub fn generate(&mut self, spec: KeySpec) -> Result<KeyMaterial, KeyError> {
        if let Err(e) = self.policy.validate(&spec) {
            log::debug!("Rejected {} request: {}", spec.role, e);
            return Err(e);
        }

        let bytes = self.random_bytes(spec.size_bytes)?;
        log::debug!("Generated {} ({} bytes)", spec.role, spec.size_bytes);
        Ok(KeyMaterial::new(spec, bytes))
    }

    /// 在 HMAC 长度区间内均匀抽取一个长度
    pub fn random_hmac_size(&mut self) -> Result<usize, KeyError> {
        let range = self.policy.hmac_range();
        let span = (range.end() - range.start() + 1) as u64;
        // 拒绝采样，避免取模偏差
        let zone = u64::MAX - (u64::MAX % span);
        loop {
            let mut buf = [0u8; 8];
            self.rng.try_fill_bytes(&mut buf)?;
            let value = u64::from_le_bytes(buf);
            if value < zone {
                return Ok(range.start() + (value % span) as usize);
            }
        }
    }

    fn random_bytes(&mut self, size: usize) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        let mut bytes = Zeroizing::new(vec![0u8; size]);
        // 随机源失败直接返回错误，不降级
        self.rng.try_fill_bytes(bytes.as_mut_slice()).map_err(|e| {
            log::error!("Secure random source failed: {}", e);
            KeyError::EntropySource(e)
        })?;
        Ok(bytes)
    }
}
