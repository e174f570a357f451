pub mod config;
pub mod error;
pub mod logger;
pub mod material;
pub mod persist;

pub use error::KeyError;
pub use material::{
    KeyMaterial, KeyMaterialGenerator, KeyRole, KeySpec, MAX_HMAC_SIZE, SizePolicy, aes_key_sizes,
    iv_size, parse_hex,
};
pub use persist::{FileSink, KeyBundle, KeySink, MemorySink, default_file_name};
