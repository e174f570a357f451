use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use keymat::config::{Config, ConfigError};
use keymat::logger::init_logger;
use keymat::{
    FileSink, KeyBundle, KeyError, KeyMaterial, KeyMaterialGenerator, KeyRole, KeySink, KeySpec,
    default_file_name, iv_size,
};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "keymat")]
#[command(about = "Generate AES keys, IVs and HMAC keys from the system secure random source")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, env = "KEYMAT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory key files are written to
    #[arg(long, global = true, env = "KEYMAT_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Smallest accepted HMAC key size in bytes
    #[arg(long, global = true)]
    hmac_min: Option<usize>,

    /// Largest accepted HMAC key size in bytes
    #[arg(long, global = true)]
    hmac_max: Option<usize>,

    /// Append log lines to this file
    #[arg(long, global = true, env = "KEYMAT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an AES-256 key, an IV and an HMAC key to AES256CBC_KEY.bin, IV.bin and HMAC_KEY.bin
    Bundle {
        /// HMAC key size in bytes (random within the configured range if omitted)
        #[arg(long)]
        hmac_size: Option<usize>,
    },
    /// Print a fresh AES key and IV as hex (prompts for the key size if omitted)
    Aes {
        /// AES key size in bytes: 16, 24 or 32
        #[arg(long)]
        size: Option<usize>,
    },
    /// Generate a single key
    Generate {
        #[arg(long, value_enum)]
        role: RoleArg,

        /// Size in bytes (AES: 32, IV: 16, HMAC: random within range if omitted)
        #[arg(long)]
        size: Option<usize>,

        /// Output file name, relative to the output directory
        #[arg(long, conflicts_with = "hex")]
        out: Option<String>,

        /// Print as hex instead of writing a file
        #[arg(long)]
        hex: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Aes,
    Iv,
    Hmac,
}

impl From<RoleArg> for KeyRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Aes => KeyRole::AesKey,
            RoleArg::Iv => KeyRole::Iv,
            RoleArg::Hmac => KeyRole::HmacKey,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            log::logger().flush();
            exit_code(&err)
        }
    }
}

// 输入校验失败返回 2，其它错误返回 1
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let validation = err.chain().any(|cause| {
        if let Some(e) = cause.downcast_ref::<KeyError>() {
            return e.is_validation();
        }
        matches!(
            cause.downcast_ref::<ConfigError>(),
            Some(ConfigError::Policy(e)) if e.is_validation()
        )
    });
    if validation {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    // 命令行参数覆盖配置文件
    if let Some(min) = cli.hmac_min {
        config.hmac.min = min;
    }
    if let Some(max) = cli.hmac_max {
        config.hmac.max = max;
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.log_level()?
    };
    let log_file = cli.log_file.clone().or_else(|| config.log.file.clone());
    init_logger(level, log_file.as_deref()).context("failed to initialise logger")?;

    let policy = config.size_policy()?;
    let out_dir = cli.out_dir.clone().unwrap_or_else(|| config.output_dir());
    let mut generator = KeyMaterialGenerator::with_policy(policy);

    match cli.command {
        Commands::Bundle { hmac_size } => {
            // 全部生成成功后才创建目录和写文件
            let bundle = KeyBundle::generate(&mut generator, hmac_size)?;
            let sink = FileSink::new(&out_dir).await?;
            for name in bundle.persist(&sink).await? {
                println!("{}", sink.path_for(&name).display());
            }
        }
        Commands::Aes { size } => {
            let size = match size {
                Some(size) => size,
                None => prompt_key_size()?,
            };
            let key = generator.generate(KeySpec::aes(size))?;
            let iv = generator.generate(KeySpec::iv())?;
            println!(
                "Random Cryptographic Key (AES{}): {}",
                size * 8,
                hex_listing(&key)
            );
            println!("Initialization Vector (IV): {}", hex_listing(&iv));
        }
        Commands::Generate {
            role,
            size,
            out,
            hex,
        } => {
            let role = KeyRole::from(role);
            let size = match (role, size) {
                (_, Some(size)) => size,
                (KeyRole::AesKey, None) => KeyBundle::AES_KEY_SIZE,
                (KeyRole::Iv, None) => iv_size(),
                (KeyRole::HmacKey, None) => generator.random_hmac_size()?,
            };
            let material = generator.generate(KeySpec::new(role, size))?;

            if hex {
                println!("{}", hex_listing(&material));
            } else {
                let name = out.unwrap_or_else(|| default_file_name(&material.spec()));
                let sink = FileSink::new(&out_dir).await?;
                sink.persist(&material, &name)
                    .await
                    .with_context(|| format!("failed to write {name}"))?;
                println!("{}", sink.path_for(&name).display());
            }
        }
    }

    log::logger().flush();
    Ok(())
}

fn prompt_key_size() -> Result<usize> {
    print!("Key_size : ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let input = line.trim();
    let size = input
        .parse::<usize>()
        .map_err(|_| KeyError::InvalidSizeInput(input.to_string()))?;
    Ok(size)
}

// 与 Python 列表的打印形式一致：['0x1a', '0x2b']
fn hex_listing(material: &KeyMaterial) -> String {
    let tokens: Vec<String> = material
        .render_hex()
        .iter()
        .map(|token| format!("'{token}'"))
        .collect();
    format!("[{}]", tokens.join(", "))
}
