// SPDX-License-Identifier: MIT OR Apache-2.0

use chacha_cli::xor_stream;
use log::{error, info};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};

configure_me::include_config!();

/// Open the configured streams and run the keystream over them.
async fn run(config: Config) -> Result<u64, chacha_cli::Error> {
    let mut cipher = chacha_cli::parse_cipher(&config.key, &config.nonce, config.counter)?;

    let mut input: Box<dyn AsyncRead + Unpin> = match &config.input {
        Some(path) => {
            info!("Reading from {}.", path.display());
            Box::new(File::open(path).await?)
        }
        None => Box::new(tokio::io::stdin()),
    };
    let mut output: Box<dyn AsyncWrite + Unpin> = match &config.output {
        Some(path) => {
            info!("Writing to {}.", path.display());
            Box::new(File::create(path).await?)
        }
        None => Box::new(tokio::io::stdout()),
    };

    info!("Keystream starts at block {}.", config.counter);
    xor_stream(&mut cipher, &mut input, &mut output, config.chunk_blocks).await
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let (config, _) = Config::including_optional_config_files::<&[&str]>(&[]).unwrap_or_exit();

    match run(config).await {
        Ok(total) => info!("Processed {} bytes.", total),
        Err(e) => {
            error!("Stream ended with error: {e}.");
            std::process::exit(1);
        }
    }
}
