use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jkess_rs::jk::open_serial;
use jkess_rs::util::hex::decode_hex;
use jkess_rs::{
    crc16_modbus, decode, init_logger, log_info, run, DeviceTable, Frame, JsonLogSink,
    MonitorConfig, Pipeline,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jkess-cli")]
#[command(about = "Monitor and decode JK ESS battery traffic on an RS485 link")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the serial link and decode frames until the port fails.
    Monitor {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        port: Option<String>,
        #[arg(short, long)]
        baudrate: Option<u32>,
        /// Log every accepted record as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Decode one captured vendor frame given as hex.
    Decode {
        hex: String,
        /// Device id to assume for slave frames.
        #[arg(short, long, default_value = "0")]
        device_id: u8,
        /// JSON configuration file for decoder options.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the Modbus CRC16 of the given hex bytes.
    Crc { hex: String },
}

fn load_config(path: Option<&PathBuf>) -> Result<MonitorConfig> {
    match path {
        Some(path) => MonitorConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(MonitorConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor {
            config,
            port,
            baudrate,
            json,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(port) = port {
                config.serial.port = port;
            }
            if let Some(baudrate) = baudrate {
                config.serial.baudrate = baudrate;
            }
            config.validate()?;
            init_logger(&config.log_level);

            let mut source = open_serial(&config.serial)
                .with_context(|| format!("opening serial port {}", config.serial.port))?;

            let table = if json {
                DeviceTable::with_sink(Box::new(JsonLogSink))
            } else {
                DeviceTable::new()
            };
            let mut pipeline = Pipeline::with_table(config.decoder, table);

            let result = run(&mut source, &mut pipeline).await;
            log_info(&format!(
                "Stopped after {} chunks, {} records from {} packs: {}",
                pipeline.stats().chunks,
                pipeline.stats().records_decoded(),
                pipeline.table().len(),
                serde_json::to_string(pipeline.stats())?
            ));
            result?;
        }
        Commands::Decode {
            hex,
            device_id,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            init_logger(&config.log_level);

            let bytes = decode_hex(&hex).context("parsing frame hex")?;
            let decoded = decode(&Frame::new(bytes), device_id, &config.decoder)?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        Commands::Crc { hex } => {
            init_logger("info");

            let bytes = decode_hex(&hex).context("parsing hex")?;
            println!("0x{:04X}", crc16_modbus(&bytes, bytes.len()));
        }
    }

    Ok(())
}
