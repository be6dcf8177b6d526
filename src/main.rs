use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

use tabserve::app_state::{AppConfig, AppState, SchemaVariant};
use tabserve::server;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VariantArg {
    Churn,
    Lead,
}

impl VariantArg {
    fn to_variant(self) -> SchemaVariant {
        match self {
            VariantArg::Churn => SchemaVariant::Churn,
            VariantArg::Lead => SchemaVariant::Lead,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(
        long,
        default_value = "0.0.0.0",
        help = "Host address to bind the server to"
    )]
    host: String,

    #[arg(long, default_value_t = 9696, help = "Port number to listen on")]
    port: u16,

    #[arg(
        long,
        default_value_t = VariantArg::Churn,
        value_enum,
        help = "Input schema this instance serves: churn or lead"
    )]
    variant: VariantArg,

    #[arg(
        long,
        help = "Path to the serialized model artifact; defaults to the variant's artifact name"
    )]
    model_path: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    let config = AppConfig {
        host: args.host,
        port: args.port,
        variant: args.variant.to_variant(),
        model_path: args.model_path,
    };
    let app_state = AppState::new(&config)?;
    server::startup(config, app_state).await?;
    Ok(())
}
