use crate::server;
use clap::{Args, Parser, Subcommand};
use screening::cuil::derive_cuil;
use screening::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Screening Service",
    about = "Query BCRA debtor records and AFIP taxpayer standing for credit screening",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Derive the CUIL for a DNI and sex without starting the service
    Cuil(CuilArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct CuilArgs {
    /// National identity document number (7 or 8 digits, or an 11-digit CUIT)
    #[arg(long)]
    dni: String,
    /// Sex as registered: M, F or X
    #[arg(long, default_value = "")]
    sex: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Cuil(args) => run_cuil(args),
    }
}

fn run_cuil(args: CuilArgs) -> Result<(), AppError> {
    match derive_cuil(&args.dni, &args.sex) {
        Ok(cuil) => {
            println!("{cuil}");
            Ok(())
        }
        Err(err) => {
            eprintln!("cannot derive CUIL: {err}");
            std::process::exit(2);
        }
    }
}
