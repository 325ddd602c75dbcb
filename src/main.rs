use std::process::ExitCode;

use clap::Parser;
use rustatsu_bkconv::{
    cli::{Cli, run},
    telemetry::{get_subscriber, init_subscriber},
};

fn main() -> ExitCode {
    let subscriber = get_subscriber("rustatsu-bkconv".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(err.msg = %error, err.details = ?error, "Run failed");
            eprintln!("Error: {:?}", error);
            ExitCode::from(error.exit_code())
        }
    }
}
