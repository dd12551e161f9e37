use poly_runner::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Dispatch to the CLI; it pre-parses the language before clap runs.
    match cli::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
