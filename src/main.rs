// src/main.rs

use sweepbuild::{cli, logging, run};

/// Exit status for configuration and setup errors.
const EXIT_SETUP_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("sweepbuild error: {err:?}");
            std::process::exit(EXIT_SETUP_ERROR);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
