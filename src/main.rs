use blogwright::cli::{self, Args};
use blogwright::{config, logging};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    // RUST_LOG may come from the env file
    let loaded = config::load_env_file(args.env_file.as_deref());
    logging::init(args.log_directives());

    let result = match loaded {
        Ok(_) => cli::execute(&args).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            if !args.quiet {
                println!("{}", report.article);
                eprintln!(
                    "Article saved to {} ({} paragraph(s), {} bytes)",
                    report.path.display(),
                    report.paragraphs,
                    report.bytes
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
