//! wtf - Wrapper for Terraform CLI

use tracing_subscriber::EnvFilter;

use wtf_cli::config::process_env;

fn main() {
    // Initialize logging; stderr keeps terraform's stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WTF_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let code = match wtf_cli::run(args, &process_env) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(code);
}
