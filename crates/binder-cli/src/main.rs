use binder_cli::output::emit_error;
use binder_cli::Cli;
use clap::Parser;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    if let Err(err) = binder_cli::run(cli) {
        emit_error(format, &err);
        std::process::exit(err.exit_code());
    }
}
