mod args;
mod run;

use clap::Parser;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = args::Args::parse();

    if let Err(err) = run::run(&args) {
        eprintln!("{}", err.render());
        std::process::exit(1);
    }
}
