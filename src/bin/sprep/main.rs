use std::process::ExitCode;

mod cli;
mod commands;
mod display;

fn main() -> ExitCode {
    let cli = cli::parse();
    let ctx = display::Context::detect().with_quiet(match &cli.command {
        cli::Command::Training(args) => args.quiet,
        cli::Command::Prediction(args) => args.quiet,
        cli::Command::All(args) => args.quiet,
    });

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
