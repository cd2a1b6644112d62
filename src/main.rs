use boostme::cli::{Cli, commands};
use boostme::config;
use boostme::error::BoostError;
use boostme::format::OutputContext;
use boostme::logging::init_logging;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = OutputContext::from_flags(cli.json, cli.quiet);

    let settings = match config::load_settings(&cli.overrides()) {
        Ok(settings) => settings,
        Err(err) => return fail(&ctx, &err),
    };

    if let Err(err) = init_logging(
        cli.verbose,
        cli.quiet,
        settings.debug,
        cli.log_file.as_deref(),
    ) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }

    match commands::dispatch(&cli, &settings, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&ctx, &err),
    }
}

fn fail(ctx: &OutputContext, err: &BoostError) -> ExitCode {
    ctx.error(err);
    ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
}
