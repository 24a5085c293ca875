use clap::Parser;
use console::style;

mod cli;
mod commands;
mod config;
mod exec;
mod fetch;
mod fsutil;
mod pipeline;
#[cfg(test)]
mod testutil;
mod updater;

fn main() {
    let cli = cli::Cli::parse();

    let result = if cli.uninstall {
        commands::uninstall::execute()
    } else if cli.fix_desktop {
        commands::fix_desktop::execute()
    } else if cli.agent {
        commands::agent::execute()
    } else {
        commands::install::execute(cli.bundle.as_deref(), cli.force)
    };

    if let Err(e) = result {
        eprintln!("{} {e}", style("error:").red().bold());
        std::process::exit(1);
    }
}
