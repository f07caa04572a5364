use clap::Parser;

mod args;
mod commands;
mod workflow;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = args::Args::parse();
    match args.command {
        args::Commands::Scatter(args) => commands::scatter_command(args),
        args::Commands::Volume(args) => commands::volume_command(args),
        args::Commands::Components(args) => commands::components_command(args),
    }
}
