use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = flowpath_cli::Args::parse();
    flowpath_cli::init_logging(args.verbose);
    flowpath_cli::run(&args)
}
