use clap::Parser;
use video_downloader_lib::cli::{run, Cli};
use video_downloader_lib::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
