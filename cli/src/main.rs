mod commands;
mod export;
mod terminal;

use commands::{CommandLine, Commands, discover, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    if !commands.no_banner {
        print::banner();
    }

    let outcome = match commands.command {
        Commands::Discover { target, opts } => {
            print::section("getting ready for discovery");
            discover::discover(target, opts).await
        }
        Commands::Scan {
            target,
            ports,
            opts,
        } => {
            print::section("starting scanner");
            scan::scan(target, ports, opts).await
        }
        Commands::Target { address, opts } => {
            print::section("targeting a single host");
            scan::target(address, opts).await
        }
    };

    print::rule();
    outcome
}
