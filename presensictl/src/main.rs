use std::io;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tracing::trace;

use presensi_common::init_logging;
use presensictl::{
    acquire_from_replay, check_fix, submit_attendance, Config, Opts, SubCommand,
};

/// Binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    let cfn = opts.config.as_ref().and_then(|p| p.to_str().map(String::from));

    // Initialise logging.
    //
    init_logging(NAME, opts.tree, None)?;

    match &opts.subcmd {
        // Handle `check LAT LON`
        //
        SubCommand::Check(copts) => {
            trace!("check");

            banner();
            let cfg = Config::load(cfn.as_deref())?;
            check_fix(&cfg, copts)?;
        }

        // Handle `acquire REPLAY`
        //
        SubCommand::Acquire(aopts) => {
            trace!("acquire");

            banner();
            let cfg = Config::load(cfn.as_deref())?;
            acquire_from_replay(&cfg, aopts).await?;
        }

        // Handle `submit REPLAY`
        //
        SubCommand::Submit(sopts) => {
            trace!("submit");

            banner();
            let cfg = Config::load(cfn.as_deref())?;
            submit_attendance(&cfg, sopts).await?;
        }

        // Standalone completion generation
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
        }

        // Standalone `version` command
        //
        SubCommand::Version => {
            eprintln!("Modules: ");
            eprintln!("\t{}", presensi_common::version());
            eprintln!("\t{}", presensi_geoloc::version());
        }
    }
    Ok(())
}

/// Display banner
///
fn banner() {
    eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    )
}
