use anyhow::Result;
use clap::Parser;
use subrecode::{cli, Error};
use tracing::error;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        error!("{:#}", err);
        let fatal = err.downcast_ref::<Error>().is_some_and(Error::is_fatal);
        std::process::exit(if fatal { 2 } else { 1 });
    }
    Ok(())
}
