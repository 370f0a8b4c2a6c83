use std::path::PathBuf;

use clap::Args;
use stargrid_analysis::games;

use super::args::{BootstrapArg, DataArg};
use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct ObservablesArg {
    #[clap(flatten)]
    data: DataArg,
    #[clap(flatten)]
    bootstrap: BootstrapArg,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ObservablesArg) -> anyhow::Result<()> {
    let bootstrap = arg.bootstrap.build()?;
    let groups = arg.data.load_games()?;
    let observables = games::bootstrap_observables(&groups, &bootstrap)?;
    Output::save_json(&observables, arg.output.clone())
}
