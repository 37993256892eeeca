mod prediction;
mod training;

use prediction::run_prediction;
use training::run_training;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Training(args) => run_training(&args, ctx),
        Command::Prediction(args) => run_prediction(&args, ctx),
        Command::All(args) => {
            run_training(&args, ctx)?;
            run_prediction(&args, ctx)
        }
    }
}

/// Descriptor parameters from the command line; everything the flags do not
/// cover stays at the library defaults.
pub(crate) fn build_parameters(args: &crate::cli::DatasetArgs) -> soap_prep::SoapParameters {
    soap_prep::SoapParameters {
        rcut: args.rcut,
        sigma: args.sigma,
        ..soap_prep::SoapParameters::default()
    }
}
