//! The saturation core: limits, the limited-resource controller, and the
//! given-clause loop.

pub mod algorithm;
pub mod limits;
pub mod lrs;

pub use algorithm::SaturationAlgorithm;
pub use limits::{Limits, LimitsChange};
pub use lrs::LrsController;

use crate::error::Result;
use crate::logic::Env;
use crate::options::Options;
use crate::problem::UnitList;
use crate::statistics::TerminationReason;

/// Run saturation on a clausified problem.
pub fn saturate(
    units: UnitList,
    options: Options,
    env: Env,
) -> Result<(TerminationReason, SaturationAlgorithm)> {
    let mut algorithm = SaturationAlgorithm::new(options, env)?;
    algorithm.add_clauses(units);
    let reason = algorithm.run();
    Ok((reason, algorithm))
}
