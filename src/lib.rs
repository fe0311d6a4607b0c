use good_lp::Solver;

pub mod error;
pub mod model;
pub mod report;
pub mod solver;
pub mod table;

pub use error::Error;
pub use model::{GroupingModel, ModelBuilder};
pub use report::{Report, Roster};
pub use solver::Assignment;
pub use table::{CostTable, MalformedInput};

/// Runs the whole pipeline with the default CBC backend: build the model,
/// solve it, interpret the assignment into rosters and a score.
pub fn optimize(table: &CostTable, min_group_size: usize) -> Result<Report, Error> {
    let model = ModelBuilder::new(table, min_group_size)?.build();
    let assignment = solver::solve(model)?;
    Report::interpret(&assignment, table, min_group_size)
}

/// Same pipeline with an injected solver backend.
pub fn optimize_with<S: Solver>(
    table: &CostTable,
    min_group_size: usize,
    backend: S,
) -> Result<Report, Error>
where
    S::Model: good_lp::SolverModel<Error = good_lp::ResolutionError>,
{
    let model = ModelBuilder::new(table, min_group_size)?.build();
    let assignment = solver::solve_with(model, backend)?;
    Report::interpret(&assignment, table, min_group_size)
}
