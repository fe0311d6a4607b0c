use good_lp::solvers::coin_cbc::coin_cbc;
use good_lp::{ResolutionError, Solution, Solver, SolverModel, Variable};

use crate::error::Error;
use crate::model::GroupingModel;

/// Resolved 0/1 choices plus the attained objective value.
///
/// Produced by the solver boundary, consumed by the report, then discarded.
#[derive(Debug, Clone)]
pub struct Assignment {
    choices: Vec<Vec<bool>>,
    objective_value: f64,
}

impl Assignment {
    pub(crate) fn new(choices: Vec<Vec<bool>>, objective_value: f64) -> Self {
        Assignment {
            choices,
            objective_value,
        }
    }

    /// Index of the alternative this person was assigned to.
    pub fn chosen(&self, person: usize) -> Option<usize> {
        self.choices[person].iter().position(|&set| set)
    }

    pub fn is_assigned(&self, person: usize, alternative: usize) -> bool {
        self.choices[person][alternative]
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }
}

/// Solves the model with the default CBC backend.
pub fn solve(model: GroupingModel) -> Result<Assignment, Error> {
    let GroupingModel {
        variables,
        objective,
        constraints,
        choices,
        costs,
        min_group_size,
        ..
    } = model;

    #[allow(unused_mut)]
    let mut problem = variables.minimise(objective).using(coin_cbc);
    #[cfg(not(debug_assertions))]
    problem.set_parameter("loglevel", "0");

    let problem = constraints.into_iter().fold(problem, |p, c| p.with(c));
    finish(problem.solve(), &choices, &costs, min_group_size)
}

/// Solves the model with an injected backend. Any `good_lp` solver satisfies
/// the contract; model construction and interpretation never see which one.
pub fn solve_with<S: Solver>(model: GroupingModel, backend: S) -> Result<Assignment, Error>
where
    S::Model: SolverModel<Error = ResolutionError>,
{
    let GroupingModel {
        variables,
        objective,
        constraints,
        choices,
        costs,
        min_group_size,
        ..
    } = model;

    let problem = constraints
        .into_iter()
        .fold(variables.minimise(objective).using(backend), |p, c| p.with(c));
    finish(problem.solve(), &choices, &costs, min_group_size)
}

fn finish<S: Solution>(
    outcome: Result<S, ResolutionError>,
    choices: &[Vec<Variable>],
    costs: &[f64],
    min_group_size: usize,
) -> Result<Assignment, Error> {
    let solution = match outcome {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => return Err(Error::Infeasible { min_group_size }),
        Err(other) => return Err(Error::Solver(other.to_string())),
    };

    let n_alternatives = choices.first().map_or(0, Vec::len);
    let mut resolved = Vec::with_capacity(choices.len());
    let mut objective_value = 0.0;
    for (row, row_costs) in choices.iter().zip(costs.chunks(n_alternatives)) {
        let picks: Vec<bool> = row.iter().map(|&x| solution.value(x) > 0.5).collect();
        for (&set, &cost) in picks.iter().zip(row_costs) {
            if set {
                objective_value += cost;
            }
        }
        resolved.push(picks);
    }

    tracing::debug!(objective_value, "solver returned an assignment");
    Ok(Assignment::new(resolved, objective_value))
}
