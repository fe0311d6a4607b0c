use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};
use itertools::iproduct;

use crate::error::Error;
use crate::table::CostTable;

/// Builds the binary program for one grouping run.
///
/// Validation happens at construction, so a builder in hand always produces
/// a well-formed model. `build` consumes the builder and returns the whole
/// model in one pass; there is no incremental construction.
pub struct ModelBuilder<'a> {
    table: &'a CostTable,
    min_group_size: usize,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(table: &'a CostTable, min_group_size: usize) -> Result<Self, Error> {
        if min_group_size < 1 || min_group_size > table.n_persons() {
            return Err(Error::InvalidParameter {
                min_group_size,
                n_persons: table.n_persons(),
            });
        }
        Ok(ModelBuilder {
            table,
            min_group_size,
        })
    }

    pub fn build(self) -> GroupingModel {
        let table = self.table;
        let (n_persons, n_alternatives) = (table.n_persons(), table.n_alternatives());
        let min_size = self.min_group_size as f64;

        let mut variables = ProblemVariables::new();
        let choices: Vec<Vec<Variable>> = (0..n_persons)
            .map(|_| {
                (0..n_alternatives)
                    .map(|_| variables.add(variable().binary()))
                    .collect()
            })
            .collect();
        let membership: Vec<Variable> = (0..n_alternatives)
            .map(|_| variables.add(variable().binary()))
            .collect();

        let mut constraints = Vec::new();

        // Every person lands in exactly one alternative.
        for row in &choices {
            let one_choice = row.iter().fold(Expression::from(0.0), |sum, &x| sum + x);
            constraints.push(one_choice.eq(1.0));
        }

        for (alternative, &has_members) in membership.iter().enumerate() {
            let headcount = choices
                .iter()
                .fold(Expression::from(0.0), |sum, row| sum + row[alternative]);

            // has_members is the OR of the column: bounded above by the
            // headcount and below by every individual choice. Both directions
            // are needed; either one alone leaves the indicator unconstrained
            // on one side.
            constraints.push(constraint!(has_members <= headcount.clone()));
            for row in &choices {
                constraints.push(constraint!(has_members >= row[alternative]));
            }

            // A non-empty alternative must reach the minimum size. With
            // has_members at 0 this is 0 >= 0, so empty groups stay legal.
            constraints.push(constraint!(headcount >= has_members * min_size));
        }

        let costs: Vec<f64> = iproduct!(0..n_persons, 0..n_alternatives)
            .map(|(person, alternative)| table.effective_cost(person, alternative))
            .collect();
        let objective = iproduct!(0..n_persons, 0..n_alternatives).fold(
            Expression::from(0.0),
            |sum, (person, alternative)| {
                sum + choices[person][alternative] * table.effective_cost(person, alternative)
            },
        );

        tracing::debug!(
            variables = n_persons * n_alternatives + n_alternatives,
            constraints = constraints.len(),
            "built grouping model"
        );

        GroupingModel {
            variables,
            choices,
            membership,
            constraints,
            objective,
            costs,
            min_group_size: self.min_group_size,
        }
    }
}

/// A complete binary program: variables, constraints and the minimization
/// objective, plus the effective cost coefficients the objective was built
/// from. Immutable once built; consumed exactly once by the solver boundary.
pub struct GroupingModel {
    pub(crate) variables: ProblemVariables,
    pub(crate) choices: Vec<Vec<Variable>>,
    pub(crate) membership: Vec<Variable>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
    /// Sentinel-substituted cost per choice variable, row-major.
    pub(crate) costs: Vec<f64>,
    pub(crate) min_group_size: usize,
}

impl GroupingModel {
    pub fn n_variables(&self) -> usize {
        self.choices.iter().map(Vec::len).sum::<usize>() + self.membership.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }
}
