use std::fmt;

use serde::Serialize;

use crate::error::Error;
use crate::solver::Assignment;
use crate::table::CostTable;

/// Membership of one non-empty alternative, persons in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    pub alternative: String,
    pub members: Vec<String>,
}

/// Outcome of one grouping run: rosters plus the normalized score.
///
/// The score compares the achieved objective against the theoretical best
/// (every person at cost 1) and the observed worst (every person at their
/// highest stated cost). It is nominally 0-100 but deliberately not clamped:
/// a table with stated costs below 1 can score above 100, and that is
/// reported as computed rather than hidden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub score: i64,
    pub achieved: f64,
    pub perfect: f64,
    pub worst: f64,
    pub min_group_size: usize,
    pub rosters: Vec<Roster>,
}

impl Report {
    /// Reads rosters out of the 0/1 assignment and scores the outcome.
    ///
    /// Pure: the same assignment and table always produce the same report.
    pub fn interpret(
        assignment: &Assignment,
        table: &CostTable,
        min_group_size: usize,
    ) -> Result<Report, Error> {
        let rosters = (0..table.n_alternatives())
            .filter_map(|alternative| {
                let members: Vec<String> = table
                    .persons()
                    .iter()
                    .enumerate()
                    .filter(|&(person, _)| assignment.is_assigned(person, alternative))
                    .map(|(_, name)| name.clone())
                    .collect();
                (!members.is_empty()).then(|| Roster {
                    alternative: table.alternatives()[alternative].clone(),
                    members,
                })
            })
            .collect();

        let achieved = assignment.objective_value();
        let perfect = table.n_persons() as f64;
        // A person who rated nothing can only ever cost the penalty, so that
        // is their worst case too.
        let worst: f64 = (0..table.n_persons())
            .map(|person| {
                table
                    .worst_stated_cost(person)
                    .unwrap_or(table.penalty_cost())
            })
            .sum();

        if worst == perfect {
            return Err(Error::DegenerateScore { value: perfect });
        }
        let score = 100 - (100.0 * (achieved - perfect) / (worst - perfect)).round() as i64;

        Ok(Report {
            score,
            achieved,
            perfect,
            worst,
            min_group_size,
            rosters,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization score (0-100): {}", self.score)?;
        writeln!(f, "Achieved: {}", self.achieved)?;
        writeln!(f, "Perfect: {}", self.perfect)?;
        write!(f, "Worst: {}", self.worst)?;
        for roster in &self.rosters {
            write!(f, "\n\n{}:", roster.alternative)?;
            for member in &roster.members {
                write!(f, "\n  {member}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(alternatives: &[&str], rows: &[(&str, &[Option<f64>])]) -> CostTable {
        CostTable::new(
            alternatives.iter().map(|a| a.to_string()).collect(),
            rows.iter()
                .map(|(name, costs)| (name.to_string(), costs.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn extracts_rosters_in_input_order_and_omits_empty_groups() {
        let table = table(
            &["hiking", "chess", "darts"],
            &[
                ("ann", &[Some(1.0), Some(2.0), Some(3.0)]),
                ("bob", &[Some(2.0), Some(1.0), Some(3.0)]),
                ("cyd", &[Some(1.0), Some(2.0), Some(3.0)]),
            ],
        );
        let assignment = Assignment::new(
            vec![
                vec![true, false, false],
                vec![false, true, false],
                vec![true, false, false],
            ],
            3.0,
        );

        let report = Report::interpret(&assignment, &table, 1).unwrap();
        assert_eq!(report.rosters.len(), 2);
        assert_eq!(report.rosters[0].alternative, "hiking");
        assert_eq!(report.rosters[0].members, ["ann", "cyd"]);
        assert_eq!(report.rosters[1].alternative, "chess");
        assert_eq!(report.rosters[1].members, ["bob"]);
    }

    #[test]
    fn scores_a_perfect_assignment_at_100() {
        let table = table(
            &["hiking", "chess"],
            &[
                ("ann", &[Some(1.0), Some(2.0)]),
                ("bob", &[Some(2.0), Some(1.0)]),
            ],
        );
        let assignment =
            Assignment::new(vec![vec![true, false], vec![false, true]], 2.0);

        let report = Report::interpret(&assignment, &table, 1).unwrap();
        assert_eq!(report.score, 100);
        assert_eq!(report.achieved, 2.0);
        assert_eq!(report.perfect, 2.0);
        assert_eq!(report.worst, 4.0);
    }

    #[test]
    fn interpretation_is_reproducible() {
        let table = table(
            &["hiking", "chess"],
            &[
                ("ann", &[Some(1.0), Some(3.0)]),
                ("bob", &[Some(2.0), Some(1.0)]),
            ],
        );
        let assignment =
            Assignment::new(vec![vec![true, false], vec![false, true]], 2.0);

        let first = Report::interpret(&assignment, &table, 1).unwrap();
        let second = Report::interpret(&assignment, &table, 1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn uniform_unit_costs_cannot_be_scored() {
        let table = table(&["hiking"], &[("ann", &[Some(1.0)]), ("bob", &[Some(1.0)])]);
        let assignment = Assignment::new(vec![vec![true], vec![true]], 2.0);

        let result = Report::interpret(&assignment, &table, 1);
        assert!(matches!(result, Err(Error::DegenerateScore { value }) if value == 2.0));
    }

    #[test]
    fn score_exceeds_100_for_sub_unit_costs() {
        // Stated costs below 1 push the achieved value under the nominal
        // perfect bound; the score is reported unclamped.
        let table = table(&["hiking", "chess"], &[("ann", &[Some(0.5), Some(3.0)])]);
        let assignment = Assignment::new(vec![vec![true, false]], 0.5);

        let report = Report::interpret(&assignment, &table, 1).unwrap();
        assert_eq!(report.score, 125);
    }

    #[test]
    fn unrated_person_counts_the_penalty_as_their_worst_case() {
        let table = table(
            &["hiking", "chess"],
            &[("ann", &[None, None]), ("bob", &[Some(1.0), Some(2.0)])],
        );
        let assignment = Assignment::new(
            vec![vec![true, false], vec![true, false]],
            table.penalty_cost() + 1.0,
        );

        let report = Report::interpret(&assignment, &table, 1).unwrap();
        assert_eq!(report.worst, table.penalty_cost() + 2.0);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn renders_the_text_report() {
        let table = table(
            &["Writing", "Climbing"],
            &[
                ("alice", &[Some(1.0), Some(2.0)]),
                ("bob", &[Some(2.0), Some(1.0)]),
            ],
        );
        let assignment =
            Assignment::new(vec![vec![true, false], vec![false, true]], 2.0);
        let report = Report::interpret(&assignment, &table, 1).unwrap();

        let expected = "Optimization score (0-100): 100\n\
                        Achieved: 2\n\
                        Perfect: 2\n\
                        Worst: 4\n\
                        \n\
                        Writing:\n  alice\n\
                        \n\
                        Climbing:\n  bob";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn serializes_to_structured_json() {
        let table = table(&["hiking", "chess"], &[("ann", &[Some(1.0), Some(3.0)])]);
        let assignment = Assignment::new(vec![vec![true, false]], 1.0);
        let report = Report::interpret(&assignment, &table, 1).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["score"], 100);
        assert_eq!(json["rosters"][0]["alternative"], "hiking");
        assert_eq!(json["rosters"][0]["members"][0], "ann");
    }
}
