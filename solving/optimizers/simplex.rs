use crate::model::{ConstraintSense, LinearProgram, LpSolver, ModelSense, Solution, Status};
use crate::tableau::{Budget, Outcome, Tableau, Tolerances};

use log::debug;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SimplexConfig {
    /// Optimality and primal feasibility tolerance.
    pub tolerance: f64,
    /// Largest sum of artificial variables still accepted as feasible.
    pub feasibility_tolerance: f64,
    /// Smallest pivot accepted, relative to the largest entry it competes with.
    pub pivot_tolerance: f64,
    /// Relative amount by which inequality rows are relaxed while pivoting.
    pub perturbation: f64,
    pub time_limit: Option<Duration>,
    pub max_iterations: usize,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        SimplexConfig {
            tolerance: 1e-9,
            feasibility_tolerance: 1e-7,
            pivot_tolerance: 1e-7,
            perturbation: 1e-6,
            time_limit: None,
            max_iterations: 1_000_000,
        }
    }
}

/// Two-phase primal simplex on a dense tableau.
///
/// The first phase minimizes the sum of artificial variables to find a feasible basis,
/// the second optimizes the actual objective from there. Both run on a slightly relaxed
/// program. Once the relaxation is removed, a few dual simplex pivots repair the basic
/// solution if needed. Pricing is deterministic, so solving the same program twice
/// pivots through the same bases.
#[derive(Debug, Clone, Default)]
pub struct DenseSimplex {
    config: SimplexConfig,
}

/// How a variable of the original program is expressed in non-negative columns.
#[derive(Debug, Copy, Clone)]
enum ColumnMap {
    /// x = offset + col
    Shifted { col: usize, offset: f64 },
    /// x = offset - col
    Mirrored { col: usize, offset: f64 },
    /// x = positive - negative
    Split { positive: usize, negative: usize },
}

/// `LinearProgram` rewritten over non-negative structural columns, as a minimization.
/// Finite upper bounds become extra `<=` rows.
#[derive(Debug)]
struct StandardForm {
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    senses: Vec<ConstraintSense>,
    costs: Vec<f64>,
    columns: Vec<ColumnMap>,
}

impl StandardForm {
    fn new(lp: &LinearProgram) -> StandardForm {
        let sign = match lp.sense() {
            ModelSense::Minimize => 1.0,
            ModelSense::Maximize => -1.0,
        };

        let mut columns = Vec::<ColumnMap>::with_capacity(lp.num_vars());
        let mut costs = Vec::<f64>::new();
        let mut upper_bounds = Vec::<(usize, f64)>::new();
        for var in lp.variables() {
            let cost = sign * var.objective;
            if var.lower.is_finite() {
                let col = costs.len();
                costs.push(cost);
                columns.push(ColumnMap::Shifted {
                    col,
                    offset: var.lower,
                });
                if var.upper.is_finite() {
                    upper_bounds.push((col, var.upper - var.lower));
                }
            } else if var.upper.is_finite() {
                let col = costs.len();
                costs.push(-cost);
                columns.push(ColumnMap::Mirrored {
                    col,
                    offset: var.upper,
                });
            } else {
                let positive = costs.len();
                costs.push(cost);
                costs.push(-cost);
                columns.push(ColumnMap::Split {
                    positive,
                    negative: positive + 1,
                });
            }
        }

        let num_structural = costs.len();
        let mut rows = Vec::<Vec<f64>>::new();
        let mut rhs = Vec::<f64>::new();
        let mut senses = Vec::<ConstraintSense>::new();

        for constr in lp.constraints() {
            let mut row = vec![0f64; num_structural];
            let mut row_rhs = constr.rhs;
            for (&var, &coeff) in constr.col_indices.iter().zip(constr.col_coeffs.iter()) {
                match columns[var] {
                    ColumnMap::Shifted { col, offset } => {
                        row[col] += coeff;
                        row_rhs -= coeff * offset;
                    }
                    ColumnMap::Mirrored { col, offset } => {
                        row[col] -= coeff;
                        row_rhs -= coeff * offset;
                    }
                    ColumnMap::Split { positive, negative } => {
                        row[positive] += coeff;
                        row[negative] -= coeff;
                    }
                }
            }
            rows.push(row);
            rhs.push(row_rhs);
            senses.push(constr.sense);
        }

        for (col, bound) in upper_bounds {
            let mut row = vec![0f64; num_structural];
            row[col] = 1.0;
            rows.push(row);
            rhs.push(bound);
            senses.push(ConstraintSense::LessEqual);
        }

        StandardForm {
            rows,
            rhs,
            senses,
            costs,
            columns,
        }
    }

    fn num_structural(&self) -> usize {
        self.costs.len()
    }

    /// Maps values of the structural columns back to the original variables.
    fn recover(&self, values: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| match *column {
                ColumnMap::Shifted { col, offset } => offset + values[col],
                ColumnMap::Mirrored { col, offset } => offset - values[col],
                ColumnMap::Split { positive, negative } => values[positive] - values[negative],
            })
            .collect()
    }
}

impl DenseSimplex {
    pub fn new(config: SimplexConfig) -> DenseSimplex {
        DenseSimplex { config }
    }

    pub fn config(&self) -> &SimplexConfig {
        &self.config
    }

    fn tolerances(&self) -> Tolerances {
        Tolerances {
            optimality: self.config.tolerance,
            pivot: self.config.pivot_tolerance,
            feasibility: self.config.tolerance,
        }
    }

    /// Adds slack, surplus and artificial columns so that every row is an equality
    /// with a non-negative right-hand side and a unit column to start the basis from.
    /// Rows are negated where that lets a slack start the basis instead of an artificial.
    /// Returns the tableau, the index of the first artificial column and the rows whose
    /// slack is basic.
    fn initial_tableau(&self, standard_form: &StandardForm) -> (Tableau, usize, Vec<usize>) {
        let num_structural = standard_form.num_structural();
        let num_rows = standard_form.rows.len();

        // Slack coefficient of each row after making its right-hand side non-negative.
        let mut slacks = Vec::<Option<(usize, f64)>>::with_capacity(num_rows);
        let mut negate = Vec::<bool>::with_capacity(num_rows);
        let mut num_slacks = 0;
        for (sense, &rhs) in standard_form.senses.iter().zip(standard_form.rhs.iter()) {
            let flip = rhs < 0.0 || (rhs == 0.0 && *sense == ConstraintSense::GreaterEqual);
            let sign = if flip { -1.0 } else { 1.0 };
            let slack = match sense {
                ConstraintSense::LessEqual => Some((num_structural + num_slacks, sign)),
                ConstraintSense::GreaterEqual => Some((num_structural + num_slacks, -sign)),
                ConstraintSense::Equal => None,
            };
            if slack.is_some() {
                num_slacks += 1;
            }
            slacks.push(slack);
            negate.push(flip);
        }

        let first_artificial = num_structural + num_slacks;
        let num_artificials = slacks
            .iter()
            .filter(|slack| !matches!(slack, Some((_, coeff)) if *coeff > 0.0))
            .count();
        let num_cols = first_artificial + num_artificials;

        let mut rows = Vec::<Vec<f64>>::with_capacity(num_rows);
        let mut basis = Vec::<usize>::with_capacity(num_rows);
        let mut next_artificial = first_artificial;
        let mut slack_rows = Vec::<usize>::new();
        for row_id in 0..num_rows {
            let sign = if negate[row_id] { -1.0 } else { 1.0 };
            let mut row = vec![0f64; num_cols + 1];
            for (entry, &coeff) in row.iter_mut().zip(standard_form.rows[row_id].iter()) {
                *entry = sign * coeff;
            }
            row[num_cols] = sign * standard_form.rhs[row_id];

            match slacks[row_id] {
                Some((col, coeff)) if coeff > 0.0 => {
                    row[col] = coeff;
                    basis.push(col);
                    slack_rows.push(row_id);
                }
                slack => {
                    if let Some((col, coeff)) = slack {
                        row[col] = coeff;
                    }
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            rows.push(row);
        }

        (
            Tableau::new(rows, basis, num_cols, self.tolerances()),
            first_artificial,
            slack_rows,
        )
    }

    /// Pivots basic artificial columns out of the basis after phase one. Rows where
    /// this is impossible are linearly dependent on the others. Their artificial stays
    /// basic at zero, and nothing can ever pivot on them.
    fn drive_out_artificials(&self, tableau: &mut Tableau, first_artificial: usize) {
        let mut row = 0;
        while row < tableau.num_rows() {
            if tableau.basis()[row] < first_artificial {
                row += 1;
                continue;
            }
            let replacement = (0..first_artificial)
                .filter(|&col| tableau.entry(row, col).abs() > self.config.tolerance)
                .fold(None, |best: Option<usize>, col| match best {
                    Some(best_col)
                        if tableau.entry(row, best_col).abs() >= tableau.entry(row, col).abs() =>
                    {
                        Some(best_col)
                    }
                    _ => Some(col),
                });
            match replacement {
                Some(col) => tableau.pivot(row, col),
                None => debug!("Row {} is redundant", row),
            }
            row += 1;
        }
    }
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Status {
        match outcome {
            Outcome::Optimal => Status::Optimal,
            Outcome::Infeasible => Status::Infeasible,
            Outcome::Unbounded => Status::Unbounded,
            Outcome::TimeLimit => Status::TimeLimit,
            Outcome::IterationLimit => Status::IterationLimit,
        }
    }
}

impl LpSolver for DenseSimplex {
    fn optimize(&self, lp: &LinearProgram) -> Solution {
        let standard_form = StandardForm::new(lp);
        let (mut tableau, first_artificial, slack_rows) = self.initial_tableau(&standard_form);
        let num_cols = tableau.values().len();
        let mut budget = Budget::new(self.config.time_limit, self.config.max_iterations);
        tableau.perturb(self.config.perturbation, &slack_rows);

        debug!(
            "Simplex on {} rows, {} structural columns, {} artificial columns",
            tableau.num_rows(),
            standard_form.num_structural(),
            num_cols - first_artificial
        );

        if first_artificial < num_cols {
            let phase_one_costs = (0..num_cols)
                .map(|col| if col >= first_artificial { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>();
            tableau.set_costs(&phase_one_costs);
            match tableau.optimize(&mut budget) {
                Outcome::Optimal => {}
                // Phase one is bounded below by zero, so this is numerical trouble.
                Outcome::Unbounded => {
                    return Solution::without_assignment(
                        Status::Infeasible,
                        lp.num_vars(),
                        budget.iterations,
                    )
                }
                outcome => {
                    return Solution::without_assignment(
                        outcome.into(),
                        lp.num_vars(),
                        budget.iterations,
                    )
                }
            }

            let infeasibility = tableau.objective_value();
            debug!("Phase one finished with infeasibility {:e}", infeasibility);
            if infeasibility > self.config.feasibility_tolerance {
                return Solution::without_assignment(
                    Status::Infeasible,
                    lp.num_vars(),
                    budget.iterations,
                );
            }

            self.drive_out_artificials(&mut tableau, first_artificial);
            for col in first_artificial..num_cols {
                tableau.block_column(col);
            }
        }

        let mut phase_two_costs = standard_form.costs.clone();
        phase_two_costs.resize(num_cols, 0.0);
        tableau.set_costs(&phase_two_costs);
        let mut outcome = tableau.optimize(&mut budget);
        debug!(
            "Phase two finished with {:?} after {} iterations",
            outcome, budget.iterations
        );
        if outcome == Outcome::Optimal {
            tableau.remove_perturbation();
            outcome = match tableau.restore_feasibility(&mut budget) {
                Outcome::Optimal => tableau.optimize(&mut budget),
                outcome => outcome,
            };
            debug!(
                "Cleanup finished with {:?} after {} iterations",
                outcome, budget.iterations
            );
        }

        match outcome {
            Outcome::Optimal => {
                let x = standard_form.recover(&tableau.values());
                Solution {
                    status: Status::Optimal,
                    objective_value: lp.evaluate_objective(&x),
                    x,
                    iterations: budget.iterations,
                }
            }
            outcome => {
                Solution::without_assignment(outcome.into(), lp.num_vars(), budget.iterations)
            }
        }
    }
}
