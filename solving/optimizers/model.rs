use std::ops::Range;

/// Bound value meaning "no bound", e.g., a free variable has bounds
/// `(-INFINITY, INFINITY)`.
pub const INFINITY: f64 = std::f64::INFINITY;

pub type VarId = usize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModelSense {
    Minimize,
    Maximize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
}

/// A sparse linear constraint `sum_k col_coeffs[k] * x[col_indices[k]] (sense) rhs`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub col_indices: Vec<VarId>,
    pub col_coeffs: Vec<f64>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

/// A linear program over continuous variables. Variables are numbered in the order in
/// which they are added.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    sense: ModelSense,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
    TimeLimit,
    IterationLimit,
}

/// Outcome of an optimization. `x` and `objective_value` are only meaningful when
/// `status` is `Status::Optimal`.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: Status,
    pub x: Vec<f64>,
    pub objective_value: f64,
    pub iterations: usize,
}

impl Solution {
    pub fn without_assignment(status: Status, num_vars: usize, iterations: usize) -> Solution {
        assert!(status != Status::Optimal);
        Solution {
            status,
            x: vec![std::f64::NAN; num_vars],
            objective_value: std::f64::NAN,
            iterations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }
}

/// Anything able to optimize a `LinearProgram`.
pub trait LpSolver {
    fn optimize(&self, lp: &LinearProgram) -> Solution;
}

impl Default for LinearProgram {
    fn default() -> Self {
        LinearProgram::new()
    }
}

impl LinearProgram {
    /// An empty minimization problem.
    pub fn new() -> LinearProgram {
        LinearProgram {
            variables: Vec::new(),
            constraints: Vec::new(),
            sense: ModelSense::Minimize,
        }
    }

    pub fn add_var(&mut self, lower: f64, upper: f64, objective: f64, name: &str) -> VarId {
        assert!(!lower.is_nan() && !upper.is_nan() && objective.is_finite());
        assert!(lower <= upper, "variable {} has empty domain", name);
        assert!(lower < INFINITY && upper > -INFINITY);
        self.variables.push(Variable {
            name: name.to_string(),
            lower,
            upper,
            objective,
        });
        self.variables.len() - 1
    }

    /// Adds `count` variables sharing bounds and objective, named `prefix_0`,
    /// `prefix_1`, ... Returns the contiguous range of their indices.
    pub fn add_vars(
        &mut self,
        count: usize,
        lower: f64,
        upper: f64,
        objective: f64,
        prefix: &str,
    ) -> Range<VarId> {
        let start = self.variables.len();
        for index in 0..count {
            self.add_var(lower, upper, objective, &format!("{}_{}", prefix, index));
        }
        start..self.variables.len()
    }

    pub fn add_constr(
        &mut self,
        col_indices: Vec<VarId>,
        col_coeffs: Vec<f64>,
        sense: ConstraintSense,
        rhs: f64,
        name: &str,
    ) {
        assert_eq!(col_indices.len(), col_coeffs.len());
        assert!(col_indices.iter().all(|&var| var < self.variables.len()));
        assert!(col_coeffs.iter().all(|x| x.is_finite()) && rhs.is_finite());
        self.constraints.push(Constraint {
            name: name.to_string(),
            col_indices,
            col_coeffs,
            sense,
            rhs,
        });
    }

    pub fn set_model_sense(&mut self, sense: ModelSense) {
        self.sense = sense;
    }

    pub fn sense(&self) -> ModelSense {
        self.sense
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constrs(&self) -> usize {
        self.constraints.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn evaluate_objective(&self, x: &[f64]) -> f64 {
        assert_eq!(x.len(), self.num_vars());
        self.variables
            .iter()
            .zip(x.iter())
            .map(|(var, value)| var.objective * value)
            .sum()
    }

    /// Largest violation of any bound or constraint by the assignment `x`.
    /// Zero means `x` is feasible.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        assert_eq!(x.len(), self.num_vars());
        let bound_violation = self
            .variables
            .iter()
            .zip(x.iter())
            .map(|(var, &value)| (var.lower - value).max(value - var.upper).max(0.0))
            .fold(0f64, f64::max);

        let constraint_violation = self
            .constraints
            .iter()
            .map(|constr| {
                let lhs = constr
                    .col_indices
                    .iter()
                    .zip(constr.col_coeffs.iter())
                    .map(|(&var, coeff)| coeff * x[var])
                    .sum::<f64>();
                match constr.sense {
                    ConstraintSense::LessEqual => (lhs - constr.rhs).max(0.0),
                    ConstraintSense::GreaterEqual => (constr.rhs - lhs).max(0.0),
                    ConstraintSense::Equal => (lhs - constr.rhs).abs(),
                }
            })
            .fold(0f64, f64::max);

        bound_violation.max(constraint_violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn build_and_evaluate() {
        let mut lp = LinearProgram::new();
        let v = lp.add_var(-INFINITY, INFINITY, 1.0, "v");
        let xs = lp.add_vars(2, 0.0, INFINITY, 0.0, "x");
        assert_eq!(v, 0);
        assert_eq!(xs, 1..3);
        assert_eq!(lp.variables()[2].name, "x_1");

        lp.add_constr(vec![1, 2], vec![1.0, 1.0], ConstraintSense::Equal, 1.0, "simplex");
        lp.add_constr(vec![1, 0], vec![2.0, -1.0], ConstraintSense::GreaterEqual, 0.0, "bound");
        lp.set_model_sense(ModelSense::Maximize);
        assert_eq!(lp.num_constrs(), 2);
        assert_eq!(lp.sense(), ModelSense::Maximize);

        assert_approx_eq!(lp.evaluate_objective(&[0.5, 0.25, 0.75]), 0.5);
        assert_approx_eq!(lp.max_violation(&[0.5, 0.25, 0.75]), 0.0);
        assert_approx_eq!(lp.max_violation(&[1.0, 0.25, 0.75]), 0.5);
        assert_approx_eq!(lp.max_violation(&[-2.0, -0.5, 1.5]), 0.5);
    }

    #[test]
    #[should_panic]
    fn mismatched_coefficients() {
        let mut lp = LinearProgram::new();
        lp.add_var(0.0, 1.0, 0.0, "x");
        lp.add_constr(vec![0], vec![1.0, 2.0], ConstraintSense::Equal, 1.0, "bad");
    }

    #[test]
    #[should_panic]
    fn unknown_variable() {
        let mut lp = LinearProgram::new();
        lp.add_constr(vec![0], vec![1.0], ConstraintSense::Equal, 1.0, "bad");
    }
}
