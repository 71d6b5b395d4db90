//! Linear programming for the equilibrium solvers.
//!
//! `model` holds a solver-agnostic description of a linear program, built up variable
//! by variable and constraint by constraint. `simplex` solves such programs with a dense
//! two-phase simplex method. Other back-ends plug in through `LpSolver`.

pub mod model;
pub mod simplex;

mod tableau;

pub use model::{
    Constraint, ConstraintSense, LinearProgram, LpSolver, ModelSense, Solution, Status, VarId,
    Variable, INFINITY,
};
pub use simplex::{DenseSimplex, SimplexConfig};
