use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// Number of consecutive degenerate pivots after which pricing falls back from
/// Dantzig's rule to Bland's rule, which cannot cycle.
const DEGENERATE_STREAK_LIMIT: usize = 50;

/// Ratios closer than this are considered tied in the ratio test.
const RATIO_TIE: f64 = 1e-12;

/// Fewest pivots between two refactorizations of the tableau.
const REFACTOR_INTERVAL: usize = 100;

/// Pivots below this make a basis matrix singular during refactorization.
const SINGULAR_PIVOT: f64 = 1e-12;

/// Spreads the perturbations of consecutive rows apart.
const GOLDEN_FRACTION: f64 = 0.618_033_988_749_895;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Optimal,
    Infeasible,
    Unbounded,
    TimeLimit,
    IterationLimit,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Tolerances {
    /// Reduced costs above `-optimality` are optimal. Also the slack of Harris' ratio test.
    pub optimality: f64,
    /// Smallest pivot accepted, relative to the largest candidate of its column or row.
    pub pivot: f64,
    /// Basic values above `-feasibility` are feasible.
    pub feasibility: f64,
}

/// Work budget shared by both phases of one solve.
#[derive(Debug)]
pub(crate) struct Budget {
    start: Instant,
    time_limit: Option<Duration>,
    max_iterations: usize,
    pub iterations: usize,
}

impl Budget {
    pub fn new(time_limit: Option<Duration>, max_iterations: usize) -> Budget {
        Budget {
            start: Instant::now(),
            time_limit,
            max_iterations,
            iterations: 0,
        }
    }

    fn exhausted(&self) -> Option<Outcome> {
        if self.iterations >= self.max_iterations {
            return Some(Outcome::IterationLimit);
        }
        match self.time_limit {
            Some(limit) if self.start.elapsed() > limit => Some(Outcome::TimeLimit),
            _ => None,
        }
    }
}

/// Dense simplex tableau for `min c'x, Ax = b, x >= 0` with `b >= 0`.
///
/// Each row stores its coefficients followed by its right-hand side. The reduced cost
/// row is laid out the same way, with the negated objective value in the last slot.
/// The basis must start out as a set of unit columns.
///
/// The rows as given at construction are kept. Every few pivots the tableau is rebuilt
/// from them by inverting the basis matrix, so rounding error does not pile up over
/// long runs of pivots.
#[derive(Debug, Clone)]
pub(crate) struct Tableau {
    rows: Vec<Vec<f64>>,
    reduced_costs: Vec<f64>,
    basis: Vec<usize>,
    blocked: Vec<bool>,
    num_cols: usize,
    costs: Vec<f64>,
    tolerances: Tolerances,

    // Rows before any pivot. Their right-hand sides include the perturbation, if any.
    original: Vec<Vec<f64>>,
    unperturbed_rhs: Vec<f64>,
    initial_basis: Vec<usize>,
    num_pivots: usize,
    pivots_since_refactor: usize,
}

impl Tableau {
    pub fn new(
        rows: Vec<Vec<f64>>,
        basis: Vec<usize>,
        num_cols: usize,
        tolerances: Tolerances,
    ) -> Tableau {
        assert_eq!(rows.len(), basis.len());
        assert!(rows.iter().all(|row| row.len() == num_cols + 1));
        assert!(rows.iter().all(|row| row[num_cols] >= 0.0));
        assert!(basis.iter().all(|&col| col < num_cols));
        Tableau {
            reduced_costs: vec![0f64; num_cols + 1],
            blocked: vec![false; num_cols],
            costs: vec![0f64; num_cols],
            tolerances,
            original: rows.clone(),
            unperturbed_rhs: rows.iter().map(|row| row[num_cols]).collect(),
            initial_basis: basis.clone(),
            num_pivots: 0,
            pivots_since_refactor: 0,
            rows,
            basis,
            num_cols,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    /// Prices out the current basis for the cost vector `costs`.
    pub fn set_costs(&mut self, costs: &[f64]) {
        assert_eq!(costs.len(), self.num_cols);
        self.costs = costs.to_vec();
        self.reprice();
    }

    fn reprice(&mut self) {
        let mut reduced_costs = self.costs.clone();
        reduced_costs.push(0.0);
        for (row, &basic_col) in self.rows.iter().zip(self.basis.iter()) {
            let cost = self.costs[basic_col];
            if cost != 0.0 {
                for (reduced_cost, entry) in reduced_costs.iter_mut().zip(row.iter()) {
                    *reduced_cost -= cost * entry;
                }
            }
        }
        for &basic_col in self.basis.iter() {
            reduced_costs[basic_col] = 0.0;
        }
        self.reduced_costs = reduced_costs;
    }

    pub fn objective_value(&self) -> f64 {
        -self.reduced_costs[self.num_cols]
    }

    /// Prevents `col` from ever entering the basis again.
    pub fn block_column(&mut self, col: usize) {
        self.blocked[col] = true;
    }

    /// Value of every column at the current basic solution.
    pub fn values(&self) -> Vec<f64> {
        let mut values = vec![0f64; self.num_cols];
        for (row, &basic_col) in self.rows.iter().zip(self.basis.iter()) {
            values[basic_col] = row[self.num_cols];
        }
        values
    }

    /// Raises the right-hand side of each of `rows` by a small amount, distinct from row
    /// to row. Ratio tests then rarely tie, which keeps the simplex out of long runs of
    /// degenerate pivots. Only rows whose slack starts in the basis may be relaxed this
    /// way, so that the starting basis stays feasible.
    pub fn perturb(&mut self, magnitude: f64, rows: &[usize]) {
        assert_eq!(self.num_pivots, 0, "perturbing a tableau after pivoting");
        let rhs_col = self.num_cols;
        for &row in rows {
            let spread = 1.0 + (row as f64 * GOLDEN_FRACTION).fract();
            let shift = magnitude * spread * (1.0 + self.original[row][rhs_col].abs());
            self.original[row][rhs_col] += shift;
            self.rows[row][rhs_col] += shift;
        }
    }

    /// Restores the right-hand sides given at construction and recomputes the basic
    /// solution for them. The reduced costs are unaffected, but the basic solution may
    /// turn slightly infeasible.
    pub fn remove_perturbation(&mut self) {
        let rhs_col = self.num_cols;
        for (row, &rhs) in self.original.iter_mut().zip(self.unperturbed_rhs.iter()) {
            row[rhs_col] = rhs;
        }
        if !self.refactor() {
            self.recompute_rhs();
        }
    }

    /// Rebuilds every row from the original rows and the inverse of the current basis
    /// matrix. Leaves the tableau untouched and returns false if the basis matrix is
    /// numerically singular.
    pub fn refactor(&mut self) -> bool {
        self.pivots_since_refactor = 0;
        let inverse = match self.basis_inverse() {
            Some(inverse) => inverse,
            None => return false,
        };

        for (row, weights) in self.rows.iter_mut().zip(inverse.iter()) {
            for entry in row.iter_mut() {
                *entry = 0.0;
            }
            for (original_row, &weight) in self.original.iter().zip(weights.iter()) {
                if weight != 0.0 {
                    for (entry, &value) in row.iter_mut().zip(original_row.iter()) {
                        *entry += weight * value;
                    }
                }
            }
        }
        for (position, &basic_col) in self.basis.iter().enumerate() {
            for (other, row) in self.rows.iter_mut().enumerate() {
                row[basic_col] = if other == position { 1.0 } else { 0.0 };
            }
        }
        self.reprice();
        true
    }

    /// Gauss-Jordan elimination with partial pivoting on the columns of the original
    /// rows that are currently basic.
    fn basis_inverse(&self) -> Option<Vec<Vec<f64>>> {
        let size = self.basis.len();
        let mut matrix = self
            .original
            .iter()
            .map(|row| self.basis.iter().map(|&col| row[col]).collect())
            .collect::<Vec<Vec<f64>>>();
        let mut inverse = (0..size)
            .map(|row| {
                let mut unit = vec![0f64; size];
                unit[row] = 1.0;
                unit
            })
            .collect::<Vec<Vec<f64>>>();

        for k in 0..size {
            let pivot_row = (k..size).max_by(|&a, &b| {
                matrix[a][k]
                    .abs()
                    .partial_cmp(&matrix[b][k].abs())
                    .unwrap_or(Ordering::Equal)
            })?;
            if matrix[pivot_row][k].abs() < SINGULAR_PIVOT {
                return None;
            }
            matrix.swap(k, pivot_row);
            inverse.swap(k, pivot_row);

            let pivot = matrix[k][k];
            for entry in matrix[k].iter_mut() {
                *entry /= pivot;
            }
            for entry in inverse[k].iter_mut() {
                *entry /= pivot;
            }
            let matrix_row = matrix[k].clone();
            let inverse_row = inverse[k].clone();
            for other in 0..size {
                let factor = matrix[other][k];
                if other == k || factor == 0.0 {
                    continue;
                }
                for (entry, &value) in matrix[other].iter_mut().zip(matrix_row.iter()) {
                    *entry -= factor * value;
                }
                for (entry, &value) in inverse[other].iter_mut().zip(inverse_row.iter()) {
                    *entry -= factor * value;
                }
            }
        }
        Some(inverse)
    }

    /// Recomputes the right-hand sides only. The columns of the initial basis hold the
    /// inverse of the current basis matrix, since they started out as unit columns.
    fn recompute_rhs(&mut self) {
        let rhs_col = self.num_cols;
        let rhs = self
            .rows
            .iter()
            .map(|row| {
                self.initial_basis
                    .iter()
                    .zip(self.original.iter())
                    .map(|(&col, original_row)| row[col] * original_row[rhs_col])
                    .sum::<f64>()
            })
            .collect::<Vec<f64>>();
        for (row, value) in self.rows.iter_mut().zip(rhs) {
            row[rhs_col] = value;
        }
        self.reprice();
    }

    fn refactor_interval(&self) -> usize {
        REFACTOR_INTERVAL.max(self.rows.len())
    }

    /// Runs simplex iterations until optimality, unboundedness or the budget runs out.
    pub fn optimize(&mut self, budget: &mut Budget) -> Outcome {
        let mut degenerate_streak = 0usize;
        loop {
            if self.pivots_since_refactor >= self.refactor_interval() {
                self.refactor();
            }
            let use_bland = degenerate_streak >= DEGENERATE_STREAK_LIMIT;
            let col = match self.entering_column(use_bland) {
                Some(col) => col,
                None => return Outcome::Optimal,
            };
            if let Some(outcome) = budget.exhausted() {
                return outcome;
            }
            let row = match self.leaving_row(col, use_bland) {
                Some(row) => row,
                None => return Outcome::Unbounded,
            };

            let rhs_col = self.num_cols;
            match self.rows[row][rhs_col] <= self.tolerances.optimality {
                true => degenerate_streak += 1,
                false => degenerate_streak = 0,
            }
            // The leaving column goes exactly to its bound.
            if self.rows[row][rhs_col] < 0.0 {
                self.rows[row][rhs_col] = 0.0;
            }
            self.pivot(row, col);
            budget.iterations += 1;
        }
    }

    /// Dual simplex iterations that make the basic solution feasible again while the
    /// reduced costs stay non-negative. Returns `Infeasible` when a row with a negative
    /// basic value has no negative entry to pivot on.
    pub fn restore_feasibility(&mut self, budget: &mut Budget) -> Outcome {
        let rhs_col = self.num_cols;
        loop {
            let row = (0..self.rows.len())
                .filter(|&row| self.rows[row][rhs_col] < -self.tolerances.feasibility)
                .min_by(|&a, &b| {
                    self.rows[a][rhs_col]
                        .partial_cmp(&self.rows[b][rhs_col])
                        .unwrap_or(Ordering::Equal)
                });
            let row = match row {
                Some(row) => row,
                None => return Outcome::Optimal,
            };
            if let Some(outcome) = budget.exhausted() {
                return outcome;
            }
            let col = match self.dual_entering_column(row) {
                Some(col) => col,
                None => return Outcome::Infeasible,
            };
            self.pivot(row, col);
            budget.iterations += 1;
        }
    }

    /// Dantzig's rule (most negative reduced cost) or Bland's rule (first negative
    /// reduced cost). Ties go to the smallest column either way.
    fn entering_column(&self, use_bland: bool) -> Option<usize> {
        let mut candidates = (0..self.num_cols).filter(|&col| {
            !self.blocked[col] && self.reduced_costs[col] < -self.tolerances.optimality
        });
        match use_bland {
            true => candidates.next(),
            false => candidates.fold(None, |best: Option<usize>, col| match best {
                Some(best_col) if self.reduced_costs[best_col] <= self.reduced_costs[col] => {
                    Some(best_col)
                }
                _ => Some(col),
            }),
        }
    }

    /// Smallest pivot accepted among entries whose largest magnitude is `largest`.
    fn pivot_threshold(&self, largest: f64) -> f64 {
        (self.tolerances.pivot * largest).max(self.tolerances.optimality)
    }

    /// Ratio test over the rows with a large enough entry in `col`.
    ///
    /// Harris' two passes first bound the step by the smallest ratio with every basic
    /// value allowed to drop `optimality` below zero, then take the largest pivot among
    /// the rows within that bound. Under Bland's rule the minimum ratio row with the
    /// smallest basic column leaves instead. Both break remaining ties on the smallest
    /// basic column.
    fn leaving_row(&self, col: usize, use_bland: bool) -> Option<usize> {
        let rhs_col = self.num_cols;
        let largest = self.rows.iter().map(|row| row[col]).fold(0f64, f64::max);
        if largest <= self.tolerances.optimality {
            return None;
        }
        let threshold = self.pivot_threshold(largest);
        let candidates = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[col] > threshold)
            .map(|(index, row)| (index, row[rhs_col].max(0.0), row[col]))
            .collect::<Vec<(usize, f64, f64)>>();

        if use_bland {
            return candidates
                .iter()
                .fold(None, |best: Option<(f64, usize)>, &(row, rhs, coeff)| {
                    let ratio = rhs / coeff;
                    match best {
                        Some((best_ratio, best_row))
                            if ratio > best_ratio + RATIO_TIE
                                || ((ratio - best_ratio).abs() <= RATIO_TIE
                                    && self.basis[best_row] < self.basis[row]) =>
                        {
                            Some((best_ratio, best_row))
                        }
                        _ => Some((ratio, row)),
                    }
                })
                .map(|(_, row)| row);
        }

        let bound = candidates
            .iter()
            .map(|&(_, rhs, coeff)| (rhs + self.tolerances.optimality) / coeff)
            .fold(std::f64::INFINITY, f64::min);
        candidates
            .iter()
            .filter(|&&(_, rhs, coeff)| rhs / coeff <= bound)
            .fold(None, |best: Option<(usize, f64)>, &(row, _, coeff)| match best {
                Some((best_row, best_coeff))
                    if best_coeff > coeff
                        || (best_coeff == coeff && self.basis[best_row] < self.basis[row]) =>
                {
                    Some((best_row, best_coeff))
                }
                _ => Some((row, coeff)),
            })
            .map(|(row, _)| row)
    }

    /// Dual ratio test on `row`: the column with a negative entry whose reduced cost
    /// reaches zero first. Ties go to the smallest column.
    fn dual_entering_column(&self, row: usize) -> Option<usize> {
        let entries = &self.rows[row];
        let blocked = &self.blocked;
        let num_cols = self.num_cols;
        let free_cols = || (0..num_cols).filter(move |&col| !blocked[col]);
        let largest = free_cols().map(|col| -entries[col]).fold(0f64, f64::max);
        if largest <= self.tolerances.optimality {
            return None;
        }
        let threshold = self.pivot_threshold(largest);
        free_cols()
            .filter(|&col| -entries[col] > threshold)
            .map(|col| (col, self.reduced_costs[col].max(0.0) / -entries[col]))
            .fold(None, |best: Option<(usize, f64)>, (col, ratio)| match best {
                Some((best_col, best_ratio)) if best_ratio <= ratio => {
                    Some((best_col, best_ratio))
                }
                _ => Some((col, ratio)),
            })
            .map(|(col, _)| col)
    }

    pub fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.rows[row][col];
        assert!(
            pivot.abs() > self.tolerances.optimality,
            "pivot {} too small",
            pivot
        );

        for entry in self.rows[row].iter_mut() {
            *entry /= pivot;
        }
        self.rows[row][col] = 1.0;
        let pivot_row = self.rows[row].clone();

        for (other, entries) in self.rows.iter_mut().enumerate() {
            if other == row {
                continue;
            }
            eliminate(entries, &pivot_row, col);
        }
        eliminate(&mut self.reduced_costs, &pivot_row, col);

        self.basis[row] = col;
        self.num_pivots += 1;
        self.pivots_since_refactor += 1;
    }
}

/// Subtracts the multiple of `pivot_row` that zeroes out `entries[col]`.
fn eliminate(entries: &mut [f64], pivot_row: &[f64], col: usize) {
    let factor = entries[col];
    if factor == 0.0 {
        return;
    }
    for (entry, pivot_entry) in entries.iter_mut().zip(pivot_row.iter()) {
        *entry -= factor * pivot_entry;
    }
    entries[col] = 0.0;
}
