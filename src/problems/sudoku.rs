// 9x9 sudoku as a binary feasibility model.
//
// x(i, j, k) = 1 iff cell (i, j) holds digit k + 1. Every (row, digit),
// (column, digit), (box, digit) and every cell sums to exactly one; givens
// are fixed through the variable bounds.

use super::{parse_payload, run_linear};
use crate::domain::{
    Constraint, ConstraintType, LinearSolver, ObjectiveFunction, OptimizationProblem, Payload,
    ProblemSolver, SolutionStatus, SolveContext, SolveError, Variable,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const PROBLEM: &str = "sudoku";
const SIZE: usize = 9;
const BOX: usize = 3;
const NUM_VARS: usize = SIZE * SIZE * SIZE;

pub type Grid = [[u8; SIZE]; SIZE];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SudokuInput {
    grid: Vec<Vec<i64>>,
}

fn var_index(row: usize, col: usize, digit: usize) -> usize {
    row * SIZE * SIZE + col * SIZE + digit
}

/// Check shape and range, then reject givens that already clash
fn parse_grid(rows: &[Vec<i64>]) -> Result<Grid, SolveError> {
    if rows.len() != SIZE {
        return Err(SolveError::invalid(format!(
            "grid must have {} rows, got {}",
            SIZE,
            rows.len()
        )));
    }

    let mut grid = [[0u8; SIZE]; SIZE];
    for (i, row) in rows.iter().enumerate() {
        if row.len() != SIZE {
            return Err(SolveError::invalid(format!(
                "grid row {} must have {} cells, got {}",
                i + 1,
                SIZE,
                row.len()
            )));
        }
        for (j, &cell) in row.iter().enumerate() {
            if !(0..=SIZE as i64).contains(&cell) {
                return Err(SolveError::invalid(format!(
                    "grid cell ({}, {}) must be between 0 and 9, got {}",
                    i + 1,
                    j + 1,
                    cell
                )));
            }
            grid[i][j] = cell as u8;
        }
    }

    check_givens(&grid)?;
    Ok(grid)
}

fn check_givens(grid: &Grid) -> Result<(), SolveError> {
    let conflict = |digit: u8, unit: String| {
        SolveError::invalid(format!(
            "Conflicting givens: digit {} appears twice in {}",
            digit, unit
        ))
    };

    for i in 0..SIZE {
        let mut row_seen = [false; SIZE + 1];
        let mut col_seen = [false; SIZE + 1];
        for j in 0..SIZE {
            let in_row = grid[i][j] as usize;
            if in_row != 0 && std::mem::replace(&mut row_seen[in_row], true) {
                return Err(conflict(grid[i][j], format!("row {}", i + 1)));
            }
            let in_col = grid[j][i] as usize;
            if in_col != 0 && std::mem::replace(&mut col_seen[in_col], true) {
                return Err(conflict(grid[j][i], format!("column {}", i + 1)));
            }
        }
    }

    for b in 0..SIZE {
        let (top, left) = ((b / BOX) * BOX, (b % BOX) * BOX);
        let mut seen = [false; SIZE + 1];
        for i in top..top + BOX {
            for j in left..left + BOX {
                let digit = grid[i][j] as usize;
                if digit != 0 && std::mem::replace(&mut seen[digit], true) {
                    return Err(conflict(grid[i][j], format!("box {}", b + 1)));
                }
            }
        }
    }

    Ok(())
}

fn exactly_one(name: String, cells: impl Iterator<Item = usize>) -> Constraint {
    let mut coefficients = vec![0.0; NUM_VARS];
    for index in cells {
        coefficients[index] = 1.0;
    }
    Constraint::new(ConstraintType::Equal, coefficients, 1.0).with_name(name)
}

fn to_model(grid: &Grid) -> OptimizationProblem {
    let mut variables = Vec::with_capacity(NUM_VARS);
    for i in 0..SIZE {
        for j in 0..SIZE {
            for k in 0..SIZE {
                let var = Variable::binary(format!("{}-{}-{}", i, j, k));
                let var = if grid[i][j] as usize == k + 1 {
                    var.fixed(1.0)
                } else {
                    var
                };
                variables.push(var);
            }
        }
    }

    let mut constraints = Vec::with_capacity(4 * SIZE * SIZE);
    for a in 0..SIZE {
        for k in 0..SIZE {
            constraints.push(exactly_one(
                format!("row_{}_{}", a, k),
                (0..SIZE).map(|j| var_index(a, j, k)),
            ));
            constraints.push(exactly_one(
                format!("col_{}_{}", a, k),
                (0..SIZE).map(|i| var_index(i, a, k)),
            ));
            let (top, left) = ((a / BOX) * BOX, (a % BOX) * BOX);
            constraints.push(exactly_one(
                format!("box_{}_{}", a, k),
                (0..BOX * BOX).map(|c| var_index(top + c / BOX, left + c % BOX, k)),
            ));
            constraints.push(exactly_one(
                format!("cell_{}_{}", a, k),
                (0..SIZE).map(|d| var_index(a, k, d)),
            ));
        }
    }

    // Pure feasibility: any objective works, a zero one keeps the model small
    OptimizationProblem::new(ObjectiveFunction::maximize(vec![0.0; NUM_VARS]))
        .with_name(PROBLEM)
        .with_variables(variables)
        .with_constraints(constraints)
}

fn decode(values: &[f64]) -> Result<Grid, SolveError> {
    let mut grid = [[0u8; SIZE]; SIZE];
    for (i, row) in grid.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let digit = (0..SIZE)
                .find(|&k| values[var_index(i, j, k)] > 0.5)
                .ok_or_else(|| {
                    SolveError::Backend(format!(
                        "Solver returned no digit for cell ({}, {})",
                        i + 1,
                        j + 1
                    ))
                })?;
            *cell = digit as u8 + 1;
        }
    }
    Ok(grid)
}

/// Solves 9x9 sudoku puzzles given as `{"grid": [[..9 ints..] x 9]}`, 0 for blanks
pub struct SudokuSolver {
    solver: Arc<dyn LinearSolver>,
}

impl SudokuSolver {
    pub fn new(solver: Arc<dyn LinearSolver>) -> Self {
        Self { solver }
    }

    pub fn solve_grid(&self, grid: &Grid, ctx: &SolveContext) -> Result<Grid, SolveError> {
        let solution = run_linear(self.solver.as_ref(), &to_model(grid), ctx)?;
        match solution.status {
            SolutionStatus::Optimal => decode(&solution.variable_values),
            SolutionStatus::Infeasible | SolutionStatus::Unbounded => {
                Err(SolveError::Infeasible("Puzzle has no solution".to_string()))
            }
        }
    }
}

impl ProblemSolver for SudokuSolver {
    fn solve(&self, payload: &Payload, ctx: &SolveContext) -> Result<Value, SolveError> {
        let input: SudokuInput = parse_payload(PROBLEM, payload)?;
        let grid = parse_grid(&input.grid)?;
        let solved = self.solve_grid(&grid, ctx)?;
        Ok(json!({ "grid": solved }))
    }

    fn description(&self) -> &str {
        "Solves a 9x9 sudoku (0 marks an empty cell)"
    }
}
