/*  ************************************************************

    QR-Logo: http://qrlogo.kaarposoft.dk

    Copyright (C) 2011-2018 Henrik Kaare Poulsen

    Licensed under the Apache License, Version 2.0 (the "License");
    you may not use this file except in compliance with the License.
    You may obtain a copy of the License at

     http://www.apache.org/licenses/LICENSE-2.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.

    ************************************************************ */


//  ************************************************************
//! Select the mask pattern with the lowest penalty
//!
//! All 8 mask patterns are applied to a copy of the unmasked matrix
//! (with matching format information) and scored with the four
//! penalty rules of ISO 18004.
//! With the `parallel` feature the candidates are scored on the rayon
//! thread pool; the result is the same as the sequential evaluation.
//  ************************************************************

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use log::{debug, trace};

use super::matrix::Matrix;
use super::ErrorCorrectionLevel;


pub const N_MASKS: u8 = 8;

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;


//  ************************************************************
/// Penalty points of a masked matrix, per rule
//  ************************************************************

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Penalty {
    pub adjacent: u32,
    pub blocks: u32,
    pub ratio: u32,
    pub dark: u32,
}

impl Penalty {
    pub fn total(&self) -> u32 {
        self.adjacent + self.blocks + self.ratio + self.dark
    }
}


//  ************************************************************
/// A masked matrix and its penalty
//  ************************************************************

#[derive(Clone, Debug)]
pub struct Candidate {
    pub mask: u8,
    pub penalty: Penalty,
    pub matrix: Matrix,
}


//  ************************************************************
/// Apply `mask` and format information to a copy of `unmasked` and score it
//  ************************************************************

pub fn candidate(unmasked: &Matrix, ec: ErrorCorrectionLevel, mask: u8) -> Candidate {
    let mut matrix = unmasked.clone();
    matrix.apply_mask(mask);
    matrix.set_format(ec, mask);
    let penalty = penalty(&matrix);
    trace!("candidate: mask={} {:?} total={}", mask, penalty, penalty.total());
    Candidate { mask, penalty, matrix }
}


//  ************************************************************
/// All 8 candidates, ordered by mask id
//  ************************************************************

#[cfg(feature = "parallel")]
pub fn evaluate(unmasked: &Matrix, ec: ErrorCorrectionLevel) -> Vec<Candidate> {
    (0..N_MASKS).into_par_iter().map(|mask| candidate(unmasked, ec, mask)).collect()
}

#[cfg(not(feature = "parallel"))]
pub fn evaluate(unmasked: &Matrix, ec: ErrorCorrectionLevel) -> Vec<Candidate> {
    (0..N_MASKS).map(|mask| candidate(unmasked, ec, mask)).collect()
}


//  ************************************************************
/// Index of the lowest total; the first one wins ties
//  ************************************************************

pub fn best_index(totals: &[u32]) -> usize {
    let mut best = 0;
    for (i, &t) in totals.iter().enumerate() {
        if t < totals[best] {
            best = i;
        }
    }
    best
}


//  ************************************************************
/// Masked matrix with the lowest penalty, and its mask id
//  ************************************************************

pub fn select(unmasked: &Matrix, ec: ErrorCorrectionLevel) -> (Matrix, u8) {
    let mut candidates = evaluate(unmasked, ec);
    let totals: Vec<u32> = candidates.iter().map(|c| c.penalty.total()).collect();
    let best = best_index(&totals);
    debug!("select: penalties={:?} best mask={}", totals, best);
    let chosen = candidates.swap_remove(best);
    (chosen.matrix, chosen.mask)
}


//  ************************************************************

pub fn penalty(matrix: &Matrix) -> Penalty {
    let lines = lines(matrix);
    Penalty {
        adjacent: lines.iter().map(|l| penalty_adjacent(l)).sum(),
        blocks: penalty_blocks(matrix),
        ratio: lines.iter().map(|l| penalty_ratio(l)).sum(),
        dark: penalty_dark(matrix),
    }
}

/// All rows followed by all columns
fn lines(matrix: &Matrix) -> Vec<Vec<bool>> {
    let n = matrix.get_dim();
    let rows = (0..n).map(|y| (0..n).map(|x| matrix.get(x, y)).collect());
    let cols = (0..n).map(|x| (0..n).map(|y| matrix.get(x, y)).collect());
    rows.chain(cols).collect()
}

/// Run lengths of equally colored modules as (dark, length)
fn runs(line: &[bool]) -> Vec<(bool, usize)> {
    let mut runs: Vec<(bool, usize)> = Vec::new();
    for &dark in line {
        match runs.last_mut() {
            Some((color, len)) if *color == dark => *len += 1,
            _ => runs.push((dark, 1)),
        }
    }
    runs
}


//  ************************************************************
/// Calculate penalty for adjacent modules in row/column in same color
///
/// # Feature:
/// Adjacent modules in row/column in same color
///
/// # Evaluation condition:
/// No. of modules = (5 + i)
///
/// # Points:
/// N1 + i
//  ************************************************************

pub fn penalty_adjacent(line: &[bool]) -> u32 {
    runs(line).iter().filter(|(_, n)| *n >= 5).map(|(_, n)| PENALTY_N1 + (*n as u32 - 5)).sum()
}


//  ************************************************************
/// Calculate penalty for block of modules in same color
///
/// # Feature:
/// Block of modules in same color
///
/// # Evaluation condition:
/// Block size = 2 * 2
///
/// # Points:
/// N2 for every (possibly overlapping) 2x2 block
//  ************************************************************

pub fn penalty_blocks(matrix: &Matrix) -> u32 {
    let n = matrix.get_dim();
    let mut p = 0;
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let c = matrix.get(x, y);
            if matrix.get(x + 1, y) == c && matrix.get(x, y + 1) == c && matrix.get(x + 1, y + 1) == c {
                p += PENALTY_N2;
            }
        }
    }
    p
}


//  ************************************************************
/// Calculate penalty for 1:1:3:1:1 ratio (dark:light:dark:light:dark) pattern in row/column
///
/// # Feature:
/// 1:1:3:1:1 ratio (dark:light:dark:light:dark) pattern in row/column,
/// preceded or followed by light area 4 modules wide
///
/// # Evaluation condition:
/// Existence of the pattern; the area outside the symbol counts as light
///
/// # Points:
/// N3
//  ************************************************************

pub fn penalty_ratio(line: &[bool]) -> u32 {
    let mut runs = runs(line);
    // Quiet zone on both sides
    match runs.first_mut() {
        Some((false, len)) => *len += 4,
        _ => runs.insert(0, (false, 4)),
    }
    match runs.last_mut() {
        Some((false, len)) => *len += 4,
        _ => runs.push((false, 4)),
    }
    let mut points = 0;
    for w in runs.windows(7) {
        if w[0].0 {
            continue;
        }
        let k = w[1].1;
        let core = w[2].1 == k && w[3].1 == 3 * k && w[4].1 == k && w[5].1 == k;
        if core && (w[0].1 >= 4 * k || w[6].1 >= 4 * k) {
            points += PENALTY_N3;
        }
    }
    points
}


//  ************************************************************
/// Calculate penalty for proportion of dark modules in entire symbol
///
/// # Feature:
/// Proportion of dark modules in entire symbol
///
/// # Evaluation condition:
/// 50 +/- (5*k)% to 50 +/- (5*(k+1))%
///
/// # Points:
/// N4 x k
//  ************************************************************

pub fn penalty_dark(matrix: &Matrix) -> u32 {
    let n = matrix.get_dim();
    let total = n * n;
    let dark = matrix.n_dark();
    let k = (20 * dark).abs_diff(10 * total) / total;
    k as u32 * PENALTY_N4
}
