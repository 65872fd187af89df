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
//! Reed Solomon error correction algorithms
//!
//! Arithmetic is in GF(2^8) with the primitive polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (285 = 0x11D).
//! The generator polynomial for `n` error correction codewords
//! has the roots a^0, a^1, ..., a^(n-1).
//  ************************************************************

use std::fmt;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Not};

use log::trace;


//  ************************************************************
/// Reed Solomon encoder
//  ************************************************************

pub struct ReedSolomonEncoder {
    n_ec_bytes: usize,
    gen_poly: Poly,
}

impl ReedSolomonEncoder {
    //  ************************************************************
    pub fn new(n_ec_bytes: usize) -> Self {
        let gen_poly = Poly::generator(n_ec_bytes);
        ReedSolomonEncoder { n_ec_bytes, gen_poly }
    }

    //  ************************************************************
    /// Error correction codewords for `msg`, highest degree first
    pub fn encode(&self, msg: &[u8]) -> Vec<u8> {
        let n = self.n_ec_bytes;
        trace!("ReedSolomonEncoder::encode begin; n={} msg.len={}", n, msg.len());
        if n == 0 {
            return Vec::new();
        }
        let mut lfsr = vec![G(0); n];
        for &m in msg {
            let b = G(m) + lfsr[n - 1];
            for j in (1..n).rev() {
                lfsr[j] = lfsr[j - 1] + self.gen_poly[j] * b;
            }
            lfsr[0] = self.gen_poly[0] * b;
        }
        let parity: Vec<u8> = lfsr.iter().rev().map(|g| g.0).collect();
        trace!("ReedSolomonEncoder::encode done; n={}, parity={:?}", n, parity);
        parity
    }
}


//  ************************************************************
/// Correct errors in a block of data and error correction codewords
//  ************************************************************
///
/// `block` holds the codewords highest degree first (as transmitted),
/// the last `n_ec` of them being error correction codewords.
/// Up to `n_ec / 2` erroneous codewords are corrected in place.
///
/// Returns the number of corrected codewords,
/// or `None` if the block is beyond repair.

pub fn correct(block: &mut [u8], n_ec: usize) -> Option<usize> {
    let n = block.len();
    if n_ec == 0 || n_ec > n || n > 255 {
        return None;
    }
    let syndromes = syndromes(block, n_ec);
    if syndromes.iter().all(|s| *s == G(0)) {
        return Some(0);
    }
    trace!("correct: n={} n_ec={} syndromes={:?}", n, n_ec, syndromes);

    let locator = berlekamp_massey(&syndromes);
    let n_errors = locator.degree();
    if 2 * n_errors > n_ec {
        trace!("correct: too many errors; n_errors={}", n_errors);
        return None;
    }

    // Chien search: an error at power p (counted from the end) gives a root at a^-p
    let positions: Vec<usize> = (0..n).filter(|&p| locator.eval(G::exp(255 - p)) == G(0)).collect();
    if positions.len() != n_errors {
        trace!("correct: locator roots={} n_errors={}", positions.len(), n_errors);
        return None;
    }

    // Forney: error evaluator is S(x) * L(x) mod x^n_ec
    let mut evaluator = Poly::new(n_ec);
    for i in 0..n_ec {
        for j in 0..locator.c.len().min(n_ec - i) {
            evaluator[i + j] += syndromes[i] * locator[j];
        }
    }
    for &p in positions.iter() {
        let x = G::exp(p);
        let x_inv = !x;
        let num = evaluator.eval(x_inv);
        let mut den = G(0);
        for i in (1..locator.c.len()).step_by(2) {
            den += locator[i] * x_inv.pow(i - 1);
        }
        if den == G(0) {
            return None;
        }
        let magnitude = x * (num / den);
        block[n - 1 - p] ^= magnitude.0;
    }

    if syndromes_zero(block, n_ec) {
        trace!("correct: corrected {} codewords at {:?}", n_errors, positions);
        Some(n_errors)
    } else {
        None
    }
}

fn syndromes(block: &[u8], n_ec: usize) -> Vec<G> {
    (0..n_ec).map(|i| block.iter().fold(G(0), |s, &c| s * G::exp(i) + G(c))).collect()
}

fn syndromes_zero(block: &[u8], n_ec: usize) -> bool {
    syndromes(block, n_ec).iter().all(|s| *s == G(0))
}

fn berlekamp_massey(syndromes: &[G]) -> Poly {
    let mut c = Poly { c: vec![G(1)] };
    let mut b = Poly { c: vec![G(1)] };
    let mut l = 0;
    let mut m = 1;
    let mut last_d = G(1);
    for k in 0..syndromes.len() {
        let mut d = syndromes[k];
        for i in 1..=l.min(c.c.len() - 1) {
            d += c[i] * syndromes[k - i];
        }
        if d == G(0) {
            m += 1;
            continue;
        }
        let t = c.clone();
        let coef = d / last_d;
        if c.c.len() < b.c.len() + m {
            c.c.resize(b.c.len() + m, G(0));
        }
        for (i, &bb) in b.c.iter().enumerate() {
            c[i + m] += coef * bb;
        }
        if 2 * l <= k {
            l = k + 1 - l;
            b = t;
            last_d = d;
            m = 1;
        } else {
            m += 1;
        }
    }
    c.simplify();
    c
}


//  ************************************************************
/// Polynomial over finite field
//  ************************************************************
///
/// Coefficients are stored lowest degree first.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    c: Vec<G>,
}

//  ************************************************************
impl Poly {
    //  ************************************************************
    pub fn new(nbytes: usize) -> Self {
        Poly { c: vec![G(0); nbytes] }
    }

    //  ************************************************************
    pub fn simplify(&mut self) {
        while self.c.len() > 1 && self.c[self.c.len() - 1] == G(0) {
            self.c.pop();
        }
    }

    //  ************************************************************
    pub fn degree(&self) -> usize {
        self.c.iter().rposition(|g| *g != G(0)).unwrap_or(0)
    }

    //  ************************************************************
    /// Product of (x + a^i) for i = 0 .. nbytes-1
    pub fn generator(nbytes: usize) -> Self {
        trace!("Poly::generator begin; n={}", nbytes);
        let mut genpoly = Poly { c: vec![G(1)] };
        for i in 0..nbytes {
            let factor = Poly { c: vec![G::exp(i), G(1)] };
            genpoly = &genpoly * &factor;
        }
        trace!("Poly::generator done; n={}, genpoly={}", nbytes, genpoly);
        genpoly
    }

    //  ************************************************************
    /// Horner evaluation at `x`
    pub fn eval(&self, x: G) -> G {
        self.c.iter().rev().fold(G(0), |acc, &c| acc * x + c)
    }

    //  ************************************************************
    /// Coefficients as exponents of a (lowest degree first)
    pub fn coef(&self) -> Vec<u8> {
        self.c.iter().map(|g| g.log()).collect()
    }
}

//  ************************************************************
impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.coef().fmt(f)
    }
}

//  ************************************************************
impl Index<usize> for Poly {
    type Output = G;

    fn index(&self, idx: usize) -> &G {
        &self.c[idx]
    }
}

//  ************************************************************
impl IndexMut<usize> for Poly {
    fn index_mut(&mut self, idx: usize) -> &mut G {
        &mut self.c[idx]
    }
}


//  ************************************************************
///  polynomial multiplication
//  ************************************************************

impl<'a> Mul for &'a Poly {
    type Output = Poly;

    fn mul(self, other: &Poly) -> Poly {
        let m = self.c.len();
        let n = other.c.len();
        let mut dst = Poly::new(n + m - 1);
        for i in 0..m {
            for j in 0..n {
                dst[i + j] += self.c[i] * other.c[j];
            }
        }
        dst.simplify();
        dst
    }
}






//  ************************************************************
/// Element in Galois Field
//  ************************************************************

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct G(pub u8);

impl G {
    /// a^i
    pub fn exp(i: usize) -> G {
        G(GF285_EXP[i % 255])
    }

    /// Exponent of a (0 for the zero element)
    pub fn log(self) -> u8 {
        GF285_LOG[self.0 as usize]
    }

    pub fn pow(self, n: usize) -> G {
        if self.0 == 0 {
            return if n == 0 { G(1) } else { G(0) };
        }
        G::exp(self.log() as usize * n)
    }
}

impl From<G> for u8 {
    fn from(g: G) -> u8 {
        g.0
    }
}

//  ************************************************************
impl From<G> for usize {
    fn from(g: G) -> usize {
        g.0 as usize
    }
}

//  ************************************************************
impl Mul for G {
    type Output = G;

    fn mul(self, other: G) -> G {
        if self.0 == 0 || other.0 == 0 {
            return G(0);
        }
        G(GF285_EXP[self.log() as usize + other.log() as usize])
    }
}

//  ************************************************************
impl Not for G {
    type Output = G;
    /// Galois Field inverse (zero has none and maps to zero)
    fn not(self) -> G {
        if self.0 == 0 {
            return G(0);
        }
        G(GF285_EXP[255 - self.log() as usize])
    }
}

//  ************************************************************
impl Div for G {
    type Output = G;
    fn div(self, other: G) -> G {
        self * !other
    }
}

//  ************************************************************
impl AddAssign for G {
    fn add_assign(&mut self, other: G) {
        *self = *self + other;
    }
}

//  ************************************************************
impl Add for G {
    type Output = G;
    fn add(self, other: G) -> G {
        G(self.0 ^ other.0)
    }
}




//  ************************************************************
/// Exponentials and logarithms for Galois Field 285
//  ************************************************************
///
/// The exponent table is doubled, so products of two logarithms
/// can be looked up without reduction modulo 255.

const fn gf285_tables() -> ([u8; 512], [u8; 256]) {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11D;
        }
        i += 1;
    }
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    (exp, log)
}

const GF285_TABLES: ([u8; 512], [u8; 256]) = gf285_tables();

static GF285_EXP: [u8; 512] = GF285_TABLES.0;
static GF285_LOG: [u8; 256] = GF285_TABLES.1;
