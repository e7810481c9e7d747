//! Theoretical isotope envelopes for partially deuterated peptides.
//!
//! Natural abundance peaks come from a Poisson approximation per element;
//! deuterium incorporation is a binomial over the exchangeable amides. The
//! two distributions are convolved on a nominal one-dalton grid.

use anyhow::{Result, bail};

use crate::scores::compatible::exchangeable_amides;

pub const PROTON: f64 = 1.007_276_4;
pub const NEUTRON: f64 = 1.003_355;

const C_MASS: f64 = 12.0;
const H_MASS: f64 = 1.007_825_032;
const N_MASS: f64 = 14.003_074;
const O_MASS: f64 = 15.994_914_6;
const S_MASS: f64 = 31.972_071;

// Expected heavy-isotope counts per atom.
const C13: f64 = 0.0107;
const H2: f64 = 0.000_115;
const N15: f64 = 0.003_64;
const O17: f64 = 0.000_38;
const O18: f64 = 0.002_05;
const S33: f64 = 0.0075;
const S34: f64 = 0.0425;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Composition {
    pub c: u32,
    pub h: u32,
    pub n: u32,
    pub o: u32,
    pub s: u32,
}

impl Composition {
    fn add(&mut self, c: u32, h: u32, n: u32, o: u32, s: u32) {
        self.c += c;
        self.h += h;
        self.n += n;
        self.o += o;
        self.s += s;
    }

    pub fn monoisotopic(&self) -> f64 {
        self.c as f64 * C_MASS
            + self.h as f64 * H_MASS
            + self.n as f64 * N_MASS
            + self.o as f64 * O_MASS
            + self.s as f64 * S_MASS
    }
}

/// Elemental composition of an unmodified linear peptide, water included.
pub fn peptide_composition(sequence: &str) -> Result<Composition> {
    if sequence.is_empty() {
        bail!("empty peptide sequence");
    }
    let mut comp = Composition::default();
    for aa in sequence.bytes() {
        match aa.to_ascii_uppercase() {
            b'G' => comp.add(2, 3, 1, 1, 0),
            b'A' => comp.add(3, 5, 1, 1, 0),
            b'S' => comp.add(3, 5, 1, 2, 0),
            b'P' => comp.add(5, 7, 1, 1, 0),
            b'V' => comp.add(5, 9, 1, 1, 0),
            b'T' => comp.add(4, 7, 1, 2, 0),
            b'C' => comp.add(3, 5, 1, 1, 1),
            b'L' | b'I' => comp.add(6, 11, 1, 1, 0),
            b'N' => comp.add(4, 6, 2, 2, 0),
            b'D' => comp.add(4, 5, 1, 3, 0),
            b'Q' => comp.add(5, 8, 2, 2, 0),
            b'K' => comp.add(6, 12, 2, 1, 0),
            b'E' => comp.add(5, 7, 1, 3, 0),
            b'M' => comp.add(5, 9, 1, 1, 1),
            b'H' => comp.add(6, 7, 3, 1, 0),
            b'F' => comp.add(9, 9, 1, 1, 0),
            b'R' => comp.add(6, 12, 4, 1, 0),
            b'Y' => comp.add(9, 9, 1, 2, 0),
            b'W' => comp.add(11, 10, 2, 1, 0),
            other => bail!("unsupported residue '{}' in {}", other as char, sequence),
        }
    }
    // Terminal water.
    comp.add(0, 2, 0, 1, 0);
    Ok(comp)
}

fn poisson(lambda: f64, len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    let mut term = (-lambda).exp();
    for (k, v) in out.iter_mut().enumerate() {
        *v = term;
        term *= lambda / (k + 1) as f64;
    }
    out
}

/// Poisson distribution placed on every `step`-th bin.
fn spaced_poisson(lambda: f64, step: usize, len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    let base = poisson(lambda, len.div_ceil(step));
    for (k, v) in base.into_iter().enumerate() {
        if k * step < len {
            out[k * step] = v;
        }
    }
    out
}

fn binomial(n: usize, p: f64, len: usize) -> Vec<f64> {
    let p = p.clamp(0.0, 1.0);
    let mut out = vec![0.0; len];
    let mut coeff = 1.0f64;
    for k in 0..=n.min(len.saturating_sub(1)) {
        out[k] = coeff * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32);
        coeff = coeff * (n - k) as f64 / (k + 1) as f64;
    }
    out
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len();
    let mut out = vec![0.0; len];
    for (i, x) in a.iter().enumerate() {
        if *x == 0.0 {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            if i + j >= len {
                break;
            }
            out[i + j] += x * y;
        }
    }
    out
}

/// Natural isotope envelope of a composition, `len` peaks, max-normalized.
pub fn natural_envelope(comp: &Composition, len: usize) -> Vec<f64> {
    let parts = [
        poisson(comp.c as f64 * C13, len),
        poisson(comp.h as f64 * H2, len),
        poisson(comp.n as f64 * N15, len),
        poisson(comp.o as f64 * O17, len),
        spaced_poisson(comp.o as f64 * O18, 2, len),
        poisson(comp.s as f64 * S33, len),
        spaced_poisson(comp.s as f64 * S34, 2, len),
    ];
    let mut dist = vec![0.0; len];
    if len > 0 {
        dist[0] = 1.0;
    }
    for part in &parts {
        dist = convolve(&dist, part);
    }
    normalize_max(&mut dist);
    dist
}

pub fn normalize_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(0.0f64, f64::max);
    if max > 0.0 {
        values.iter_mut().for_each(|v| *v /= max);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
}

/// Envelope of `sequence` at `charge` with a fraction `incorporation` of its
/// exchangeable amides deuterated. Intensities are max-normalized.
pub fn theoretical_envelope(
    sequence: &str,
    charge: u32,
    incorporation: f64,
    peaks: usize,
) -> Result<Envelope> {
    if charge == 0 {
        bail!("charge must be positive for {}", sequence);
    }
    if peaks == 0 {
        bail!("envelope requires at least one peak");
    }
    let comp = peptide_composition(sequence)?;
    let natural = natural_envelope(&comp, peaks);
    let deuterium = binomial(exchangeable_amides(sequence), incorporation, peaks);
    let mut intensity = convolve(&natural, &deuterium);
    normalize_max(&mut intensity);

    let z = charge as f64;
    let mono_mz = (comp.monoisotopic() + z * PROTON) / z;
    let mz = (0..peaks).map(|k| mono_mz + k as f64 * NEUTRON / z).collect();
    Ok(Envelope { mz, intensity })
}
