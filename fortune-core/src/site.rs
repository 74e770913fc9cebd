//! Deterministic site generation.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Point, Result, VoronoiError};

/// Draws allowed per requested site before giving up on finding distinct ones.
const DRAWS_PER_SITE: usize = 64;

/// `count` sites uniformly distributed in `[0, width) x [0, height)`.
///
/// The same seed always yields the same sites. Coincident draws are skipped,
/// so the result is always valid sweep input. Fails if the area is not
/// finite and positive, or too small to hold `count` distinct points.
pub fn random_sites(count: usize, width: f64, height: f64, seed: u64) -> Result<Vec<Point>> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(VoronoiError::InvalidParameter(format!(
            "site area must be finite and positive, got {} x {}",
            width, height
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(count);
    let mut sites = Vec::with_capacity(count);
    let max_draws = count.saturating_mul(DRAWS_PER_SITE);
    let mut draws = 0usize;
    while sites.len() < count {
        if draws == max_draws {
            return Err(VoronoiError::InvalidParameter(format!(
                "only {} distinct sites found in {} x {} after {} draws",
                sites.len(),
                width,
                height,
                draws
            )));
        }
        draws += 1;
        let site = Point::new(rng.gen::<f64>() * width, rng.gen::<f64>() * height);
        if seen.insert(site) {
            sites.push(site);
        }
    }
    Ok(sites)
}

/// A `cols x rows` lattice with `spacing` between nodes, each node moved by
/// up to `jitter` in x and y.
///
/// With `jitter == 0` the sites are exactly on the lattice: a heavily
/// degenerate input (cocircular quadruples, shared rows and columns).
pub fn jittered_grid(cols: usize, rows: usize, spacing: f64, jitter: f64, seed: u64) -> Result<Vec<Point>> {
    if !spacing.is_finite() || !jitter.is_finite() || jitter < 0.0 {
        return Err(VoronoiError::InvalidParameter(format!(
            "grid needs finite spacing and non-negative jitter, got {} and {}",
            spacing, jitter
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut offset = || {
        if jitter > 0.0 {
            rng.gen_range(-jitter..jitter)
        } else {
            0.0
        }
    };
    let mut sites = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let x = col as f64 * spacing + offset();
            let y = row as f64 * spacing + offset();
            sites.push(Point::new(x, y));
        }
    }
    Ok(sites)
}
