//! Entry points for computing diagrams.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::sweep::Sweep;
use crate::{Point, Result, VoronoiGraph};

/// Voronoi diagram computer.
///
/// Holds per-caller settings only; every call to [`Fortune::compute`] owns
/// its own working state, so one computer can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct Fortune {
    cancel: Option<Arc<AtomicBool>>,
}

impl Fortune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort with [`crate::VoronoiError::Cancelled`] once `flag` is set.
    /// The flag is checked between events.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Compute the Voronoi diagram of `sites`.
    ///
    /// Input order does not affect the result. Coincident sites are
    /// rejected before any work is done.
    pub fn compute(&self, sites: &[Point]) -> Result<VoronoiGraph> {
        Sweep::new(sites, self.cancel.as_deref())?.run()
    }

    /// Compute several independent diagrams, in parallel.
    #[cfg(feature = "parallel")]
    pub fn compute_many<S>(&self, site_sets: &[S]) -> Vec<Result<VoronoiGraph>>
    where
        S: AsRef<[Point]> + Sync,
    {
        use rayon::prelude::*;

        site_sets
            .par_iter()
            .map(|sites| self.compute(sites.as_ref()))
            .collect()
    }
}

/// Compute the Voronoi diagram of `sites` with default settings.
pub fn compute_voronoi_graph(sites: &[Point]) -> Result<VoronoiGraph> {
    Fortune::new().compute(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoronoiError;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(false));
        let fortune = Fortune::new().with_cancel_flag(flag.clone());
        let sites = [Point::new(0.0, 0.0), Point::new(4.0, 1.0), Point::new(2.0, 5.0)];

        assert!(fortune.compute(&sites).is_ok());
        flag.store(true, Ordering::SeqCst);
        assert!(matches!(fortune.compute(&sites), Err(VoronoiError::Cancelled)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_compute_many_matches_sequential() {
        let sets: Vec<Vec<Point>> = (0..8)
            .map(|seed| crate::random_sites(40, 100.0, 100.0, seed).unwrap())
            .collect();
        let fortune = Fortune::new();
        let parallel = fortune.compute_many(&sets);

        assert_eq!(parallel.len(), sets.len());
        for (sites, result) in sets.iter().zip(parallel) {
            let expected = fortune.compute(sites).unwrap();
            let actual = result.unwrap();
            assert_eq!(actual.edges(), expected.edges());
            assert_eq!(actual.vertices(), expected.vertices());
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_compute_many_reports_each_failure() {
        let good = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let bad = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)];
        let results = Fortune::new().compute_many(&[good, bad]);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(VoronoiError::DegenerateInput(_))));
    }
}
