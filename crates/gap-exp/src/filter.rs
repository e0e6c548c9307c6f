//! Composable applicability filters over the registered algorithms.

use gap_algo::{Algorithm, Capability};
use gap_core::{ExperimentKind, Scenario};

/// One exclusion rule. Filters compose by intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Keep streaming-capable algorithms.
    Streaming,
    /// Keep algorithms that recover columns beyond the first.
    Multicolumn,
    /// Keep algorithms that tolerate full-row gaps.
    Blackout,
    /// Keep algorithms that cope with randomly placed gaps.
    Mcar,
    /// Drop algorithms whose `max_rows` is below the series length.
    Slow {
        /// Rows of the run.
        rows: usize,
    },
    /// Drop algorithms whose `min_rows` exceeds the series length.
    Unstable {
        /// Rows of the run.
        rows: usize,
    },
}

impl Filter {
    /// Whether `algorithm` passes this filter.
    pub fn admits(&self, algorithm: &Algorithm) -> bool {
        match *self {
            Filter::Streaming => algorithm.supports(Capability::Streaming),
            Filter::Multicolumn => algorithm.supports(Capability::Multicolumn),
            Filter::Blackout => algorithm.supports(Capability::Blackout),
            Filter::Mcar => algorithm.supports(Capability::Mcar),
            Filter::Slow { rows } => algorithm.max_rows().map_or(true, |max| rows <= max),
            Filter::Unstable { rows } => algorithm.min_rows().map_or(true, |min| rows >= min),
        }
    }
}

/// Filters that apply to a `(kind, scenario)` run over `rows` rows.
pub fn filters_for(kind: ExperimentKind, scenario: Scenario, rows: usize) -> Vec<Filter> {
    let mut filters = Vec::new();
    if kind == ExperimentKind::Streaming {
        filters.push(Filter::Streaming);
    }
    if !scenario.is_single_column() {
        filters.push(Filter::Multicolumn);
    }
    if scenario.has_blackouts() {
        filters.push(Filter::Blackout);
    }
    if scenario.is_mcar() {
        filters.push(Filter::Mcar);
    }
    filters.push(Filter::Slow { rows });
    filters.push(Filter::Unstable { rows });
    filters
}

/// Algorithms admitted by every filter, in input order.
pub fn apply<'a, I>(filters: &[Filter], algorithms: I) -> Vec<&'a Algorithm>
where
    I: IntoIterator<Item = &'a Algorithm>,
{
    algorithms
        .into_iter()
        .filter(|algorithm| filters.iter().all(|filter| filter.admits(algorithm)))
        .collect()
}

#[cfg(test)]
mod tests {
    use gap_algo::{builtin_manifests, AlgorithmManifest, AlgorithmRegistry};

    use super::*;

    fn registry(manifests: Vec<AlgorithmManifest>) -> AlgorithmRegistry {
        AlgorithmRegistry::from_manifests("algos", manifests).expect("registry")
    }

    fn kept_codes(registry: &AlgorithmRegistry, kind: ExperimentKind, scenario: Scenario, rows: usize) -> Vec<String> {
        apply(&filters_for(kind, scenario, rows), registry.iter())
            .iter()
            .map(|a| a.code().to_string())
            .collect()
    }

    #[test]
    fn continuous_blackout_excludes_expected_codes() {
        let pack = registry(builtin_manifests());
        let kept = kept_codes(&pack, ExperimentKind::Continuous, Scenario::Blackout, 1000);
        assert!(!kept.contains(&"grouse".to_string()));
        assert!(!kept.contains(&"tkcm".to_string()));
        assert!(kept.contains(&"cdrec".to_string()));
    }

    #[test]
    fn mrnn_runs_blackouts_but_not_random_gaps() {
        let pack = registry(builtin_manifests());
        let blackout = kept_codes(&pack, ExperimentKind::Recovery, Scenario::Blackout, 1000);
        assert_eq!(blackout, vec!["cdrec", "m-rnn", "ogd-imp", "pca-mme"]);
        for scenario in [Scenario::McarElement, Scenario::McarBlock, Scenario::McarMultiBlock] {
            let kept = kept_codes(&pack, ExperimentKind::Recovery, scenario, 1000);
            assert_eq!(kept, vec!["cdrec", "ogd-imp", "pca-mme"], "{scenario}");
        }
    }

    #[test]
    fn row_bounds_filter_both_ways() {
        let mut manifests = builtin_manifests();
        manifests[0].max_rows = Some(500);
        manifests[1].min_rows = Some(2000);
        let pack = registry(manifests);
        let kept = apply(&filters_for(ExperimentKind::Recovery, Scenario::Missing, 1000), pack.iter());
        assert_eq!(kept.len(), pack.len() - 2);
    }

    #[test]
    fn builtin_thresholds_engage() {
        let pack = registry(builtin_manifests());
        let short = kept_codes(&pack, ExperimentKind::Recovery, Scenario::Missing, 80);
        assert!(!short.contains(&"ssa".to_string()));
        let long = kept_codes(&pack, ExperimentKind::Recovery, Scenario::Missing, 3000);
        assert!(!long.contains(&"m-rnn".to_string()));
        assert!(long.contains(&"tkcm".to_string()));
        assert!(long.contains(&"ssa".to_string()));
    }
}
