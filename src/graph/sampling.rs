//! Convergent Monte-Carlo estimate of mean hop distance from one reference vertex.
//!
//! Instead of computing every pairwise distance, vertices are drawn uniformly
//! with replacement and a running mean is updated until two successive means
//! differ by no more than the threshold. The reported value is the mean of the
//! whole running-mean trajectory, not its last point.
//!
//! Draws that hit the reference itself or an unreachable vertex are discarded
//! without advancing the sample count. Two caps keep the loop finite: one on
//! accepted samples and one on total draws (discards included).

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

use super::GraphResult;
use super::index::InteractionGraph;
use super::traverse::{PathLength, shortest_path};

/// Stopping rules for the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Largest change between successive running means still counted as stable.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Maximum accepted (reachable, non-self) samples.
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Maximum draws including discarded ones.
    #[serde(default = "default_max_draws")]
    pub max_draws: usize,
    /// Fixed RNG seed for reproducible runs. `None` draws from the thread RNG.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_threshold() -> f64 {
    0.01
}
fn default_max_samples() -> usize {
    10_000
}
fn default_max_draws() -> usize {
    100_000
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_samples: default_max_samples(),
            max_draws: default_max_draws(),
            seed: None,
        }
    }
}

impl SamplingConfig {
    /// Reject settings under which the loop could not run at all.
    pub fn validate(&self) -> GraphResult<()> {
        let invalid = |message: String| Err(GraphError::InvalidSampling { message });
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return invalid(format!(
                "threshold must be finite and non-negative, got {}",
                self.threshold
            ));
        }
        if self.max_samples == 0 {
            return invalid("max_samples must be at least 1".into());
        }
        if self.max_draws == 0 {
            return invalid("max_draws must be at least 1".into());
        }
        Ok(())
    }
}

/// Outcome of one estimator run.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEstimate {
    /// Mean of the running-mean history: the reported estimate.
    pub mean: f64,
    /// Final running mean.
    pub last_average: f64,
    /// Running means after each accepted sample.
    pub history: Vec<f64>,
    /// Accepted samples.
    pub samples: usize,
    /// Draws that were the reference or unreachable.
    pub discarded: usize,
    /// Total draws.
    pub draws: usize,
    /// Whether the threshold was met before a cap was hit.
    pub converged: bool,
}

/// Estimate the mean hop distance from `reference_id` to vertices in `population`.
///
/// `population` is sampled uniformly with replacement. Fails if `config` does
/// not validate, if the population is empty, or if no draw before `max_draws`
/// reached another vertex.
pub fn estimate_average_distance<S, R>(
    population: &[S],
    graph: &InteractionGraph,
    reference_id: &str,
    config: &SamplingConfig,
    rng: &mut R,
) -> GraphResult<DistanceEstimate>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    config.validate()?;
    if population.is_empty() {
        return Err(GraphError::EmptyPopulation);
    }

    let mut samples = 0usize;
    let mut average = 0.0f64;
    let mut delta = f64::INFINITY;
    let mut history: Vec<f64> = Vec::new();
    let mut discarded = 0usize;
    let mut draws = 0usize;

    while delta > config.threshold {
        if samples >= config.max_samples || draws >= config.max_draws {
            break;
        }
        let Some(candidate) = population.choose(rng) else {
            break;
        };
        draws += 1;

        match shortest_path(graph, reference_id, candidate.as_ref()) {
            PathLength::Found(hops) if hops > 0 => {
                let n = samples as f64;
                let next = (n * average + hops as f64) / (n + 1.0);
                delta = (next - average).abs();
                average = next;
                samples += 1;
                history.push(next);
            }
            _ => discarded += 1,
        }
    }

    if history.is_empty() {
        return Err(GraphError::NoReachableSamples {
            reference: reference_id.to_string(),
            draws,
        });
    }

    let converged = delta <= config.threshold;
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    if converged {
        tracing::debug!(reference_id, samples, discarded, mean, "estimate converged");
    } else {
        tracing::warn!(
            reference_id,
            samples,
            discarded,
            draws,
            delta,
            "estimate stopped at sampling cap before converging"
        );
    }

    Ok(DistanceEstimate {
        mean,
        last_average: average,
        history,
        samples,
        discarded,
        draws,
        converged,
    })
}

/// Estimate over every vertex in `graph`, seeding the RNG from `config.seed` if set.
pub fn estimate(
    graph: &InteractionGraph,
    reference_id: &str,
    config: &SamplingConfig,
) -> GraphResult<DistanceEstimate> {
    let population = graph.vertex_ids();
    match config.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            estimate_average_distance(&population, graph, reference_id, config, &mut rng)
        }
        None => {
            let mut rng = rand::thread_rng();
            estimate_average_distance(&population, graph, reference_id, config, &mut rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn build_star_graph(leaves: usize) -> InteractionGraph {
        // hub connects to leaf-1 .. leaf-n
        let mut g = InteractionGraph::new();
        for i in 1..=leaves {
            let leaf = format!("leaf-{i}");
            g.add_edge("hub", "Hub", &leaf, &leaf, "test", "low", "");
        }
        g
    }

    #[test]
    fn star_from_hub_converges_to_one() {
        let g = build_star_graph(5);
        let population = g.vertex_ids();
        let est = estimate_average_distance(
            &population,
            &g,
            "hub",
            &SamplingConfig::default(),
            &mut seeded_rng(),
        )
        .unwrap();

        assert!(est.converged);
        assert!((est.mean - 1.0).abs() < 1e-9);
        assert_eq!(est.samples, est.history.len());
        assert_eq!(est.draws, est.samples + est.discarded);
    }

    #[test]
    fn star_from_leaf_lands_between_one_and_two() {
        let g = build_star_graph(5);
        let population = g.vertex_ids();
        let est = estimate_average_distance(
            &population,
            &g,
            "leaf-1",
            &SamplingConfig::default(),
            &mut seeded_rng(),
        )
        .unwrap();

        assert!(est.mean >= 1.0 && est.mean <= 2.0, "mean = {}", est.mean);
        assert!(est.draws <= SamplingConfig::default().max_draws);
    }

    #[test]
    fn same_seed_reproduces_estimate() {
        let g = build_star_graph(8);
        let config = SamplingConfig {
            seed: Some(7),
            ..Default::default()
        };
        let first = estimate(&g, "leaf-3", &config).unwrap();
        let second = estimate(&g, "leaf-3", &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sample_cap_bounds_the_loop() {
        let mut g = InteractionGraph::new();
        g.add_edge("0", "0", "1", "1", "test", "low", "");
        g.add_edge("1", "1", "2", "2", "test", "low", "");
        let config = SamplingConfig {
            threshold: 0.0,
            max_samples: 3,
            ..Default::default()
        };
        let est = estimate_average_distance(&g.vertex_ids(), &g, "0", &config, &mut seeded_rng())
            .unwrap();
        assert!(est.samples <= 3);
        assert_eq!(est.history.len(), est.samples);
    }

    #[test]
    fn isolated_reference_hits_draw_cap() {
        let mut g = build_star_graph(3);
        g.add_vertex("island", "Island");
        let config = SamplingConfig {
            max_draws: 50,
            ..Default::default()
        };
        let err = estimate_average_distance(&g.vertex_ids(), &g, "island", &config, &mut seeded_rng())
            .unwrap_err();
        assert!(matches!(err, GraphError::NoReachableSamples { draws: 50, .. }));
    }

    #[test]
    fn single_vertex_population_is_all_discards() {
        let g = build_star_graph(1);
        let config = SamplingConfig {
            max_draws: 10,
            ..Default::default()
        };
        let err = estimate_average_distance(&["hub"], &g, "hub", &config, &mut seeded_rng())
            .unwrap_err();
        assert!(matches!(err, GraphError::NoReachableSamples { .. }));
    }

    #[test]
    fn empty_population_is_rejected() {
        let g = InteractionGraph::new();
        let empty: [&str; 0] = [];
        let err = estimate_average_distance(
            &empty,
            &g,
            "hub",
            &SamplingConfig::default(),
            &mut seeded_rng(),
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::EmptyPopulation));
    }

    #[test]
    fn unusable_config_is_rejected_before_sampling() {
        let g = build_star_graph(3);
        let population = g.vertex_ids();
        let bad = [
            SamplingConfig {
                threshold: f64::NAN,
                ..Default::default()
            },
            SamplingConfig {
                threshold: -0.5,
                ..Default::default()
            },
            SamplingConfig {
                max_samples: 0,
                ..Default::default()
            },
            SamplingConfig {
                max_draws: 0,
                ..Default::default()
            },
        ];
        for config in &bad {
            let err = estimate_average_distance(&population, &g, "hub", config, &mut seeded_rng())
                .unwrap_err();
            assert!(matches!(err, GraphError::InvalidSampling { .. }), "{config:?}");
        }
    }

    #[test]
    fn nan_threshold_from_toml_fails_validation() {
        let config: SamplingConfig = toml::from_str("threshold = nan").unwrap();
        assert!(matches!(
            config.validate(),
            Err(GraphError::InvalidSampling { .. })
        ));
        assert!(SamplingConfig::default().validate().is_ok());
    }

    #[test]
    fn config_defaults_fill_missing_toml_fields() {
        let config: SamplingConfig = toml::from_str("threshold = 0.05").unwrap();
        assert_eq!(config.threshold, 0.05);
        assert_eq!(config.max_samples, 10_000);
        assert_eq!(config.seed, None);
    }
}
