//! OutcomeResolver - maps a requested choice to the outcome that actually happens.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DivergenceProbability, UnitDraw};
use crate::domain::interaction::{ChoiceDomain, InteractionError, OptionIndex};
use crate::ports::RandomSource;

/// How a diverging outcome is picked when the domain has more than two options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceRule {
    /// Uniform pick among every option except the requested one.
    #[default]
    UniformAmongOthers,
    /// Always the domain-defined alternate (cyclic successor).
    Alternate,
}

/// Outcome of resolving one requested choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub requested: OptionIndex,
    pub actual: OptionIndex,
    pub diverged: bool,
}

/// Resolves requested choices against a fixed divergence probability.
///
/// Resolution is a pure function of `(requested, probability, draw)`; the
/// resolver holds no mutable state.
#[derive(Debug, Clone)]
pub struct OutcomeResolver {
    domain: ChoiceDomain,
    probability: DivergenceProbability,
    rule: DivergenceRule,
}

impl OutcomeResolver {
    pub fn new(domain: ChoiceDomain, probability: DivergenceProbability) -> Self {
        Self {
            domain,
            probability,
            rule: DivergenceRule::default(),
        }
    }

    pub fn with_rule(mut self, rule: DivergenceRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn domain(&self) -> &ChoiceDomain {
        &self.domain
    }

    pub fn probability(&self) -> DivergenceProbability {
        self.probability
    }

    /// Resolves `requested` using an explicit draw.
    ///
    /// # Algorithm
    /// Diverges iff `draw < probability`. A diverging draw is rescaled to
    /// `draw / probability`, which is again uniform in `[0, 1)`, and used to
    /// pick among the other options, so one draw decides both questions.
    ///
    /// # Edge Cases
    /// - Single-member domain: never diverges
    /// - Binary domain: both rules pick the other value
    pub fn resolve(
        &self,
        requested: OptionIndex,
        draw: UnitDraw,
    ) -> Result<Resolution, InteractionError> {
        let requested = self.domain.check(requested)?;
        let p = self.probability.value();

        if self.domain.len() < 2 || draw.value() >= p {
            return Ok(Resolution {
                requested,
                actual: requested,
                diverged: false,
            });
        }

        let actual = match self.rule {
            DivergenceRule::Alternate => self.domain.alternate(requested)?,
            DivergenceRule::UniformAmongOthers => {
                let others = self.domain.others(requested)?;
                let rescaled = UnitDraw::saturating(draw.value() / p);
                others[rescaled.pick_index(others.len())]
            }
        };

        Ok(Resolution {
            requested,
            actual,
            diverged: true,
        })
    }

    /// Resolves `requested` with a draw taken from `random`.
    pub fn resolve_with(
        &self,
        requested: OptionIndex,
        random: &mut dyn RandomSource,
    ) -> Result<Resolution, InteractionError> {
        self.resolve(requested, random.next_draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::random::{ScriptedRandomSource, SeededRandomSource};
    use proptest::prelude::*;

    fn binary(p: f64) -> OutcomeResolver {
        OutcomeResolver::new(
            ChoiceDomain::binary("left", "right").unwrap(),
            DivergenceProbability::new(p).unwrap(),
        )
    }

    fn draw(v: f64) -> UnitDraw {
        UnitDraw::new(v).unwrap()
    }

    #[test]
    fn draw_below_probability_diverges() {
        let r = binary(0.8).resolve(OptionIndex::new(0), draw(0.79)).unwrap();
        assert!(r.diverged);
        assert_eq!(r.actual, OptionIndex::new(1));
    }

    #[test]
    fn draw_at_probability_keeps_request() {
        let r = binary(0.8).resolve(OptionIndex::new(0), draw(0.8)).unwrap();
        assert!(!r.diverged);
        assert_eq!(r.actual, OptionIndex::new(0));
    }

    #[test]
    fn single_member_domain_never_diverges() {
        let resolver = OutcomeResolver::new(
            ChoiceDomain::new(["only"]).unwrap(),
            DivergenceProbability::ALWAYS,
        );
        let r = resolver.resolve(OptionIndex::new(0), draw(0.0)).unwrap();
        assert!(!r.diverged);
        assert_eq!(r.actual, OptionIndex::new(0));
    }

    #[test]
    fn unknown_request_is_rejected() {
        let result = binary(0.5).resolve(OptionIndex::new(3), draw(0.1));
        assert!(matches!(result, Err(InteractionError::UnknownOption { .. })));
    }

    #[test]
    fn nary_uniform_rule_spreads_over_other_options() {
        let resolver = OutcomeResolver::new(
            ChoiceDomain::new(["a", "b", "c"]).unwrap(),
            DivergenceProbability::new(0.5).unwrap(),
        );
        // draw / p = 0.2 -> first of the others, 0.8 -> second
        let first = resolver.resolve(OptionIndex::new(0), draw(0.1)).unwrap();
        let second = resolver.resolve(OptionIndex::new(0), draw(0.4)).unwrap();
        assert_eq!(first.actual, OptionIndex::new(1));
        assert_eq!(second.actual, OptionIndex::new(2));
    }

    #[test]
    fn nary_alternate_rule_uses_successor() {
        let resolver = OutcomeResolver::new(
            ChoiceDomain::new(["a", "b", "c"]).unwrap(),
            DivergenceProbability::ALWAYS,
        )
        .with_rule(DivergenceRule::Alternate);
        let r = resolver.resolve(OptionIndex::new(2), draw(0.9)).unwrap();
        assert_eq!(r.actual, OptionIndex::new(0));
    }

    #[test]
    fn resolve_with_consumes_one_draw() {
        let mut random = ScriptedRandomSource::new([0.1, 0.9]);
        let resolver = binary(0.5);
        assert!(resolver.resolve_with(OptionIndex::new(0), &mut random).unwrap().diverged);
        assert!(!resolver.resolve_with(OptionIndex::new(0), &mut random).unwrap().diverged);
    }

    #[test]
    fn empirical_divergence_rate_matches_probability() {
        for p in [0.2, 0.5, 0.8] {
            let resolver = binary(p);
            let mut random = SeededRandomSource::seeded(42);
            let n = 10_000;
            let diverged = (0..n)
                .filter(|_| {
                    resolver
                        .resolve_with(OptionIndex::new(0), &mut random)
                        .unwrap()
                        .diverged
                })
                .count();
            let rate = diverged as f64 / n as f64;
            assert!((rate - p).abs() <= 0.02, "p={} rate={}", p, rate);
        }
    }

    proptest! {
        #[test]
        fn zero_probability_always_returns_request(requested in 0usize..2, d in 0.0f64..1.0) {
            let r = binary(0.0).resolve(OptionIndex::new(requested), draw(d)).unwrap();
            prop_assert_eq!(r.actual, OptionIndex::new(requested));
            prop_assert!(!r.diverged);
        }

        #[test]
        fn full_probability_always_returns_alternate(requested in 0usize..2, d in 0.0f64..1.0) {
            let r = binary(1.0).resolve(OptionIndex::new(requested), draw(d)).unwrap();
            prop_assert_eq!(r.actual, OptionIndex::new(1 - requested));
            prop_assert!(r.diverged);
        }

        #[test]
        fn nary_divergence_never_returns_request(requested in 0usize..5, d in 0.0f64..1.0) {
            let resolver = OutcomeResolver::new(
                ChoiceDomain::new(["a", "b", "c", "d", "e"]).unwrap(),
                DivergenceProbability::ALWAYS,
            );
            let r = resolver.resolve(OptionIndex::new(requested), draw(d)).unwrap();
            prop_assert_ne!(r.actual, OptionIndex::new(requested));
        }
    }
}
