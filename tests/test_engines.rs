use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use evopop::{
    error::{GeneticError, Result},
    evolution::{
        DemeGa, GaOptions, GeneticAlgorithm, Goal, IncrementalGa, Replacement,
        ReplacementStrategy, SteadyStateGa,
    },
    genome::{Genome, Individual},
    rng::RandomNumberGenerator,
    scaling::NoScaling,
    selection::TournamentSelector,
};

/// A vector of reals in [-1, 1] scored by its sum of squares.
#[derive(Clone, Debug, PartialEq)]
struct Vector(Vec<f64>);

impl Genome for Vector {
    fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        self.0.iter_mut().for_each(|x| *x = rng.random_range(-1.0, 1.0));
        Ok(())
    }

    fn mutate(&mut self, probability: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
        let mut changed = 0;
        for x in self.0.iter_mut() {
            if rng.flip_coin(probability) {
                *x = (*x + 0.1 * rng.gaussian()).clamp(-1.0, 1.0);
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn compare(&self, other: &Self) -> Result<f64> {
        let d: f64 = self.0.iter().zip(&other.0).map(|(a, b)| (a - b).abs()).sum();
        Ok((d / (2.0 * self.0.len() as f64)).min(1.0))
    }

    fn evaluate(&self) -> Result<f64> {
        Ok(self.0.iter().map(|x| x * x).sum())
    }

    // Blend crossover: each child is a random convex mix of the parents.
    fn crossover(
        mom: &Self,
        dad: &Self,
        sister: Option<&mut Self>,
        brother: Option<&mut Self>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let mut produced = 0;
        for child in [sister, brother].into_iter().flatten() {
            let w = rng.random_float();
            child.0 = mom
                .0
                .iter()
                .zip(&dad.0)
                .map(|(a, b)| w * a + (1.0 - w) * b)
                .collect();
            produced += 1;
        }
        Ok(produced)
    }
}

fn template() -> Individual<Vector> {
    Individual::new(Vector(vec![0.0; 6]))
}

fn minimizing(size: usize, generations: usize) -> evopop::evolution::GaOptionsBuilder {
    GaOptions::builder()
        .population_size(size)
        .num_generations(generations)
        .p_mutation(0.2)
        .goal(Goal::Minimize)
        .seed(404)
}

#[test]
fn test_steady_state_size_survives_every_step() {
    let options = minimizing(25, 60).replacement(Replacement::Fraction(0.4)).build().unwrap();
    let mut ga = SteadyStateGa::new(&template(), options).unwrap();
    ga.population_mut().set_scaling(NoScaling);
    ga.population_mut().set_selector(TournamentSelector::default());

    ga.initialize(0).unwrap();
    let before = ga.population().len();
    let initial_best = ga.statistics().best_ever();
    while !ga.done() {
        ga.step().unwrap();
        assert_eq!(ga.population().len(), before);
    }
    assert!(ga.statistics().best_ever() <= initial_best);
    assert_eq!(ga.statistics().replacements(), 60 * 10);
}

#[test]
fn test_steady_state_is_deterministic() {
    let run = || {
        let options = minimizing(20, 30).build().unwrap();
        let mut ga = SteadyStateGa::new(&template(), options).unwrap();
        ga.population_mut().set_scaling(NoScaling);
        ga.evolve(0).unwrap().score()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_incremental_parent_replacement() {
    let options = minimizing(12, 80)
        .num_offspring(2)
        .replacement_strategy(ReplacementStrategy::Parent)
        .build()
        .unwrap();
    let mut ga = IncrementalGa::new(&template(), options).unwrap();
    ga.population_mut().set_scaling(NoScaling);
    ga.population_mut().set_selector(TournamentSelector::default());
    let best = ga.evolve(0).unwrap();
    assert_eq!(ga.population().len(), 12);
    assert_eq!(ga.statistics().replacements(), 160);
    assert!(best.score() <= ga.statistics().initial().min);
}

#[test]
fn test_incremental_crowding() {
    let options = minimizing(12, 40).num_offspring(3).build().unwrap();
    let mut ga = IncrementalGa::new(&template(), options).unwrap();
    ga.population_mut().set_scaling(NoScaling);
    ga.set_custom_replacement(|child, population| {
        let mut nearest = 0;
        let mut distance = f64::INFINITY;
        for (i, member) in population.iter().enumerate() {
            let d = child.compare(member).unwrap_or(1.0);
            if d < distance {
                nearest = i;
                distance = d;
            }
        }
        nearest
    });
    ga.evolve(0).unwrap();
    assert_eq!(ga.statistics().replacements(), 120);
    ga.population().check_consistency().unwrap();
}

#[test]
fn test_deme_total_size_survives_migration() {
    let options = minimizing(8, 30)
        .num_populations(4)
        .migration_count(3)
        .migration_frequency(2)
        .build()
        .unwrap();
    let mut ga = DemeGa::new(&template(), options).unwrap();
    ga.set_scaling(NoScaling);
    ga.set_selector(TournamentSelector::default());

    ga.initialize(0).unwrap();
    let total = ga.total_size();
    assert_eq!(total, 32);
    while !ga.done() {
        ga.step().unwrap();
        assert_eq!(ga.total_size(), total);
    }
    for i in 0..ga.num_demes() {
        assert_eq!(ga.deme_statistics(i).unwrap().generation(), 30);
    }
}

#[test]
fn test_deme_overall_best_matches_the_demes() {
    let options = minimizing(6, 10).num_populations(3).build().unwrap();
    let mut ga = DemeGa::new(&template(), options).unwrap();
    ga.set_scaling(NoScaling);
    let best = ga.evolve(0).unwrap();
    let deme_best = (0..3)
        .map(|i| ga.deme_statistics(i).unwrap().best_ever())
        .fold(f64::INFINITY, f64::min);
    assert!(best.score() <= deme_best + 1e-12);
}

#[test]
fn test_deme_without_migration() {
    let options = minimizing(5, 5)
        .num_populations(2)
        .migration_frequency(0)
        .build()
        .unwrap();
    let mut ga = DemeGa::new(&template(), options).unwrap();
    ga.set_scaling(NoScaling);
    ga.evolve(0).unwrap();
    assert_eq!(ga.total_size(), 10);
}

/// The template scores normally for `budget` evaluations and NaN after.
fn exhausting(budget: usize) -> Individual<Vector> {
    let calls = Arc::new(AtomicUsize::new(0));
    template().with_evaluator(move |v: &Vector| {
        if calls.fetch_add(1, Ordering::SeqCst) < budget {
            v.0.iter().map(|x| x * x).sum::<f64>()
        } else {
            f64::NAN
        }
    })
}

#[test]
fn test_failed_steady_state_step_leaves_population_unchanged() {
    let options = minimizing(10, 5).replacement(Replacement::Count(2)).build().unwrap();
    let mut ga = SteadyStateGa::new(&exhausting(10), options).unwrap();
    ga.initialize(0).unwrap();
    let before = ga.population().members().to_vec();

    assert!(matches!(ga.step(), Err(GeneticError::FitnessCalculation(_))));
    assert_eq!(ga.population().len(), 10);
    assert!(ga.population().members() == &before[..]);
    assert_eq!(ga.statistics().generation(), 0);
    ga.population().check_consistency().unwrap();
}

#[test]
fn test_failed_deme_step_leaves_every_deme_unchanged() {
    let options = minimizing(5, 5).num_populations(3).build().unwrap();
    let mut ga = DemeGa::new(&exhausting(15), options).unwrap();
    ga.set_scaling(NoScaling);
    ga.initialize(0).unwrap();
    let before: Vec<_> = (0..3)
        .map(|i| ga.deme(i).unwrap().members().to_vec())
        .collect();

    assert!(ga.step().is_err());
    assert_eq!(ga.total_size(), 15);
    for (i, members) in before.iter().enumerate() {
        assert!(ga.deme(i).unwrap().members() == &members[..]);
        assert_eq!(ga.deme_statistics(i).unwrap().generation(), 0);
    }
}
