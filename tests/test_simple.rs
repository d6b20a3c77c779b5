use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use evopop::{
    error::{GeneticError, Result},
    evolution::{GaOptions, GeneticAlgorithm, Goal, LogLevel, SimpleGa, UponConvergence},
    genome::{Genome, Individual},
    rng::RandomNumberGenerator,
    scaling::SigmaTruncationScaling,
    selection::RouletteWheelSelector,
};

const WIDTH: usize = 10;
const HEIGHT: usize = 5;

/// A 10x5 binary grid scored by how many cells match a checkerboard.
#[derive(Clone, Debug, PartialEq)]
struct Grid {
    cells: Vec<bool>,
}

impl Grid {
    fn blank() -> Self {
        Self {
            cells: vec![false; WIDTH * HEIGHT],
        }
    }
}

impl Genome for Grid {
    fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        self.cells.iter_mut().for_each(|c| *c = rng.random_bit());
        Ok(())
    }

    fn mutate(&mut self, probability: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
        let mut flipped = 0;
        for cell in self.cells.iter_mut() {
            if rng.flip_coin(probability) {
                *cell = !*cell;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    fn compare(&self, other: &Self) -> Result<f64> {
        let differing = self
            .cells
            .iter()
            .zip(&other.cells)
            .filter(|(a, b)| a != b)
            .count();
        Ok(differing as f64 / self.cells.len() as f64)
    }

    fn evaluate(&self) -> Result<f64> {
        let matching = self
            .cells
            .iter()
            .enumerate()
            .filter(|(i, cell)| {
                let (x, y) = (i % WIDTH, i / WIDTH);
                **cell == ((x + y) % 2 == 0)
            })
            .count();
        Ok(matching as f64)
    }

    // Single-point crossover over the row-major layout.
    fn crossover(
        mom: &Self,
        dad: &Self,
        sister: Option<&mut Self>,
        brother: Option<&mut Self>,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let len = mom.cells.len();
        let site = rng.random_int(0, len);
        let mut produced = 0;
        if let Some(s) = sister {
            s.cells = mom.cells[..site]
                .iter()
                .chain(&dad.cells[site..])
                .copied()
                .collect();
            produced += 1;
        }
        if let Some(b) = brother {
            b.cells = dad.cells[..site]
                .iter()
                .chain(&mom.cells[site..])
                .copied()
                .collect();
            produced += 1;
        }
        Ok(produced)
    }
}

fn grid_engine(generations: usize) -> SimpleGa<Grid> {
    let options = GaOptions::builder()
        .population_size(30)
        .num_generations(generations)
        .p_mutation(0.001)
        .p_crossover(0.9)
        .elitism(true)
        .goal(Goal::Maximize)
        .build()
        .unwrap();
    let mut ga = SimpleGa::new(&Individual::new(Grid::blank()), options).unwrap();
    ga.population_mut().set_scaling(SigmaTruncationScaling::default());
    ga.population_mut().set_selector(RouletteWheelSelector::default());
    ga
}

/// Runs `ga` to completion, returning the best-ever score after each
/// generation.
fn trajectory(ga: &mut SimpleGa<Grid>, seed: u32) -> Vec<f64> {
    ga.initialize(seed).unwrap();
    let mut best = vec![ga.statistics().best_ever()];
    while !ga.done() {
        ga.step().unwrap();
        best.push(ga.statistics().best_ever());
    }
    best
}

#[test]
fn test_grid_best_ever_is_monotone() {
    let mut ga = grid_engine(400);
    let best = trajectory(&mut ga, 101);
    assert_eq!(best.len(), 401);
    for pair in best.windows(2) {
        assert!(pair[1] >= pair[0], "best-ever dropped: {:?}", pair);
    }
}

#[test]
fn test_grid_reaches_the_optimum() {
    let solved = [1u32, 2, 3, 4, 5]
        .iter()
        .filter(|&&seed| {
            let mut ga = grid_engine(400);
            let best = ga.evolve(seed).unwrap();
            best.score() == 50.0
        })
        .count();
    assert!(solved >= 3, "only {} of 5 runs reached 50", solved);
}

#[test]
fn test_same_seed_same_statistics() {
    let run = || {
        let mut ga = grid_engine(60);
        ga.initialize(2024).unwrap();
        let mut rows = Vec::new();
        while !ga.done() {
            ga.step().unwrap();
            let current = *ga.statistics().current();
            rows.push((current.mean, current.max, current.min, current.stddev));
        }
        rows
    };
    assert_eq!(run(), run());
}

#[test]
fn test_different_seeds_diverge() {
    let means = |seed| {
        let mut ga = grid_engine(5);
        ga.initialize(seed).unwrap();
        let mut means = vec![ga.statistics().current().mean];
        while !ga.done() {
            ga.step().unwrap();
            means.push(ga.statistics().current().mean);
        }
        means
    };
    assert_ne!(means(7), means(8));
}

#[test]
fn test_step_can_be_interleaved_with_done() {
    let mut ga = grid_engine(1000);
    ga.initialize(3).unwrap();
    for _ in 0..10 {
        assert!(!ga.done());
        ga.step().unwrap();
    }
    assert_eq!(ga.statistics().generation(), 10);
}

#[test]
fn test_convergence_terminator_stops_early() {
    let mut ga = grid_engine(5000);
    ga.set_terminator(UponConvergence);
    ga.evolve(9).unwrap();
    assert!(ga.statistics().generation() < 5000);
    assert!(ga.statistics().generation() >= 19);
}

#[test]
fn test_closure_terminator() {
    let mut ga = grid_engine(5000);
    ga.set_terminator(|s: &evopop::evolution::EvolutionState| s.best_ever >= 40.0);
    ga.evolve(4).unwrap();
    assert!(ga.statistics().best_ever() >= 40.0);
}

#[test]
fn test_verbose_logging_through_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let options = GaOptions::builder()
            .population_size(6)
            .num_generations(2)
            .log_level(LogLevel::Verbose)
            .build()
            .unwrap();
        let mut ga = SimpleGa::new(&Individual::new(Grid::blank()), options).unwrap();
        ga.evolve(12).unwrap();
        assert_eq!(ga.statistics().generation(), 2);
    });
}

#[test]
fn test_crossover_override() {
    let mut ga = grid_engine(5);
    ga.set_crossover(|mom: &Grid, _dad: &Grid, sister, brother, _rng| {
        let mut produced = 0;
        for child in [sister, brother].into_iter().flatten() {
            child.cells = mom.cells.clone();
            produced += 1;
        }
        Ok(produced)
    });
    ga.evolve(6).unwrap();
    assert!(ga.statistics().crossovers() > 0);
}

#[test]
fn test_evaluation_counts_only_changed_members() {
    let mut ga = grid_engine(10);
    ga.initialize(31).unwrap();
    assert_eq!(ga.statistics().evaluations(), 30);
    ga.step().unwrap();
    assert!(ga.statistics().evaluations() <= 60);
}

#[test]
fn test_failed_step_keeps_the_current_generation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let template = Individual::new(Grid::blank()).with_evaluator(move |g: &Grid| {
        if counter.fetch_add(1, Ordering::SeqCst) < 30 {
            g.evaluate().unwrap_or(0.0)
        } else {
            f64::NAN
        }
    });
    let options = GaOptions::builder()
        .population_size(30)
        .num_generations(5)
        .elitism(true)
        .build()
        .unwrap();
    let mut ga = SimpleGa::new(&template, options).unwrap();
    ga.initialize(8).unwrap();
    let before = ga.population().members().to_vec();

    assert!(matches!(ga.step(), Err(GeneticError::FitnessCalculation(_))));
    assert!(calls.load(Ordering::SeqCst) > 30);
    assert!(ga.population().members() == &before[..]);
    assert!(ga.population().iter().all(|m| m.is_evaluated()));
    assert_eq!(ga.statistics().generation(), 0);
}
