use std::fs;
use std::path::PathBuf;

use evopop::{
    error::Result,
    evolution::{GaOptions, GeneticAlgorithm, SimpleGa},
    genome::{Genome, Individual},
    population::Population,
    rng::RandomNumberGenerator,
    statistics::{ScoreSelection, Statistics},
};

#[derive(Clone, Debug, PartialEq)]
struct Bits(Vec<bool>);

impl Genome for Bits {
    fn initialize(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        self.0.iter_mut().for_each(|b| *b = rng.random_bit());
        Ok(())
    }

    fn mutate(&mut self, probability: f64, rng: &mut RandomNumberGenerator) -> Result<usize> {
        let mut flipped = 0;
        for bit in self.0.iter_mut() {
            if rng.flip_coin(probability) {
                *bit = !*bit;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    fn evaluate(&self) -> Result<f64> {
        Ok(self.0.iter().filter(|b| **b).count() as f64)
    }
}

fn score_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("evopop-{}-{}.dat", name, std::process::id()))
}

fn engine(options: GaOptions) -> SimpleGa<Bits> {
    SimpleGa::new(&Individual::new(Bits(vec![false; 16])), options).unwrap()
}

#[test]
fn test_score_file_is_rewritten_per_run() {
    let path = score_path("history");
    let options = GaOptions::builder()
        .population_size(10)
        .num_generations(7)
        .score_frequency(1)
        .flush_frequency(3)
        .score_file(&path)
        .build()
        .unwrap();

    for _ in 0..2 {
        let mut ga = engine(options.clone());
        ga.evolve(5).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 8);
        assert!(rows[0].starts_with("0\t"));
        assert!(rows[7].starts_with("7\t"));
        assert_eq!(rows[0].split('\t').count(), 6);
    }
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_score_selection_chooses_columns() {
    let path = score_path("columns");
    let options = GaOptions::builder()
        .population_size(6)
        .num_generations(4)
        .score_frequency(2)
        .flush_frequency(1)
        .score_selection(ScoreSelection::MEAN | ScoreSelection::MAX)
        .score_file(&path)
        .build()
        .unwrap();
    engine(options).evolve(1).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let generations: Vec<&str> = text
        .lines()
        .map(|row| {
            assert_eq!(row.split('\t').count(), 3);
            row.split('\t').next().unwrap()
        })
        .collect();
    assert_eq!(generations, vec!["0", "2", "4"]);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_best_of_all_tracks_distinct_individuals() {
    let options = GaOptions::builder()
        .population_size(20)
        .num_generations(15)
        .num_best(4)
        .build()
        .unwrap();
    let mut ga = engine(options);
    let best = ga.evolve(8).unwrap();

    let tracked = ga.statistics().best_individuals();
    assert_eq!(tracked.len(), 4);
    assert!(tracked[0] == best);
    for pair in tracked.windows(2) {
        assert!(pair[0].score() >= pair[1].score());
    }
    for (i, a) in tracked.iter().enumerate() {
        for b in &tracked[i + 1..] {
            assert!(a != b);
        }
    }
    assert_eq!(ga.statistics().best_population().len(), 4);
}

#[test]
fn test_best_of_all_never_exceeds_population() {
    let members = [1.0, 2.0]
        .iter()
        .map(|v| Individual::new(Bits(vec![*v > 1.5; 3])))
        .collect();
    let mut pop = Population::from_individuals(members);
    pop.evaluate(false).unwrap();

    let mut stats = Statistics::new();
    stats.set_best_size(5);
    stats.reset(&mut pop).unwrap();
    assert_eq!(stats.best_individuals().len(), 2);
}

#[test]
fn test_running_averages() {
    let options = GaOptions::builder()
        .population_size(10)
        .num_generations(12)
        .build()
        .unwrap();
    let mut ga = engine(options);
    ga.evolve(14).unwrap();

    let stats = ga.statistics();
    assert!(stats.offline_max() <= stats.max_ever());
    assert!(stats.offline_min() >= stats.min_ever());
    assert!(stats.online() >= stats.min_ever() && stats.online() <= stats.max_ever());
    assert_eq!(stats.best_ever(), stats.max_ever());
    assert!(stats.evaluations() >= 10);

    let report = stats.to_string();
    assert!(report.contains("generations:        12"));
}
