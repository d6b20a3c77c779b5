use crate::genome::Genome;

/// The objective function a population is evolved against.
///
/// Closures `Fn(&G) -> f64` implement `Challenge` directly.
pub trait Challenge<G: Genome>: Send + Sync {
    fn score(&self, genome: &G) -> f64;
}

impl<G, F> Challenge<G> for F
where
    G: Genome,
    F: Fn(&G) -> f64 + Send + Sync,
{
    fn score(&self, genome: &G) -> f64 {
        self(genome)
    }
}
