use evopop::{
    error::GeneticError,
    evolution::{GaOptions, Goal, LogLevel, Replacement, ReplacementStrategy},
    statistics::ScoreSelection,
};

#[test]
fn test_defaults() {
    let options = GaOptions::default();
    assert_eq!(options.get_population_size(), 30);
    assert_eq!(options.get_num_generations(), 250);
    assert_eq!(options.get_p_mutation(), 0.01);
    assert_eq!(options.get_p_crossover(), 0.9);
    assert_eq!(options.get_replacement(), Replacement::Fraction(0.25));
    assert_eq!(options.get_goal(), Goal::Maximize);
    assert_eq!(options.get_replacement_strategy(), ReplacementStrategy::Worst);
    assert_eq!(options.get_log_level(), LogLevel::None);
    assert!(options.get_elitism());
    assert!(options.get_score_file().is_none());
    options.validate().unwrap();
}

#[test]
fn test_builder_rejects_bad_values() {
    let bad_probability = GaOptions::builder().p_mutation(-0.1).build();
    assert!(matches!(bad_probability, Err(GeneticError::InvalidArgument(_))));

    let empty = GaOptions::builder().population_size(0).build();
    assert!(matches!(empty, Err(GeneticError::Configuration(_))));

    let fraction = GaOptions::builder()
        .replacement(Replacement::Fraction(0.0))
        .build();
    assert!(fraction.is_err());
}

#[test]
fn test_builder_sets_every_field() {
    let options = GaOptions::builder()
        .population_size(12)
        .num_generations(40)
        .p_mutation(0.02)
        .p_crossover(0.7)
        .p_convergence(0.95)
        .n_convergence(8)
        .replacement(Replacement::Count(4))
        .score_frequency(2)
        .flush_frequency(10)
        .score_file("scores.dat")
        .score_selection(ScoreSelection::MAX)
        .record_diversity(true)
        .elitism(false)
        .num_populations(3)
        .migration_count(2)
        .migration_frequency(5)
        .num_best(3)
        .goal(Goal::Minimize)
        .num_offspring(4)
        .replacement_strategy(ReplacementStrategy::Parent)
        .seed(99)
        .log_level(LogLevel::Minimal)
        .build()
        .unwrap();

    assert_eq!(options.get_population_size(), 12);
    assert_eq!(options.get_n_convergence(), 8);
    assert_eq!(options.get_replacement(), Replacement::Count(4));
    assert_eq!(
        options.get_score_file().map(|p| p.to_string_lossy().into_owned()),
        Some("scores.dat".to_string())
    );
    assert_eq!(options.get_score_selection(), ScoreSelection::MAX);
    assert!(options.get_record_diversity());
    assert!(!options.get_elitism());
    assert_eq!(options.get_migration_frequency(), 5);
    assert_eq!(options.get_goal(), Goal::Minimize);
    assert_eq!(options.get_num_offspring(), 4);
    assert_eq!(options.get_seed(), 99);
    assert_eq!(options.get_log_level(), LogLevel::Minimal);
}

#[cfg(feature = "serde")]
#[test]
fn test_options_serde_round_trip() {
    let options = GaOptions::builder()
        .population_size(50)
        .replacement(Replacement::Count(7))
        .goal(Goal::Minimize)
        .score_file("history.dat")
        .build()
        .unwrap();
    let json = serde_json::to_string(&options).unwrap();
    let back: GaOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}
