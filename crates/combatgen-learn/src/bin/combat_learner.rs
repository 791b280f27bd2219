//! Train the outcome classifier on parsed replays and report held-out scores.
//!
//! Usage: `combat_learner [learn.yaml]`

use std::path::PathBuf;

use combatgen_learn::{ArmyBaseline, LearnConfig, Trainer, load_dataset};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    combatgen_core::init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = LearnConfig::load(config_path.as_deref())?;

    let dataset = load_dataset(&config.parsed_dir, &config)?;
    let [minerals, vespene] = dataset.class_counts();
    tracing::info!(minerals, vespene, "class balance");
    let (train, test) = dataset.split_holdout(config.test_size)?;

    let mut trainer = Trainer::new(&config, train.shape())?;
    println!("{}", trainer.network().summary());

    trainer.fit_with_hook(&train, |m| {
        let val = match (m.val_loss, m.val_accuracy) {
            (Some(loss), Some(acc)) => format!(" - val_loss: {loss:.4} - val_acc: {acc:.4}"),
            _ => String::new(),
        };
        println!(
            "Epoch {}/{} - loss: {:.4} - acc: {:.4}{}",
            m.epoch, config.epochs, m.loss, m.accuracy, val
        );
    })?;

    let score = trainer.evaluate(&test)?;
    println!("Loss = {}", score.loss);
    println!("Accuracy = {}", score.accuracy);
    if let Some(accuracy) = ArmyBaseline.accuracy(&test) {
        println!("Army baseline accuracy = {accuracy}");
    }
    Ok(())
}
