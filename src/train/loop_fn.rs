use std::time::Instant;

use tracing::{debug, trace};

use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Trains `network` for `config.epochs` epochs and returns the mean training
/// loss of the **last completed epoch** (0.0 if nothing ran).
///
/// Samples are visited in the order given, every epoch, in consecutive
/// batches of `config.batch_size`; the last batch of an epoch may be
/// shorter. Each batch's gradients are averaged over its actual length.
///
/// # Panics
/// Panics if `inputs` and `targets` differ in length, `batch_size == 0`, or
/// a sample has the wrong dimension.
pub fn train_loop(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainConfig,
) -> f64 {
    assert_eq!(
        inputs.len(),
        targets.len(),
        "inputs and targets must have equal length"
    );
    assert!(config.batch_size > 0, "batch_size must be at least 1");

    let mut last_train_loss = 0.0;

    for epoch in 1..=config.epochs {
        let t_start = Instant::now();

        let train_loss = run_one_epoch(network, inputs, targets, config.batch_size);
        last_train_loss = train_loss;

        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        debug!(epoch, total_epochs = config.epochs, train_loss, elapsed_ms, "Epoch finished.");

        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                train_loss,
                elapsed_ms,
            };
            // Nobody listening is fine; the run still completes.
            let _ = tx.send(stats);
        }
    }

    last_train_loss
}

/// One full pass of mini-batch gradient descent. Returns the mean loss.
fn run_one_epoch(network: &mut Network, inputs: &[Vec<f64>], targets: &[Vec<f64>], batch_size: usize) -> f64 {
    let n = inputs.len();
    if n == 0 {
        return 0.0;
    }

    let mut total_loss = 0.0;

    for (batch, (batch_inputs, batch_targets)) in
        inputs.chunks(batch_size).zip(targets.chunks(batch_size)).enumerate()
    {
        for (input, target) in batch_inputs.iter().zip(batch_targets) {
            total_loss += network.backpropagate(input, target);
        }
        network.apply_gradients(batch_inputs.len());
        trace!(batch, size = batch_inputs.len(), "Applied batch gradients.");
    }

    total_loss / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn regression() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let inputs = (0..7).map(|i| vec![i as f64 / 7.0]).collect();
        let targets = (0..7).map(|i| vec![0.2 + 0.5 * i as f64 / 7.0]).collect();
        (inputs, targets)
    }

    #[test]
    fn progress_is_reported_every_epoch() {
        let mut network = Network::new(&[1, 3, 1], &["relu", "sigmoid"], "square").unwrap();
        let (inputs, targets) = regression();
        let (tx, rx) = mpsc::channel();

        let config = TrainConfig::new(4, 3).with_progress(tx);
        let last = train_loop(&mut network, &inputs, &targets, &config);
        drop(config);

        let stats: Vec<EpochStats> = rx.iter().collect();
        assert_eq!(stats.iter().map(|s| s.epoch).collect::<Vec<_>>(), [1, 2, 3, 4]);
        assert!(stats.iter().all(|s| s.total_epochs == 4));
        assert_eq!(stats[3].train_loss, last);
    }

    #[test]
    fn dropped_receiver_does_not_stop_training() {
        let mut network = Network::new(&[1, 1], &["sigmoid"], "square").unwrap();
        let (inputs, targets) = regression();
        let (tx, rx) = mpsc::channel();
        drop(rx);

        let before = network.predict(&[0.5]);
        let config = TrainConfig::new(3, 2).with_progress(tx);
        train_loop(&mut network, &inputs, &targets, &config);
        assert_ne!(network.predict(&[0.5]), before);
    }

    #[test]
    fn empty_dataset_is_a_no_op() {
        let mut network = Network::new(&[1, 1], &["sigmoid"], "square").unwrap();
        let before = network.predict(&[0.5]);
        assert_eq!(train_loop(&mut network, &[], &[], &TrainConfig::new(5, 2)), 0.0);
        assert_eq!(network.predict(&[0.5]), before);
    }

    #[test]
    #[should_panic]
    fn mismatched_dataset_lengths_panic() {
        let mut network = Network::new(&[1, 1], &["sigmoid"], "square").unwrap();
        train_loop(&mut network, &[vec![0.0]], &[], &TrainConfig::new(1, 1));
    }

    #[test]
    #[should_panic]
    fn zero_batch_size_panics() {
        let mut network = Network::new(&[1, 1], &["sigmoid"], "square").unwrap();
        train_loop(&mut network, &[vec![0.0]], &[vec![1.0]], &TrainConfig::new(1, 0));
    }
}
