use ferrite_mlp::{ActivationRegistry, LossRegistry, Network, TrainConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ferrite_mlp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut network = Network::new(&[2, 4, 1], &["relu", "sigmoid"], "square")?;

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];

    let config = TrainConfig::new(1000, 1);
    for round in 0..5 {
        let loss = network.train_with(&inputs, &expected_outputs, &config);
        println!("Epoch {}: loss = {loss:.6}", (round + 1) * config.epochs);
    }

    let path = std::env::temp_dir().join("xor.model");
    network.save_model(&path)?;
    let network = Network::load_model(&path, &ActivationRegistry::new(), &LossRegistry::new())?;

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.predict(input)[0]);
    }
    Ok(())
}
