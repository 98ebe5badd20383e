/// MNIST digit classification example for ferrite-mlp.
///
/// Architecture: 784 → 16 (ReLU) → 16 (ReLU) → 10 (Softmax)
/// Loss:         square
/// Batch size:   10
/// Epochs:       5, then save, reload, and 5 more
///
/// Run with:
///   cargo run --example mnist --release -- <data dir> [model path]
///
/// The data directory must hold the four standard IDX files
/// (train-images.idx3-ubyte, train-labels.idx1-ubyte,
/// t10k-images.idx3-ubyte, t10k-labels.idx1-ubyte).

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use ferrite_mlp::{ActivationRegistry, LossRegistry, Network};
use tracing::info;
use tracing_subscriber::EnvFilter;

const IMAGE_MAGIC: u32 = 0x0000_0803;
const LABEL_MAGIC: u32 = 0x0000_0801;

// ---------------------------------------------------------------------------
// Data loading helpers
// ---------------------------------------------------------------------------

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf4 = [0u8; 4];
    reader.read_exact(&mut buf4)?;
    Ok(u32::from_be_bytes(buf4))
}

fn check_magic(path: &Path, found: u32, expected: u32) -> io::Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: magic number {found:#010x}, expected {expected:#010x}", path.display()),
        ))
    }
}

/// Reads an IDX3 image file, scaling pixels from [0, 255] to [0.0, 1.0].
fn load_images(path: &Path) -> io::Result<Vec<Vec<f64>>> {
    let mut reader = BufReader::new(File::open(path)?);
    check_magic(path, read_u32(&mut reader)?, IMAGE_MAGIC)?;

    let n_images = read_u32(&mut reader)? as usize;
    let rows = read_u32(&mut reader)? as usize;
    let cols = read_u32(&mut reader)? as usize;
    let n_pixels = rows * cols;

    let mut pixel_bytes = vec![0u8; n_images * n_pixels];
    reader.read_exact(&mut pixel_bytes)?;

    Ok(pixel_bytes
        .chunks(n_pixels)
        .map(|chunk| chunk.iter().map(|&p| p as f64 / 255.0).collect())
        .collect())
}

/// Reads an IDX1 label file into one-hot vectors of length 10.
fn load_labels(path: &Path) -> io::Result<Vec<Vec<f64>>> {
    let mut reader = BufReader::new(File::open(path)?);
    check_magic(path, read_u32(&mut reader)?, LABEL_MAGIC)?;

    let n_labels = read_u32(&mut reader)? as usize;
    let mut label_bytes = vec![0u8; n_labels];
    reader.read_exact(&mut label_bytes)?;

    Ok(label_bytes
        .iter()
        .map(|&label| {
            let mut one_hot = vec![0.0f64; 10];
            one_hot[label as usize] = 1.0;
            one_hot
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn accuracy(network: &Network, images: &[Vec<f64>], labels: &[Vec<f64>]) -> f64 {
    let correct = images
        .iter()
        .zip(labels)
        .filter(|(image, label)| argmax(&network.predict(image)) == argmax(label))
        .count();
    correct as f64 / images.len() as f64 * 100.0
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().ok_or("usage: mnist <data dir> [model path]")?;
    let model_path = args.next().unwrap_or_else(|| "mnist.model".to_owned());
    let data_dir = Path::new(&data_dir);

    let train_images = load_images(&data_dir.join("train-images.idx3-ubyte"))?;
    let train_labels = load_labels(&data_dir.join("train-labels.idx1-ubyte"))?;
    let test_images = load_images(&data_dir.join("t10k-images.idx3-ubyte"))?;
    let test_labels = load_labels(&data_dir.join("t10k-labels.idx1-ubyte"))?;
    info!(train = train_images.len(), test = test_images.len(), "Loaded MNIST.");

    let activations = ActivationRegistry::new();
    let losses = LossRegistry::new();

    let mut network = Network::new(&[28 * 28, 16, 16, 10], &["relu", "relu", "softmax"], "square")?;

    println!("Training started");
    network.train(5, &train_images, &train_labels);
    println!("Accuracy before save is {:.2}%", accuracy(&network, &test_images, &test_labels));

    network.save_model(&model_path)?;
    println!("Saved model to {model_path}");

    let mut loaded = Network::load_model(&model_path, &activations, &losses)?;
    loaded.train(5, &train_images, &train_labels);
    println!(
        "Accuracy after load and 5 more epochs is {:.2}%",
        accuracy(&loaded, &test_images, &test_labels)
    );

    Ok(())
}
