//! Binary model format.
//!
//! Every integer is a `u64` and every real an `f64`, both little-endian:
//!
//! ```text
//! num_layers, input_size, output_size
//! num_layers times:
//!     rows, cols
//!     rows * cols weights, row-major
//!     bias_len
//!     bias_len biases
//!     name_len, name bytes        (activation, UTF-8, no terminator)
//! name_len, name bytes            (loss)
//! ```
//!
//! There is no magic number or version field; a file is only recognisable
//! by parsing it.

use std::io::{self, Read, Write};

use crate::activation::registry::ActivationRegistry;
use crate::error::{Error, Result};
use crate::layers::LinearLayer;
use crate::loss::registry::LossRegistry;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

pub fn write_model<W: Write>(writer: &mut W, network: &Network) -> io::Result<()> {
    write_len(writer, network.num_layers())?;
    write_len(writer, network.input_size())?;
    write_len(writer, network.output_size())?;

    for (linear, activation) in network.layers() {
        let weights = linear.weights();
        write_len(writer, weights.rows)?;
        write_len(writer, weights.cols)?;
        for &w in weights.as_slice() {
            writer.write_all(&w.to_le_bytes())?;
        }

        write_len(writer, linear.bias().len())?;
        for &b in linear.bias() {
            writer.write_all(&b.to_le_bytes())?;
        }

        write_name(writer, activation.function().name())?;
    }

    write_name(writer, network.loss().name())
}

/// Reads a model, resolving function names against the registries.
///
/// A file that ends early is an [`Error::Io`] (`UnexpectedEof`); one whose
/// contents contradict each other is an [`Error::Corrupt`].
pub fn read_model<R: Read>(
    reader: &mut R,
    activations: &ActivationRegistry,
    losses: &LossRegistry,
) -> Result<Network> {
    let num_layers = read_len(reader)?;
    let input_size = read_len(reader)?;
    let output_size = read_len(reader)?;

    if num_layers == 0 {
        return Err(Error::Corrupt("model has no layers".into()));
    }

    let mut layers = Vec::new();
    for i in 0..num_layers {
        let rows = read_len(reader)?;
        let cols = read_len(reader)?;
        let count = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::Corrupt(format!("layer {i}: {rows}x{cols} weights overflow")))?;
        let weights = Matrix::from_vec(rows, cols, read_reals(reader, count)?);

        let bias_len = read_len(reader)?;
        if bias_len != rows {
            return Err(Error::Corrupt(format!(
                "layer {i}: {rows} weight rows but {bias_len} biases"
            )));
        }
        let bias = read_reals(reader, bias_len)?;

        let linear = LinearLayer::from_parts(weights, bias).map_err(as_corrupt)?;
        let activation = activations.get(&read_name(reader)?);
        layers.push((linear, activation));
    }

    let loss = losses.get(&read_name(reader)?);
    let network = Network::from_layers(layers, loss).map_err(as_corrupt)?;

    if network.input_size() != input_size || network.output_size() != output_size {
        return Err(Error::Corrupt(format!(
            "header declares {}->{} but layers map {}->{}",
            input_size,
            output_size,
            network.input_size(),
            network.output_size()
        )));
    }

    Ok(network)
}

fn as_corrupt(err: Error) -> Error {
    match err {
        Error::Architecture(msg) => Error::Corrupt(msg),
        other => other,
    }
}

fn write_len<W: Write>(writer: &mut W, len: usize) -> io::Result<()> {
    writer.write_all(&(len as u64).to_le_bytes())
}

fn write_name<W: Write>(writer: &mut W, name: &str) -> io::Result<()> {
    write_len(writer, name.len())?;
    writer.write_all(name.as_bytes())
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    let value = u64::from_le_bytes(buf);
    usize::try_from(value).map_err(|_| Error::Corrupt(format!("length {value} does not fit in memory")))
}

// Values are pushed one at a time so a bogus count in a short file fails
// with UnexpectedEof rather than a huge allocation.
fn read_reals<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    let mut buf = [0u8; 8];
    for _ in 0..count {
        reader.read_exact(&mut buf)?;
        values.push(f64::from_le_bytes(buf));
    }
    Ok(values)
}

fn read_name<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_len(reader)?;
    let mut bytes = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "model file ends inside a name").into());
    }
    String::from_utf8(bytes).map_err(|e| Error::Corrupt(format!("function name is not UTF-8: {e}")))
}
