/*!
Compose command - encode JSON as CBOR
*/

use crate::io::{Input, Output};
use clap::Parser;
use serde_json::Value;
use tessera_cbor::{
    Error, Null,
    encode::{Encoder, ToCbor},
    io::Write,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Raw CBOR
    Binary,
    /// CBOR as a hex string
    Hex,
}

#[derive(Parser, Debug)]
#[command(
    about = "Encode JSON as CBOR",
    long_about = "Encode one or more whitespace-separated JSON values as a CBOR sequence.\n\n\
                  Integers that fit 64 bits are encoded as CBOR integers, other numbers as \
                  double-precision floats. Objects become maps with text keys, in key order."
)]
pub struct Command {
    #[arg(
        long,
        default_value = "binary",
        value_name = "FORMAT",
        help = "Output format: binary, hex"
    )]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input JSON file (use '-' for stdin)
    input: Input,
}

struct Json<'a>(&'a Value);

impl ToCbor for Json<'_> {
    fn to_cbor<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), Error> {
        match self.0 {
            Value::Null => encoder.emit(&Null),
            Value::Bool(b) => encoder.emit(b),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    encoder.emit(&v)
                } else if let Some(v) = n.as_i64() {
                    encoder.emit(&v)
                } else {
                    encoder.emit(&n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => encoder.emit(s.as_str()),
            Value::Array(a) => encoder.emit_array(Some(a.len()), |seq| {
                a.iter().try_for_each(|v| seq.emit(&Json(v)))
            }),
            Value::Object(o) => encoder.emit_map(Some(o.len()), |seq| {
                for (k, v) in o {
                    seq.emit(k.as_str())?;
                    seq.emit(&Json(v))?;
                }
                Ok(())
            }),
        }
    }
}

fn compose(text: &str) -> anyhow::Result<Vec<u8>> {
    let mut encoder = Encoder::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        encoder.emit(&Json(&value?))?;
    }
    tracing::debug!("Composed {} bytes of CBOR", encoder.offset());
    Ok(encoder.build())
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let cbor = compose(&self.input.read_to_string()?)?;

        let output = self.output.unwrap_or_default();
        match self.format {
            OutputFormat::Binary => output.write_all(&cbor)?,
            OutputFormat::Hex => output.write_text(&hex::encode(&cbor))?,
        }
        Ok(())
    }
}
