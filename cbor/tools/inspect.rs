/*!
Inspect command - list the top-level items of a CBOR sequence
*/

use super::io::{Input, Output};
use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tessera_cbor::{
    decode,
    header::{self, ItemHeader, Major},
    io::SliceReader,
    skip,
};

#[derive(Parser, Debug)]
#[command(about = "List the top-level items of a CBOR sequence", long_about = None)]
pub struct Command {
    #[arg(
        long,
        default_value = "text",
        value_name = "FORMAT",
        help = "Output format: text, json, hex"
    )]
    format: OutputFormat,

    /// Refuse items with more containers open at once than this
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input CBOR file (use '-' for stdin)
    input: Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// One line per item
    Text,
    /// An array of item descriptions
    Json,
    /// Each item's bytes as hex, one per line
    Hex,
}

#[derive(Debug)]
struct Item<'a> {
    offset: usize,
    header: ItemHeader,
    bytes: &'a [u8],
}

impl Item<'_> {
    /// Short rendering of scalars; containers and strings show their size.
    fn summary(&self) -> String {
        let header = &self.header;
        match header.major() {
            Major::Unsigned => header.argument().to_string(),
            Major::Negative => (-1 - header.argument() as i128).to_string(),
            Major::Bytes | Major::Text | Major::Array | Major::Map => match header.length() {
                Some(n) => format!("({n})"),
                None => "(_)".to_string(),
            },
            Major::Tag => format!("{}(..)", header.argument()),
            Major::Special => match header.lead() {
                header::FALSE => "false".to_string(),
                header::TRUE => "true".to_string(),
                header::NULL => "null".to_string(),
                header::HALF_FLOAT | header::SINGLE_FLOAT | header::DOUBLE_FLOAT => {
                    match decode::parse::<f64>(self.bytes) {
                        Ok(v) => format!("{v:?}"),
                        Err(e) => format!("<{e}>"),
                    }
                }
                _ => format!("simple({})", header.argument()),
            },
        }
    }
}

fn walk(data: &[u8], max_depth: usize) -> anyhow::Result<Vec<Item<'_>>> {
    let mut items = Vec::new();
    let mut input = SliceReader::new(data);
    while !input.is_empty() {
        let offset = input.position();
        let header = header::parse_header(&mut SliceReader::new(input.remaining()))
            .with_context(|| format!("Invalid item header at offset {offset}"))?;

        skip::skip_item_bounded(&mut input, max_depth)
            .with_context(|| format!("Invalid item at offset {offset}"))?;

        tracing::debug!("{} at offset {offset}", header.major().name());
        items.push(Item {
            offset,
            header,
            bytes: &data[offset..input.position()],
        });
    }
    Ok(items)
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let data = self.input.read_all()?;
        let items = walk(&data, self.max_depth.unwrap_or(usize::MAX))?;

        let text = match self.format {
            OutputFormat::Text => items
                .iter()
                .map(|item| {
                    format!(
                        "{:>8} {:>8}  {:<16} {}",
                        item.offset,
                        item.bytes.len(),
                        item.header.major().name(),
                        item.summary()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => serde_json::to_string_pretty(
                &items
                    .iter()
                    .map(|item| {
                        json!({
                            "offset": item.offset,
                            "length": item.bytes.len(),
                            "major": item.header.major() as u8,
                            "argument": item.header.length(),
                            "indefinite": item.header.is_indefinite(),
                            "summary": item.summary(),
                        })
                    })
                    .collect::<Vec<_>>(),
            )?,
            OutputFormat::Hex => items
                .iter()
                .map(|item| hex::encode(item.bytes))
                .collect::<Vec<_>>()
                .join("\n"),
        };

        self.output.unwrap_or_default().write_text(&text)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn walks_a_sequence() {
        let data = [
            0x01, 0x39, 0x03, 0xe7, 0x82, 0xf5, 0xf6, 0xbf, 0x61, 0x61, 0x01, 0xff, 0xf9, 0x3e,
            0x00,
        ];
        let items = walk(&data, usize::MAX).unwrap();
        let summary = items
            .iter()
            .map(|item| (item.offset, item.bytes.len(), item.summary()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                (0, 1, "1".to_string()),
                (1, 3, "-1000".to_string()),
                (4, 3, "(2)".to_string()),
                (7, 5, "(_)".to_string()),
                (12, 3, "1.5".to_string()),
            ]
        );
    }

    #[test]
    fn reports_offset_of_bad_item() {
        let err = walk(&[0x01, 0x82, 0x01], usize::MAX).unwrap_err();
        assert_eq!(err.to_string(), "Invalid item at offset 1");

        assert!(walk(&[0x81, 0x81, 0x00], 1).is_ok());
        assert!(walk(&[0x82, 0x81, 0x00, 0x00], 1).is_err());
    }
}
