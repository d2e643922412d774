/*!
Files or the standard streams, chosen on the command line with `-` meaning stdio.
*/

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        match self {
            Input::Stdin => {
                let mut buffer = Vec::new();
                io::stdin().lock().read_to_end(&mut buffer)?;
                Ok(buffer)
            }
            Input::File(path) => fs::read(path),
        }
    }

    pub fn read_to_string(&self) -> io::Result<String> {
        String::from_utf8(self.read_all()?).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl FromStr for Input {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => Input::Stdin,
            path => Input::File(PathBuf::from(path)),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn write_all(&self, data: &[u8]) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(data)?;
                out.flush()
            }
            Output::File(path) => fs::write(path, data),
        }
    }

    /// Text gets a trailing newline when it goes to a terminal-facing stream.
    pub fn write_text(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Stdout if !text.ends_with('\n') => self.write_all(format!("{text}\n").as_bytes()),
            _ => self.write_all(text.as_bytes()),
        }
    }
}

impl FromStr for Output {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "-" => Output::Stdout,
            path => Output::File(PathBuf::from(path)),
        })
    }
}
