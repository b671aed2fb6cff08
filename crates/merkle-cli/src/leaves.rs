use anyhow::{Context, Result};
use base64::Engine as _;
use clap::{Args, ValueEnum};
use engine::{types::LeafEncoding, Digest};
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Encoding {
    Utf8,
    Base64,
    Hex,
}

impl From<Encoding> for LeafEncoding {
    fn from(e: Encoding) -> Self {
        match e {
            Encoding::Utf8 => LeafEncoding::Utf8,
            Encoding::Base64 => LeafEncoding::Base64,
            Encoding::Hex => LeafEncoding::Hex,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Hex,
    Base64,
}

impl OutputFormat {
    pub fn render(self, root: &Digest) -> String {
        match self {
            OutputFormat::Hex => hex::encode(root),
            OutputFormat::Base64 => base64::engine::general_purpose::STANDARD.encode(root),
        }
    }
}

/// Where leaves come from. Order: positional leaves, then files, then lines.
#[derive(Debug, Args)]
pub struct LeafArgs {
    /// Leaves given on the command line, decoded with --encoding.
    pub leaves: Vec<String>,

    /// Read a whole file as one leaf (raw bytes). Repeatable.
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Read one leaf per line from a file, or "-" for stdin.
    #[arg(long)]
    pub lines: Option<String>,

    /// Encoding of positional and line leaves.
    #[arg(long, value_enum, default_value_t = Encoding::Utf8)]
    pub encoding: Encoding,
}

impl LeafArgs {
    pub fn collect(&self) -> Result<Vec<Vec<u8>>> {
        let encoding = LeafEncoding::from(self.encoding);
        let mut out = Vec::new();

        for leaf in &self.leaves {
            out.push(encoding.decode(out.len(), leaf)?);
        }

        for path in &self.files {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            out.push(bytes);
        }

        if let Some(src) = &self.lines {
            let reader: Box<dyn BufRead> = if src == "-" {
                Box::new(BufReader::new(io::stdin()))
            } else {
                let f = fs::File::open(src).with_context(|| format!("opening {src}"))?;
                Box::new(BufReader::new(f))
            };
            for line in reader.lines() {
                // `lines` drops "\n" or "\r\n"; any other '\r' is leaf data.
                let line = line?;
                out.push(encoding.decode(out.len(), &line)?);
            }
        }

        Ok(out)
    }
}
