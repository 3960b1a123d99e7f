use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdfo", about = "Reorder, rotate, delete and merge PDF pages", version)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge PDFs and images into one PDF, editing the page order on the way
    Merge {
        /// Input PDF or image files, in order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        #[command(flatten)]
        edits: EditArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Turn images into a PDF with one page per image
    Images {
        /// Input JPEG, PNG or WEBP files, in order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Rotate the image at this 1-based position a quarter turn
        /// counter-clockwise (repeatable)
        #[arg(long = "rotate", value_name = "POS")]
        rotate: Vec<usize>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show what the inputs would contribute, without writing anything
    Info {
        /// Input PDF or image files
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

/// Page edits, applied in order: moves, then rotations, then deletions.
/// Every position is 1-based and refers to the page order at that step.
#[derive(Args, Debug, Default, Clone)]
pub struct EditArgs {
    /// Move the page at FROM to position TO (repeatable)
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<(usize, usize)>,

    /// Rotate the page at POS a quarter turn counter-clockwise (repeatable)
    #[arg(long = "rotate", value_name = "POS")]
    pub rotate: Vec<usize>,

    /// Delete the page at POS (repeatable)
    #[arg(long = "delete", value_name = "POS")]
    pub delete: Vec<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Output PDF file (defaults to the configured file name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Load export options from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the effective export options to a JSON file
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Document title written to the PDF metadata
    #[arg(long)]
    pub title: Option<String>,

    /// PDF version of the output
    #[arg(long)]
    pub pdf_version: Option<String>,

    /// Write streams uncompressed
    #[arg(long)]
    pub no_compress: bool,
}

fn parse_move(value: &str) -> Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got {value}"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid position {part:?} in {value}"))
    };
    Ok((parse(from)?, parse(to)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_edits() {
        let cli = Cli::try_parse_from([
            "pdfo", "merge", "-i", "a.pdf", "b.png", "--move", "3:1", "--rotate", "2", "--rotate",
            "2", "--delete", "4", "-o", "out.pdf",
        ])
        .unwrap();

        let Commands::Merge {
            input,
            edits,
            export,
        } = cli.command
        else {
            panic!("expected merge");
        };
        assert_eq!(input, vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")]);
        assert_eq!(edits.moves, vec![(3, 1)]);
        assert_eq!(edits.rotate, vec![2, 2]);
        assert_eq!(edits.delete, vec![4]);
        assert_eq!(export.output, Some(PathBuf::from("out.pdf")));
        assert!(!export.no_compress);
    }

    #[test]
    fn test_move_requires_from_and_to() {
        let result = Cli::try_parse_from(["pdfo", "merge", "-i", "a.pdf", "--move", "3"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["pdfo", "merge", "-i", "a.pdf", "--move", "x:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["pdfo", "info"]).is_err());
        assert!(Cli::try_parse_from(["pdfo", "images", "-o", "out.pdf"]).is_err());
    }

    #[test]
    fn test_export_flags() {
        let cli = Cli::try_parse_from([
            "pdfo",
            "images",
            "-i",
            "scan.jpg",
            "--title",
            "Scans",
            "--pdf-version",
            "1.4",
            "--no-compress",
            "--config",
            "export.json",
        ])
        .unwrap();

        let Commands::Images { export, .. } = cli.command else {
            panic!("expected images");
        };
        assert_eq!(export.title.as_deref(), Some("Scans"));
        assert_eq!(export.pdf_version.as_deref(), Some("1.4"));
        assert!(export.no_compress);
        assert_eq!(export.config, Some(PathBuf::from("export.json")));
        assert_eq!(export.output, None);
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["pdfo", "-vv", "info", "-i", "a.pdf"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Debug);

        let cli = Cli::try_parse_from(["pdfo", "info", "-q", "-i", "a.pdf"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Error);

        let cli = Cli::try_parse_from(["pdfo", "info", "-i", "a.pdf"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Warn);

        assert!(Cli::try_parse_from(["pdfo", "-q", "-v", "info", "-i", "a.pdf"]).is_err());
    }
}
