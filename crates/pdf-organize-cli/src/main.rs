mod cli;
mod logger;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use cli::{Cli, Commands, EditArgs, ExportArgs};
use logger::CliLogger;
use pdf_organize::{
    Collection, DirectorySink, EditingSession, ExportOptions, InputKind, ItemId, Source,
};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(cli.log_level())
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Merge {
            input,
            edits,
            export,
        } => {
            let mut session = load_session(&input).await?;
            apply_edits(session.collection_mut(), &edits)?;
            export_session(&session, &export, "Merged").await?;
        }

        Commands::Images {
            input,
            rotate,
            export,
        } => {
            let files = pdf_organize::load_input_files(&input).await?;
            if let Some(file) = files
                .iter()
                .find(|file| !matches!(file.kind(), InputKind::Image(_)))
            {
                bail!("{} is not a JPEG, PNG or WEBP image", file.name);
            }

            let mut session = EditingSession::new();
            session.load_files(&files)?;
            let edits = EditArgs {
                rotate,
                ..EditArgs::default()
            };
            apply_edits(session.collection_mut(), &edits)?;
            export_session(&session, &export, "Converted").await?;
        }

        Commands::Info { input } => {
            let session = load_session(&input).await?;
            let stats = session.statistics();

            println!("Sources:");
            for (index, source) in session.registry().iter().enumerate() {
                let kind = match source {
                    Source::Pdf(_) => "pages",
                    Source::Image(_) => "image",
                };
                println!(
                    "  {}. {} ({} {})",
                    index + 1,
                    source.name(),
                    source.content_count(),
                    kind
                );
            }
            println!("Collection Statistics:");
            println!("  Items: {}", stats.items);
            println!("  Sources: {}", stats.sources);
            println!("  Output pages: {}", stats.items - stats.skipped_on_export);
            if stats.skipped_on_export > 0 {
                println!("  Skipped on export: {}", stats.skipped_on_export);
            }
        }
    }

    Ok(())
}

async fn load_session(input: &[PathBuf]) -> Result<EditingSession> {
    let files = pdf_organize::load_input_files(input).await?;
    let mut session = EditingSession::new();
    let summary = session.load_files(&files)?;

    for name in &summary.skipped {
        println!("Skipped unsupported input {}", name);
    }
    if session.collection().is_empty() {
        bail!("No pages or images loaded");
    }
    Ok(session)
}

/// Resolve a 1-based position to the item currently there.
fn item_at(collection: &Collection, position: usize) -> Result<ItemId> {
    position
        .checked_sub(1)
        .and_then(|index| collection.items().get(index))
        .map(|item| item.id.clone())
        .ok_or_else(|| {
            anyhow!(
                "Position {} out of range (1..={})",
                position,
                collection.len()
            )
        })
}

fn apply_edits(collection: &mut Collection, edits: &EditArgs) -> Result<()> {
    for &(from, to) in &edits.moves {
        let moved = item_at(collection, from)?;
        let target = item_at(collection, to)?;
        collection.reorder(&moved, &target);
    }

    for &position in &edits.rotate {
        let id = item_at(collection, position)?;
        collection.toggle_selection(&id, false);
        collection.rotate_selected();
    }
    collection.clear_selection();

    // Resolve every position before deleting anything
    let doomed = edits
        .delete
        .iter()
        .map(|&position| item_at(collection, position))
        .collect::<Result<Vec<_>>>()?;
    for id in &doomed {
        if !collection.is_selected(id) {
            collection.toggle_selection(id, true);
        }
    }
    collection.delete_selected();

    Ok(())
}

async fn export_options(args: &ExportArgs) -> Result<ExportOptions> {
    let mut options = match &args.config {
        Some(path) => ExportOptions::load(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ExportOptions::default(),
    };

    if let Some(title) = &args.title {
        options.title = Some(title.clone());
    }
    if let Some(version) = &args.pdf_version {
        options.pdf_version = version.clone();
    }
    if args.no_compress {
        options.compress = false;
    }

    if let Some(path) = &args.save_config {
        options.save(path).await?;
        println!("Saved export options → {}", path.display());
    }

    Ok(options)
}

/// Split an output path into the sink directory and the file name.
fn output_target(output: Option<&Path>, options: &ExportOptions) -> Result<(PathBuf, String)> {
    let Some(output) = output else {
        return Ok((PathBuf::from("."), options.file_name.clone()));
    };

    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Output path {} has no file name", output.display()))?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

async fn export_session(session: &EditingSession, args: &ExportArgs, verb: &str) -> Result<()> {
    let mut options = export_options(args).await?;
    let (dir, file_name) = output_target(args.output.as_deref(), &options)?;
    options.file_name = file_name;

    let mut sink = DirectorySink::new(dir);
    let report = session.export_to(&options, &mut sink).await?;

    for id in &report.skipped {
        let position = session
            .collection()
            .page_number(id)
            .map(|n| n.to_string())
            .unwrap_or_default();
        println!("Skipped item {} (image format cannot be embedded)", position);
    }
    println!(
        "{} {} pages → {}",
        verb,
        report.page_count,
        sink.path_for(&report.file_name).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_organize::Item;

    fn collection(len: usize) -> Collection {
        let mut collection = Collection::new();
        collection.append((0..len).map(|i| Item::new(ItemId::new(format!("p{}", i + 1)), 0, i)));
        collection
    }

    fn order(collection: &Collection) -> Vec<&str> {
        collection.items().iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_apply_edits_in_order() {
        let mut pages = collection(5);
        let edits = EditArgs {
            moves: vec![(5, 1)],
            rotate: vec![1, 1],
            delete: vec![2, 4, 2],
        };

        apply_edits(&mut pages, &edits).unwrap();

        assert_eq!(order(&pages), vec!["p5", "p2", "p4"]);
        assert_eq!(pages.items()[0].rotation.degrees(), 180);
        assert!(!pages.has_selection());
    }

    #[test]
    fn test_out_of_range_position_is_an_error() {
        let mut pages = collection(2);
        let edits = EditArgs {
            delete: vec![3],
            ..EditArgs::default()
        };
        assert!(apply_edits(&mut pages, &edits).is_err());

        let edits = EditArgs {
            rotate: vec![0],
            ..EditArgs::default()
        };
        assert!(apply_edits(&mut pages, &edits).is_err());
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_output_target() {
        let options = ExportOptions::default();

        let (dir, name) = output_target(None, &options).unwrap();
        assert_eq!((dir, name.as_str()), (PathBuf::from("."), "organized.pdf"));

        let (dir, name) = output_target(Some(Path::new("out/merged.pdf")), &options).unwrap();
        assert_eq!((dir, name.as_str()), (PathBuf::from("out"), "merged.pdf"));

        let (dir, name) = output_target(Some(Path::new("merged.pdf")), &options).unwrap();
        assert_eq!((dir, name.as_str()), (PathBuf::from("."), "merged.pdf"));
    }
}
