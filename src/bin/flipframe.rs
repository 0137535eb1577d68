use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flipframe", version)]
struct Cli {
    /// Editor config JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate project JSON files (directories are scanned for `*.json`).
    Validate(ValidateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Export a project as an animated GIF.
    Gif(GifArgs),
    /// Concatenate frame ranges of several projects into one project.
    Montage(MontageArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Project files or directories.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Also require the config's width, height and fps.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Number of preceding frames to ghost (0 renders the frame alone).
    #[arg(long, default_value_t = 0)]
    onion: usize,

    /// Upscale to the configured display size.
    #[arg(long)]
    display: bool,
}

#[derive(Parser, Debug)]
struct GifArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct MontageArgs {
    /// Inputs as `PATH` or `PATH@START..END` (half-open, 0-based).
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => flipframe::EditorConfig::from_json_file(path)?,
        None => flipframe::EditorConfig::default(),
    };
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args, &cfg),
        Command::Frame(args) => cmd_frame(args, &cfg).map(|()| ExitCode::SUCCESS),
        Command::Gif(args) => cmd_gif(args, &cfg).map(|()| ExitCode::SUCCESS),
        Command::Montage(args) => cmd_montage(args, &cfg).map(|()| ExitCode::SUCCESS),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn collect_json_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("read dir '{}'", path.display()))?
            {
                let p = entry?.path();
                if p.extension().is_some_and(|e| e == "json") {
                    found.push(p);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_validate(args: ValidateArgs, cfg: &flipframe::EditorConfig) -> anyhow::Result<ExitCode> {
    let files = collect_json_files(&args.paths)?;
    if files.is_empty() {
        eprintln!("no project JSON files found");
        return Ok(ExitCode::from(1));
    }
    let expected = if args.strict {
        flipframe::Expected::from_config(cfg)
    } else {
        flipframe::Expected::default()
    };

    let mut ok = true;
    for path in &files {
        let name = display_name(path);
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("{name}: failed to read: {e}");
                ok = false;
                continue;
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{name}: invalid JSON: {e}");
                ok = false;
                continue;
            }
        };
        let report = flipframe::validate_project(&value, &expected);
        if report.ok {
            let frames = value["frames"].as_array().map_or(0, Vec::len);
            println!(
                "{name}: OK ({frames} frames {}x{})",
                value["width"], value["height"]
            );
        } else {
            eprintln!("{name}: {}", report.errors.join("; "));
            ok = false;
        }
    }

    if ok {
        println!("all {} files validated successfully", files.len());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("one or more files failed validation");
        Ok(ExitCode::from(2))
    }
}

fn read_project(path: &Path) -> anyhow::Result<flipframe::ProjectData> {
    let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
    let project: flipframe::ProjectData = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse project '{}'", path.display()))?;
    Ok(project)
}

fn load_project_frames(
    path: &Path,
    cfg: &flipframe::EditorConfig,
) -> anyhow::Result<Vec<flipframe::PixelBuffer>> {
    let project = read_project(path)?;
    Ok(flipframe::load_frames(&project, cfg)?)
}

fn cmd_frame(args: FrameArgs, cfg: &flipframe::EditorConfig) -> anyhow::Result<()> {
    let frames = load_project_frames(&args.in_path, cfg)?;
    if args.frame >= frames.len() {
        anyhow::bail!(
            "frame {} out of range (project has {} frames)",
            args.frame,
            frames.len()
        );
    }

    let mut rgba = if args.onion > 0 {
        flipframe::compose_with_onion_skin(&frames, args.frame, args.onion)?
    } else {
        flipframe::compose_frame_only(&frames, args.frame)?
    };
    if args.display {
        rgba = rgba.scaled(cfg.display, cfg.display);
    }

    flipframe::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &rgba.data,
        rgba.width,
        rgba.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_gif(args: GifArgs, cfg: &flipframe::EditorConfig) -> anyhow::Result<()> {
    let frames = load_project_frames(&args.in_path, cfg)?;
    flipframe::write_gif(&args.out, &frames, cfg)?;
    eprintln!("wrote {} ({} frames)", args.out.display(), frames.len());
    Ok(())
}

/// Split `PATH@START..END` into a path and an optional range.
///
/// An `@` not followed by a `START..END` suffix (no `..`, or a path separator after it) is
/// part of the path.
fn parse_montage_input(input: &str) -> anyhow::Result<(PathBuf, Option<(usize, usize)>)> {
    let suffix = input.rsplit_once('@').and_then(|(path, range)| {
        if range.contains(['/', '\\']) {
            return None;
        }
        range.split_once("..").map(|bounds| (path, bounds))
    });
    let Some((path, (start, end))) = suffix else {
        return Ok((PathBuf::from(input), None));
    };
    let start: usize = start
        .parse()
        .with_context(|| format!("invalid range start in '{input}'"))?;
    let end: usize = end
        .parse()
        .with_context(|| format!("invalid range end in '{input}'"))?;
    Ok((PathBuf::from(path), Some((start, end))))
}

fn cmd_montage(args: MontageArgs, cfg: &flipframe::EditorConfig) -> anyhow::Result<()> {
    let mut timeline = flipframe::MontageTimeline::new(cfg.canvas());
    for input in &args.inputs {
        let (path, range) = parse_montage_input(input)?;
        let index = timeline.import_path(&path)?;
        if let Some((start, end)) = range {
            timeline.trim(index, start, end)?;
        }
    }

    let project = timeline.export(cfg);
    project.write_to_path(&args.out)?;
    eprintln!(
        "wrote {} ({} frames from {} chunks)",
        args.out.display(),
        project.frame_count,
        timeline.chunks().len()
    );
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/bin/flipframe.rs"]
mod tests;
