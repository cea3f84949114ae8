//! bevelicon command-line frontend.
//!
//! Provides three subcommands:
//!
//! - **render** (default sizes 16–512): rasterizes the artwork once per size
//!   and writes one PNG per size, optionally bundling the ≤256 px images into
//!   a `.ico`.
//! - **inspect**: lists the chunks of a PNG, verifies CRCs and reports the
//!   header and opaque bounds.
//! - **script**: prints the built-in artwork as JSON, a starting point for
//!   `render --script`.
//!
//! Log verbosity comes from `BEVELICON_LOG` (tracing `EnvFilter` syntax),
//! falling back to `info`, or `debug`/`warn` with `-v`/`-q`.

use anyhow::{bail, Context, Result};
use bevelicon_core::artwork::Script;
use bevelicon_core::driver::{render_sizes, IconSink, DEFAULT_SIZES};
use bevelicon_core::ico::{encode_ico, MAX_ICO_SIZE};
use bevelicon_core::png::{decode_png, read_chunks, PngEncoder, DEFAULT_LEVEL};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "BEVELICON_LOG";
/// Placeholder replaced by the edge length in output file names.
const SIZE_PLACEHOLDER: &str = "{size}";

#[derive(Parser, Debug)]
#[command(name = "bevelicon", version, about = "Render a bevel-style monitor icon as PNG at multiple sizes")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the icon at every requested size
    Render(RenderArgs),
    /// Show the chunk structure of PNG files
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the built-in artwork script as JSON
    Script,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Comma-separated output sizes in pixels
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES.to_vec())]
    sizes: Vec<u32>,

    /// Directory the PNG files are written to (created if missing)
    #[arg(short, long, default_value = "icons")]
    out_dir: PathBuf,

    /// File name pattern; `{size}` is replaced by the edge length
    #[arg(long, default_value = "{size}x{size}.png")]
    name_template: String,

    /// zlib compression level, 0 (stored) to 10 (best)
    #[arg(long, default_value_t = DEFAULT_LEVEL, value_parser = clap::value_parser!(u8).range(0..=10))]
    level: u8,

    /// JSON drawing script to render instead of the built-in artwork
    #[arg(long)]
    script: Option<PathBuf>,

    /// Also bundle sizes up to 256 px into this .ico file
    #[arg(long)]
    ico: Option<PathBuf>,
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn init_logging(verbose: u8, quiet: bool) {
    let fallback = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ─── Directory sink ─────────────────────────────────────────────────────────

/// Writes each image to `dir/<template>` and optionally keeps ICO-sized
/// images in memory.
struct DirSink {
    dir: PathBuf,
    template: String,
    keep_for_ico: bool,
    ico_images: Vec<(u32, Vec<u8>)>,
}

impl DirSink {
    fn new(dir: &Path, template: &str, keep_for_ico: bool) -> Self {
        DirSink {
            dir: dir.to_path_buf(),
            template: template.to_string(),
            keep_for_ico,
            ico_images: Vec::new(),
        }
    }

    fn path_for(&self, size: u32) -> PathBuf {
        self.dir.join(file_name(&self.template, size).into_owned())
    }
}

impl IconSink for DirSink {
    fn accept(&mut self, size: u32, png: Vec<u8>) -> bevelicon_core::Result<()> {
        let path = self.path_for(size);
        fs::write(&path, &png).map_err(|e| bevelicon_core::Error::Sink {
            size,
            message: format!("{}: {}", path.display(), e),
        })?;
        info!("wrote {} ({} bytes)", path.display(), png.len());
        if self.keep_for_ico && size <= MAX_ICO_SIZE {
            // A repeated size replaces its earlier image, like the file on disk
            match self.ico_images.iter_mut().find(|(s, _)| *s == size) {
                Some(entry) => entry.1 = png,
                None => self.ico_images.push((size, png)),
            }
        }
        Ok(())
    }
}

fn file_name(template: &str, size: u32) -> Cow<'_, str> {
    if template.contains(SIZE_PLACEHOLDER) {
        Cow::Owned(template.replace(SIZE_PLACEHOLDER, &size.to_string()))
    } else {
        Cow::Borrowed(template)
    }
}

// ─── Commands ───────────────────────────────────────────────────────────────

fn load_script(path: &Path) -> Result<Script> {
    let text = fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    let script: Script = serde_json::from_str(&text).with_context(|| format!("parsing script {}", path.display()))?;
    if script.ops.is_empty() {
        warn!("script {} has no drawing operations", path.display());
    }
    Ok(script)
}

fn run_render(args: &RenderArgs) -> Result<bool> {
    if args.sizes.is_empty() {
        bail!("no sizes requested");
    }
    if args.sizes.len() > 1 && !args.name_template.contains(SIZE_PLACEHOLDER) {
        bail!("name template {:?} must contain {} when rendering several sizes", args.name_template, SIZE_PLACEHOLDER);
    }

    let script = match &args.script {
        Some(path) => load_script(path)?,
        None => Script::monitor(),
    };

    fs::create_dir_all(&args.out_dir).with_context(|| format!("creating {}", args.out_dir.display()))?;

    let encoder = PngEncoder::with_level(args.level);
    let mut sink = DirSink::new(&args.out_dir, &args.name_template, args.ico.is_some());
    info!("rendering {:?} at {} size(s)", script.name, args.sizes.len());
    let report = render_sizes(&args.sizes, &script.ops, &encoder, &mut sink);

    for (size, e) in &report.failed {
        error!("size {}: {}", size, e);
    }

    if let Some(ico_path) = &args.ico {
        if sink.ico_images.is_empty() {
            warn!("no image of {} px or less was rendered, skipping {}", MAX_ICO_SIZE, ico_path.display());
        } else {
            let ico = encode_ico(&sink.ico_images)?;
            fs::write(ico_path, &ico).with_context(|| format!("writing {}", ico_path.display()))?;
            info!("wrote {} ({} images, {} bytes)", ico_path.display(), sink.ico_images.len(), ico.len());
        }
    }

    info!("{} written, {} failed", report.written.len(), report.failed.len());
    Ok(report.is_success())
}

fn run_inspect(files: &[PathBuf]) -> Result<bool> {
    let mut all_ok = true;
    for path in files {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        println!("{} ({} bytes)", path.display(), bytes.len());

        let chunks = match read_chunks(&bytes) {
            Ok(c) => c,
            Err(e) => {
                println!("  error: {}", e);
                all_ok = false;
                continue;
            }
        };
        for chunk in &chunks {
            println!("  {} len={:<8} crc={:08X}", chunk.kind_str(), chunk.data.len(), chunk.crc);
        }

        match decode_png(&bytes) {
            Ok(img) => {
                let h = img.header;
                println!("  {}x{} depth={} color={} interlace={}", h.width, h.height, h.bit_depth, h.color_type, h.interlace);
                match img.opaque_bounds() {
                    Some((x1, y1, x2, y2)) => println!("  opaque bounds: [{},{}) x [{},{})", x1, x2, y1, y2),
                    None => println!("  fully transparent"),
                }
            }
            Err(e) => {
                println!("  decode error: {}", e);
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

fn run_script() -> Result<bool> {
    let json = serde_json::to_string_pretty(&Script::monitor())?;
    println!("{}", json);
    Ok(true)
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Render(args) => run_render(&args),
        Command::Inspect { files } => run_inspect(&files),
        Command::Script => run_script(),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bevelicon-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_name_template() {
        assert_eq!(file_name("{size}x{size}.png", 32), "32x32.png");
        assert_eq!(file_name("icon-{size}.png", 16), "icon-16.png");
        assert_eq!(file_name("icon.png", 16), "icon.png");
    }

    #[test]
    fn test_parse_render_defaults() {
        let cli = Cli::try_parse_from(["bevelicon", "render"]).unwrap();
        let Command::Render(args) = cli.command else { panic!("expected render") };
        assert_eq!(args.sizes, DEFAULT_SIZES);
        assert_eq!(args.out_dir, PathBuf::from("icons"));
        assert_eq!(args.level, DEFAULT_LEVEL);
        assert!(args.ico.is_none());
    }

    #[test]
    fn test_parse_sizes_list() {
        let cli = Cli::try_parse_from(["bevelicon", "-v", "render", "--sizes", "16,512", "--level", "9"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Render(args) = cli.command else { panic!("expected render") };
        assert_eq!(args.sizes, [16, 512]);
        assert_eq!(args.level, 9);
    }

    #[test]
    fn test_parse_rejects_bad_level() {
        assert!(Cli::try_parse_from(["bevelicon", "render", "--level", "11"]).is_err());
    }

    #[test]
    fn test_render_writes_files_and_ico() {
        let dir = scratch_dir("render");
        let args = RenderArgs {
            sizes: vec![16, 0, 512],
            out_dir: dir.clone(),
            name_template: "icon-{size}.png".to_string(),
            level: 6,
            script: None,
            ico: Some(dir.join("icon.ico")),
        };
        // Size 0 fails, the others are still written
        assert!(!run_render(&args).unwrap());

        let small = fs::read(dir.join("icon-16.png")).unwrap();
        assert_eq!(decode_png(&small).unwrap().width(), 16);
        assert!(dir.join("icon-512.png").exists());
        assert!(!dir.join("icon-0.png").exists());

        // Only the 16 px image fits the ICO
        let ico = fs::read(dir.join("icon.ico")).unwrap();
        assert_eq!(u16::from_le_bytes([ico[4], ico[5]]), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_repeated_size_keeps_one_ico_entry() {
        let dir = scratch_dir("repeat");
        fs::create_dir_all(&dir).unwrap();
        let mut sink = DirSink::new(&dir, "icon-{size}.png", true);
        sink.accept(16, vec![1]).unwrap();
        sink.accept(32, vec![2]).unwrap();
        sink.accept(16, vec![3]).unwrap();
        assert_eq!(sink.ico_images, [(16, vec![3]), (32, vec![2])]);
        assert_eq!(fs::read(dir.join("icon-16.png")).unwrap(), [3]);

        let args = RenderArgs {
            sizes: vec![16, 16],
            out_dir: dir.clone(),
            name_template: "icon-{size}.png".to_string(),
            level: 6,
            script: None,
            ico: Some(dir.join("icon.ico")),
        };
        assert!(run_render(&args).unwrap());
        let ico = fs::read(dir.join("icon.ico")).unwrap();
        assert_eq!(u16::from_le_bytes([ico[4], ico[5]]), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_render_with_script_file() {
        let dir = scratch_dir("script");
        fs::create_dir_all(&dir).unwrap();
        let script_path = dir.join("art.json");
        fs::write(
            &script_path,
            r#"{ "ops": [ { "op": "fill", "rect": { "x1": 0, "y1": 0, "x2": 512, "y2": 512 }, "color": [9, 8, 7] } ] }"#,
        )
        .unwrap();
        let args = RenderArgs {
            sizes: vec![8],
            out_dir: dir.clone(),
            name_template: "out.png".to_string(),
            level: 6,
            script: Some(script_path),
            ico: None,
        };
        assert!(run_render(&args).unwrap());
        let img = decode_png(&fs::read(dir.join("out.png")).unwrap()).unwrap();
        assert_eq!(img.pixel(4, 4), Some([9, 8, 7, 255]));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_template_without_placeholder_needs_single_size() {
        let args = RenderArgs {
            sizes: vec![16, 32],
            out_dir: scratch_dir("template"),
            name_template: "icon.png".to_string(),
            level: 6,
            script: None,
            ico: None,
        };
        assert!(run_render(&args).is_err());
    }
}
