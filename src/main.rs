// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use pico_args::Arguments;

const HELP: &str = "\
svgfetch transforms an SVG into a cacheable derivative.

USAGE:
  svgfetch [OPTIONS] <in-svg> <out-svg>  # from file to file
  svgfetch [OPTIONS] <in-svg> -c         # from file to stdout
  svgfetch [OPTIONS] - <out-svg>         # from stdin to file
  svgfetch [OPTIONS] - -c                # from stdin to stdout

OPTIONS:
  -h, --help                        Prints help information
  -V, --version                     Prints version information
  -c                                Prints the output SVG to the stdout

  --width PX                        Requested width
  --height PX                       Requested height
  --ratio RATIO                     Requested aspect ratio
                                    Examples: '16x9', '16:9', '1.78'
  --zoom FACTOR                     Zoom factor, negative zooms out
  --color COLOR                     Requested CSS color
  --type TYPE                       Requested usage type
                                    [possible values: icon, tile, illustration]
  --name NAME                       Addressing name
                                    [default: input file stem]
  --class CLASS                     Extra CSS classes for the root element
  --preserve-aspect-ratio VALUE     preserveAspectRatio for illustrations
                                    [default: xMidYMid slice]
  --preserve-style                  Retains style/class/id attributes
  --no-optimize                     Disables the size optimizer
  --primary-color COLOR             The site primary color, applied to
                                    illustrations without a requested color
  --icon-dir DIR                    Treats SVG files under DIR as icons.
                                    This option can be set multiple times
  --quiet                           Disables warnings

ARGS:
  <in-svg>                          Input file
  <out-svg>                         Output file
";

#[derive(Debug)]
struct Args {
    width: Option<u32>,
    height: Option<u32>,
    ratio: Option<String>,
    zoom: Option<f64>,
    color: Option<String>,
    kind: Option<String>,
    name: Option<String>,
    class: Option<String>,
    preserve_aspect_ratio: Option<String>,
    preserve_style: bool,
    no_optimize: bool,
    primary_color: Option<String>,
    icon_dirs: Vec<PathBuf>,
    quiet: bool,
    input: String,
    output: String,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    let args = Args {
        width: input.opt_value_from_str("--width")?,
        height: input.opt_value_from_str("--height")?,
        ratio: input.opt_value_from_str("--ratio")?,
        zoom: input.opt_value_from_str("--zoom")?,
        color: input.opt_value_from_str("--color")?,
        kind: input.opt_value_from_str("--type")?,
        name: input.opt_value_from_str("--name")?,
        class: input.opt_value_from_str("--class")?,
        preserve_aspect_ratio: input.opt_value_from_str("--preserve-aspect-ratio")?,
        preserve_style: input.contains("--preserve-style"),
        no_optimize: input.contains("--no-optimize"),
        primary_color: input.opt_value_from_str("--primary-color")?,
        icon_dirs: input.values_from_str("--icon-dir")?,
        quiet: input.contains("--quiet"),
        input: input.free_from_str()?,
        output: input.free_from_str()?,
    };

    let remaining = input.finish();
    if !remaining.is_empty() {
        let s = remaining
            .iter()
            .map(|s| s.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!("Error: unknown arguments: {}.", s);
        process::exit(1);
    }

    Ok(args)
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom<'a> {
    Stdin,
    File(&'a str),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo<'a> {
    Stdout,
    File(&'a str),
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let (svg_from, svg_to) = {
        let svg_from = if args.input == "-" {
            InputFrom::Stdin
        } else if args.input == "-c" {
            return Err("-c should be set after input".to_string());
        } else {
            InputFrom::File(args.input.as_str())
        };

        let svg_to = if args.output == "-c" {
            OutputTo::Stdout
        } else {
            OutputTo::File(args.output.as_str())
        };

        (svg_from, svg_to)
    };

    let text = match svg_from {
        InputFrom::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            buf
        }
        InputFrom::File(path) => {
            std::fs::read_to_string(path).map_err(|e| format!("failed to read input: {}", e))?
        }
    };

    let mut query: Vec<(&str, &str)> = Vec::new();
    let width = args.width.map(|v| v.to_string());
    let height = args.height.map(|v| v.to_string());
    let zoom = args.zoom.map(|v| v.to_string());
    if let Some(ref v) = width {
        query.push(("width", v));
    }
    if let Some(ref v) = height {
        query.push(("height", v));
    }
    if let Some(ref v) = args.ratio {
        query.push(("ratio", v));
    }
    if let Some(ref v) = zoom {
        query.push(("zoom", v));
    }
    if let Some(ref v) = args.color {
        query.push(("color", v));
    }
    if let Some(ref v) = args.kind {
        query.push(("type", v));
    }
    if let Some(ref v) = args.name {
        query.push(("name", v));
    }
    if let Some(ref v) = args.class {
        query.push(("class", v));
    }
    if let Some(ref v) = args.preserve_aspect_ratio {
        query.push(("preserveAspectRatio", v));
    }
    if args.preserve_style {
        query.push(("preserve", "style"));
    }
    let request = svgfetch::FetchRequest::from_query(query.iter().copied());

    let options = svgfetch::Options {
        optimize: !args.no_optimize,
        primary_color: args.primary_color.clone(),
        icon_directories: args.icon_dirs.clone(),
        ..svgfetch::Options::default()
    };

    let (source_name, in_icon_directory) = match svg_from {
        InputFrom::Stdin => ("stdin".to_string(), false),
        InputFrom::File(path) => {
            let path = Path::new(path);
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let in_icons = options.icon_directories.iter().any(|d| path.starts_with(d));
            (name, in_icons)
        }
    };

    let mut pipeline =
        svgfetch::SvgPipeline::new(&text, &source_name, in_icon_directory, request, options)
            .map_err(|e| e.to_string())?;
    pipeline.process();
    let markup = pipeline.markup();

    match svg_to {
        OutputTo::Stdout => {
            std::io::stdout()
                .write_all(markup.as_bytes())
                .map_err(|e| format!("failed to write to stdout: {}", e))?;
        }
        OutputTo::File(path) => {
            std::fs::write(path, markup)
                .map_err(|e| format!("failed to write output: {}", e))?;
        }
    }

    Ok(())
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::LevelFilter::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
