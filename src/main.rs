use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use mapscan_lib::{
    pipeline::{default_output_path, render_preview},
    Config, MapScan, UnmatchedPolicy,
};

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.occurrences_of("verbose"), matches.value_of("log-file"))?;
    return run(&matches);
}

// dumps are box-shadow lists from a CSS export; the selector and brace lines
// around them only cost a warning each
fn cli() -> Command<'static> {
    Command::new("mapscan")
        .about("Compiles pixel dumps of a map and its tileset into a tile-index map")
        .arg(
            Arg::new("map")
                .required(true)
                .help("map pixel dump (or png/bmp/gif image)"),
        )
        .arg(
            Arg::new("tileset")
                .required(true)
                .help("tileset pixel dump (or png/bmp/gif image)"),
        )
        .arg(
            Arg::new("tile-size")
                .required(true)
                .validator(|s| s.parse::<u32>())
                .help("edge length of the square tiles, in pixels"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .help("map file to write [default: <map> with a .dat extension]"),
        )
        .arg(
            Arg::new("asset-dir")
                .long("asset-dir")
                .takes_value(true)
                .help("game directory holding the tileset image"),
        )
        .arg(
            Arg::new("fallback-tile")
                .long("fallback-tile")
                .takes_value(true)
                .validator(|s| s.parse::<u8>())
                .help("tileset index written for unmatched map tiles instead of failing"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("fail on malformed dump lines instead of skipping them"),
        )
        .arg(
            Arg::new("preview")
                .long("preview")
                .takes_value(true)
                .help("also write the map rebuilt from tileset tiles as a png"),
        )
        .arg(
            Arg::new("export-tileset")
                .long("export-tileset")
                .takes_value(true)
                .help("also write the tileset image as a png"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .help("json config file, overridden by the flags above"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .takes_value(true)
                .help("also write the log to this file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("more logging (-v debug, -vv trace)"),
        )
}

fn init_logging(verbosity: u64, log_file: Option<&str>) -> anyhow::Result<()> {
    use simplelog::{
        ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode,
        WriteLogger,
    };

    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Creating log file {}", path))?;
        loggers.push(WriteLogger::new(level, simplelog::Config::default(), file));
    }
    CombinedLogger::init(loggers).context("Initializing logger")?;
    return Ok(());
}

fn config_from_matches(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_json_file(Path::new(path))?,
        None => Config::default(),
    };

    let tile_size = matches.value_of("tile-size").unwrap_or_default();
    config.tile_size = tile_size
        .parse()
        .with_context(|| format!("Tile size must be a number, got {}", tile_size))?;
    if let Some(dir) = matches.value_of("asset-dir") {
        config.asset_dir = dir.to_owned();
    }
    if let Some(index) = matches.value_of("fallback-tile") {
        let index = index
            .parse()
            .with_context(|| format!("Fallback tile must be 0-255, got {}", index))?;
        config.unmatched = UnmatchedPolicy::Substitute(index);
    }
    if matches.is_present("strict") {
        config.strict = true;
    }
    return Ok(config);
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = config_from_matches(matches)?;
    log::debug!("{config:?}");

    let map_path = PathBuf::from(matches.value_of("map").unwrap_or_default());
    let tileset_path = PathBuf::from(matches.value_of("tileset").unwrap_or_default());
    let output_path = matches
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&map_path));

    let output = MapScan::new(config).run(&map_path, &tileset_path)?;
    if !output.warnings.is_empty() {
        log::warn!("skipped {} malformed dump lines", output.warnings.len());
    }

    if output_path == map_path {
        log::warn!(
            "replacing the map dump [{}] with the compiled map",
            map_path.display()
        );
    }
    output
        .map_file
        .save(&output_path)
        .with_context(|| format!("Writing map file {}", output_path.display()))?;
    let header = &output.map_file.header;
    log::info!(
        "wrote [{}]: {}x{} tiles over {} tileset tiles",
        output_path.display(),
        header.width,
        header.height,
        header.tileset_tiles
    );

    if let Some(preview_path) = matches.value_of("preview") {
        let preview = render_preview(&output.map_file.layers[0], &output.tileset)?;
        preview
            .save_png(Path::new(preview_path))
            .with_context(|| format!("Writing preview {}", preview_path))?;
        log::info!("wrote preview [{}]", preview_path);
    }
    if let Some(export_path) = matches.value_of("export-tileset") {
        output
            .tileset_image
            .save_png(Path::new(export_path))
            .with_context(|| format!("Writing tileset image {}", export_path))?;
        log::info!("wrote tileset image [{}]", export_path);
    }
    return Ok(());
}
