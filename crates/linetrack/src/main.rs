//! linetrack: generate line follower arenas for robot simulators.
//!
//! Each track subcommand writes a ground texture (PNG) and a world file
//! (`.wbt`) that places it on a square arena.
//!
//! # Usage
//!
//! ```text
//! linetrack simple arena.wbt
//! linetrack etrack --shape c arena.wbt
//! linetrack grid arena.wbt track.json
//! linetrack friction rubber
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use linetrack_pipeline::{
    GridWaypoint, LetterShape, TrackConfig, TrackError, TrackShape, generate_grid_track,
    generate_shape_track, parse_grid,
};
use linetrack_world::friction::{DEFAULT_DATABASE_PATH, DEFAULT_MATERIAL};
use linetrack_world::{
    ArenaWorld, CodeFormat, FrictionDatabase, FrictionError, image_url, to_wbt,
    world_and_image_file_names,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use crate::output::OutputError;

/// Generate line follower tracks and simulator worlds.
#[derive(Parser)]
#[command(name = "linetrack", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Track along a jittered rectangle.
    Simple {
        /// World file name (.wbt is appended if missing).
        world: String,

        /// Number of seed points along the rectangle.
        #[arg(short, long, default_value_t = 20)]
        num_points: usize,

        /// Image width and height in pixels.
        #[arg(long, default_value_t = 1024)]
        image_size: u32,

        /// Arena width and length in meters.
        #[arg(short, long, default_value_t = 1.0)]
        size: f64,

        #[command(flatten)]
        world_args: WorldArgs,
    },

    /// Track shaped like a letter.
    Etrack {
        /// World file name (.wbt is appended if missing).
        world: String,

        /// Letter to draw.
        #[arg(long, value_enum, default_value_t = Letter::E)]
        shape: Letter,

        /// Number of seed points along the letter outline.
        #[arg(short, long, default_value_t = 60)]
        num_points: usize,

        /// Image width and height in pixels.
        #[arg(long, default_value_t = 1024)]
        image_size: u32,

        /// Arena width and length in meters.
        #[arg(short, long, default_value_t = 2.0)]
        size: f64,

        #[command(flatten)]
        world_args: WorldArgs,
    },

    /// Track through waypoints on a grid, read from a JSON file.
    Grid {
        /// World file name (.wbt is appended if missing).
        world: String,

        /// Grid file (`{"track": [{"x": 0, "y": 0}, ...]}`).
        grid: PathBuf,

        /// Distance between neighbouring grid points in meters.
        #[arg(long, default_value_t = 0.1)]
        point_distance: f64,

        /// Image width and height in pixels.
        #[arg(long, default_value_t = 2048)]
        image_size: u32,

        /// Arena width and length in meters.
        #[arg(short, long, default_value_t = 1.0)]
        size: f64,

        #[command(flatten)]
        world_args: WorldArgs,
    },

    /// List friction data, optionally only for one material.
    Friction {
        /// Only list pairs involving this material.
        material: Option<String>,

        /// Friction database file.
        #[arg(long, default_value = DEFAULT_DATABASE_PATH)]
        friction_db: PathBuf,
    },
}

/// Options shared by the track subcommands.
#[derive(Args)]
struct WorldArgs {
    /// The author's name.
    #[arg(short, long, default_value = ArenaWorld::DEFAULT_AUTHOR)]
    author: String,

    /// World description.
    #[arg(short, long, default_value = ArenaWorld::DEFAULT_DESCRIPTION)]
    desc: String,

    /// The author's email address.
    #[arg(short, long, default_value = "")]
    email: String,

    /// World title.
    #[arg(short, long, default_value = ArenaWorld::DEFAULT_TITLE)]
    title: String,

    /// Draw seed points and a colored start/stop line, and log at debug
    /// level.
    #[arg(long)]
    debug: bool,

    /// Track line width in meters.
    #[arg(long, default_value_t = TrackConfig::DEFAULT_LINE_WIDTH)]
    line_width: f64,

    /// Ground material used for friction.
    #[arg(long, default_value = DEFAULT_MATERIAL)]
    material_ground: String,

    /// Robot contact material (tires, tracks) used for friction.
    #[arg(long, default_value = DEFAULT_MATERIAL)]
    material_robot: String,

    /// Contact surface property, e.g. dry or wet.
    #[arg(long, default_value = "dry")]
    material_property: String,

    /// Friction database file.
    #[arg(long, default_value = DEFAULT_DATABASE_PATH)]
    friction_db: PathBuf,

    /// Random seed for reproducible tracks and friction sampling.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Letter {
    E,
    C,
}

impl Letter {
    const fn shape(self) -> LetterShape {
        match self {
            Self::E => LetterShape::E,
            Self::C => LetterShape::C,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Track(#[from] TrackError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Friction {
        path: PathBuf,
        source: FrictionError,
    },
}

/// Geometry of the requested track.
enum TrackKind {
    Shape { shape: TrackShape, num_points: usize },
    Grid { grid: PathBuf, point_distance: f64 },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Simple {
            world,
            num_points,
            image_size,
            size,
            world_args,
        } => {
            let kind = TrackKind::Shape {
                shape: TrackShape::Rectangle,
                num_points,
            };
            generate(&world, &kind, image_size, size, &world_args)
        }
        Command::Etrack {
            world,
            shape,
            num_points,
            image_size,
            size,
            world_args,
        } => {
            let kind = TrackKind::Shape {
                shape: TrackShape::Letter(shape.shape()),
                num_points,
            };
            generate(&world, &kind, image_size, size, &world_args)
        }
        Command::Grid {
            world,
            grid,
            point_distance,
            image_size,
            size,
            world_args,
        } => {
            let kind = TrackKind::Grid {
                grid,
                point_distance,
            };
            generate(&world, &kind, image_size, size, &world_args)
        }
        Command::Friction {
            material,
            friction_db,
        } => {
            init_logging(false);
            list_friction(&friction_db, material.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the track image and world, then write both files.
fn generate(
    world_name: &str,
    kind: &TrackKind,
    image_size: u32,
    size: f64,
    args: &WorldArgs,
) -> Result<(), RunError> {
    init_logging(args.debug);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (world_file, image_file) = world_and_image_file_names(world_name);
    let config = TrackConfig::for_arena(image_size, size, args.line_width, args.debug);

    eprintln!(
        "Arena: {size} m, image: {image_size}x{image_size} px, line width: {} px",
        config.line_width
    );

    let track = match kind {
        TrackKind::Shape { shape, num_points } => {
            generate_shape_track(shape, *num_points, &config, &mut rng)?
        }
        TrackKind::Grid {
            grid,
            point_distance,
        } => {
            let waypoints = read_grid(grid)?;
            generate_grid_track(&waypoints, *point_distance, &config)?
        }
    };

    let mut arena = ArenaWorld {
        title: args.title.clone(),
        description: args.desc.clone(),
        author: args.author.clone(),
        email: args.email.clone(),
        parameters: std::env::args().skip(1).collect(),
        ..ArenaWorld::new(size, image_url(&image_file))
    };
    if args.material_ground != DEFAULT_MATERIAL || args.material_robot != DEFAULT_MATERIAL {
        arena = add_friction(arena, args, &mut rng);
    }

    let text = to_wbt(&arena.build(), &CodeFormat::default());
    let staged = vec![
        output::stage_png(Path::new(&image_file), &track.image)?,
        output::stage_text(Path::new(&world_file), &text)?,
    ];
    eprintln!("Writing {image_file} and {world_file}");
    output::commit(staged)?;

    Ok(())
}

/// Waypoints from `path`. A missing file yields no waypoints.
fn read_grid(path: &Path) -> Result<Vec<GridWaypoint>, RunError> {
    match std::fs::read_to_string(path) {
        Ok(json) => Ok(parse_grid(&json)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "grid file not found");
            Ok(Vec::new())
        }
        Err(source) => Err(RunError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn load_friction_database(path: &Path) -> Result<FrictionDatabase, RunError> {
    let json = std::fs::read_to_string(path).map_err(|source| RunError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FrictionDatabase::from_json(&json).map_err(|source| RunError::Friction {
        path: path.to_path_buf(),
        source,
    })
}

/// Look up the configured materials and attach the contact to `arena`.
/// An unreadable database leaves the arena without contact properties.
fn add_friction(arena: ArenaWorld, args: &WorldArgs, rng: &mut StdRng) -> ArenaWorld {
    let db = match load_friction_database(&args.friction_db) {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!("friction skipped: {e}");
            return arena;
        }
    };

    let ground = &args.material_ground;
    let robot = &args.material_robot;
    let friction = db.lookup(ground, robot, &args.material_property, rng);
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    println!(
        "Static friction for {ground} / {robot}: {}",
        show(friction.static_friction)
    );
    println!(
        "Dynamic friction for {ground} / {robot}: {}",
        show(friction.sliding_friction)
    );

    arena.with_contact(ground.as_str(), robot.as_str(), friction)
}

fn list_friction(path: &Path, material: Option<&str>) -> Result<(), RunError> {
    let db = load_friction_database(path)?;
    print!("{}", db.describe(material));
    Ok(())
}
