use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{ error, info };

use whitted_tracer::{ Error, Result };
use whitted_tracer::tuple::Tuple4D;
use whitted_tracer::matrix::Matrix4D;
use whitted_tracer::world::World;
use whitted_tracer::camera::Camera;
use whitted_tracer::scene::Scene;
use whitted_tracer::parallel::parallel_render;
use whitted_tracer::logger::{ init_logger, level_for };
use whitted_tracer::consts::{ DEFAULT_OUT_FILE, DEFAULT_THREADS };

/// Renders a JSON scene description to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene description (JSON)
    scene: Option<PathBuf>,

    /// Render the built-in two-sphere scene instead of a scene file
    #[clap(long)]
    default_world: bool,

    /// Image width for --default-world
    #[clap(long, default_value_t = 11)]
    width: usize,

    /// Image height for --default-world
    #[clap(long, default_value_t = 11)]
    height: usize,

    /// Where to write the PPM image
    #[clap(short, long, default_value = DEFAULT_OUT_FILE)]
    output: PathBuf,

    /// Number of render threads
    #[clap(short, long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, parse(from_occurrences))]
    verbose: u64,
}

/// The default world, seen from `(0, 0, -5)` with a 90 degree field of view.
fn default_scene(width: usize, height: usize) -> Result<Scene> {
    let camera = Camera::new(width, height, std::f64::consts::PI / 2.0,
        Matrix4D::view_transform(
            Tuple4D::point(0.0, 0.0, -5.0),
            Tuple4D::point(0.0, 0.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        ))?;

    Ok(Scene { world: World::default(), camera })
}

fn run(args: &Args) -> Result<()> {
    let scene = match (&args.scene, args.default_world) {
        (_, true) => default_scene(args.width, args.height)?,
        (Some(path), false) => Scene::from_file(path)?,
        (None, false) => return Err(Error::Scene(
            "no scene file given; pass one, or --default-world".into()
        )),
    };

    let canvas = parallel_render(
        Arc::new(scene.world), Arc::new(scene.camera), args.threads
    );

    canvas.save(&args.output)?;
    info!("Saved render to {:?}.", args.output);

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger(level_for(args.verbose));

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}
