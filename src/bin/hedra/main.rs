//! Hedra CLI - build a primitive, run a pipeline of mesh operations, report
//! the result.
//!
//! Usage: hedra <COMMAND> [OPTIONS]
//!
//! Run `hedra --help` for available commands.

use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use nalgebra::Vector3;

use hedra::algo::dual::{BoundaryPolicy, DualOptions};
use hedra::algo::subdivide::SubdivideOptions;
use hedra::algo::transform::VertexTransform;
use hedra::algo::{cleanup, Operation, Progress};
use hedra::mesh::{to_polygons, to_triangle_arrays, HalfEdgeMesh};
use hedra::primitives;
use hedra::selection::FaceSelection;

#[derive(Parser)]
#[command(name = "hedra")]
#[command(author, version, about = "Half-edge mesh pipeline CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about a primitive
    Info {
        /// Starting primitive
        #[arg(short, long, value_enum, default_value = "icosahedron")]
        primitive: Primitive,
    },

    /// Run a pipeline of operations on a primitive
    Run {
        /// Starting primitive
        #[arg(short, long, value_enum, default_value = "icosahedron")]
        primitive: Primitive,

        /// Operation to apply; repeat to chain. One of: subdivide=N,
        /// triangulate, dual, dual=skip, scale=S, scale=X,Y,Z, translate=X,Y,Z,
        /// project=R, clamp=INNER,OUTER, filter=I,J,..., extrude=D:I,J,...,
        /// cleanup
        #[arg(short, long = "op", required = true)]
        ops: Vec<Step>,

        /// Also print every face as a list of vertex indices
        #[arg(long)]
        faces: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Primitive {
    /// Unit cube with six quads
    QuadCube,
    /// Unit cube with twelve triangles
    TriangleCube,
    /// Regular icosahedron
    Icosahedron,
}

/// A pipeline step as written on the command line.
///
/// Face selections are positions in the face listing of the mesh the step
/// runs on, so they are resolved only when the step is reached.
#[derive(Clone, Debug, PartialEq)]
enum Step {
    Subdivide(usize),
    Triangulate,
    Dual(BoundaryPolicy),
    Transform(VertexTransform),
    Filter(Vec<usize>),
    Extrude { distance: f64, faces: Vec<usize> },
    Cleanup,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Subdivide(_) => "subdivide",
            Step::Triangulate => "triangulate",
            Step::Dual(_) => "dual",
            Step::Transform(t) => t.name(),
            Step::Filter(_) => "filter",
            Step::Extrude { .. } => "extrude",
            Step::Cleanup => "cleanup",
        }
    }

    fn apply(&self, mesh: &HalfEdgeMesh) -> hedra::error::Result<HalfEdgeMesh> {
        if let Some(op) = self.operation(mesh)? {
            return op.apply(mesh);
        }

        let mut copy = mesh.clone();
        let halfedges = cleanup::detach_unused_halfedges(&mut copy)?;
        let vertices = cleanup::detach_unused_vertices(&mut copy)?;
        info!("cleanup removed {} half-edges, {} vertices", halfedges, vertices);
        Ok(copy)
    }

    /// The library operation for this step; `None` for cleanup.
    fn operation(&self, mesh: &HalfEdgeMesh) -> hedra::error::Result<Option<Operation>> {
        let op = match self {
            Step::Subdivide(levels) => {
                Operation::SubdivideTriangles(SubdivideOptions::new(*levels))
            }
            Step::Triangulate => Operation::Triangulate,
            Step::Dual(policy) => {
                Operation::GeometricDual(DualOptions::new().with_boundary(*policy))
            }
            Step::Transform(t) => Operation::Transform(*t),
            Step::Filter(faces) => {
                Operation::FilterFaces(FaceSelection::from_positions(mesh, faces)?)
            }
            Step::Extrude { distance, faces } => Operation::SphericalExtrude {
                selection: FaceSelection::from_positions(mesh, faces)?,
                distance: *distance,
            },
            Step::Cleanup => return Ok(None),
        };
        Ok(Some(op))
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };

        match (name, arg) {
            ("triangulate", None) => Ok(Step::Triangulate),
            ("cleanup", None) => Ok(Step::Cleanup),
            ("dual", None) => Ok(Step::Dual(BoundaryPolicy::OpenFan)),
            ("dual", Some("open")) => Ok(Step::Dual(BoundaryPolicy::OpenFan)),
            ("dual", Some("skip")) => Ok(Step::Dual(BoundaryPolicy::Skip)),
            ("subdivide", None) => Ok(Step::Subdivide(1)),
            ("subdivide", Some(arg)) => arg
                .parse()
                .map(Step::Subdivide)
                .map_err(|e| format!("bad level count '{}': {}", arg, e)),
            ("scale", Some(arg)) => {
                let values = parse_floats(arg)?;
                match values.as_slice() {
                    [s] => Ok(Step::Transform(VertexTransform::uniform_scale(*s))),
                    [x, y, z] => {
                        Ok(Step::Transform(VertexTransform::Scale(Vector3::new(*x, *y, *z))))
                    }
                    _ => Err(format!("scale takes 1 or 3 values, got '{}'", arg)),
                }
            }
            ("translate", Some(arg)) => match parse_floats(arg)?.as_slice() {
                [x, y, z] => {
                    let offset = Vector3::new(*x, *y, *z);
                    Ok(Step::Transform(VertexTransform::Translate(offset)))
                }
                _ => Err(format!("translate takes 3 values, got '{}'", arg)),
            },
            ("project", Some(arg)) => match parse_floats(arg)?.as_slice() {
                [radius] => {
                    Ok(Step::Transform(VertexTransform::ProjectToSphere { radius: *radius }))
                }
                _ => Err(format!("project takes 1 value, got '{}'", arg)),
            },
            ("clamp", Some(arg)) => match parse_floats(arg)?.as_slice() {
                [inner, outer] => Ok(Step::Transform(VertexTransform::ClampToRadii {
                    inner: *inner,
                    outer: *outer,
                })),
                _ => Err(format!("clamp takes 2 values, got '{}'", arg)),
            },
            ("filter", Some(arg)) => parse_indices(arg).map(Step::Filter),
            ("extrude", Some(arg)) => {
                let (distance, faces) = arg
                    .split_once(':')
                    .ok_or_else(|| format!("extrude expects DISTANCE:FACES, got '{}'", arg))?;
                let distance = distance
                    .trim()
                    .parse()
                    .map_err(|e| format!("bad distance '{}': {}", distance, e))?;
                Ok(Step::Extrude {
                    distance,
                    faces: parse_indices(faces)?,
                })
            }
            _ => Err(format!("unknown operation '{}'", s)),
        }
    }
}

fn parse_floats(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|v| v.trim().parse().map_err(|e| format!("bad number '{}': {}", v, e)))
        .collect()
}

fn parse_indices(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .map(|v| v.trim().parse().map_err(|e| format!("bad face index '{}': {}", v, e)))
        .collect()
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { primitive } => {
            let mesh = build(primitive)?;
            print_info(&mesh);
        }

        Commands::Run { primitive, ops, faces } => {
            cmd_run(primitive, &ops, faces)?;
        }
    }

    Ok(())
}

fn build(primitive: Primitive) -> hedra::error::Result<HalfEdgeMesh> {
    match primitive {
        Primitive::QuadCube => primitives::quad_cube(),
        Primitive::TriangleCube => primitives::triangle_cube(),
        Primitive::Icosahedron => primitives::icosahedron(),
    }
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Never move backwards.
        let previous = max_percent.fetch_max(percent, Ordering::Relaxed);
        if percent <= previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {:<12}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_run(
    primitive: Primitive,
    steps: &[Step],
    show_faces: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build(primitive)?;
    println!("Start: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let progress = create_progress();
    let total = steps.len();
    let start = Instant::now();
    for (i, step) in steps.iter().enumerate() {
        progress.report(i, total, step.name());
        mesh = step
            .apply(&mesh)
            .map_err(|e| format!("step {} ({}): {}", i + 1, step.name(), e))?;
    }
    progress.report(total, total, "done");
    let elapsed = start.elapsed();

    println!("Pipeline: {} steps ({:.2?})", total, elapsed);
    print_info(&mesh);

    if show_faces {
        let (_, polygons) = to_polygons(&mesh);
        for (i, polygon) in polygons.iter().enumerate() {
            println!("  f{}: {:?}", i, polygon);
        }
    }

    Ok(())
}

fn print_info(mesh: &HalfEdgeMesh) {
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some(bbox) = mesh.bounding_box() {
        let (min, max) = (bbox.min, bbox.max);
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let size = bbox.size();
        println!("Dimensions: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    }

    if mesh.num_faces() == 0 {
        println!("Mesh type: Empty");
    } else if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else if mesh.is_quad_mesh() {
        println!("Mesh type: Quad mesh");
    } else {
        println!("Mesh type: Mixed polygon mesh");
    }

    let boundary = mesh.vertex_ids().filter(|&v| mesh.is_boundary_vertex(v)).count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary);
    }

    match to_triangle_arrays(mesh) {
        Ok((_, triangles)) => println!("Export: {} triangles", triangles.len()),
        Err(e) => println!("Export: unavailable ({})", e),
    }
}
