/// Visualization set to vtkjs archive converter main entry point
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use polyscene::{Scene, SceneDefaults, VisualizationSet};

enum Format {
    Vtkjs,
    Html,
}

struct Args {
    input: PathBuf,
    format: Format,
    output: Option<String>,
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <vis-file.json> [--format vtkjs|html] [--output PATH|-]");
    process::exit(1);
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("polyscene");

    let mut input = None;
    let mut format = Format::Vtkjs;
    let mut output = None;

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--format" => match rest.next().map(String::as_str) {
                Some("vtkjs") => format = Format::Vtkjs,
                Some("html") => format = Format::Html,
                _ => usage(program),
            },
            "--output" => match rest.next() {
                Some(path) => output = Some(path.clone()),
                None => usage(program),
            },
            _ if input.is_none() && !arg.starts_with('-') => {
                input = Some(PathBuf::from(arg));
            }
            _ => usage(program),
        }
    }

    let Some(input) = input else { usage(program) };
    Args {
        input,
        format,
        output,
    }
}

fn main() {
    env_logger::init();
    let args = parse_args();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> polyscene::Result<()> {
    let input = VisualizationSet::from_file(&args.input)?;
    let name = match (&input.display_name, input.identifier.as_str()) {
        (Some(display_name), _) if !display_name.is_empty() => display_name.clone(),
        (_, identifier) if !identifier.is_empty() => identifier.to_string(),
        _ => "visualization".to_string(),
    };

    println!("Loaded {} geometry sections", input.geometry.len());
    let scene = Scene::from_visualization_set(&input, SceneDefaults::default())?;

    let to_stdout = args.output.as_deref() == Some("-");
    let folder = match (&args.output, to_stdout) {
        (Some(path), false) => PathBuf::from(path),
        _ => env::current_dir()?,
    };

    if to_stdout {
        // stage in a scratch dir, then stream base64 so the archive bytes
        // survive any text-only transport
        let scratch = tempfile::tempdir()?;
        let path = match args.format {
            Format::Vtkjs => scene.to_vtkjs(scratch.path(), &name)?,
            Format::Html => scene.to_html(scratch.path(), &name)?,
        };
        println!("{}", STANDARD.encode(fs::read(&path)?));
        return Ok(());
    }

    let path = match args.format {
        Format::Vtkjs => scene.to_vtkjs(&folder, &name)?,
        Format::Html => scene.to_html(&folder, &name)?,
    };
    println!("Wrote {}", display_path(&path));
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
