//! End-to-end export tests: visualization-set JSON in, zip archive out.

use std::fs::File;
use std::io::Read;

use serde_json::{json, Value};

use polyscene::{Scene, SceneDefaults, VisualizationSet};

fn daylight_set() -> VisualizationSet {
    serde_json::from_value(json!({
        "identifier": "daylight_study",
        "display_name": "Daylight Study",
        "geometry": [
            {
                "type": "AnalysisGeometry",
                "identifier": "grid",
                "display_name": "Data",
                "geometry": [{
                    "type": "Mesh3D",
                    "vertices": [
                        [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0],
                        [0.0, 1.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 0.0]
                    ],
                    "faces": [[0, 1, 2, 3], [1, 4, 5, 2]]
                }],
                "data_sets": [{
                    "values": [20.0, 22.5],
                    "data_type": {"name": "Temperature", "base_unit": "C"},
                    "legend_parameters": {"min": 18.0, "max": 26.0}
                }],
                "display_mode": "SurfaceWithEdges"
            },
            {
                "type": "ContextGeometry",
                "identifier": "site",
                "geometry": [{
                    "type": "Polyline3D",
                    "vertices": [[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [5.0, 5.0, 0.0]],
                    "display": {"color": {"r": 255, "g": 0, "b": 0, "a": 128}}
                }]
            }
        ]
    }))
    .unwrap()
}

fn read_manifest(archive: &std::path::Path) -> Value {
    let file = File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut raw = String::new();
    zip.by_name("index.json")
        .unwrap()
        .read_to_string(&mut raw)
        .unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn archive_names(archive: &std::path::Path) -> Vec<String> {
    let file = File::open(archive).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn round_trip_produces_one_entry_and_folder_per_group() {
    let scene = Scene::from_visualization_set(&daylight_set(), SceneDefaults::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let archive = scene.to_vtkjs(dir.path(), "daylight").unwrap();

    let manifest = read_manifest(&archive);
    let entries = manifest["scene"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let names = archive_names(&archive);
    for entry in entries {
        let url = entry["httpDataSetReader"]["url"].as_str().unwrap();
        assert!(names.contains(&format!("{url}/index.json")));
        assert!(names.contains(&format!("{url}/data/points")));
    }
}

#[test]
fn export_is_idempotent() {
    let scene = Scene::from_visualization_set(&daylight_set(), SceneDefaults::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let first = read_manifest(&scene.to_vtkjs(dir.path(), "a").unwrap());
    let second = read_manifest(&scene.to_vtkjs(dir.path(), "b").unwrap());
    assert_eq!(first, second);
}

#[test]
fn sections_without_geometry_leave_the_scene_empty() {
    let input: VisualizationSet = serde_json::from_value(json!({
        "identifier": "empty",
        "geometry": [
            {"type": "ContextGeometry", "identifier": "ctx", "geometry": []}
        ]
    }))
    .unwrap();
    let scene = Scene::from_visualization_set(&input, SceneDefaults::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let archive = scene.to_vtkjs(dir.path(), "empty").unwrap();

    let manifest = read_manifest(&archive);
    assert!(manifest["scene"].as_array().unwrap().is_empty());
    assert_eq!(manifest["version"], 1);
}

#[test]
fn manifest_reflects_display_and_legend_state() {
    let scene = Scene::from_visualization_set(&daylight_set(), SceneDefaults::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let manifest = read_manifest(&scene.to_vtkjs(dir.path(), "daylight").unwrap());

    assert_eq!(manifest["background"], json!([1.0, 1.0, 1.0]));
    assert_eq!(manifest["centerOfRotation"], json!([2.5, 5.0, 1.5]));
    assert_eq!(manifest["camera"]["focalPoint"], json!([2.5, 5.0, 1.5]));

    let analysis = &manifest["scene"][0];
    assert_eq!(analysis["name"], "Data");
    assert_eq!(analysis["type"], "httpDataSetReader");
    // SurfaceWithEdges clamps to Surface but keeps its edges
    assert_eq!(analysis["property"]["representation"], 2);
    assert_eq!(analysis["property"]["edgeVisibility"], 1);
    assert_eq!(analysis["mapper"]["colorByArrayName"], "Temperature");
    assert_eq!(analysis["mapper"]["scalarMode"], 4);
    let legend = &analysis["metadata"][0]["legend_parameters"];
    assert_eq!(legend["min"], 18.0);
    assert_eq!(legend["max"], 26.0);
    assert_eq!(legend["hidden"], false);
    assert_eq!(analysis["metadata"][0]["unit"], "C");

    let context = &manifest["scene"][1];
    assert_eq!(context["name"], "site");
    assert_eq!(context["property"]["diffuseColor"], json!([1.0, 0.0, 0.0]));
    let opacity = context["property"]["opacity"].as_f64().unwrap();
    assert!((opacity - 128.0 / 255.0).abs() < 1e-12);
}

#[test]
fn html_export_embeds_the_archive() {
    let scene = Scene::from_visualization_set(&daylight_set(), SceneDefaults::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let page = scene.to_html(dir.path(), "daylight").unwrap();
    assert_eq!(page.file_name().unwrap(), "daylight.html");

    let contents = std::fs::read_to_string(&page).unwrap();
    assert!(contents.contains("<title>daylight</title>"));
    // zip archives start with the PK signature; its base64 form starts "UEs"
    assert!(contents.contains("\"UEs"));
    assert!(!contents.contains("{{ARCHIVE_BASE64}}"));
}
