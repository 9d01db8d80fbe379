/// Scene assembler: display groups plus viewer defaults, exported as a
/// `.vtkjs` archive or a self-contained HTML page.
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::color::Color;
use crate::display::DisplayGroup;
use crate::error::Result;
use crate::html;
use crate::input::VisualizationSet;
use crate::manifest::{Camera, IndexJson};
use crate::writer::write_dataset_folder;

/// Viewer defaults threaded through export instead of living in the
/// manifest structs: background, initial camera, rotation center and the
/// flat color applied to groups without their own.
#[derive(Debug, Clone)]
pub struct SceneDefaults {
    pub background: [f64; 3],
    pub camera: Camera,
    pub center_of_rotation: [f64; 3],
    pub flat_color: Color,
}

impl Default for SceneDefaults {
    fn default() -> Self {
        Self {
            background: [1.0, 1.0, 1.0],
            camera: Camera::default(),
            center_of_rotation: [2.5, 5.0, 1.5],
            flat_color: Color::default(),
        }
    }
}

/// An ordered collection of display groups ready for export. Exports are
/// synchronous and recompute everything; nothing is cached across calls.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    groups: Vec<DisplayGroup>,
    pub defaults: SceneDefaults,
}

impl Scene {
    pub fn new(defaults: SceneDefaults) -> Self {
        Self {
            groups: Vec::new(),
            defaults,
        }
    }

    /// One display group per geometry section of the input.
    pub fn from_visualization_set(
        input: &VisualizationSet,
        defaults: SceneDefaults,
    ) -> Result<Self> {
        let mut scene = Self::new(defaults);
        for section in &input.geometry {
            scene.add_group(DisplayGroup::from_section(section)?);
        }
        Ok(scene)
    }

    pub fn add_group(&mut self, group: DisplayGroup) {
        self.groups.push(group);
    }

    pub fn add_groups(&mut self, groups: impl IntoIterator<Item = DisplayGroup>) {
        self.groups.extend(groups);
    }

    pub fn groups(&self) -> &[DisplayGroup] {
        &self.groups
    }

    /// Export the scene as `<folder>/<name>.vtkjs`.
    ///
    /// Data sets are staged in a scratch directory, the manifest is written
    /// next to them and the whole tree is zipped into the target file.
    /// Scratch cleanup is best-effort; a leftover temp directory never fails
    /// an otherwise successful export.
    pub fn to_vtkjs(&self, folder: &Path, name: &str) -> Result<PathBuf> {
        let scratch = tempfile::tempdir()?;

        let pb = ProgressBar::new(self.groups.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} groups ({percent}%) {msg}")
                .unwrap()
                .progress_chars("▉▊▋▌▍▎▏ "),
        );

        let mut manifest = IndexJson {
            background: self.defaults.background,
            camera: self.defaults.camera.clone(),
            center_of_rotation: self.defaults.center_of_rotation,
            ..IndexJson::default()
        };

        for group in &self.groups {
            pb.set_message(group.name.clone());
            let Some(buffer) = group.export_buffer() else {
                info!("skipping \"{}\": group holds no geometry", group.name);
                pb.inc(1);
                continue;
            };
            let target = scratch.path().join(&group.identifier);
            if write_dataset_folder(&buffer, &target)?.is_none() {
                info!("skipping \"{}\": group holds no geometry", group.name);
                pb.inc(1);
                continue;
            }
            manifest
                .scene
                .push(group.to_manifest_entry(self.defaults.flat_color));
            pb.inc(1);
        }
        pb.finish_with_message("groups written");

        manifest.to_json(scratch.path())?;

        fs::create_dir_all(folder)?;
        let archive = folder.join(format!("{name}.vtkjs"));
        zip_directory(scratch.path(), &archive)?;
        Ok(archive)
    }

    /// Export the scene as `<folder>/<name>.html`: the `.vtkjs` archive is
    /// built in a scratch location and embedded base64-encoded into the
    /// bundled viewer page.
    pub fn to_html(&self, folder: &Path, name: &str) -> Result<PathBuf> {
        let scratch = tempfile::tempdir()?;
        let archive = self.to_vtkjs(scratch.path(), name)?;
        let bytes = fs::read(&archive)?;

        fs::create_dir_all(folder)?;
        let page = folder.join(format!("{name}.html"));
        fs::write(&page, html::render_page(name, &bytes))?;
        Ok(page)
    }
}

/// Zip every file under `dir` into `archive`, with paths relative to `dir`.
fn zip_directory(dir: &Path, archive: &Path) -> Result<()> {
    let mut writer = ZipWriter::new(BufWriter::new(File::create(archive)?));
    let options = SimpleFileOptions::default();
    let mut contents = Vec::new();

    add_dir_entries(dir, dir, &mut writer, options, &mut contents)?;
    writer.finish()?;
    Ok(())
}

fn add_dir_entries(
    root: &Path,
    dir: &Path,
    writer: &mut ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .expect("entry paths stay under the walk root");
        let zip_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if path.is_dir() {
            add_dir_entries(root, &path, writer, options, buf)?;
        } else {
            writer.start_file(zip_name, options)?;
            buf.clear();
            File::open(&path)?.read_to_end(buf)?;
            writer.write_all(buf)?;
        }
    }
    Ok(())
}
