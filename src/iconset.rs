//! Renders a complete set of application icons and writes it to disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};

use super::deflate::Compression;
use super::error::{Error, Result};
use super::family::IcnsFamily;
use super::ico::IcoDir;
use super::icontype::IconType;
use super::png::{PngEncoder, PngImage};
use super::source::{IconRole, PixelSource};

/// A standalone PNG file in an icon set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PngFile {
    /// File name, relative to the output directory.
    pub name: String,
    /// Side length, in pixels.
    pub size: u32,
    /// Which artwork to render.
    pub role: IconRole,
}

impl PngFile {
    /// Creates a PNG file description.
    pub fn new(name: &str, size: u32, role: IconRole) -> PngFile {
        PngFile {
            name: name.to_string(),
            size,
            role,
        }
    }
}

/// An ICNS file in an icon set, holding app artwork in the given slots.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcnsFile {
    /// File name, relative to the output directory.
    pub name: String,
    /// Slots to fill, in file order.
    pub icon_types: Vec<IconType>,
}

/// An ICO file in an icon set, holding app artwork at the given sizes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcoFile {
    /// File name, relative to the output directory.
    pub name: String,
    /// Side lengths, in directory order.
    pub sizes: Vec<u32>,
}

/// Describes every file an icon set consists of.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconSetLayout {
    /// Standalone PNG files.
    pub pngs: Vec<PngFile>,
    /// The macOS bundle icon, if any.
    pub icns: Option<IcnsFile>,
    /// The Windows bundle icon, if any.
    pub ico: Option<IcoFile>,
    /// Compression used for every PNG, standalone or embedded.
    pub compression: Compression,
}

impl Default for IconSetLayout {
    /// The files a desktop app bundle expects: three app PNGs, a menu-bar
    /// tray PNG, `icon.icns` and a multi-size `icon.ico`.
    fn default() -> IconSetLayout {
        IconSetLayout {
            pngs: vec![PngFile::new("32x32.png", 32, IconRole::App),
                       PngFile::new("128x128.png", 128, IconRole::App),
                       PngFile::new("128x128@2x.png", 256, IconRole::App),
                       PngFile::new("tray.png", 22, IconRole::Tray)],
            icns: Some(IcnsFile {
                name: "icon.icns".to_string(),
                icon_types: vec![IconType::RGBA32_128x128,
                                 IconType::RGBA32_256x256,
                                 IconType::RGBA32_512x512,
                                 IconType::RGBA32_512x512_2x,
                                 IconType::RGBA32_16x16_2x,
                                 IconType::RGBA32_32x32_2x,
                                 IconType::RGBA32_128x128_2x,
                                 IconType::RGBA32_256x256_2x],
            }),
            ico: Some(IcoFile {
                name: "icon.ico".to_string(),
                sizes: vec![16, 32, 48, 64, 128, 256],
            }),
            compression: Compression::BEST,
        }
    }
}

/// A file written by [`generate`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    /// File name, relative to the output directory.
    pub name: String,
    /// Where the file was written.
    pub path: PathBuf,
    /// Length of the file, in bytes.
    pub len: usize,
}

/// Renders and encodes every file in `layout`, then writes them into
/// `out_dir` (creating it if needed).
///
/// Nothing is written unless every file encodes successfully.  Each file is
/// written to a temporary file next to its destination and renamed into
/// place, so a failed write never leaves a partial file behind.  Files are
/// written one at a time, though: if a later write fails, the files written
/// before it stay in place and the directory holds a mix of new and old
/// icons.
pub fn generate<S>(source: &S, layout: &IconSetLayout, out_dir: &Path)
                   -> Result<Vec<Artifact>>
    where S: PixelSource + ?Sized
{
    let files = build(source, layout)?;
    fs::create_dir_all(out_dir).map_err(|err| Error::io(out_dir, err))?;
    let mut artifacts = Vec::with_capacity(files.len());
    for (name, data) in files {
        let path = out_dir.join(&name);
        write_atomic(&path, &data).map_err(|err| Error::artifact(&name, err))?;
        info!(path = %path.display(), bytes = data.len(), "wrote icon");
        artifacts.push(Artifact {
            name,
            path,
            len: data.len(),
        });
    }
    Ok(artifacts)
}

/// Renders and encodes every file in `layout` without touching the disk,
/// returning `(file name, contents)` pairs in layout order.
pub fn build<S>(source: &S, layout: &IconSetLayout)
                -> Result<Vec<(String, Vec<u8>)>>
    where S: PixelSource + ?Sized
{
    let mut renderer = Renderer {
        source,
        encoder: PngEncoder::new().compression(layout.compression),
        cache: BTreeMap::new(),
    };
    let mut files = Vec::new();

    for png in &layout.pngs {
        let image = renderer.png(png.size, png.role)
            .map_err(|err| Error::artifact(&png.name, err))?;
        files.push((png.name.clone(), image.data().to_vec()));
    }

    if let Some(ref icns) = layout.icns {
        let data = build_icns_file(&mut renderer, icns)
            .map_err(|err| Error::artifact(&icns.name, err))?;
        files.push((icns.name.clone(), data));
    }

    if let Some(ref ico) = layout.ico {
        let data = build_ico_file(&mut renderer, ico)
            .map_err(|err| Error::artifact(&ico.name, err))?;
        files.push((ico.name.clone(), data));
    }

    Ok(files)
}

fn build_icns_file<S>(renderer: &mut Renderer<S>, icns: &IcnsFile)
                      -> Result<Vec<u8>>
    where S: PixelSource + ?Sized
{
    let mut family = IcnsFamily::new();
    for &icon_type in &icns.icon_types {
        let image = renderer.png(icon_type.pixel_width(), IconRole::App)?;
        family.add_icon_with_type(image, icon_type)?;
    }
    Ok(family.to_bytes()?)
}

fn build_ico_file<S>(renderer: &mut Renderer<S>, ico: &IcoFile)
                     -> Result<Vec<u8>>
    where S: PixelSource + ?Sized
{
    let mut dir = IcoDir::new();
    for &size in &ico.sizes {
        dir.add_icon(renderer.png(size, IconRole::App)?)?;
    }
    Ok(dir.to_bytes()?)
}

/// Renders each (size, role) pair at most once.
struct Renderer<'a, S: PixelSource + ?Sized> {
    source: &'a S,
    encoder: PngEncoder,
    cache: BTreeMap<(u32, IconRole), PngImage>,
}

impl<'a, S: PixelSource + ?Sized> Renderer<'a, S> {
    fn png(&mut self, size: u32, role: IconRole) -> Result<&PngImage> {
        if !self.cache.contains_key(&(size, role)) {
            let image = self.render(size, role).map_err(|err| {
                Error::Render {
                    size,
                    role,
                    source: Box::new(err),
                }
            })?;
            self.cache.insert((size, role), image);
        }
        Ok(&self.cache[&(size, role)])
    }

    fn render(&self, size: u32, role: IconRole) -> Result<PngImage> {
        debug!(size, %role, "rendering icon");
        let buffer = self.source.render(size, role)?;
        if buffer.width() != size || buffer.height() != size {
            return Err(Error::WrongRenderSize {
                size,
                width: buffer.width(),
                height: buffer.height(),
            });
        }
        self.encoder.encode(&buffer)
    }
}

/// Writes `data` to `path` through a temporary file in the same directory.
/// The temporary file is removed if any step fails.
///
/// A new file gets the same permissions `fs::write` would give it; a
/// replaced file keeps its existing permissions.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = Builder::new();
    builder.prefix(".iconkit-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask, like any other newly created file.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir)
        .map_err(|err| Error::io(dir, err))?;
    fill(&mut file, data).map_err(|err| Error::io(file.path(), err))?;
    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            file.as_file()
                .set_permissions(existing.permissions())
                .map_err(|err| Error::io(file.path(), err))?;
        }
    }
    file.persist(path).map_err(|err| {
        let source = err.error;
        if let Err(cleanup) = err.file.close() {
            warn!(error = %cleanup, "failed to remove temporary file");
        }
        Error::io(path, source)
    })?;
    Ok(())
}

fn fill(file: &mut NamedTempFile, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data)?;
    file.flush()?;
    file.as_file().sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::image::PixelBuffer;
    use super::super::source::SolidColor;
    use std::cell::RefCell;

    #[test]
    fn default_layout_file_names() {
        let layout = IconSetLayout::default();
        let names: Vec<&str> =
            layout.pngs.iter().map(|png| png.name.as_str()).collect();
        assert_eq!(names,
                   vec!["32x32.png", "128x128.png", "128x128@2x.png",
                        "tray.png"]);
        assert_eq!(layout.icns.unwrap().icon_types.len(), 8);
        assert_eq!(layout.ico.unwrap().sizes, vec![16, 32, 48, 64, 128, 256]);
    }

    #[test]
    fn each_size_is_rendered_once() {
        let calls = RefCell::new(Vec::new());
        let source = |size: u32, role: IconRole| {
            calls.borrow_mut().push((size, role));
            PixelBuffer::filled(size, size, [0, 0, 255, 255])
        };
        let layout = IconSetLayout {
            compression: Compression::FAST,
            ..IconSetLayout::default()
        };
        let files = build(&source, &layout).unwrap();
        assert_eq!(files.len(), 6);
        let mut calls = calls.into_inner();
        let rendered = calls.len();
        calls.sort();
        calls.dedup();
        assert_eq!(rendered, calls.len());
        assert!(calls.contains(&(22, IconRole::Tray)));
        assert!(calls.contains(&(1024, IconRole::App)));
        assert!(calls.contains(&(48, IconRole::App)));
    }

    #[test]
    fn wrong_render_size_names_the_artifact() {
        let source = |size: u32, _role: IconRole| {
            PixelBuffer::new(size, size + 1)
        };
        let err = build(&source, &IconSetLayout::default()).unwrap_err();
        assert!(err.is_invalid_input());
        match err {
            Error::Artifact { ref name, ref source } => {
                assert_eq!(name, "32x32.png");
                match **source {
                    Error::Render { size: 32, role: IconRole::App, .. } => {}
                    ref other => panic!("unexpected source: {:?}", other),
                }
            }
            ref other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn oversized_ico_entry_is_rejected() {
        let layout = IconSetLayout {
            pngs: Vec::new(),
            icns: None,
            ico: Some(IcoFile {
                name: "big.ico".to_string(),
                sizes: vec![16, 512],
            }),
            compression: Compression::FAST,
        };
        let err = build(&SolidColor::default(), &layout).unwrap_err();
        match err {
            Error::Artifact { ref name, ref source } => {
                assert_eq!(name, "big.ico");
                assert!(matches!(**source,
                                 Error::IcoDimensions { width: 512, .. }));
            }
            ref other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.ico");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second".to_vec());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_onto_directory_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.ico");
        fs::create_dir(&path).unwrap();
        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(!err.is_invalid_input());
        assert!(matches!(err, Error::Io { .. }));
        assert!(path.is_dir());
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| {
                entry.unwrap().file_name().to_string_lossy().into_owned()
            })
            .collect();
        assert_eq!(names, vec!["icon.ico".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_uses_default_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.png");
        fs::write(&plain, b"data").unwrap();
        let path = dir.path().join("icon.png");
        write_atomic(&path, b"data").unwrap();
        let mode = |path: &Path| {
            fs::metadata(path).unwrap().permissions().mode() & 0o777
        };
        assert_eq!(mode(path.as_path()), mode(plain.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_keeps_permissions_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.icns");
        fs::write(&path, b"old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640))
            .unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new".to_vec());
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn write_atomic_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("icon.icns");
        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(!err.is_invalid_input());
        assert!(!path.exists());
    }
}
