use crate::icondir::{IcoDirEntry, IcoFile};
use crate::image::IcoImage;
use crate::pngfile::{IdatPayload, PngBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

//===========================================================================//

/// File name of the generated icon.
pub const ICON_FILE_NAME: &str = "icon.ico";

/// Width and height of the generated icon, in pixels.
pub const ICON_SIZE: u32 = 32;

/// One generated PNG: its file name and declared size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PngTarget {
    /// File name, relative to the output directory.
    pub file_name: &'static str,
    /// Width written to IHDR.
    pub width: u32,
    /// Height written to IHDR.
    pub height: u32,
}

/// The PNG files written by `write_placeholders`, in order.  The `@2x` file
/// declares the same size as its 1x sibling.
pub const PNG_TARGETS: [PngTarget; 3] = [
    PngTarget { file_name: "32x32.png", width: 32, height: 32 },
    PngTarget { file_name: "128x128.png", width: 128, height: 128 },
    PngTarget { file_name: "128x128@2x.png", width: 128, height: 128 },
];

//===========================================================================//

/// Builds a single-image ICO file holding a fully transparent bitmap of the
/// given size.
#[derive(Clone, Copy, Debug)]
pub struct IcoBuilder {
    width: u32,
    height: u32,
}

impl IcoBuilder {
    /// Starts an icon of the given size.
    pub fn new(width: u32, height: u32) -> IcoBuilder {
        IcoBuilder { width, height }
    }

    /// Assembles the icon.  Returns an error if either dimension is outside
    /// `1..=256`.
    pub fn build(&self) -> io::Result<IcoFile> {
        let image = IcoImage::blank(self.width, self.height)?;
        let mut icofile = IcoFile::new();
        icofile.add_entry(IcoDirEntry::encode(&image)?);
        Ok(icofile)
    }

    /// Assembles the icon and encodes it into a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        self.build()?.to_bytes()
    }
}

//===========================================================================//

/// Writes the placeholder `icon.ico` into `out_dir`, creating the directory
/// if needed, and returns the path written.
pub fn write_icon(out_dir: &Path) -> io::Result<PathBuf> {
    let bytes = IcoBuilder::new(ICON_SIZE, ICON_SIZE).to_bytes()?;
    write_asset(out_dir, ICON_FILE_NAME, &bytes)
}

/// Writes every file in `PNG_TARGETS` into `out_dir`, creating the directory
/// if needed, and returns the paths written.
pub fn write_placeholders(
    out_dir: &Path,
    payload: IdatPayload,
) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(PNG_TARGETS.len());
    for target in PNG_TARGETS.iter() {
        let bytes = PngBuilder::new(target.width, target.height)
            .payload(payload)
            .to_bytes()?;
        paths.push(write_asset(out_dir, target.file_name, &bytes)?);
    }
    Ok(paths)
}

fn write_asset(
    out_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);
    fs::write(&path, bytes)?;
    info!(path = %path.display(), len = bytes.len(), "wrote asset");
    Ok(path)
}

//===========================================================================//


//===========================================================================//
