//! A library for hand-emitting placeholder icon assets: a single-image ICO
//! file holding an uncompressed 32-bpp bitmap, and minimal RGB PNG files
//! made of IHDR, IDAT, and IEND chunks.
//!
//! Both formats are written byte by byte, with no imaging library involved.
//! The read side parses the same subset back, for checking generated files.
//!
//! ```
//! let icon = placeholder_icons::IcoBuilder::new(32, 32).to_bytes()?;
//! assert_eq!(icon.len(), 4158);
//! let png = placeholder_icons::PngBuilder::new(32, 32).to_bytes()?;
//! assert!(png.starts_with(&placeholder_icons::PNG_SIGNATURE));
//! # Ok::<(), std::io::Error>(())
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod assets;
mod chunk;
mod icondir;
mod image;
mod inspect;
pub mod logging;
mod pngfile;

pub use crate::assets::{
    write_icon, write_placeholders, IcoBuilder, PngTarget, ICON_FILE_NAME,
    ICON_SIZE, PNG_TARGETS,
};
pub use crate::chunk::{Chunk, ChunkType};
pub use crate::icondir::{IcoDirEntry, IcoFile};
pub use crate::image::IcoImage;
pub use crate::inspect::{describe_asset, inspect_files};
pub use crate::pngfile::{
    decode_pixels, IdatPayload, PngBuilder, PngFile, PngHeader, PNG_SIGNATURE,
};

//===========================================================================//
