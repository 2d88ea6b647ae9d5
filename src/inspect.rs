use crate::icondir::IcoFile;
use crate::pngfile::{decode_pixels, PngFile, PNG_SIGNATURE};
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use tracing::warn;

//===========================================================================//

/// Lists the structure of each file in `paths` to `out`.  A file that can't
/// be read or fails structural checks gets an `error:` line and the listing
/// moves on to the next file.  Returns how many files failed; only errors
/// writing to `out` itself are returned as `Err`.
pub fn inspect_files<P, W>(paths: &[P], mut out: W) -> io::Result<usize>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut num_failed = 0;
    for path in paths.iter() {
        let path = path.as_ref();
        writeln!(out, "{}:", path.display())?;
        let result = match fs::read(path) {
            Ok(bytes) => describe_asset(&bytes, &mut out),
            Err(error) => Err(error),
        };
        if let Err(error) = result {
            warn!(path = %path.display(), %error, "inspection failed");
            writeln!(out, "  error: {}", error)?;
            num_failed += 1;
        }
    }
    Ok(num_failed)
}

/// Writes the structure of one ICO or PNG file to `out`, telling the two
/// apart by the PNG signature.
pub fn describe_asset<W: Write>(bytes: &[u8], out: W) -> io::Result<()> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        describe_png(bytes, out)
    } else {
        describe_ico(bytes, out)
    }
}

fn describe_ico<W: Write>(bytes: &[u8], mut out: W) -> io::Result<()> {
    let icofile = IcoFile::read(Cursor::new(bytes))?;
    writeln!(
        out,
        "  ICO, {} bytes, {} entries",
        bytes.len(),
        icofile.entries().len()
    )?;
    for (index, entry) in icofile.entries().iter().enumerate() {
        writeln!(
            out,
            "{:5}: {}x{} BMP, {} bpp, {} bytes at offset {}",
            index,
            entry.width(),
            entry.height(),
            entry.bits_per_pixel(),
            entry.data().len(),
            entry.data_offset()
        )?;
        entry.decode()?;
    }
    Ok(())
}

fn describe_png<W: Write>(bytes: &[u8], mut out: W) -> io::Result<()> {
    let png = PngFile::read(bytes)?;
    let header = png.header()?;
    writeln!(
        out,
        "  PNG, {} bytes, {}x{}, depth {}, color type {}",
        bytes.len(),
        header.width,
        header.height,
        header.bit_depth,
        header.color_type
    )?;
    for chunk in png.chunks() {
        writeln!(
            out,
            "  {}: {} bytes, crc {:#010x}",
            chunk.chunk_type(),
            chunk.len(),
            chunk.crc()
        )?;
    }
    match decode_pixels(bytes) {
        Ok((_, pixels)) => {
            writeln!(out, "  decodes to {} bytes", pixels.len())
        }
        Err(error) => writeln!(out, "  does not decode: {}", error),
    }
}

//===========================================================================//


//===========================================================================//
