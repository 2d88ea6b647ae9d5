use crate::image::{IcoImage, BITS_PER_PIXEL, BMP_HEADER_LEN};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::debug;

//===========================================================================//

// The resource type number for icons (cursors would be 2).
const ICON_TYPE: u16 = 1;

// The sizes of the ICONDIR and ICONDIRENTRY structs, in bytes.
const ICONDIR_LEN: u32 = 6;
const ICONDIRENTRY_LEN: u32 = 16;

//===========================================================================//

/// The contents of a single ICO file: a directory of uncompressed bitmaps.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IcoFile {
    entries: Vec<IcoDirEntry>,
}

impl IcoFile {
    /// Creates a new ICO file with no images.
    pub fn new() -> IcoFile {
        IcoFile { entries: Vec::new() }
    }

    /// Returns the entries in this file.
    pub fn entries(&self) -> &[IcoDirEntry] {
        &self.entries
    }

    /// Adds an entry to the file.  The data offsets of all entries are
    /// recomputed to match the layout that `write` produces.
    pub fn add_entry(&mut self, entry: IcoDirEntry) {
        self.entries.push(entry);
        let mut data_offset = IcoFile::first_data_offset(self.entries.len());
        for entry in self.entries.iter_mut() {
            entry.data_offset = data_offset;
            data_offset += entry.data.len() as u32;
        }
    }

    fn first_data_offset(num_entries: usize) -> u32 {
        ICONDIR_LEN + ICONDIRENTRY_LEN * (num_entries as u32)
    }

    /// Reads an ICO file into memory.  Only icon (not cursor) files holding
    /// uncompressed 32-bpp bitmaps are accepted.
    pub fn read<R: Read + Seek>(mut reader: R) -> io::Result<IcoFile> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            invalid_data!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        if restype != ICON_TYPE {
            invalid_data!(
                "Unsupported resource type (was {}, but must be {})",
                restype,
                ICON_TYPE
            );
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let mut entries = Vec::<IcoDirEntry>::with_capacity(num_entries);
        let mut spans = Vec::<(u32, u32)>::with_capacity(num_entries);
        for _ in 0..num_entries {
            let width_byte = reader.read_u8()?;
            let height_byte = reader.read_u8()?;
            let num_colors = reader.read_u8()?;
            let reserved = reader.read_u8()?;
            if reserved != 0 {
                invalid_data!(
                    "Invalid reserved field value in ICONDIRENTRY \
                     (was {}, but must be 0)",
                    reserved
                );
            }
            let color_planes = reader.read_u16::<LittleEndian>()?;
            let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
            let data_size = reader.read_u32::<LittleEndian>()?;
            let data_offset = reader.read_u32::<LittleEndian>()?;
            spans.push((data_offset, data_size));
            entries.push(IcoDirEntry {
                width: if width_byte == 0 { 256 } else { width_byte as u32 },
                height: if height_byte == 0 {
                    256
                } else {
                    height_byte as u32
                },
                num_colors,
                color_planes,
                bits_per_pixel,
                data_offset,
                data: Vec::new(),
            });
        }
        // The declared sizes come straight from the file, so the buffers
        // grow only as far as the stream actually reaches.
        for (index, &(data_offset, data_size)) in spans.iter().enumerate() {
            reader.seek(SeekFrom::Start(data_offset as u64))?;
            let mut data = Vec::new();
            let read_len = reader
                .by_ref()
                .take(data_size as u64)
                .read_to_end(&mut data)?;
            if read_len != data_size as usize {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "Image data of entry {} is truncated \
                         (has {} of {} bytes at offset {})",
                        index, read_len, data_size, data_offset
                    ),
                ));
            }
            entries[index].data = data;
        }
        Ok(IcoFile { entries })
    }

    /// Writes the ICO file out, with the image data of each entry placed
    /// directly after the directory, in entry order.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.entries.len() > (u16::MAX as usize) {
            invalid_input!(
                "Too many entries in IcoFile (was {}, but max is {})",
                self.entries.len(),
                u16::MAX
            );
        }
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(ICON_TYPE)?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut data_offset = IcoFile::first_data_offset(self.entries.len());
        for entry in self.entries.iter() {
            // A width/height byte of zero indicates a size of 256.
            let width = if entry.width > 255 { 0 } else { entry.width as u8 };
            writer.write_u8(width)?;
            let height =
                if entry.height > 255 { 0 } else { entry.height as u8 };
            writer.write_u8(height)?;
            writer.write_u8(entry.num_colors)?;
            writer.write_u8(0)?; // reserved
            writer.write_u16::<LittleEndian>(entry.color_planes)?;
            writer.write_u16::<LittleEndian>(entry.bits_per_pixel)?;
            let data_size = entry.data.len() as u32;
            writer.write_u32::<LittleEndian>(data_size)?;
            writer.write_u32::<LittleEndian>(data_offset)?;
            debug!(
                width = entry.width,
                height = entry.height,
                data_size,
                data_offset,
                "wrote ICONDIRENTRY"
            );
            data_offset += data_size;
        }
        for entry in self.entries.iter() {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// Encodes the whole file into a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}

//===========================================================================//

/// One entry in an ICO file: the directory record plus its encoded bitmap.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IcoDirEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_offset: u32,
    data: Vec<u8>,
}

impl IcoDirEntry {
    /// Encodes an image as an uncompressed bitmap entry.
    pub fn encode(image: &IcoImage) -> io::Result<IcoDirEntry> {
        let data = image.write_bmp()?;
        debug_assert_eq!(
            data.len(),
            BMP_HEADER_LEN as usize + image.pixel_data().len()
        );
        Ok(IcoDirEntry {
            width: image.width(),
            height: image.height(),
            num_colors: 0,
            color_planes: 1,
            bits_per_pixel: BITS_PER_PIXEL,
            data_offset: 0,
            data,
        })
    }

    /// Decodes this entry back into an image.  Returns an error if the data
    /// is malformed or disagrees with the directory record.
    pub fn decode(&self) -> io::Result<IcoImage> {
        let image = IcoImage::read_bmp(self.data.as_slice())?;
        if image.width() != self.width || image.height() != self.height {
            invalid_data!(
                "Encoded image has wrong dimensions \
                 (was {}x{}, but should be {}x{})",
                image.width(),
                image.height(),
                self.width,
                self.height
            );
        }
        Ok(image)
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the palette size recorded in the directory (zero for
    /// true-color images).
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the number of color planes recorded in the directory.
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the bits-per-pixel recorded in the directory.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the byte offset of the image data within the file.  For a
    /// file that was read, this is the offset found in the directory; for a
    /// file being built, it is where `IcoFile::write` will place the data.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Returns the encoded image data (info header plus pixel buffer).
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

//===========================================================================//


//===========================================================================//
