use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Write};
use tracing::debug;

//===========================================================================//

// PNG limits chunk lengths to 2^31 - 1 bytes.
pub(crate) const MAX_CHUNK_LEN: u32 = 0x7fff_ffff;

//===========================================================================//

/// The four-byte tag that names a PNG chunk.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    /// The image header chunk, which must come first.
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    /// A chunk of zlib-compressed image data.
    pub const IDAT: ChunkType = ChunkType(*b"IDAT");
    /// The end-of-stream marker, which must come last.
    pub const IEND: ChunkType = ChunkType(*b"IEND");

    /// Returns the raw tag bytes.
    pub fn bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        for &byte in self.0.iter() {
            if byte.is_ascii_graphic() {
                write!(formatter, "{}", byte as char)?;
            } else {
                write!(formatter, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

//===========================================================================//

/// One PNG chunk.  The length and CRC fields are derived from the data when
/// the chunk is written, so they always agree with it.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Chunk {
    chunk_type: ChunkType,
    data: Vec<u8>,
}

impl Chunk {
    /// Creates a chunk with the given type tag and data.
    pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Chunk {
        Chunk { chunk_type, data }
    }

    /// Returns the type tag of this chunk.
    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    /// Returns the chunk data, excluding the length, type, and CRC fields.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the value of the length field: the number of data bytes.
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    /// Returns true if the chunk carries no data (as IEND does).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the CRC-32 of the type tag followed by the data.
    pub fn crc(&self) -> u32 {
        chunk_crc(&self.chunk_type, &self.data)
    }

    /// Returns the number of bytes this chunk occupies in a PNG stream.
    pub fn encoded_len(&self) -> usize {
        12 + self.data.len()
    }

    /// Writes the length, type, data, and CRC fields.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.data.len() > MAX_CHUNK_LEN as usize {
            invalid_input!(
                "{} chunk is too long (was {} bytes, but max is {})",
                self.chunk_type,
                self.data.len(),
                MAX_CHUNK_LEN
            );
        }
        let crc = self.crc();
        writer.write_u32::<BigEndian>(self.len())?;
        writer.write_all(self.chunk_type.bytes())?;
        writer.write_all(&self.data)?;
        writer.write_u32::<BigEndian>(crc)?;
        debug!(
            chunk = %self.chunk_type,
            len = self.len(),
            crc,
            "wrote chunk"
        );
        Ok(())
    }

    /// Reads one chunk, checking its length limit and CRC.
    pub fn read<R: Read>(mut reader: R) -> io::Result<Chunk> {
        let len = reader.read_u32::<BigEndian>()?;
        if len > MAX_CHUNK_LEN {
            invalid_data!(
                "Invalid chunk length (was {}, but max is {})",
                len,
                MAX_CHUNK_LEN
            );
        }
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag)?;
        let chunk_type = ChunkType(tag);
        let mut data = Vec::new();
        let read_len =
            reader.by_ref().take(len as u64).read_to_end(&mut data)?;
        if read_len != len as usize {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{} chunk is truncated (has {} of {} data bytes)",
                    chunk_type, read_len, len
                ),
            ));
        }
        let stored_crc = reader.read_u32::<BigEndian>()?;
        let actual_crc = chunk_crc(&chunk_type, &data);
        if stored_crc != actual_crc {
            invalid_data!(
                "CRC mismatch in {} chunk (stored {:#010x}, computed \
                 {:#010x})",
                chunk_type,
                stored_crc,
                actual_crc
            );
        }
        Ok(Chunk { chunk_type, data })
    }
}

//===========================================================================//

fn chunk_crc(chunk_type: &ChunkType, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(chunk_type.bytes());
    hasher.update(data);
    hasher.finalize()
}

//===========================================================================//


//===========================================================================//
