use crate::chunk::{Chunk, ChunkType, MAX_CHUNK_LEN};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

//===========================================================================//

/// The signature that all PNG files start with.
pub const PNG_SIGNATURE: [u8; 8] =
    [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

// The size of the IHDR chunk data, in bytes.
const IHDR_LEN: usize = 13;

// IHDR field values for 8-bit truecolor without interlacing.
const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGB: u8 = 2;
const BYTES_PER_PIXEL: usize = 3;

// A fixed zlib stream holding one stored deflate block with a single zero
// byte.  Its trailer is not a valid Adler-32 for that byte, and it does not
// depend on the image size, so decoders reject the pixel data.
const STUB_IDAT: &[u8] = &[
    0x08, 0x1d, 0x01, 0x01, 0x00, 0xfe, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00,
    0x01,
];

// zlib header for a deflate stream with a 32K window and no preset
// dictionary, at the "fastest" compression level.
const ZLIB_HEADER: [u8; 2] = [0x78, 0x01];

// A stored deflate block carries at most this many bytes.
const MAX_STORED_BLOCK_LEN: usize = 0xffff;

const ADLER_MOD: u32 = 65521;

//===========================================================================//

/// What goes in the IDAT chunk of a generated PNG.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum IdatPayload {
    /// The same fixed 13-byte block for every size.  The file is well-formed
    /// at the chunk level, but its pixel data does not match the declared
    /// dimensions and does not decode.
    #[default]
    Stub,
    /// Uncompressed (stored) deflate blocks holding a black scanline for
    /// every row, so the file decodes to an all-black image.
    Blank,
}

//===========================================================================//

/// Builds a minimal RGB PNG: signature, IHDR, one IDAT, and IEND.
#[derive(Clone, Debug)]
pub struct PngBuilder {
    width: u32,
    height: u32,
    payload: IdatPayload,
}

impl PngBuilder {
    /// Starts a PNG of the given size, using the stub IDAT payload.
    pub fn new(width: u32, height: u32) -> PngBuilder {
        PngBuilder { width, height, payload: IdatPayload::Stub }
    }

    /// Chooses the IDAT payload.
    pub fn payload(mut self, payload: IdatPayload) -> PngBuilder {
        self.payload = payload;
        self
    }

    /// Assembles the chunk sequence.  Returns an error if either dimension
    /// is zero or exceeds 2^31 - 1, which PNG forbids, or if a blank payload
    /// for that size would not fit in one IDAT chunk.
    pub fn build(&self) -> io::Result<PngFile> {
        if self.width == 0 || self.width > i32::MAX as u32 {
            invalid_input!("Invalid PNG width ({})", self.width);
        }
        if self.height == 0 || self.height > i32::MAX as u32 {
            invalid_input!("Invalid PNG height ({})", self.height);
        }
        let mut ihdr = Vec::<u8>::with_capacity(IHDR_LEN);
        ihdr.write_u32::<BigEndian>(self.width)?;
        ihdr.write_u32::<BigEndian>(self.height)?;
        ihdr.write_u8(BIT_DEPTH)?;
        ihdr.write_u8(COLOR_TYPE_RGB)?;
        ihdr.write_u8(0)?; // compression method
        ihdr.write_u8(0)?; // filter method
        ihdr.write_u8(0)?; // interlace method
        debug_assert_eq!(ihdr.len(), IHDR_LEN);
        let idat = match self.payload {
            IdatPayload::Stub => STUB_IDAT.to_vec(),
            IdatPayload::Blank => blank_idat(self.width, self.height)?,
        };
        Ok(PngFile {
            chunks: vec![
                Chunk::new(ChunkType::IHDR, ihdr),
                Chunk::new(ChunkType::IDAT, idat),
                Chunk::new(ChunkType::IEND, Vec::new()),
            ],
        })
    }

    /// Assembles the file and encodes it into a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        self.build()?.to_bytes()
    }
}

//===========================================================================//

/// The image size and format recorded in an IHDR chunk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PngHeader {
    /// Width of the image, in pixels.
    pub width: u32,
    /// Height of the image, in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: u8,
    /// PNG color type code (2 for RGB).
    pub color_type: u8,
    /// Interlace method (0 for none).
    pub interlace: u8,
}

/// A PNG file as an ordered sequence of IHDR, IDAT, and IEND chunks.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct PngFile {
    chunks: Vec<Chunk>,
}

impl PngFile {
    /// Returns the chunks, in file order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Parses the IHDR chunk.
    pub fn header(&self) -> io::Result<PngHeader> {
        let ihdr = match self.chunks.first() {
            Some(chunk) if chunk.chunk_type() == ChunkType::IHDR => chunk,
            _ => invalid_data!("PNG does not start with an IHDR chunk"),
        };
        if ihdr.data().len() != IHDR_LEN {
            invalid_data!(
                "Invalid IHDR length (was {}, but must be {})",
                ihdr.data().len(),
                IHDR_LEN
            );
        }
        let mut reader = ihdr.data();
        let width = reader.read_u32::<BigEndian>()?;
        let height = reader.read_u32::<BigEndian>()?;
        let bit_depth = reader.read_u8()?;
        let color_type = reader.read_u8()?;
        let _compression = reader.read_u8()?;
        let _filter = reader.read_u8()?;
        let interlace = reader.read_u8()?;
        Ok(PngHeader { width, height, bit_depth, color_type, interlace })
    }

    /// Reads a PNG file, checking the signature, every chunk's length and
    /// CRC, and that the chunks are one IHDR, then IDAT chunks, then IEND,
    /// with nothing after it.
    pub fn read<R: Read>(mut reader: R) -> io::Result<PngFile> {
        let mut signature = [0u8; 8];
        reader.read_exact(&mut signature)?;
        if signature != PNG_SIGNATURE {
            invalid_data!("Invalid PNG signature ({:02x?})", signature);
        }
        let mut chunks = Vec::<Chunk>::new();
        loop {
            let chunk = Chunk::read(&mut reader)?;
            let chunk_type = chunk.chunk_type();
            let expected: &[ChunkType] = match chunks.last() {
                None => &[ChunkType::IHDR],
                Some(prev) if prev.chunk_type() == ChunkType::IHDR => {
                    &[ChunkType::IDAT]
                }
                Some(_) => &[ChunkType::IDAT, ChunkType::IEND],
            };
            if !expected.contains(&chunk_type) {
                invalid_data!(
                    "Unexpected {} chunk at index {} (expected {:?})",
                    chunk_type,
                    chunks.len(),
                    expected
                );
            }
            chunks.push(chunk);
            if chunk_type == ChunkType::IEND {
                break;
            }
        }
        let mut trailing = [0u8; 1];
        if reader.read(&mut trailing)? != 0 {
            invalid_data!("Trailing data after IEND chunk");
        }
        let file = PngFile { chunks };
        file.header()?;
        Ok(file)
    }

    /// Writes the signature followed by every chunk.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&PNG_SIGNATURE)?;
        for chunk in self.chunks.iter() {
            chunk.write(&mut writer)?;
        }
        Ok(())
    }

    /// Encodes the whole file into a byte vector.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let len = PNG_SIGNATURE.len()
            + self.chunks.iter().map(Chunk::encoded_len).sum::<usize>();
        let mut bytes = Vec::with_capacity(len);
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}

//===========================================================================//

/// Fully decodes PNG data with the `png` crate and returns the header and
/// the raw samples.  Stub-payload files fail here even though `PngFile::read`
/// accepts them.
pub fn decode_pixels<R: Read>(reader: R) -> io::Result<(PngHeader, Vec<u8>)> {
    let decoder = png::Decoder::new(reader);
    let mut png_reader = match decoder.read_info() {
        Ok(png_reader) => png_reader,
        Err(error) => invalid_data!("Malformed PNG data: {}", error),
    };
    let mut buffer = vec![0u8; png_reader.output_buffer_size()];
    let frame = match png_reader.next_frame(&mut buffer) {
        Ok(frame) => frame,
        Err(error) => invalid_data!("Malformed PNG data: {}", error),
    };
    buffer.truncate(frame.buffer_size());
    let info = png_reader.info();
    let header = PngHeader {
        width: info.width,
        height: info.height,
        bit_depth: info.bit_depth as u8,
        color_type: info.color_type as u8,
        interlace: if info.interlaced { 1 } else { 0 },
    };
    Ok((header, buffer))
}

//===========================================================================//

fn blank_idat(width: u32, height: u32) -> io::Result<Vec<u8>> {
    let raw_len = (width as u64)
        .checked_mul(BYTES_PER_PIXEL as u64)
        .and_then(|samples| samples.checked_add(1))
        .and_then(|row_len| row_len.checked_mul(height as u64));
    let stream_len = raw_len.and_then(zlib_stored_len);
    let raw_len = match (raw_len, stream_len) {
        (Some(raw_len), Some(stream_len))
            if stream_len <= MAX_CHUNK_LEN as u64 =>
        {
            raw_len as usize
        }
        _ => invalid_input!(
            "Blank pixel data for {}x{} image does not fit in an IDAT chunk",
            width,
            height
        ),
    };
    // Each row is a filter-type byte of zero followed by black samples.
    let raw = vec![0u8; raw_len];
    zlib_stored(&raw)
}

/// Returns the length of the stream `zlib_stored` produces for `raw_len`
/// bytes of input, or `None` on overflow.
fn zlib_stored_len(raw_len: u64) -> Option<u64> {
    let block_len = MAX_STORED_BLOCK_LEN as u64;
    let num_blocks = raw_len.div_ceil(block_len).max(1);
    num_blocks
        .checked_mul(5)?
        .checked_add(raw_len)?
        .checked_add((ZLIB_HEADER.len() + 4) as u64)
}

/// Wraps `raw` in a zlib stream made of stored (uncompressed) deflate
/// blocks.
fn zlib_stored(raw: &[u8]) -> io::Result<Vec<u8>> {
    let num_blocks = raw.len().div_ceil(MAX_STORED_BLOCK_LEN).max(1);
    let mut stream =
        Vec::<u8>::with_capacity(2 + 5 * num_blocks + raw.len() + 4);
    stream.write_all(&ZLIB_HEADER)?;
    let mut blocks = raw.chunks(MAX_STORED_BLOCK_LEN).peekable();
    if blocks.peek().is_none() {
        write_stored_block(&mut stream, &[], true)?;
    }
    while let Some(block) = blocks.next() {
        let is_final = blocks.peek().is_none();
        write_stored_block(&mut stream, block, is_final)?;
    }
    stream.write_u32::<BigEndian>(adler32(raw))?;
    Ok(stream)
}

fn write_stored_block<W: Write>(
    mut writer: W,
    block: &[u8],
    is_final: bool,
) -> io::Result<()> {
    debug_assert!(block.len() <= MAX_STORED_BLOCK_LEN);
    // BFINAL in bit 0, BTYPE=00 in bits 1-2, then padding to a byte boundary.
    writer.write_u8(if is_final { 1 } else { 0 })?;
    let len = block.len() as u16;
    writer.write_u16::<LittleEndian>(len)?;
    writer.write_u16::<LittleEndian>(!len)?;
    writer.write_all(block)
}

fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    // 5552 is the most bytes that can be summed before `b` could overflow.
    for block in data.chunks(5552) {
        for &byte in block {
            a += byte as u32;
            b += a;
        }
        a %= ADLER_MOD;
        b %= ADLER_MOD;
    }
    (b << 16) | a
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{
        adler32, decode_pixels, zlib_stored, zlib_stored_len, IdatPayload,
        PngBuilder, PngFile, STUB_IDAT,
    };
    use crate::chunk::ChunkType;
    use std::io::ErrorKind;

    #[test]
    fn adler32_check_values() {
        assert_eq!(adler32(b""), 1);
        assert_eq!(adler32(b"Wikipedia"), 0x11e6_0398);
        assert_eq!(adler32(&[0u8]), 0x0001_0001);
    }

    #[test]
    fn zlib_stored_empty_input() {
        let stream = zlib_stored(&[]).unwrap();
        let expected: &[u8] =
            b"\x78\x01\x01\x00\x00\xff\xff\x00\x00\x00\x01";
        assert_eq!(stream.as_slice(), expected);
    }

    #[test]
    fn zlib_stored_splits_long_input() {
        let raw = vec![0u8; 0xffff + 10];
        let stream = zlib_stored(&raw).unwrap();
        assert_eq!(stream.len(), 2 + 5 + 0xffff + 5 + 10 + 4);
        // First block is not final and carries 0xffff bytes.
        assert_eq!(&stream[2..7], b"\x00\xff\xff\x00\x00");
        let second = 2 + 5 + 0xffff;
        assert_eq!(&stream[second..second + 5], b"\x01\x0a\x00\xf5\xff");
    }

    #[test]
    fn stub_png_layout() {
        let file = PngBuilder::new(32, 32).build().unwrap();
        let types: Vec<ChunkType> =
            file.chunks().iter().map(|chunk| chunk.chunk_type()).collect();
        assert_eq!(
            types,
            vec![ChunkType::IHDR, ChunkType::IDAT, ChunkType::IEND]
        );
        assert_eq!(file.chunks()[1].data(), STUB_IDAT);
        assert!(file.chunks()[2].is_empty());
        let header = file.header().unwrap();
        assert_eq!((header.width, header.height), (32, 32));
        assert_eq!((header.bit_depth, header.color_type), (8, 2));
    }

    #[test]
    fn reject_zero_size() {
        let error = PngBuilder::new(0, 4).build().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        let error = PngBuilder::new(4, 0).build().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn reject_sizes_beyond_png_limit() {
        let error = PngBuilder::new(0x8000_0000, 4).build().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        let error = PngBuilder::new(4, u32::MAX).build().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert!(PngBuilder::new(0x7fff_ffff, 0x7fff_ffff).build().is_ok());
    }

    #[test]
    fn reject_blank_payload_too_large_for_idat() {
        let error = PngBuilder::new(0x7fff_ffff, 0x7fff_ffff)
            .payload(IdatPayload::Blank)
            .build()
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        // 1 + 3 * 0x2aaa_aaaa bytes per row is just under 2 GiB on its own;
        // two rows overflow the chunk length limit.
        let error = PngBuilder::new(0x2aaa_aaaa, 2)
            .payload(IdatPayload::Blank)
            .build()
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn zlib_stored_len_matches_stream() {
        for &len in &[0usize, 1, 0xffff, 0xffff + 1, 3 * 0xffff + 7] {
            let stream = zlib_stored(&vec![0u8; len]).unwrap();
            assert_eq!(zlib_stored_len(len as u64), Some(stream.len() as u64));
        }
        assert_eq!(zlib_stored_len(u64::MAX), None);
    }

    #[test]
    fn read_rejects_bad_signature() {
        let mut bytes = PngBuilder::new(1, 1).to_bytes().unwrap();
        bytes[1] = b'Q';
        let error = PngFile::read(bytes.as_slice()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn read_rejects_trailing_data() {
        let mut bytes = PngBuilder::new(1, 1).to_bytes().unwrap();
        bytes.push(0);
        let error = PngFile::read(bytes.as_slice()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn read_rejects_missing_idat() {
        let mut bytes = PngBuilder::new(1, 1).to_bytes().unwrap();
        // Cut the IDAT chunk (12 + 13 bytes) out from after the IHDR chunk.
        let idat_start = 8 + 12 + 13;
        bytes.drain(idat_start..idat_start + 12 + STUB_IDAT.len());
        let error = PngFile::read(bytes.as_slice()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn read_rejects_missing_iend() {
        let bytes = PngBuilder::new(1, 1).to_bytes().unwrap();
        let error = PngFile::read(&bytes[..bytes.len() - 12]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn blank_png_decodes() {
        let bytes = PngBuilder::new(5, 3)
            .payload(IdatPayload::Blank)
            .to_bytes()
            .unwrap();
        let (header, pixels) = decode_pixels(bytes.as_slice()).unwrap();
        assert_eq!((header.width, header.height), (5, 3));
        assert_eq!(pixels, vec![0u8; 5 * 3 * 3]);
    }

    #[test]
    fn stub_png_does_not_decode() {
        let bytes = PngBuilder::new(32, 32).to_bytes().unwrap();
        assert!(PngFile::read(bytes.as_slice()).is_ok());
        let error = decode_pixels(bytes.as_slice()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }
}

//===========================================================================//
