use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
pub(crate) const BMP_HEADER_LEN: u32 = 40;

// Every image is stored uncompressed at 32 bits per pixel.
pub(crate) const BITS_PER_PIXEL: u16 = 32;
const BYTES_PER_PIXEL: u32 = 4;

// Size limits for images in an ICO file.  The directory entry stores each
// dimension in a single byte, with zero standing for 256.
const MIN_SIZE: u32 = 1;
const MAX_SIZE: u32 = 256;

//===========================================================================//

/// One uncompressed 32-bpp bitmap, as stored in an ICO file.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IcoImage {
    width: u32,
    height: u32,
    pixel_data: Vec<u8>,
}

impl IcoImage {
    /// Creates a fully transparent black image of the given size.  Returns an
    /// error if either dimension is outside `1..=256`.
    pub fn blank(width: u32, height: u32) -> io::Result<IcoImage> {
        IcoImage::check_size(width, height)?;
        let len = (width * height * BYTES_PER_PIXEL) as usize;
        Ok(IcoImage { width, height, pixel_data: vec![0u8; len] })
    }

    /// Creates an image from a raw pixel buffer.  The buffer is stored
    /// verbatim as the bitmap color data (BGRA, bottom row first), so it must
    /// be exactly `4 * width * height` bytes long.
    pub fn from_pixel_data(
        width: u32,
        height: u32,
        pixel_data: Vec<u8>,
    ) -> io::Result<IcoImage> {
        IcoImage::check_size(width, height)?;
        let expected_len = (width * height * BYTES_PER_PIXEL) as usize;
        if pixel_data.len() != expected_len {
            invalid_input!(
                "Invalid pixel data length (was {}, but must be {} for \
                 {}x{} image)",
                pixel_data.len(),
                expected_len,
                width,
                height
            );
        }
        Ok(IcoImage { width, height, pixel_data })
    }

    fn check_size(width: u32, height: u32) -> io::Result<()> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&width) {
            invalid_input!(
                "Invalid width (was {}, but must be between {} and {})",
                width,
                MIN_SIZE,
                MAX_SIZE
            );
        }
        if !(MIN_SIZE..=MAX_SIZE).contains(&height) {
            invalid_input!(
                "Invalid height (was {}, but must be between {} and {})",
                height,
                MIN_SIZE,
                MAX_SIZE
            );
        }
        Ok(())
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the color depth, which is always 32.
    pub fn bits_per_pixel(&self) -> u16 {
        BITS_PER_PIXEL
    }

    /// Returns the raw pixel buffer.
    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    /// Encodes the image as a BITMAPINFOHEADER followed by the pixel buffer.
    /// No AND mask is appended, even though the header's height field counts
    /// one.
    pub(crate) fn write_bmp(&self) -> io::Result<Vec<u8>> {
        let data_size = BMP_HEADER_LEN as usize + self.pixel_data.len();
        let mut data = Vec::<u8>::with_capacity(data_size);
        data.write_u32::<LittleEndian>(BMP_HEADER_LEN)?;
        data.write_i32::<LittleEndian>(self.width as i32)?;
        // The height is stored doubled, as if an AND mask followed the color
        // data.
        data.write_i32::<LittleEndian>(2 * self.height as i32)?;
        data.write_u16::<LittleEndian>(1)?; // planes
        data.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
        data.write_u32::<LittleEndian>(0)?; // compression
        data.write_u32::<LittleEndian>(self.pixel_data.len() as u32)?;
        data.write_i32::<LittleEndian>(0)?; // horz ppm
        data.write_i32::<LittleEndian>(0)?; // vert ppm
        data.write_u32::<LittleEndian>(0)?; // colors used
        data.write_u32::<LittleEndian>(0)?; // colors important
        debug_assert_eq!(data.len(), BMP_HEADER_LEN as usize);
        data.write_all(&self.pixel_data)?;
        debug_assert_eq!(data.len(), data_size);
        Ok(data)
    }

    /// Decodes a BITMAPINFOHEADER and pixel buffer written by `write_bmp`.
    pub(crate) fn read_bmp<R: Read>(mut reader: R) -> io::Result<IcoImage> {
        let header_size = reader.read_u32::<LittleEndian>()?;
        if header_size != BMP_HEADER_LEN {
            invalid_data!(
                "Invalid BMP header size (was {}, must be {})",
                header_size,
                BMP_HEADER_LEN
            );
        }
        let width = reader.read_i32::<LittleEndian>()?;
        if width < MIN_SIZE as i32 || width > MAX_SIZE as i32 {
            invalid_data!("Invalid BMP width ({})", width);
        }
        let height = reader.read_i32::<LittleEndian>()?;
        if height % 2 != 0 {
            invalid_data!(
                "Invalid height field in BMP header \
                 (was {}, but must be divisible by 2)",
                height
            );
        }
        let height = height / 2;
        if height < MIN_SIZE as i32 || height > MAX_SIZE as i32 {
            invalid_data!("Invalid BMP height ({})", height);
        }
        let (width, height) = (width as u32, height as u32);
        let planes = reader.read_u16::<LittleEndian>()?;
        if planes != 1 {
            invalid_data!("Invalid BMP plane count ({})", planes);
        }
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        if bits_per_pixel != BITS_PER_PIXEL {
            invalid_data!(
                "Unsupported BMP bits-per-pixel (was {}, but only {} is \
                 supported)",
                bits_per_pixel,
                BITS_PER_PIXEL
            );
        }
        let compression = reader.read_u32::<LittleEndian>()?;
        if compression != 0 {
            invalid_data!("Unsupported BMP compression ({})", compression);
        }
        let pixel_len = width * height * BYTES_PER_PIXEL;
        let image_size = reader.read_u32::<LittleEndian>()?;
        // Zero is allowed here for uncompressed bitmaps.
        if image_size != 0 && image_size != pixel_len {
            invalid_data!(
                "Invalid BMP image size (was {}, but must be {} for {}x{} \
                 image)",
                image_size,
                pixel_len,
                width,
                height
            );
        }
        let _horz_ppm = reader.read_i32::<LittleEndian>()?;
        let _vert_ppm = reader.read_i32::<LittleEndian>()?;
        let _colors_used = reader.read_u32::<LittleEndian>()?;
        let _colors_important = reader.read_u32::<LittleEndian>()?;
        let mut pixel_data = vec![0u8; pixel_len as usize];
        reader.read_exact(&mut pixel_data)?;
        Ok(IcoImage { width, height, pixel_data })
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::IcoImage;
    use std::io::ErrorKind;

    #[test]
    fn blank_image_is_all_zero() {
        let image = IcoImage::blank(32, 32).unwrap();
        assert_eq!(image.pixel_data().len(), 32 * 32 * 4);
        assert!(image.pixel_data().iter().all(|&byte| byte == 0));
        assert_eq!(image.bits_per_pixel(), 32);
    }

    #[test]
    fn reject_out_of_range_sizes() {
        for &(width, height) in &[(0, 32), (32, 0), (257, 32), (32, 300)] {
            let error = IcoImage::blank(width, height).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidInput);
        }
        assert!(IcoImage::blank(256, 256).is_ok());
    }

    #[test]
    fn reject_wrong_pixel_data_length() {
        let error =
            IcoImage::from_pixel_data(2, 2, vec![0u8; 15]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn write_bmp_header() {
        let image = IcoImage::blank(2, 3).unwrap();
        let data = image.write_bmp().unwrap();
        let expected: &[u8] = b"\
            \x28\x00\x00\x00\x02\x00\x00\x00\x06\x00\x00\x00\
            \x01\x00\x20\x00\x00\x00\x00\x00\x18\x00\x00\x00\
            \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
            \x00\x00\x00\x00";
        assert_eq!(&data[..40], expected);
        assert_eq!(data.len(), 40 + 24);
    }

    #[test]
    fn read_bmp_keeps_pixel_data() {
        let pixels: Vec<u8> = (0..16).collect();
        let image = IcoImage::from_pixel_data(2, 2, pixels.clone()).unwrap();
        let data = image.write_bmp().unwrap();
        let decoded = IcoImage::read_bmp(data.as_slice()).unwrap();
        assert_eq!(decoded, image);
        assert_eq!(decoded.pixel_data(), pixels.as_slice());
    }

    #[test]
    fn read_bmp_with_odd_height_field() {
        let mut data = IcoImage::blank(2, 2).unwrap().write_bmp().unwrap();
        data[8] = 3;
        let error = IcoImage::read_bmp(data.as_slice()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn read_bmp_with_wrong_depth() {
        let mut data = IcoImage::blank(2, 2).unwrap().write_bmp().unwrap();
        data[14] = 24;
        let error = IcoImage::read_bmp(data.as_slice()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn read_truncated_bmp() {
        let data = IcoImage::blank(2, 2).unwrap().write_bmp().unwrap();
        let error = IcoImage::read_bmp(&data[..data.len() - 1]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnexpectedEof);
    }
}

//===========================================================================//
