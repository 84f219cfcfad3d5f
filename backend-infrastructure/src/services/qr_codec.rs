use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use backend_domain::ports::{CodeDecoder, CodeRenderer};
use backend_domain::{RuntimeConfig, TicketToken};

const QUIET_ZONE_MODULES: u32 = 4;
const DARK: u8 = 0;
const LIGHT: u8 = 255;

/// QR rendering to PNG and decoding from raster images.
#[derive(Debug, Clone, Copy)]
pub struct QrCodec {
    module_pixels: u32,
    quiet_zone: bool,
}

impl QrCodec {
    pub fn new(module_pixels: u32, quiet_zone: bool) -> Self {
        Self {
            module_pixels: module_pixels.max(1),
            quiet_zone,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.qr_module_pixels, config.qr_quiet_zone)
    }

    fn rasterize(&self, code: &QrCode) -> Result<GrayImage> {
        let modules = u32::try_from(code.width()).context("qr code too wide")?;
        let margin = if self.quiet_zone { QUIET_ZONE_MODULES } else { 0 };
        let side = (modules + 2 * margin) * self.module_pixels;
        let mut image = GrayImage::from_pixel(side, side, Luma([LIGHT]));

        for (index, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let index = index as u32;
            let x0 = (index % modules + margin) * self.module_pixels;
            let y0 = (index / modules + margin) * self.module_pixels;
            for dy in 0..self.module_pixels {
                for dx in 0..self.module_pixels {
                    image.put_pixel(x0 + dx, y0 + dy, Luma([DARK]));
                }
            }
        }
        Ok(image)
    }
}

impl Default for QrCodec {
    fn default() -> Self {
        Self::new(8, true)
    }
}

impl CodeRenderer for QrCodec {
    fn render_png(&self, token: &TicketToken) -> Result<Vec<u8>> {
        let code = QrCode::with_error_correction_level(token.as_str().as_bytes(), EcLevel::M)
            .map_err(|err| anyhow!("cannot encode ticket {}: {}", token, err))?;
        let image = self.rasterize(&code)?;

        let mut png = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("png encoding failed")?;
        Ok(png)
    }
}

impl CodeDecoder for QrCodec {
    fn decode_image(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let luma = image::load_from_memory(bytes)
            .context("unsupported image")?
            .to_luma8();
        let (width, height) = luma.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );

        let mut decoded = Vec::new();
        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => decoded.push(content),
                Err(err) => debug!("skipping undecodable grid: {}", err),
            }
        }
        Ok(decoded)
    }
}
