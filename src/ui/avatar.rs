use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::{bail, Context as _};
use eframe::egui;

const MAX_AVATAR_BYTES: usize = 8 * 1024 * 1024;
const THUMBNAIL_SIDE: u32 = 128;

/// Downloads and decodes the avatar off the UI thread.
#[derive(Default)]
pub struct AvatarCache {
    url: Option<String>,
    texture: Option<egui::TextureHandle>,
    pending: Option<Receiver<anyhow::Result<egui::ColorImage>>>,
    error: Option<String>,
}

impl AvatarCache {
    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a fetch when the wanted URL changes.
    pub fn want(&mut self, ctx: &egui::Context, url: Option<&str>) {
        if self.url.as_deref() == url {
            return;
        }

        self.url = url.map(str::to_string);
        self.texture = None;
        self.error = None;
        self.pending = None;

        let Some(url) = url else {
            return;
        };

        let (tx, rx) = mpsc::channel();
        let url = url.to_string();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(fetch_avatar(&url));
            ctx.request_repaint();
        });
        self.pending = Some(rx);
    }

    pub fn poll(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.pending else {
            return;
        };

        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.pending = None;

        match result {
            Ok(image) => {
                self.texture = Some(ctx.load_texture("avatar", image, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                tracing::warn!(error = %e, "avatar fetch failed");
                self.error = Some(format!("头像加载失败: {e}"));
            }
        }
    }
}

fn fetch_avatar(url: &str) -> anyhow::Result<egui::ColorImage> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()?;

    let resp = client.get(url).send()?.error_for_status()?;
    if let Some(len) = resp.content_length() {
        if len > MAX_AVATAR_BYTES as u64 {
            bail!("image is too large ({len} bytes)");
        }
    }

    let bytes = read_capped(resp, MAX_AVATAR_BYTES)?;
    decode_avatar(&bytes)
}

/// Reads at most `limit` bytes, failing instead of buffering anything larger.
fn read_capped(reader: impl Read, limit: usize) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)
        .context("failed to read image body")?;
    if bytes.len() > limit {
        bail!("image is larger than {limit} bytes");
    }
    Ok(bytes)
}

pub fn decode_avatar(bytes: &[u8]) -> anyhow::Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes)
        .context("unsupported image (PNG or JPEG expected)")?
        .thumbnail(THUMBNAIL_SIDE, THUMBNAIL_SIDE)
        .to_rgba8();

    let size = [image.width() as usize, image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, image.as_flat_samples().as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_png_into_thumbnail() {
        let source = image::RgbaImage::from_pixel(300, 150, image::Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_avatar(&png).unwrap();

        assert_eq!(decoded.size, [128, 64]);
    }

    #[test]
    fn body_over_limit_is_rejected() {
        let body = vec![0u8; 64];

        assert_eq!(read_capped(Cursor::new(&body), 64).unwrap().len(), 64);
        assert!(read_capped(Cursor::new(&body), 63).is_err());
    }

    #[test]
    fn rejects_non_images() {
        assert!(decode_avatar(b"<html>not an image</html>").is_err());
    }
}
