//! Tile textures and CPU readback.

use image::RgbaImage;
use wgpu::{Device, Queue, Texture, TextureFormat, TextureUsages, TextureView};

use super::GpuError;

/// An RGBA texture holding one rasterised tile.
pub struct TileTexture {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl TileTexture {
    pub fn new(device: &Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_DST
                | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// View for sampling the tile from a host render pass.
    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Replace the texture contents. `image` must match the texture size.
    pub fn upload(&self, queue: &Queue, image: &RgbaImage) {
        debug_assert_eq!(image.dimensions(), (self.width, self.height));
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            extent(self.width, self.height),
        );
    }

    /// Copy the texture back to the CPU.
    pub fn read_back(&self, device: &Device, queue: &Queue) -> Result<RgbaImage, GpuError> {
        let readback = ReadbackBuffer::new(device, self.width, self.height);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tile_readback"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: readback.buffer(),
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(readback.padded_row_bytes()),
                    rows_per_image: Some(self.height),
                },
            },
            extent(self.width, self.height),
        );
        queue.submit(std::iter::once(encoder.finish()));

        let pixels = readback.read_pixels(device)?;
        RgbaImage::from_raw(self.width, self.height, pixels).ok_or(GpuError::ReadbackInterrupted)
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Readback buffer for copying GPU texture data to CPU.
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    height: u32,
    padded_row_bytes: u32,
    unpadded_row_bytes: u32,
}

impl ReadbackBuffer {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let unpadded_row_bytes = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = unpadded_row_bytes.div_ceil(align) * align;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tile_readback_buffer"),
            size: (padded_row_bytes * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            height,
            padded_row_bytes,
            unpadded_row_bytes,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes per row including alignment padding.
    pub fn padded_row_bytes(&self) -> u32 {
        self.padded_row_bytes
    }

    /// Map the buffer and return tightly packed RGBA rows.
    pub fn read_pixels(&self, device: &Device) -> Result<Vec<u8>, GpuError> {
        let slice = self.buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::PollType::wait_indefinitely())?;
        receiver.recv().map_err(|_| GpuError::ReadbackInterrupted)??;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((self.unpadded_row_bytes * self.height) as usize);
        for row in 0..self.height {
            let start = (row * self.padded_row_bytes) as usize;
            pixels.extend_from_slice(&data[start..start + self.unpadded_row_bytes as usize]);
        }
        drop(data);
        self.buffer.unmap();
        Ok(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_readback_buffer_padding() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let buffer = ReadbackBuffer::new(&ctx.device, 100, 4);
        assert_eq!(buffer.padded_row_bytes() % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
        assert!(buffer.padded_row_bytes() >= 400);
    }
}
