//! The command sink a [`SphereMesh`](crate::SphereMesh) draws into.

use std::ops::Range;

/// The subset of render-pass commands an instanced indexed draw needs.
///
/// Implemented for [`wgpu::RenderPass`]; anything else implementing it
/// (a command recorder, a bundle encoder wrapper) receives exactly the same
/// call sequence.
pub trait DrawTarget {
    /// Bind `buffer` to vertex binding `slot`.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer);

    /// Bind `buffer` as the element source.
    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer, format: wgpu::IndexFormat);

    /// Issue one indexed, instanced draw.
    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);
}

impl DrawTarget for wgpu::RenderPass<'_> {
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer) {
        wgpu::RenderPass::set_vertex_buffer(self, slot, buffer.slice(..));
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer, format: wgpu::IndexFormat) {
        wgpu::RenderPass::set_index_buffer(self, buffer.slice(..), format);
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        wgpu::RenderPass::draw_indexed(self, indices, base_vertex, instances);
    }
}
