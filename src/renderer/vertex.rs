//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in game units with RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.05, 0.09, 0.07, 1.0];
    /// Target face from the outside in: white, black, blue, red, gold
    pub const RING_WHITE: [f32; 4] = [0.94, 0.94, 0.92, 1.0];
    pub const RING_BLACK: [f32; 4] = [0.12, 0.12, 0.14, 1.0];
    pub const RING_BLUE: [f32; 4] = [0.2, 0.55, 0.9, 1.0];
    pub const RING_RED: [f32; 4] = [0.9, 0.22, 0.2, 1.0];
    pub const RING_GOLD: [f32; 4] = [1.0, 0.84, 0.2, 1.0];
    pub const RING_LINE: [f32; 4] = [0.0, 0.0, 0.0, 0.35];
    pub const TARGET_STAND: [f32; 4] = [0.35, 0.24, 0.14, 1.0];
    pub const IMPACT: [f32; 4] = [0.15, 0.1, 0.05, 0.85];
    pub const IMPACT_LATEST: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const AIM: [f32; 4] = [0.2, 1.0, 0.4, 0.9];
    pub const WIND: [f32; 4] = [0.6, 0.85, 1.0, 0.9];
    pub const BAR_TRACK: [f32; 4] = [1.0, 1.0, 1.0, 0.15];
    pub const BAR_LOW: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const BAR_HIGH: [f32; 4] = [1.0, 0.3, 0.2, 1.0];
}
