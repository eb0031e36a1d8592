use cgmath::Vector4;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex3 {
    pub position: Vector4<f32>,
    pub color: Vector4<f32>,
    pub normal: Vector4<f32>,
}

unsafe impl bytemuck::Pod for Vertex3 {}
unsafe impl bytemuck::Zeroable for Vertex3 {}

impl Vertex3 {
    pub fn new(position: [f32; 3], color: [f32; 4], normal: [f32; 3]) -> Self {
        Self {
            position: Vector4::new(position[0], position[1], position[2], 1.0),
            color: color.into(),
            normal: Vector4::new(normal[0], normal[1], normal[2], 0.0),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<Vector4<f32>>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<Vector4<f32>>() as wgpu::BufferAddress
                    * 2,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex3>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
