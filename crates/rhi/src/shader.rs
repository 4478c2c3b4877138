//! SPIR-V shader modules.
//!
//! Shaders are compiled ahead of time and loaded from disk.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::path::Path;
//! use triframe_rhi::device::Device;
//! use triframe_rhi::shader::{Shader, ShaderStage};
//!
//! # fn example(device: Arc<Device>) -> Result<(), triframe_rhi::RhiError> {
//! let vertex_shader = Shader::from_spirv_file(
//!     device,
//!     Path::new("shaders/spirv/triangle.vert.spv"),
//!     ShaderStage::Vertex,
//!     "VSMain",
//! )?;
//! let _stage = vertex_shader.stage_create_info();
//! # Ok(())
//! # }
//! ```

use std::ffi::{CStr, CString};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn to_vk_stage(self) -> vk::ShaderStageFlags {
        match self {
            ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A shader module plus the stage and entry point it is used with.
pub struct Shader {
    device: Arc<Device>,
    module: vk::ShaderModule,
    stage: ShaderStage,
    entry_point: CString,
}

impl Shader {
    pub fn from_spirv_file(
        device: Arc<Device>,
        path: &Path,
        stage: ShaderStage,
        entry_point: &str,
    ) -> RhiResult<Self> {
        debug!("Loading {} shader from {:?}", stage, path);

        let bytes = std::fs::read(path).map_err(|e| {
            RhiError::ShaderError(format!("Failed to read shader file {}: {}", path.display(), e))
        })?;

        Self::from_spirv_bytes(device, &bytes, stage, entry_point)
    }

    pub fn from_spirv_bytes(
        device: Arc<Device>,
        bytes: &[u8],
        stage: ShaderStage,
        entry_point: &str,
    ) -> RhiResult<Self> {
        let code = parse_spirv(bytes)?;
        let entry_point = CString::new(entry_point)
            .map_err(|e| RhiError::ShaderError(format!("Invalid entry point name: {}", e)))?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);
        let module = unsafe { device.handle().create_shader_module(&create_info, None)? };

        debug!(
            "Created {} shader module ({} words, entry point {:?})",
            stage,
            code.len(),
            entry_point
        );

        Ok(Self {
            device,
            module,
            stage,
            entry_point,
        })
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn entry_point(&self) -> &CStr {
        &self.entry_point
    }

    pub fn stage_create_info(&self) -> vk::PipelineShaderStageCreateInfo<'_> {
        vk::PipelineShaderStageCreateInfo::default()
            .stage(self.stage.to_vk_stage())
            .module(self.module)
            .name(&self.entry_point)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_shader_module(self.module, None);
        }
    }
}

/// Decodes a SPIR-V binary into words, checking size and magic number.
pub fn parse_spirv(bytes: &[u8]) -> RhiResult<Vec<u32>> {
    ash::util::read_spv(&mut Cursor::new(bytes))
        .map_err(|e| RhiError::ShaderError(format!("Invalid SPIR-V: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPIRV_MAGIC: u32 = 0x0723_0203;

    #[test]
    fn test_shader_stage_flags() {
        assert_eq!(ShaderStage::Vertex.to_vk_stage(), vk::ShaderStageFlags::VERTEX);
        assert_eq!(
            ShaderStage::Fragment.to_vk_stage(),
            vk::ShaderStageFlags::FRAGMENT
        );
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }

    #[test]
    fn test_parse_spirv_accepts_magic() {
        let mut bytes = SPIRV_MAGIC.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x0001_0000u32.to_le_bytes());
        let words = parse_spirv(&bytes).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn test_parse_spirv_rejects_unaligned() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0x00];
        assert!(matches!(parse_spirv(&bytes), Err(RhiError::ShaderError(_))));
    }

    #[test]
    fn test_parse_spirv_rejects_bad_magic() {
        let bytes = 0xdead_beefu32.to_le_bytes();
        assert!(parse_spirv(&bytes).is_err());
    }
}
