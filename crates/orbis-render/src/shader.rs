//! Shader module registry for the scene's WGSL programs.
//!
//! Every scene shader shares the per-frame uniform block in `frame.wgsl`,
//! which is prepended to each program before compilation.

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

const FRAME_PRELUDE: &str = include_str!("shaders/frame.wgsl");

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },
}

/// The scene's shader programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneShader {
    Surface,
    Atmosphere,
    Aurora,
    Body,
    Line,
    Point,
}

impl SceneShader {
    pub const ALL: [SceneShader; 6] = [
        SceneShader::Surface,
        SceneShader::Atmosphere,
        SceneShader::Aurora,
        SceneShader::Body,
        SceneShader::Line,
        SceneShader::Point,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneShader::Surface => "surface",
            SceneShader::Atmosphere => "atmosphere",
            SceneShader::Aurora => "aurora",
            SceneShader::Body => "body",
            SceneShader::Line => "line",
            SceneShader::Point => "point",
        }
    }

    fn body_source(self) -> &'static str {
        match self {
            SceneShader::Surface => include_str!("shaders/surface.wgsl"),
            SceneShader::Atmosphere => include_str!("shaders/atmosphere.wgsl"),
            SceneShader::Aurora => include_str!("shaders/aurora.wgsl"),
            SceneShader::Body => include_str!("shaders/body.wgsl"),
            SceneShader::Line => include_str!("shaders/line.wgsl"),
            SceneShader::Point => include_str!("shaders/point.wgsl"),
        }
    }

    /// Full WGSL source with the frame uniform prelude.
    pub fn source(self) -> String {
        format!("{FRAME_PRELUDE}\n{}", self.body_source())
    }
}

/// Compiled shader modules keyed by name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every [`SceneShader`].
    pub fn with_scene_shaders(device: &wgpu::Device) -> Self {
        let mut library = Self::new();
        for shader in SceneShader::ALL {
            library.load_from_source(device, shader.name(), &shader.source());
        }
        library
    }

    /// Compile `source` and store it under `name`, replacing any previous module.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Loading shader '{}' from source", name);

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        if self
            .modules
            .insert(name.to_string(), module.clone())
            .is_some()
        {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }
        module
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    /// Like [`get`](Self::get) but an error when missing.
    pub fn require(&self, shader: SceneShader) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.get(shader.name()).ok_or_else(|| ShaderError::NotLoaded {
            name: shader.name().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_device;

    #[test]
    fn test_scene_sources_carry_frame_prelude() {
        for shader in SceneShader::ALL {
            let source = shader.source();
            assert!(source.contains("struct Frame"), "{} lacks prelude", shader.name());
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
    }

    #[test]
    fn test_shader_names_unique() {
        let mut names: Vec<_> = SceneShader::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SceneShader::ALL.len());
    }

    #[test]
    fn test_empty_library_reports_missing() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(
            library.require(SceneShader::Surface),
            Err(ShaderError::NotLoaded { .. })
        ));
    }

    #[test]
    fn test_scene_shaders_compile() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let library = ShaderLibrary::with_scene_shaders(&device);
        assert_eq!(library.len(), SceneShader::ALL.len());
        for shader in SceneShader::ALL {
            assert!(library.require(shader).is_ok());
        }
    }

    #[test]
    fn test_reload_replaces_cached_module() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let source = SceneShader::Line.source();
        let original = library.load_from_source(&device, "line", &source);
        let reloaded = library.load_from_source(&device, "line", &source);
        assert!(!Arc::ptr_eq(&original, &reloaded));
        assert_eq!(library.len(), 1);
    }
}
