// Shader module loading
//
// Shaders arrive as precompiled SPIR-V files; this module only reads them
// into aligned words. Module creation goes through the Gpu trait.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Read a SPIR-V binary into 32-bit words
pub fn read_spirv(path: &Path) -> Result<Vec<u32>> {
    let mut file = File::open(path).with_context(|| format!("Failed to open shader {:?}", path))?;
    ash::util::read_spv(&mut file).with_context(|| format!("Invalid SPIR-V in {:?}", path))
}

/// Vertex + fragment SPIR-V pair
#[derive(Debug, Clone)]
pub struct ShaderPair {
    pub vertex: Vec<u32>,
    pub fragment: Vec<u32>,
}

impl ShaderPair {
    pub fn load(vertex: &Path, fragment: &Path) -> Result<Self> {
        Ok(Self {
            vertex: read_spirv(vertex)?,
            fragment: read_spirv(fragment)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_words_from_spirv_file() {
        let path = std::env::temp_dir().join("frameloop_shader_test.spv");
        let words: [u32; 3] = [0x0723_0203, 0x0001_0000, 42];
        let mut file = File::create(&path).unwrap();
        for word in words {
            file.write_all(&word.to_le_bytes()).unwrap();
        }
        drop(file);

        assert_eq!(read_spirv(&path).unwrap(), words.to_vec());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_spirv(Path::new("does/not/exist.spv")).unwrap_err();
        assert!(format!("{:#}", err).contains("exist.spv"));
    }
}
