use std::fmt;

/// Shader stage a compile diagnostic belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Why a program could not be created.
///
/// Carries the diagnostic text produced by the device.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramError {
    /// A single stage failed to compile.
    Compile { stage: ShaderStage, log: String },
    /// Both stages compiled but do not form a valid program.
    Link { log: String },
}

impl ProgramError {
    pub(crate) fn compile(stage: ShaderStage, log: impl Into<String>) -> Self {
        Self::Compile { stage, log: log.into() }
    }

    pub(crate) fn link(log: impl Into<String>) -> Self {
        Self::Link { log: log.into() }
    }

    pub fn log(&self) -> &str {
        match self {
            ProgramError::Compile { log, .. } | ProgramError::Link { log } => log,
        }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::Compile { stage, log } => {
                write!(f, "{stage} shader failed to compile: {log}")
            }
            ProgramError::Link { log } => write!(f, "program failed to link: {log}"),
        }
    }
}

impl std::error::Error for ProgramError {}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
