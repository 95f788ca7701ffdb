use std::fs;
use std::path::Path;

use super::AppError;

/// Played when no `--script` is given: fall onto the ground, run both ways,
/// jump, nudge the constants and replay a stretch in slow motion.
const DEMO_SCRIPT: &str = "\
# settle onto the ground
wait 1.0
hold right
step 30
jump
step 50
key U
jump
step 60
hold left
step 20
jump
step 40
hold none
step 15
slowmo 4
hold right
jump
wait 1.0
slowmo 1
hold none
tune run_speed -500
key G
reset
step 20
dump
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Script {
    origin: String,
    lines: Vec<String>,
}

impl Script {
    pub(crate) fn demo() -> Self {
        Self::from_source("<demo>", DEMO_SCRIPT)
    }

    pub(crate) fn from_source(origin: impl Into<String>, source: &str) -> Self {
        Self {
            origin: origin.into(),
            lines: source.lines().map(ToString::to_string).collect(),
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let source = fs::read_to_string(path).map_err(|source| AppError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path.display().to_string(), &source))
    }

    pub(crate) fn origin(&self) -> &str {
        &self.origin
    }

    /// Lines paired with their 1-based line numbers.
    pub(crate) fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (index + 1, line.as_str()))
    }
}
