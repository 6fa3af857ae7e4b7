pub use crate::store::StorePaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// User display preferences, supplied by the settings collaborator on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub clock24: bool,
    /// Larger passage font, capped at two lines, no setup line.
    pub glance: bool,
    pub unit: TempUnit,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            clock24: true,
            glance: false,
            unit: TempUnit::Celsius,
        }
    }
}
