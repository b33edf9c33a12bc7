use std::path::PathBuf;

/// Runtime settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the session log
    pub database: PathBuf,
    /// Optional JSON file replacing the builtin device catalog
    pub catalog: Option<PathBuf>,
    /// Print machine-readable JSON instead of text
    pub json: bool,
    /// 0 = warnings only, 1 = info, 2+ = debug
    pub verbosity: u8,
}

impl Config {
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("doser.db"),
            catalog: None,
            json: false,
            verbosity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_level() {
        let mut cfg = Config::default();
        assert_eq!(cfg.log_level(), "warn");
        cfg.verbosity = 1;
        assert_eq!(cfg.log_level(), "info");
        cfg.verbosity = 4;
        assert_eq!(cfg.log_level(), "debug");
    }
}
