//! Vaporizer reference data
//!
//! The catalog is read-only once built. A process-wide instance is installed
//! at most once (normally from `main`) and falls back to the embedded table.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, info};

use crate::error::{DoserError, Result};
use crate::models::{CalculatorInputs, MeasurementMethod, OTHER_DEVICE, Vaporizer, VaporizerType};

/// Efficiency assumed for devices we know nothing about
pub const DEFAULT_EFFICIENCY: f64 = 0.65;

static CATALOG: OnceLock<Catalog> = OnceLock::new();

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    devices: Vec<Vaporizer>,
}

impl Catalog {
    /// Build a catalog, rejecting records that would break the calculator
    pub fn new(devices: Vec<Vaporizer>) -> Result<Self> {
        for device in &devices {
            check_device(device)?;
        }
        Ok(Self { devices })
    }

    /// The embedded device table
    pub fn builtin() -> Self {
        let devices = BUILTIN
            .iter()
            .map(|&(name, kind, chamber, capsule, efficiency)| Vaporizer {
                name: name.to_string(),
                kind,
                chamber_capacity_g: chamber,
                supports_dosing_capsules: capsule.is_some(),
                dosing_capsule_capacity_g: capsule,
                extraction_efficiency: efficiency,
            })
            .collect();
        Self { devices }
    }

    /// Load a catalog from a JSON array of vaporizer records
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DoserError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let devices: Vec<Vaporizer> =
            serde_json::from_str(&content).map_err(|source| DoserError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::new(devices)?;
        info!("loaded {} devices from {}", catalog.devices.len(), path.display());
        Ok(catalog)
    }

    pub fn devices(&self) -> &[Vaporizer] {
        &self.devices
    }

    /// Find a device by name, exact match first, then ignoring case
    pub fn find(&self, name: &str) -> Option<&Vaporizer> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .or_else(|| self.devices.iter().find(|d| d.name.eq_ignore_ascii_case(name)))
    }

    /// Grams of material in one unit (chamber fill or dosing capsule)
    pub fn resolve_weight(&self, inputs: &CalculatorInputs) -> f64 {
        match inputs.method {
            MeasurementMethod::Chamber => inputs.chamber_weight_g,
            MeasurementMethod::Capsule => {
                if is_other(&inputs.device) {
                    return 0.0;
                }
                self.find(&inputs.device)
                    .filter(|d| d.supports_dosing_capsules)
                    .and_then(|d| d.dosing_capsule_capacity_g)
                    .unwrap_or(0.0)
            }
        }
    }

    /// Extraction efficiency as a fraction in [0, 1]
    pub fn resolve_efficiency(&self, device: &str) -> f64 {
        if is_other(device) {
            return DEFAULT_EFFICIENCY;
        }
        match self.find(device) {
            Some(d) => d.extraction_efficiency / 100.0,
            None => {
                debug!("device '{}' not in catalog, using default efficiency", device);
                DEFAULT_EFFICIENCY
            }
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_device(device: &Vaporizer) -> Result<()> {
    let invalid = |reason: String| DoserError::InvalidDevice {
        name: device.name.clone(),
        reason,
    };

    if !(0.0..=100.0).contains(&device.extraction_efficiency) {
        return Err(invalid(format!(
            "extraction efficiency {} is outside 0-100",
            device.extraction_efficiency
        )));
    }
    if !(device.chamber_capacity_g > 0.0 && device.chamber_capacity_g.is_finite()) {
        return Err(invalid(format!(
            "chamber capacity {}g must be greater than 0",
            device.chamber_capacity_g
        )));
    }
    if device.supports_dosing_capsules != device.dosing_capsule_capacity_g.is_some() {
        return Err(invalid(
            "capsule support flag does not match capsule capacity".to_string(),
        ));
    }
    if let Some(capacity) = device.dosing_capsule_capacity_g {
        if !(capacity > 0.0 && capacity.is_finite()) {
            return Err(invalid(format!("capsule capacity {}g must be greater than 0", capacity)));
        }
    }
    Ok(())
}

pub fn is_other(device: &str) -> bool {
    device.eq_ignore_ascii_case(OTHER_DEVICE)
}

/// Install the process-wide catalog. Fails if one is already in use.
pub fn install(catalog: Catalog) -> Result<()> {
    CATALOG
        .set(catalog)
        .map_err(|_| DoserError::CatalogAlreadyInstalled)
}

/// The process-wide catalog, the builtin table unless `install` ran first
pub fn global() -> &'static Catalog {
    CATALOG.get_or_init(Catalog::builtin)
}

// (name, type, chamber capacity g, dosing capsule capacity g, extraction efficiency %)
const BUILTIN: &[(&str, VaporizerType, f64, Option<f64>, f64)] = &[
    ("Arizer Solo 3", VaporizerType::Portable, 0.2, Some(0.15), 83.0),
    ("Arizer Air Max", VaporizerType::Portable, 0.15, None, 80.0),
    ("Arizer XQ2", VaporizerType::Desktop, 0.3, None, 82.0),
    ("Storz & Bickel Mighty+", VaporizerType::Portable, 0.3, Some(0.15), 80.0),
    ("Storz & Bickel Crafty+", VaporizerType::Portable, 0.3, Some(0.15), 78.0),
    ("Storz & Bickel Venty", VaporizerType::Portable, 0.2, Some(0.15), 80.0),
    ("Storz & Bickel Volcano Hybrid", VaporizerType::Desktop, 0.5, Some(0.15), 85.0),
    ("PAX Plus", VaporizerType::Portable, 0.25, None, 70.0),
    ("DaVinci IQ2", VaporizerType::Portable, 0.25, None, 72.0),
    ("Firefly 2+", VaporizerType::Portable, 0.15, None, 75.0),
    ("TinyMight 2", VaporizerType::Portable, 0.2, None, 78.0),
    ("DynaVap VapCap M", VaporizerType::Portable, 0.1, None, 70.0),
];
