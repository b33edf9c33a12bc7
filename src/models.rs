//! Data models for vaporizers, calculator inputs and results

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Device id used when the user's vaporizer is not in the catalog
pub const OTHER_DEVICE: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMethod {
    Chamber,
    Capsule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoseType {
    Thc,
    Cbd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaporizerType {
    Portable,
    Desktop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaporizer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VaporizerType,
    pub chamber_capacity_g: f64,
    pub supports_dosing_capsules: bool,
    pub dosing_capsule_capacity_g: Option<f64>,
    pub extraction_efficiency: f64, // percent, 0-100
}

/// Everything the user enters on the calculator form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorInputs {
    pub device: String,
    pub method: MeasurementMethod,
    pub chamber_weight_g: f64,
    pub thc_percent: f64,
    pub cbd_percent: f64,
    pub desired_dose_type: Option<DoseType>,
    pub desired_dose_mg: f64,
    pub higher_accuracy: bool,
    pub inhalations_per_unit: u32,
    pub total_session_inhalations: u32,
}

/// Cannabinoid content of one unit (or one inhalation in accuracy capsule mode)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DosePerUnit {
    pub thc: f64,
    pub cbd: f64,
}

impl DosePerUnit {
    pub fn get(&self, dose_type: DoseType) -> f64 {
        match dose_type {
            DoseType::Thc => self.thc,
            DoseType::Cbd => self.cbd,
        }
    }
}

/// Result of a dosage calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorOutputs {
    pub recommended_dose_mg: f64,
    pub inhalations_needed: u32,
    pub capsules_needed: u32,
    pub chambers_needed: u32,
    pub weight_needed_g: Option<f64>,
    pub confidence: u8,
    pub warnings: Vec<String>,
    pub dose_per_unit: DosePerUnit,
}

/// A calculation stored in the session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub created_at: String,
    pub device: String,
    pub method: MeasurementMethod,
    pub dose_type: DoseType,
    pub thc_percent: f64,
    pub cbd_percent: f64,
    pub desired_dose_mg: f64,
    pub higher_accuracy: bool,
    pub capsules_needed: u32,
    pub chambers_needed: u32,
    pub inhalations_needed: u32,
    pub notes: Option<String>,
}

impl MeasurementMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementMethod::Chamber => "chamber",
            MeasurementMethod::Capsule => "capsule",
        }
    }
}

impl DoseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseType::Thc => "thc",
            DoseType::Cbd => "cbd",
        }
    }
}

impl fmt::Display for MeasurementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for DoseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str().to_uppercase())
    }
}

impl fmt::Display for VaporizerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaporizerType::Portable => f.pad("portable"),
            VaporizerType::Desktop => f.pad("desktop"),
        }
    }
}

impl FromStr for MeasurementMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chamber" => Ok(MeasurementMethod::Chamber),
            "capsule" => Ok(MeasurementMethod::Capsule),
            other => Err(format!("unknown measurement method '{}'", other)),
        }
    }
}

impl FromStr for DoseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "thc" => Ok(DoseType::Thc),
            "cbd" => Ok(DoseType::Cbd),
            other => Err(format!("unknown dose type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_method_and_dose_type() {
        assert_eq!("Capsule".parse::<MeasurementMethod>(), Ok(MeasurementMethod::Capsule));
        assert_eq!("chamber".parse::<MeasurementMethod>(), Ok(MeasurementMethod::Chamber));
        assert_eq!("CBD".parse::<DoseType>(), Ok(DoseType::Cbd));
        assert!("bowl".parse::<MeasurementMethod>().is_err());
        assert!("cbn".parse::<DoseType>().is_err());
    }

    #[test]
    fn dose_per_unit_selects_cannabinoid() {
        let dose = DosePerUnit { thc: 12.5, cbd: 0.4 };
        assert_eq!(dose.get(DoseType::Thc), 12.5);
        assert_eq!(dose.get(DoseType::Cbd), 0.4);
    }

    #[test]
    fn vaporizer_json_uses_type_key() {
        let json = r#"{
            "name": "Test Vape",
            "type": "desktop",
            "chamber_capacity_g": 0.5,
            "supports_dosing_capsules": false,
            "dosing_capsule_capacity_g": null,
            "extraction_efficiency": 70.0
        }"#;
        let vape: Vaporizer = serde_json::from_str(json).unwrap();
        assert_eq!(vape.kind, VaporizerType::Desktop);
        assert_eq!(vape.dosing_capsule_capacity_g, None);
    }
}
