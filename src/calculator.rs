//! Dosage calculator logic
//!
//! Every function here is pure: outputs depend only on the inputs and the
//! (read-only) device catalog.

use tracing::debug;

use crate::catalog::{self, Catalog};
use crate::error::{DoserError, Result};
use crate::models::{
    CalculatorInputs, CalculatorOutputs, DosePerUnit, DoseType, MeasurementMethod,
};

/// Placeholder until a real confidence model exists
pub const CONFIDENCE: u8 = 85;

/// Doses above this get a notice in the warnings list
pub const HIGH_DOSE_MG: f64 = 30.0;

/// Check the inputs, returning one message per problem (empty when valid)
pub fn validate_inputs(inputs: &CalculatorInputs) -> Vec<String> {
    let mut errors = Vec::new();

    if inputs.higher_accuracy && inputs.total_session_inhalations == 0 {
        errors.push("Total session inhalations must be greater than 0 in higher accuracy mode".to_string());
    }
    if !(0.0..=100.0).contains(&inputs.thc_percent) {
        errors.push("THC percentage must be between 0 and 100".to_string());
    }
    if !(0.0..=100.0).contains(&inputs.cbd_percent) {
        errors.push("CBD percentage must be between 0 and 100".to_string());
    }
    if inputs.thc_percent + inputs.cbd_percent > 100.0 {
        errors.push("THC and CBD percentages cannot add up to more than 100".to_string());
    }
    if inputs.desired_dose_type.is_none() {
        errors.push("Select a dose type (THC or CBD)".to_string());
    }
    if !(inputs.desired_dose_mg > 0.0 && inputs.desired_dose_mg.is_finite()) {
        errors.push("Desired dose must be a finite number greater than 0".to_string());
    }
    if inputs.method == MeasurementMethod::Chamber
        && !(inputs.chamber_weight_g > 0.0 && inputs.chamber_weight_g.is_finite())
    {
        errors.push("Chamber weight must be a finite number greater than 0".to_string());
    }

    errors
}

/// Grams per unit, using the process-wide catalog
pub fn resolve_weight(inputs: &CalculatorInputs) -> f64 {
    catalog::global().resolve_weight(inputs)
}

/// Extraction efficiency fraction, using the process-wide catalog
pub fn resolve_efficiency(device: &str) -> f64 {
    catalog::global().resolve_efficiency(device)
}

/// mg of each cannabinoid per unit, or per inhalation in accuracy capsule mode
pub fn compute_dose_per_unit(catalog: &Catalog, inputs: &CalculatorInputs) -> DosePerUnit {
    let weight = catalog.resolve_weight(inputs);
    let efficiency = catalog.resolve_efficiency(&inputs.device);

    let mg = |percent: f64| (percent / 100.0) * 1000.0 * weight * efficiency;
    let mut dose = DosePerUnit {
        thc: mg(inputs.thc_percent),
        cbd: mg(inputs.cbd_percent),
    };

    if per_inhalation(inputs) && inputs.total_session_inhalations > 0 {
        let inhalations = f64::from(inputs.total_session_inhalations);
        dose.thc /= inhalations;
        dose.cbd /= inhalations;
    }

    debug!(
        "dose per unit: weight={}g efficiency={} thc={:.3}mg cbd={:.3}mg",
        weight, efficiency, dose.thc, dose.cbd
    );
    dose
}

/// Counts of units needed to reach a target dose
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnitCounts {
    pub inhalations: u32,
    pub capsules: u32,
    pub chambers: u32,
}

/// Work out how many capsules, chambers and inhalations cover `desired_dose_mg`
///
/// A non-positive `dose_per_unit` yields all-zero counts; there is no finite
/// answer in that case.
pub fn solve_units(inputs: &CalculatorInputs, dose_per_unit: f64) -> UnitCounts {
    if !(dose_per_unit > 0.0) || !dose_per_unit.is_finite() {
        return UnitCounts::default();
    }

    let desired = inputs.desired_dose_mg;
    let session = f64::from(inputs.total_session_inhalations);
    let accuracy = inputs.higher_accuracy;

    let mut capsules = 0.0;
    let mut chambers = 0.0;
    let inhalations;

    if per_inhalation(inputs) && session > 0.0 {
        inhalations = (desired / dose_per_unit).ceil();
        capsules = (inhalations / session).ceil();
    } else {
        let units = desired / dose_per_unit;
        match inputs.method {
            MeasurementMethod::Capsule => {
                capsules = units.ceil();
                inhalations = if accuracy { capsules * session } else { 0.0 };
            }
            MeasurementMethod::Chamber => {
                chambers = units.ceil();
                inhalations = if accuracy { units.ceil() } else { 0.0 };
            }
        }
    }

    UnitCounts {
        inhalations: inhalations.round() as u32,
        capsules: capsules as u32,
        chambers: chambers as u32,
    }
}

pub fn estimate_confidence(_inputs: &CalculatorInputs) -> u8 {
    CONFIDENCE
}

/// Validate and calculate against the process-wide catalog
pub fn calculate_dosage(inputs: &CalculatorInputs) -> Result<CalculatorOutputs> {
    calculate_dosage_with(catalog::global(), inputs)
}

/// Validate and calculate against an explicit catalog
pub fn calculate_dosage_with(catalog: &Catalog, inputs: &CalculatorInputs) -> Result<CalculatorOutputs> {
    let errors = validate_inputs(inputs);
    if !errors.is_empty() {
        return Err(DoserError::InvalidInput(errors));
    }
    let Some(dose_type) = inputs.desired_dose_type else {
        return Err(DoserError::InvalidInput(vec!["Select a dose type (THC or CBD)".to_string()]));
    };

    let dose_per_unit = compute_dose_per_unit(catalog, inputs);
    let target = dose_per_unit.get(dose_type);
    let counts = solve_units(inputs, target);

    let outputs = CalculatorOutputs {
        recommended_dose_mg: inputs.desired_dose_mg,
        inhalations_needed: counts.inhalations,
        capsules_needed: counts.capsules,
        chambers_needed: counts.chambers,
        weight_needed_g: match inputs.method {
            MeasurementMethod::Chamber => Some(inputs.chamber_weight_g),
            MeasurementMethod::Capsule => None,
        },
        confidence: estimate_confidence(inputs),
        warnings: collect_warnings(catalog, inputs, dose_type, target),
        dose_per_unit,
    };

    debug!(
        "calculated {:?} for {} via {}",
        counts, inputs.device, inputs.method
    );
    Ok(outputs)
}

fn per_inhalation(inputs: &CalculatorInputs) -> bool {
    inputs.higher_accuracy && inputs.method == MeasurementMethod::Capsule
}

fn collect_warnings(
    catalog: &Catalog,
    inputs: &CalculatorInputs,
    dose_type: DoseType,
    target: f64,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let device = if catalog::is_other(&inputs.device) {
        None
    } else {
        catalog.find(&inputs.device)
    };

    if device.is_none() && !catalog::is_other(&inputs.device) {
        warnings.push(format!(
            "'{}' is not in the device catalog; using default extraction efficiency",
            inputs.device
        ));
    }

    if inputs.method == MeasurementMethod::Capsule {
        match device {
            Some(d) if d.supports_dosing_capsules => {}
            Some(d) => warnings.push(format!("{} does not support dosing capsules", d.name)),
            None => warnings.push("Capsule capacity is unknown for this device".to_string()),
        }
    }

    if let Some(d) = device {
        if inputs.method == MeasurementMethod::Chamber && inputs.chamber_weight_g > d.chamber_capacity_g {
            warnings.push(format!(
                "Chamber weight {:.2}g exceeds the {} chamber capacity of {:.2}g",
                inputs.chamber_weight_g, d.name, d.chamber_capacity_g
            ));
        }
    }

    if !(target > 0.0) {
        warnings.push(format!(
            "Material yields no {} per unit; cannot compute unit counts",
            dose_type
        ));
    }

    if inputs.desired_dose_mg > HIGH_DOSE_MG {
        warnings.push(format!(
            "{:.1}mg is a high dose; start lower if you are unsure of your tolerance",
            inputs.desired_dose_mg
        ));
    }

    warnings
}

/// Format a calculation result as a readable string
pub fn format_result(inputs: &CalculatorInputs, outputs: &CalculatorOutputs) -> String {
    let mut output = String::new();
    let unit_name = if per_inhalation(inputs) { "inhalation" } else { inputs.method.as_str() };

    output.push_str(&format!("=== Dosage for {} ({}) ===\n", inputs.device, inputs.method));
    output.push_str(&format!(
        "Per {}: {:.2}mg THC, {:.2}mg CBD\n",
        unit_name, outputs.dose_per_unit.thc, outputs.dose_per_unit.cbd
    ));
    output.push_str(&format!("Target dose: {:.1}mg\n\n", outputs.recommended_dose_mg));

    match inputs.method {
        MeasurementMethod::Capsule => {
            output.push_str(&format!("Capsules needed:    {}\n", outputs.capsules_needed));
        }
        MeasurementMethod::Chamber => {
            output.push_str(&format!("Chambers needed:    {}\n", outputs.chambers_needed));
        }
    }
    if inputs.higher_accuracy {
        output.push_str(&format!("Inhalations needed: {}\n", outputs.inhalations_needed));
    }
    if let Some(weight) = outputs.weight_needed_g {
        output.push_str(&format!("Weight per chamber: {:.2}g\n", weight));
    }
    output.push_str(&format!("Confidence:         {}%\n", outputs.confidence));

    if !outputs.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &outputs.warnings {
            output.push_str(&format!("  ! {}\n", warning));
        }
    }

    output
}
