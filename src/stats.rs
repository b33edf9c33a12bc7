//! Aggregate statistics over the session log

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{DoseType, MeasurementMethod, SessionRecord};

/// Summary of logged sessions
#[derive(Debug, Default, Serialize)]
pub struct SessionSummary {
    pub sessions: usize,
    pub total_thc_mg: f64,
    pub total_cbd_mg: f64,
    pub average_dose_mg: f64,
    pub accuracy_sessions: usize,
    pub by_device: Vec<(String, usize)>,
    pub by_method: Vec<(String, usize)>,
}

/// Generate a summary of the given sessions
pub fn summarize_sessions(sessions: &[SessionRecord]) -> SessionSummary {
    let mut by_device: HashMap<String, usize> = HashMap::new();
    let mut by_method: HashMap<MeasurementMethod, usize> = HashMap::new();
    let mut total_thc = 0.0;
    let mut total_cbd = 0.0;
    let mut accuracy_sessions = 0;

    for session in sessions {
        *by_device.entry(session.device.clone()).or_default() += 1;
        *by_method.entry(session.method).or_default() += 1;

        match session.dose_type {
            DoseType::Thc => total_thc += session.desired_dose_mg,
            DoseType::Cbd => total_cbd += session.desired_dose_mg,
        }
        if session.higher_accuracy {
            accuracy_sessions += 1;
        }
    }

    let mut device_list: Vec<_> = by_device.into_iter().collect();
    device_list.sort_by(|a, b| a.0.cmp(&b.0));

    let mut method_list: Vec<_> = by_method
        .into_iter()
        .map(|(m, n)| (m.as_str().to_string(), n))
        .collect();
    method_list.sort_by(|a, b| a.0.cmp(&b.0));

    let average = if sessions.is_empty() {
        0.0
    } else {
        (total_thc + total_cbd) / sessions.len() as f64
    };

    SessionSummary {
        sessions: sessions.len(),
        total_thc_mg: total_thc,
        total_cbd_mg: total_cbd,
        average_dose_mg: average,
        accuracy_sessions,
        by_device: device_list,
        by_method: method_list,
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(f, "Sessions: {} ({} in higher accuracy mode)", self.sessions, self.accuracy_sessions)?;
        writeln!(f)?;

        writeln!(f, "Totals:")?;
        writeln!(f, "  THC:     {:.1}mg", self.total_thc_mg)?;
        writeln!(f, "  CBD:     {:.1}mg", self.total_cbd_mg)?;
        writeln!(f, "  Average: {:.1}mg per session", self.average_dose_mg)?;
        writeln!(f)?;

        writeln!(f, "Devices:")?;
        for (name, count) in &self.by_device {
            writeln!(f, "  {:>3}x {}", count, name)?;
        }
        writeln!(f)?;

        writeln!(f, "Methods:")?;
        for (name, count) in &self.by_method {
            writeln!(f, "  {:>3}x {}", count, name)?;
        }

        Ok(())
    }
}
