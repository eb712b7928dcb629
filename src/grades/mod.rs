//! Credit-weighted average grade.
//!
//! Under the course rule only the better (numerically lower) grade of each
//! paired module counts when both parts are present.

use serde::Serialize;

use crate::error::AppError;
use crate::io::Table;

/// Module pairs subject to the better-of rule.
pub const PAIRED_MODULES: [(&str, &str); 2] = [
    (
        "Lineare Algebra und Analytische Geometrie I",
        "Lineare Algebra und Analytische Geometrie II",
    ),
    ("Analysis I", "Analysis II"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub grade: f64,
    pub credit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeSummary {
    pub final_grade: f64,
    pub total_credits: f64,
    pub used: Vec<Module>,
    /// Modules left out by the better-of rule.
    pub dropped: Vec<Module>,
}

/// Read `name`, `grade` and `credit` columns. Rows missing a grade or credit
/// are skipped.
pub fn read_modules(table: &Table) -> Result<Vec<Module>, AppError> {
    let names = table.column_text("name")?;
    let grades = table.column("grade")?;
    let credits = table.column("credit")?;

    Ok(names
        .into_iter()
        .zip(grades)
        .zip(credits)
        .filter_map(|((name, grade), credit)| {
            Some(Module {
                name,
                grade: grade?,
                credit: credit?,
            })
        })
        .collect())
}

/// Indices of the modules the better-of rule leaves out.
///
/// For each pair with both parts present, the worse grade is dropped; on a tie
/// the first part is dropped.
pub fn better_of_pairs(modules: &[Module]) -> Vec<usize> {
    let find = |name: &str| modules.iter().position(|m| m.name == name);
    PAIRED_MODULES
        .iter()
        .filter_map(|&(first, second)| {
            let (i, j) = (find(first)?, find(second)?);
            Some(if modules[i].grade >= modules[j].grade { i } else { j })
        })
        .collect()
}

/// Weighted average over all modules, optionally applying the better-of rule.
pub fn calculate(modules: &[Module], apply_pairs: bool) -> Result<GradeSummary, AppError> {
    if let Some(bad) = modules.iter().find(|m| m.credit.is_nan() || m.credit < 0.0 || !m.grade.is_finite()) {
        return Err(AppError::invalid_input(format!(
            "Module '{}' has an invalid grade or credit ({}, {})",
            bad.name, bad.grade, bad.credit
        )));
    }

    let drop = if apply_pairs { better_of_pairs(modules) } else { Vec::new() };
    let (dropped, used): (Vec<_>, Vec<_>) = modules
        .iter()
        .enumerate()
        .partition(|(i, _)| drop.contains(i));
    let used: Vec<Module> = used.into_iter().map(|(_, m)| m.clone()).collect();
    let dropped: Vec<Module> = dropped.into_iter().map(|(_, m)| m.clone()).collect();

    let total_credits: f64 = used.iter().map(|m| m.credit).sum();
    if total_credits <= 0.0 {
        return Err(AppError::insufficient_data("No credited modules to average"));
    }
    let weighted: f64 = used.iter().map(|m| m.grade * m.credit).sum();

    Ok(GradeSummary {
        final_grade: weighted / total_credits,
        total_credits,
        used,
        dropped,
    })
}
