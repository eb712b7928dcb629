//! Observation sets assembled from table columns.

use crate::domain::{ObservationSet, SeriesSpec};
use crate::error::AppError;
use crate::io::Table;

/// Observations for one series plus the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct AssembledSeries {
    pub observations: ObservationSet,
    pub warnings: Vec<String>,
}

/// Read the columns named by `spec` and pair them row by row.
///
/// Rows with a null in any requested column are dropped (one warning for
/// all of them) and the result is sorted by x.
pub fn assemble_series(table: &Table, spec: &SeriesSpec) -> Result<AssembledSeries, AppError> {
    let x = table.column(&spec.x_column)?;
    let y = table.column(&spec.y_column)?;
    let dx = optional_column(table, &spec.x_error_column)?;
    let dy = optional_column(table, &spec.y_error_column)?;

    let mut xs = Vec::with_capacity(x.len());
    let mut ys = Vec::with_capacity(y.len());
    let mut dxs = dx.as_ref().map(|_| Vec::with_capacity(x.len()));
    let mut dys = dy.as_ref().map(|_| Vec::with_capacity(y.len()));
    let mut skipped = 0usize;

    for i in 0..x.len() {
        let cell = |c: &Option<Vec<Option<f64>>>| c.as_ref().map(|c| c[i]);
        let (Some(xi), Some(yi)) = (x[i], y[i]) else {
            skipped += 1;
            continue;
        };
        let dxi = cell(&dx);
        let dyi = cell(&dy);
        if matches!(dxi, Some(None)) || matches!(dyi, Some(None)) {
            skipped += 1;
            continue;
        }
        xs.push(xi);
        ys.push(yi);
        if let (Some(out), Some(Some(v))) = (dxs.as_mut(), dxi) {
            out.push(v);
        }
        if let (Some(out), Some(Some(v))) = (dys.as_mut(), dyi) {
            out.push(v);
        }
    }

    let mut warnings = Vec::new();
    if skipped > 0 {
        warnings.push(format!(
            "{}: skipped {skipped} row(s) with missing values",
            series_name(spec)
        ));
    }

    let observations = ObservationSet::new(xs, ys, dxs, dys)?.sorted_by_x();
    Ok(AssembledSeries { observations, warnings })
}

/// Label used in messages and legends: the explicit label or the y column.
pub fn series_name(spec: &SeriesSpec) -> &str {
    spec.label.as_deref().unwrap_or(&spec.y_column)
}

fn optional_column(table: &Table, name: &str) -> Result<Option<Vec<Option<f64>>>, AppError> {
    if name.is_empty() {
        return Ok(None);
    }
    table.column(name).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn spec(dx: &str, dy: &str) -> SeriesSpec {
        SeriesSpec {
            x_column: "l".into(),
            x_error_column: dx.into(),
            y_column: "T".into(),
            y_error_column: dy.into(),
            label: None,
            model: ModelKind::Linear,
        }
    }

    #[test]
    fn skips_incomplete_rows_and_sorts_by_x() {
        let table = Table::from_reader(
            "l,dl,T,dT\n0.6,0.01,1.5,0.02\n0.2,0.01,0.9,\n0.4,0.02,1.2,0.03\n,0.01,1.0,0.01\n".as_bytes(),
            "mem",
        )
        .unwrap();

        let s = assemble_series(&table, &spec("dl", "dT")).unwrap();
        assert_eq!(s.observations.x(), &[0.4, 0.6]);
        assert_eq!(s.observations.y(), &[1.2, 1.5]);
        assert_eq!(s.observations.dx(), Some(&[0.02, 0.01][..]));
        assert_eq!(s.observations.dy(), Some(&[0.03, 0.02][..]));
        assert_eq!(s.warnings.len(), 1);
        assert!(s.warnings[0].contains("2 row(s)"));
    }

    #[test]
    fn empty_error_column_names_mean_no_uncertainties() {
        let table = Table::from_reader("l,T\n1,2\n2,4\n".as_bytes(), "mem").unwrap();
        let s = assemble_series(&table, &spec("", "")).unwrap();
        assert!(s.observations.dx().is_none());
        assert!(s.observations.dy().is_none());
        assert!(s.warnings.is_empty());
    }
}
