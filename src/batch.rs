//! Scale factors for a list of points, one outcome per input record.
//!
//! A record that cannot be computed (a field that is not a number, a
//! coordinate outside the zone, ...) becomes a [`BatchOutcome::Failed`]
//! carrying its row number and raw values; the rest of the batch goes on.

use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::{
    factors::{ScaleFactorCalculator, ScaleFactors},
    projections::transverse_mercator::TransverseMercator,
    utm::{check_zone, Hemisphere, UtmPoint, UtmProjection},
    Error,
};

/// One raw input cell, as read from a spreadsheet or a delimited file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Empty,
}

impl FieldValue {
    /// Reads the cell as a number. Text is trimmed and parsed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for an empty cell and
    /// [`Error::InvalidField`] for text that is not a finite number.
    ///
    /// # Usage
    ///
    /// ```
    /// use geoscale::FieldValue;
    ///
    /// assert_eq!(FieldValue::from(" 59.595 ").to_f64("height").unwrap(), 59.595);
    /// assert_eq!(FieldValue::from(12.5).to_f64("height").unwrap(), 12.5);
    /// assert!(FieldValue::from("n/a").to_f64("height").is_err());
    /// assert!(FieldValue::Empty.to_f64("height").is_err());
    /// ```
    pub fn to_f64(&self, field: &'static str) -> Result<f64, Error> {
        let invalid = || Error::InvalidField {
            field,
            value: self.to_string(),
        };

        match self {
            FieldValue::Number(value) if value.is_finite() => Ok(*value),
            FieldValue::Number(_) => Err(invalid()),
            FieldValue::Text(text) if text.trim().is_empty() => Err(Error::MissingField(field)),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(invalid),
            FieldValue::Empty => Err(Error::MissingField(field)),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Empty, Into::into)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(value) => {
                let mut buf = ryu::Buffer::new();
                write!(f, "{}", buf.format(*value))
            }
            FieldValue::Text(text) => write!(f, "{text}"),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// One input row: an identifier passed through untouched, two coordinates
/// and an ellipsoidal height.
///
/// `first`/`second` are easting/northing in a projected batch and
/// latitude/longitude in a geographic one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchRecord {
    pub id: String,
    pub first: FieldValue,
    pub second: FieldValue,
    pub height: FieldValue,
}

impl BatchRecord {
    pub fn new<F, S, H>(id: impl Into<String>, first: F, second: S, height: H) -> BatchRecord
    where
        F: Into<FieldValue>,
        S: Into<FieldValue>,
        H: Into<FieldValue>,
    {
        Self {
            id: id.into(),
            first: first.into(),
            second: second.into(),
            height: height.into(),
        }
    }
}

/// How the coordinates of every record in a batch are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatchFrame {
    /// Easting/northing in one UTM zone and hemisphere
    Projected { zone: i32, hemisphere: Hemisphere },
    /// WGS84 latitude/longitude in decimal degrees
    Geographic,
}

impl BatchFrame {
    fn field_names(self) -> (&'static str, &'static str) {
        match self {
            BatchFrame::Projected { .. } => ("easting", "northing"),
            BatchFrame::Geographic => ("latitude", "longitude"),
        }
    }
}

/// Completion of a running batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share of the batch in `[0, 1]`. An empty batch is complete.
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Receives progress updates after each record. Any `FnMut(Progress)` is a
/// sink.
pub trait ProgressSink {
    fn update(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn update(&mut self, progress: Progress) {
        self(progress);
    }
}

/// A record whose scale factors were computed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchSuccess {
    /// 1-based position of the record in the input
    pub row: usize,
    pub id: String,
    /// Input easting, or the computed one for a geographic batch
    pub easting: f64,
    /// Input northing, or the computed one for a geographic batch
    pub northing: f64,
    pub height: f64,
    pub factors: ScaleFactors,
}

impl BatchSuccess {
    /// The output row of this record.
    pub fn to_row(&self) -> OutputRow {
        OutputRow {
            id: self.id.clone(),
            easting: self.easting,
            northing: self.northing,
            height: self.height,
            grid_scale_factor: self.factors.grid_scale_factor(),
            height_scale_factor: self.factors.height_scale_factor(),
            combined_scale_factor: self.factors.combined_scale_factor(),
        }
    }
}

/// A record that could not be computed, with what is needed to fix it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatchFailure {
    /// 1-based position of the record in the input
    pub row: usize,
    pub id: String,
    /// The raw `first`, `second` and `height` fields
    pub values: [FieldValue; 3],
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_error"))]
    pub error: Error,
}

#[cfg(feature = "serde")]
fn serialize_error<S: serde::Serializer>(error: &Error, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [first, second, height] = &self.values;
        write!(
            f,
            "row {} ({}): {} [{first}, {second}, {height}]",
            self.row,
            self.id,
            self.error,
        )
    }
}

/// Result of one record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BatchOutcome {
    Computed(BatchSuccess),
    Failed(BatchFailure),
}

impl BatchOutcome {
    /// 1-based position of the record in the input.
    pub fn row(&self) -> usize {
        match self {
            BatchOutcome::Computed(success) => success.row,
            BatchOutcome::Failed(failure) => failure.row,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            BatchOutcome::Computed(success) => &success.id,
            BatchOutcome::Failed(failure) => &failure.id,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, BatchOutcome::Computed(_))
    }
}

/// Outcomes of a batch, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BatchReport {
    outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn outcomes(&self) -> &[BatchOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<BatchOutcome> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn successes(&self) -> impl Iterator<Item = &BatchSuccess> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BatchOutcome::Computed(success) => Some(success),
            BatchOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            BatchOutcome::Computed(_) => None,
            BatchOutcome::Failed(failure) => Some(failure),
        })
    }

    /// Output rows of the computed records, in input order.
    pub fn rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        self.successes().map(BatchSuccess::to_row)
    }
}

/// One line of the result table. Column names match the files written by
/// earlier versions and must not change.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputRow {
    #[cfg_attr(feature = "serde", serde(rename = "Numéro"))]
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "X_UTM"))]
    pub easting: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Y_UTM"))]
    pub northing: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Z"))]
    pub height: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Grid Scale Factor"))]
    pub grid_scale_factor: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Height Scale Factor"))]
    pub height_scale_factor: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Facteur Échelle Combiné"))]
    pub combined_scale_factor: f64,
}

impl OutputRow {
    pub const HEADERS: [&'static str; 7] = [
        "Numéro",
        "X_UTM",
        "Y_UTM",
        "Z",
        "Grid Scale Factor",
        "Height Scale Factor",
        "Facteur Échelle Combiné",
    ];

    /// The row as text, in [`OutputRow::HEADERS`] order. Numbers use the
    /// shortest representation that reads back to the same value.
    pub fn fields(&self) -> [String; 7] {
        let number = |value: f64| {
            let mut buf = ryu::Buffer::new();
            buf.format(value).to_string()
        };

        [
            self.id.clone(),
            number(self.easting),
            number(self.northing),
            number(self.height),
            number(self.grid_scale_factor),
            number(self.height_scale_factor),
            number(self.combined_scale_factor),
        ]
    }
}

/// Applies a [`ScaleFactorCalculator`] to every record of a batch.
///
/// # Usage
///
/// ```
/// use geoscale::{BatchRecord, BatchRunner, Hemisphere, ScaleFactorCalculator};
///
/// let calculator = ScaleFactorCalculator::wgs84();
/// let runner = BatchRunner::projected(&calculator, 31, Hemisphere::North).unwrap();
///
/// let report = runner.run(&[
///     BatchRecord::new("P1", 348163.320, 4041824.970, 59.595),
///     BatchRecord::new("P2", "348200.5", "4041900.0", "abc"),
/// ]);
///
/// assert_eq!(report.success_count(), 1);
/// assert_eq!(report.failures().next().unwrap().row, 2);
/// ```
#[derive(Clone, Debug)]
pub struct BatchRunner<'a, P = TransverseMercator> {
    calculator: &'a ScaleFactorCalculator<P>,
    frame: BatchFrame,
}

impl<'a, P: UtmProjection> BatchRunner<'a, P> {
    /// Runner for records in UTM `zone` and `hemisphere`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZone`] if the zone is outside `[1, 60]`; this
    /// concerns the whole batch, so it is reported here and not per record.
    pub fn projected(calculator: &'a ScaleFactorCalculator<P>, zone: i32, hemisphere: Hemisphere) -> Result<Self, Error> {
        check_zone(zone)?;

        Ok(Self {
            calculator,
            frame: BatchFrame::Projected { zone, hemisphere },
        })
    }

    /// Runner for records in WGS84 latitude/longitude.
    pub fn geographic(calculator: &'a ScaleFactorCalculator<P>) -> Self {
        Self {
            calculator,
            frame: BatchFrame::Geographic,
        }
    }

    pub fn frame(&self) -> BatchFrame {
        self.frame
    }

    /// Computes every record in order.
    pub fn run(&self, records: &[BatchRecord]) -> BatchReport {
        self.run_with_progress(records, |_: Progress| {})
    }

    /// Computes every record in order, reporting to `sink` after each one.
    pub fn run_with_progress<S: ProgressSink>(&self, records: &[BatchRecord], mut sink: S) -> BatchReport {
        let total = records.len();
        debug!(rows = total, frame = ?self.frame, "starting batch");

        let outcomes = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let outcome = self.process(index, record);
                sink.update(Progress { completed: index + 1, total });
                outcome
            })
            .collect::<Vec<_>>();

        self.finish(outcomes)
    }

    /// Computes the records on the rayon thread pool. Outcomes are returned
    /// in input order and `sink` still sees a strictly increasing count.
    #[cfg(feature = "rayon")]
    pub fn run_parallel<S>(&self, records: &[BatchRecord], sink: S) -> BatchReport
    where
        P: Sync,
        S: ProgressSink + Send,
    {
        use parking_lot::Mutex;
        use rayon::prelude::*;

        let total = records.len();
        debug!(rows = total, frame = ?self.frame, "starting parallel batch");

        let state = Mutex::new((0_usize, sink));
        let outcomes = records
            .par_iter()
            .enumerate()
            .map(|(index, record)| {
                let outcome = self.process(index, record);

                let mut guard = state.lock();
                let (completed, sink) = &mut *guard;
                *completed += 1;
                sink.update(Progress { completed: *completed, total });

                outcome
            })
            .collect::<Vec<_>>();

        self.finish(outcomes)
    }

    fn finish(&self, outcomes: Vec<BatchOutcome>) -> BatchReport {
        let report = BatchReport { outcomes };
        info!(
            computed = report.success_count(),
            failed = report.failure_count(),
            frame = ?self.frame,
            "batch finished"
        );
        report
    }

    fn process(&self, index: usize, record: &BatchRecord) -> BatchOutcome {
        let row = index + 1;

        match self.compute(record) {
            Ok((easting, northing, height, factors)) => BatchOutcome::Computed(BatchSuccess {
                row,
                id: record.id.clone(),
                easting,
                northing,
                height,
                factors,
            }),
            Err(error) => {
                warn!(row, id = %record.id, %error, "skipping batch row");
                BatchOutcome::Failed(BatchFailure {
                    row,
                    id: record.id.clone(),
                    values: [record.first.clone(), record.second.clone(), record.height.clone()],
                    error,
                })
            }
        }
    }

    fn compute(&self, record: &BatchRecord) -> Result<(f64, f64, f64, ScaleFactors), Error> {
        let (first_name, second_name) = self.frame.field_names();
        let first = record.first.to_f64(first_name)?;
        let second = record.second.to_f64(second_name)?;
        let height = record.height.to_f64("height")?;

        match self.frame {
            BatchFrame::Projected { zone, hemisphere } => {
                let utm = UtmPoint::create(zone, hemisphere, first, second)?;
                let factors = self.calculator.compute_from_utm(&utm, height)?;
                Ok((first, second, height, factors))
            }
            BatchFrame::Geographic => {
                let factors = self.calculator.compute(first, second, height)?;
                Ok((factors.easting(), factors.northing(), height, factors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<BatchRecord> {
        vec![
            BatchRecord::new("P1", 348_163.320, 4_041_824.970, 59.595),
            BatchRecord::new("P2", "348200.5", "4041900.0", "not a number"),
            BatchRecord::new("P3", "352000", "4045000", "12.041"),
        ]
    }

    #[test]
    fn failed_row_does_not_stop_the_batch() {
        let calculator = ScaleFactorCalculator::wgs84();
        let runner = BatchRunner::projected(&calculator, 31, Hemisphere::North).unwrap();

        let report = runner.run(&records());

        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);

        let rows = report.outcomes().iter().map(BatchOutcome::row).collect::<Vec<_>>();
        assert_eq!(rows, [1, 2, 3]);

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.row, 2);
        assert_eq!(failure.id, "P2");
        assert_eq!(
            failure.error,
            Error::InvalidField { field: "height", value: "not a number".to_string() }
        );
        assert_eq!(failure.values[0], FieldValue::from("348200.5"));

        let ids = report.successes().map(|s| s.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["P1", "P3"]);
    }

    #[test]
    fn progress_is_reported_after_each_row() {
        let calculator = ScaleFactorCalculator::wgs84();
        let runner = BatchRunner::projected(&calculator, 31, Hemisphere::North).unwrap();

        let mut seen = Vec::new();
        runner.run_with_progress(&records(), |progress: Progress| seen.push(progress.fraction()));

        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last().copied(), Some(1.));
    }

    #[test]
    fn empty_batch() {
        let calculator = ScaleFactorCalculator::wgs84();
        let runner = BatchRunner::geographic(&calculator);

        let mut calls = 0;
        let report = runner.run_with_progress(&[], |_: Progress| calls += 1);

        assert!(report.is_empty());
        assert_eq!(calls, 0);
        assert_eq!(Progress { completed: 0, total: 0 }.fraction(), 1.);
    }

    #[test]
    fn invalid_zone_is_rejected_up_front() {
        let calculator = ScaleFactorCalculator::wgs84();
        assert_eq!(
            BatchRunner::projected(&calculator, 0, Hemisphere::North).unwrap_err(),
            Error::InvalidZone(0)
        );
    }

    #[test]
    fn out_of_zone_coordinates_fail_their_row_only() {
        let calculator = ScaleFactorCalculator::wgs84();
        let runner = BatchRunner::projected(&calculator, 31, Hemisphere::South).unwrap();

        let report = runner.run(&[
            BatchRecord::new("too-far-south", 348_163.32, 500_000., 0.),
            BatchRecord::new("ok", 500_000., 6_000_000., 0.),
            BatchRecord::new("empty", FieldValue::Empty, 6_000_000., 0.),
        ]);

        let outcomes = report.outcomes();
        assert!(matches!(&outcomes[0], BatchOutcome::Failed(f) if matches!(f.error, Error::InvalidUtmCoords(_))));
        assert!(outcomes[1].is_computed());
        assert!(matches!(&outcomes[2], BatchOutcome::Failed(f) if f.error == Error::MissingField("easting")));
    }

    #[test]
    fn geographic_batch_reports_projected_coordinates() {
        let calculator = ScaleFactorCalculator::wgs84();
        let runner = BatchRunner::geographic(&calculator);

        let report = runner.run(&[BatchRecord::new("7", 36.509_736_111, 1.304_408_333, 59.595)]);
        let row = report.rows().next().unwrap();

        assert_eq!(row.id, "7");
        assert!((row.easting - 348_163.32).abs() < 1e-2);
        assert!((row.northing - 4_041_824.97).abs() < 1e-2);
        assert!((row.combined_scale_factor - 0.999_874_692_048).abs() < 1e-6);
    }

    #[test]
    fn output_row_keeps_full_precision() {
        let row = OutputRow {
            id: "P1".to_string(),
            easting: 348_163.32,
            northing: 4_041_824.97,
            height: 59.595,
            grid_scale_factor: 0.999_883_803_906_159_4,
            height_scale_factor: 0.999_990_647_232_823,
            combined_scale_factor: 0.999_874_452_225_737_5,
        };

        let fields = row.fields();
        assert_eq!(fields[0], "P1");
        assert_eq!(fields[3], "59.595");
        assert_eq!(fields[6].parse::<f64>().unwrap(), row.combined_scale_factor);
        assert_eq!(OutputRow::HEADERS.len(), fields.len());
    }

    #[test]
    fn failure_message_has_context() {
        let failure = BatchFailure {
            row: 2,
            id: "P2".to_string(),
            values: ["348200.5".into(), "4041900.0".into(), "abc".into()],
            error: Error::InvalidField { field: "height", value: "abc".to_string() },
        };

        assert_eq!(
            failure.to_string(),
            "row 2 (P2): Field height is not a number: \"abc\" [348200.5, 4041900.0, abc]"
        );
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_run_matches_sequential() {
        let calculator = ScaleFactorCalculator::wgs84();
        let runner = BatchRunner::projected(&calculator, 31, Hemisphere::North).unwrap();

        let records = (0..200)
            .map(|i| {
                let height = if i % 17 == 0 { FieldValue::from("x") } else { FieldValue::from(f64::from(i)) };
                BatchRecord::new(format!("P{i}"), 300_000. + f64::from(i) * 1000., 4_000_000., height)
            })
            .collect::<Vec<_>>();

        let mut last = 0;
        let mut increasing = true;
        let parallel = runner.run_parallel(&records, |progress: Progress| {
            increasing &= progress.completed > last;
            last = progress.completed;
        });

        assert!(increasing);
        assert_eq!(last, records.len());
        assert_eq!(parallel, runner.run(&records));
    }
}
