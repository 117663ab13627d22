//! Device history series and the single chart slot.
//!
//! [`build_series`] shapes one device's stored readings into aligned
//! temperature and humidity series with a resolved x-axis configuration.
//! [`HistoryChart`] owns the one chart a view shows at a time and makes sure
//! only the most recent request ever reaches it.

use tracing::{debug, warn};

use farmwatch_types::{AxisGranularity, HistorySeries, Reading, ReadingRecord, SeriesPoint};

use crate::error::Result;
use crate::traits::TelemetrySource;

/// Shape stored records into a chartable series.
///
/// Points keep the order the records came in; there is no resampling or
/// gap filling. Records without a parsable timestamp are skipped.
pub fn build_series(
    device_id: &str,
    records: &[ReadingRecord],
    granularity: AxisGranularity,
) -> HistorySeries {
    let points = records
        .iter()
        .filter_map(|record| match Reading::try_from(record) {
            Ok(reading) => Some(SeriesPoint {
                timestamp: reading.timestamp,
                temperature: reading.temperature,
                humidity: reading.humidity,
            }),
            Err(e) => {
                warn!(device_id, "Skipping history record: {}", e);
                None
            }
        })
        .collect();

    HistorySeries {
        device_id: device_id.to_string(),
        points,
        axis: granularity.resolve(),
    }
}

/// Fetch a device's history and build its series.
pub async fn load_history<S: TelemetrySource + ?Sized>(
    source: &S,
    device_id: &str,
    granularity: AxisGranularity,
) -> Result<HistorySeries> {
    let records = source.fetch_history(device_id).await?;
    let series = build_series(device_id, &records, granularity);
    debug!(
        device_id,
        records = records.len(),
        points = series.len(),
        "History loaded"
    );
    Ok(series)
}

/// Something that can display one history chart at a time.
pub trait ChartSurface {
    /// Draw a new chart for `series`.
    fn build(&mut self, series: &HistorySeries);

    /// Release the chart currently drawn.
    fn dispose(&mut self);
}

/// Ticket for one history load, issued by [`HistoryChart::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    generation: u64,
    pub device_id: String,
    pub granularity: AxisGranularity,
}

impl ChartRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`HistoryChart::apply`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartOutcome {
    /// The surface now shows the new series.
    Rendered,
    /// A newer request was issued, or the chart was torn down.
    Discarded,
}

/// Owner of the single chart slot.
///
/// Each device or granularity change calls [`begin`](Self::begin), fetches
/// the history, then hands the result to [`apply`](Self::apply). Only the
/// result of the latest request is drawn; the previous chart is disposed
/// before the new one is built.
#[derive(Debug)]
pub struct HistoryChart<S: ChartSurface> {
    surface: S,
    generation: u64,
    shown: Option<ChartRequest>,
    torn_down: bool,
}

impl<S: ChartSurface> HistoryChart<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            generation: 0,
            shown: None,
            torn_down: false,
        }
    }

    /// Start a new request, superseding any earlier one.
    pub fn begin(&mut self, device_id: &str, granularity: AxisGranularity) -> ChartRequest {
        self.generation += 1;
        ChartRequest {
            generation: self.generation,
            device_id: device_id.to_string(),
            granularity,
        }
    }

    /// Draw the result of `request` if it is still the latest one.
    ///
    /// A failed load for the latest request leaves the current chart in
    /// place and returns the error. Results for stale requests are dropped
    /// whether they succeeded or not.
    pub fn apply(
        &mut self,
        request: &ChartRequest,
        result: Result<HistorySeries>,
    ) -> Result<ChartOutcome> {
        if self.torn_down || request.generation != self.generation {
            debug!(
                generation = request.generation,
                latest = self.generation,
                "Discarding stale history result"
            );
            return Ok(ChartOutcome::Discarded);
        }

        let series = result?;
        if self.shown.take().is_some() {
            self.surface.dispose();
        }
        self.surface.build(&series);
        self.shown = Some(request.clone());
        Ok(ChartOutcome::Rendered)
    }

    /// Begin, fetch and apply in one step.
    pub async fn load<T: TelemetrySource + ?Sized>(
        &mut self,
        source: &T,
        device_id: &str,
        granularity: AxisGranularity,
    ) -> Result<ChartOutcome> {
        let request = self.begin(device_id, granularity);
        let result = load_history(source, device_id, granularity).await;
        self.apply(&request, result)
    }

    /// Dispose the chart and ignore every later result.
    pub fn teardown(&mut self) {
        if self.shown.take().is_some() {
            self.surface.dispose();
        }
        self.torn_down = true;
    }

    /// The request whose result is currently drawn.
    pub fn shown(&self) -> Option<&ChartRequest> {
        self.shown.as_ref()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mock::MockStore;
    use farmwatch_types::TimeUnit;
    use time::macros::datetime;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Built(String, usize),
        Disposed,
    }

    #[derive(Debug, Default)]
    struct RecordingSurface {
        events: Vec<Event>,
        live: usize,
    }

    impl ChartSurface for RecordingSurface {
        fn build(&mut self, series: &HistorySeries) {
            self.live += 1;
            assert_eq!(self.live, 1, "built over a live chart");
            self.events
                .push(Event::Built(series.device_id.clone(), series.len()));
        }

        fn dispose(&mut self) {
            self.live -= 1;
            self.events.push(Event::Disposed);
        }
    }

    fn series(device: &str, n: usize) -> HistorySeries {
        let records: Vec<ReadingRecord> = (0..n)
            .map(|i| ReadingRecord::new(device, format!("2024-05-01T10:{:02}:00Z", i)))
            .collect();
        build_series(device, &records, AxisGranularity::Auto)
    }

    #[test]
    fn test_empty_history_has_valid_axis() {
        let hourly = AxisGranularity::Fixed {
            unit: TimeUnit::Hour,
            step: 1,
        };
        let series = build_series("a", &[], hourly);
        assert!(series.is_empty());
        assert_eq!(series.axis.unit, Some(TimeUnit::Hour));
        assert_eq!(series.axis.display_format.as_deref(), Some("HH:mm"));
    }

    #[test]
    fn test_series_keeps_record_order() {
        let records = vec![
            ReadingRecord::new("a", "2024-05-01T11:00:00Z")
                .with_temperature(22.0)
                .with_humidity(40.0),
            ReadingRecord::new("a", "2024-05-01T10:00:00Z").with_temperature(21.0),
            ReadingRecord::new("a", "bad"),
        ];
        let series = build_series("a", &records, AxisGranularity::Auto);

        assert_eq!(
            series.timestamps(),
            vec![
                datetime!(2024-05-01 11:00:00 UTC),
                datetime!(2024-05-01 10:00:00 UTC)
            ]
        );
        assert_eq!(series.temperatures(), vec![Some(22.0), Some(21.0)]);
        assert_eq!(series.humidities(), vec![Some(40.0), None]);
        assert!(series.axis.is_auto());
    }

    #[tokio::test]
    async fn test_load_history_from_source() {
        let store = MockStore::builder()
            .history(
                "a",
                vec![ReadingRecord::new("a", "2024-05-01T10:00:00Z").with_temperature(20.0)],
            )
            .build();
        let series = load_history(&store, "a", AxisGranularity::Auto).await.unwrap();
        assert_eq!(series.len(), 1);

        let empty = load_history(&store, "unknown", AxisGranularity::Auto)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_rebuild_disposes_previous_chart_first() {
        let mut chart = HistoryChart::new(RecordingSurface::default());

        let first = chart.begin("a", AxisGranularity::Auto);
        chart.apply(&first, Ok(series("a", 2))).unwrap();
        let second = chart.begin("b", AxisGranularity::Auto);
        chart.apply(&second, Ok(series("b", 3))).unwrap();

        assert_eq!(
            chart.surface().events,
            vec![
                Event::Built("a".into(), 2),
                Event::Disposed,
                Event::Built("b".into(), 3),
            ]
        );
        assert_eq!(chart.shown().unwrap().device_id, "b");
    }

    #[test]
    fn test_superseded_result_is_discarded() {
        let mut chart = HistoryChart::new(RecordingSurface::default());

        let slow = chart.begin("a", AxisGranularity::Auto);
        let fast = chart.begin("b", AxisGranularity::Auto);
        assert_eq!(
            chart.apply(&fast, Ok(series("b", 1))).unwrap(),
            ChartOutcome::Rendered
        );
        assert_eq!(
            chart.apply(&slow, Ok(series("a", 5))).unwrap(),
            ChartOutcome::Discarded
        );

        assert_eq!(chart.surface().events, vec![Event::Built("b".into(), 1)]);
    }

    #[test]
    fn test_result_after_teardown_is_discarded() {
        let mut chart = HistoryChart::new(RecordingSurface::default());
        let shown = chart.begin("a", AxisGranularity::Auto);
        chart.apply(&shown, Ok(series("a", 1))).unwrap();

        let late = chart.begin("a", AxisGranularity::Auto);
        chart.teardown();
        assert_eq!(
            chart.apply(&late, Ok(series("a", 2))).unwrap(),
            ChartOutcome::Discarded
        );

        assert!(chart.is_torn_down());
        assert!(chart.shown().is_none());
        assert_eq!(
            chart.surface().events,
            vec![Event::Built("a".into(), 1), Event::Disposed]
        );
    }

    #[test]
    fn test_failed_load_keeps_current_chart() {
        let mut chart = HistoryChart::new(RecordingSurface::default());
        let first = chart.begin("a", AxisGranularity::Auto);
        chart.apply(&first, Ok(series("a", 1))).unwrap();

        let second = chart.begin("a", AxisGranularity::Auto);
        let err = chart
            .apply(
                &second,
                Err(Error::Api {
                    status: 500,
                    message: "boom".into(),
                }),
            )
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(chart.surface().events.len(), 1);
        assert_eq!(chart.shown().unwrap().generation(), first.generation());
    }

    #[tokio::test]
    async fn test_load_renders_latest() {
        let store = MockStore::builder()
            .history("a", vec![ReadingRecord::new("a", "2024-05-01T10:00:00Z")])
            .build();
        let mut chart = HistoryChart::new(RecordingSurface::default());

        let outcome = chart
            .load(&store, "a", AxisGranularity::Auto)
            .await
            .unwrap();
        assert_eq!(outcome, ChartOutcome::Rendered);
        assert_eq!(chart.surface().events, vec![Event::Built("a".into(), 1)]);
    }
}
