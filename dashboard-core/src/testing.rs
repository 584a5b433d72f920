//! In-memory fakes for the dashboard's collaborators.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    dashboard::Dashboard,
    error::{GeolocationError, ServiceError, SnapshotPart, StoreError},
    geolocation::Geolocator,
    model::{
        CurrentConditions, FiveDayForecast, ForecastDay, GeoCoordinates, HourlySample,
        LocationInfo, Place, WeatherSnapshot,
    },
    provider::WeatherService,
    store::{KeyValueStore, MemoryStore},
    ui::{BusyIndicator, Dialog, ModalHost, Notifier, Ui},
};

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("valid test timestamp")
}

pub fn hourly_at(date_time: &str, temperature: f64) -> HourlySample {
    HourlySample { date_time: at(date_time), temperature }
}

pub fn day_at(date: &str, icon: u8, max_temp: f64, min_temp: f64) -> ForecastDay {
    ForecastDay { date: at(date), icon, max_temp, min_temp }
}

/// Five days starting on Monday 2024-03-04, hourly samples from 07:00.
pub fn sample_snapshot() -> WeatherSnapshot {
    snapshot_named("Warsaw")
}

pub fn snapshot_named(city: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        five_day: FiveDayForecast {
            headline_text: "Mild with rain showers".to_string(),
            days: vec![
                day_at("2024-03-04T07:00:00+01:00", 12, 7.0, -1.5),
                day_at("2024-03-05T07:00:00+01:00", 6, 9.0, 2.0),
                day_at("2024-03-06T07:00:00+01:00", 1, 11.5, 3.0),
                day_at("2024-03-07T07:00:00+01:00", 3, 10.0, 4.0),
                day_at("2024-03-08T07:00:00+01:00", 18, 8.0, 1.0),
            ],
        },
        current_day: vec![CurrentConditions { temperature_metric: 3.5 }],
        location_info: LocationInfo { localized_name: city.to_string() },
        hourly: (0..12)
            .map(|i| hourly_at(&format!("2024-03-04T{:02}:00:00+01:00", 7 + i), i as f64))
            .collect(),
    }
}

pub fn place(key: &str, city: &str, region: &str, country: &str) -> Place {
    Place {
        key: key.to_string(),
        localized_name: city.to_string(),
        administrative_area: region.to_string(),
        country: country.to_string(),
    }
}

fn boom(endpoint: &'static str) -> ServiceError {
    ServiceError::Status { endpoint, status: 500, body: "boom".to_string() }
}

/// Scriptable weather service.
#[derive(Debug, Default)]
pub struct FakeService {
    pub geolocated: Mutex<Option<Place>>,
    pub snapshots: Mutex<HashMap<String, WeatherSnapshot>>,
    pub failing_part: Mutex<Option<SnapshotPart>>,
    pub search_results: Mutex<HashMap<String, Vec<Place>>>,
    pub search_fails: Mutex<bool>,
    /// Five-day requests for these keys wait until the gate is notified.
    pub gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub geolocate_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl FakeService {
    pub fn with_snapshot(key: &str, snapshot: WeatherSnapshot) -> Self {
        let service = Self::default();
        service.snapshots.lock().insert(key.to_string(), snapshot);
        service
    }

    pub fn gate(&self, key: &str) -> Arc<Notify> {
        self.gates.lock().entry(key.to_string()).or_default().clone()
    }

    fn snapshot(&self, key: &str, part: SnapshotPart) -> Result<WeatherSnapshot, ServiceError> {
        if *self.failing_part.lock() == Some(part) {
            return Err(boom(part.as_str()));
        }
        self.snapshots.lock().get(key).cloned().ok_or(ServiceError::Status {
            endpoint: part.as_str(),
            status: 404,
            body: format!("unknown key {key}"),
        })
    }
}

#[async_trait]
impl WeatherService for FakeService {
    async fn geolocate(&self, _coordinates: GeoCoordinates) -> Result<Place, ServiceError> {
        self.geolocate_calls.fetch_add(1, Ordering::SeqCst);
        self.geolocated.lock().clone().ok_or_else(|| boom("geoposition search"))
    }

    async fn five_day_forecast(&self, key: &str) -> Result<FiveDayForecast, ServiceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.snapshot(key, SnapshotPart::FiveDay)?.five_day)
    }

    async fn current_day_forecast(
        &self,
        key: &str,
    ) -> Result<Vec<CurrentConditions>, ServiceError> {
        Ok(self.snapshot(key, SnapshotPart::CurrentDay)?.current_day)
    }

    async fn location_info(&self, key: &str) -> Result<LocationInfo, ServiceError> {
        Ok(self.snapshot(key, SnapshotPart::LocationInfo)?.location_info)
    }

    async fn hourly_forecast(&self, key: &str) -> Result<Vec<HourlySample>, ServiceError> {
        Ok(self.snapshot(key, SnapshotPart::Hourly)?.hourly)
    }

    async fn city_search(&self, query: &str) -> Result<Vec<Place>, ServiceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if *self.search_fails.lock() {
            return Err(boom("city search"));
        }
        Ok(self.search_results.lock().get(query).cloned().unwrap_or_default())
    }
}

#[derive(Debug)]
pub struct FakeGeolocator {
    pub position: Option<GeoCoordinates>,
    pub calls: AtomicUsize,
    /// When set, every request waits for this gate before answering.
    gate: Option<Arc<Notify>>,
}

impl FakeGeolocator {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Some(GeoCoordinates { latitude, longitude }),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn denied() -> Self {
        Self { position: None, calls: AtomicUsize::new(0), gate: None }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl Geolocator for FakeGeolocator {
    async fn current_position(&self) -> Result<GeoCoordinates, GeolocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.position.ok_or(GeolocationError::PermissionDenied)
    }
}

/// Memory store whose writes can be switched off.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_writes: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                path: "memory".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.set_many(entries)
    }
}

#[derive(Debug, Default)]
pub struct CountingBusy {
    visible: AtomicIsize,
    shown: AtomicUsize,
}

impl CountingBusy {
    pub fn visible(&self) -> isize {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

impl BusyIndicator for CountingBusy {
    fn show(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.visible.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.visible.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub errors: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.errors.lock().iter().map(|(title, _)| title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, title: &str, detail: &str) {
        self.errors.lock().push((title.to_string(), detail.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingModals {
    pub dialogs: Mutex<Vec<Dialog>>,
}

impl ModalHost for RecordingModals {
    fn has_dialog(&self, id: &str) -> bool {
        self.dialogs.lock().iter().any(|d| d.id == id)
    }

    fn create_dialog(&self, dialog: Dialog) {
        self.dialogs.lock().push(dialog);
    }
}

/// A dashboard wired to fakes, with handles to inspect each of them.
pub struct Harness {
    pub service: Arc<FakeService>,
    pub kv: Arc<FlakyStore>,
    pub busy: Arc<CountingBusy>,
    pub notifier: Arc<RecordingNotifier>,
    pub modals: Arc<RecordingModals>,
}

impl Harness {
    pub fn new(service: FakeService) -> Self {
        Self {
            service: Arc::new(service),
            kv: Arc::new(FlakyStore::default()),
            busy: Arc::new(CountingBusy::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            modals: Arc::new(RecordingModals::default()),
        }
    }

    pub fn dashboard(&self, geolocator: Option<Arc<dyn Geolocator>>) -> Arc<Dashboard> {
        Arc::new(Dashboard::new(
            self.service.clone(),
            self.kv.clone(),
            geolocator,
            Ui {
                busy: self.busy.clone(),
                notifier: self.notifier.clone(),
                modals: self.modals.clone(),
            },
        ))
    }
}
