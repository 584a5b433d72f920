//! Resolve, fetch and render cycles.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    error::DashboardError,
    fetcher::WeatherDataFetcher,
    geolocation::Geolocator,
    model::PersistedLocation,
    provider::WeatherService,
    render::{SETTINGS_MODAL_ID, render},
    resolver::{LocationDecision, LocationResolver, default_location},
    settings::{self, SettingsController},
    store::{KeyValueStore, LocationStore},
    ui::{BusyGuard, Dialog, Ui},
    view::{Surface, ViewNode},
};

/// How a cycle ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle's view is now mounted.
    Rendered { generation: u64, location: PersistedLocation, decision: LocationDecision },
    /// A newer cycle started while this one was in flight; its result was dropped.
    Superseded { generation: u64 },
}

/// The weather widget: owns the collaborators and the mounted view.
pub struct Dashboard {
    service: Arc<dyn WeatherService>,
    store: LocationStore,
    resolver: LocationResolver,
    fetcher: WeatherDataFetcher,
    ui: Ui,
    surface: Surface,
    /// Token of the most recently started cycle.
    generation: Mutex<u64>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("store", &self.store)
            .field("generation", &*self.generation.lock())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(
        service: Arc<dyn WeatherService>,
        kv: Arc<dyn KeyValueStore>,
        geolocator: Option<Arc<dyn Geolocator>>,
        ui: Ui,
    ) -> Self {
        let store = LocationStore::new(kv);
        let resolver =
            LocationResolver::new(store.clone(), service.clone(), geolocator, ui.notifier.clone());
        let fetcher = WeatherDataFetcher::new(service.clone());

        Self {
            service,
            store,
            resolver,
            fetcher,
            ui,
            surface: Surface::new(),
            generation: Mutex::new(0),
        }
    }

    /// First cycle after the widget is mounted.
    pub async fn start(&self) -> Result<CycleOutcome, DashboardError> {
        tracing::info!("starting weather dashboard");
        self.refresh().await
    }

    /// Run one resolve → fetch → render cycle.
    ///
    /// Failures are reported through the notifier before being returned. A
    /// failed cycle leaves the mounted view as it was.
    pub async fn refresh(&self) -> Result<CycleOutcome, DashboardError> {
        let generation = {
            let mut latest = self.generation.lock();
            *latest += 1;
            *latest
        };
        self.cycle(generation).await
    }

    /// Persist `location` and run a cycle for it.
    ///
    /// The write and the new generation are taken under one lock, so a cycle
    /// still in flight can no longer commit its own location over this one.
    pub async fn switch_location(
        &self,
        location: &PersistedLocation,
    ) -> Result<CycleOutcome, DashboardError> {
        let generation = {
            let mut latest = self.generation.lock();
            if let Err(err) = self.store.save(location) {
                tracing::warn!(key = %location.key, error = %err, "could not save location");
                self.ui.notifier.error("Location storage error", &err.to_string());
                return Err(err.into());
            }
            *latest += 1;
            *latest
        };
        tracing::info!(key = %location.key, label = %location.label, "location saved");

        self.cycle(generation).await
    }

    async fn cycle(&self, generation: u64) -> Result<CycleOutcome, DashboardError> {
        let _busy = BusyGuard::acquire(self.ui.busy.clone());

        tracing::debug!(generation, "cycle started");

        match self.run_cycle(generation).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if self.is_current(generation) {
                    let title = match err {
                        DashboardError::Store(_) => "Location storage error",
                        _ => "Fetch weather data error",
                    };
                    tracing::warn!(generation, error = %err, "cycle failed");
                    self.ui.notifier.error(title, &err.to_string());
                } else {
                    tracing::debug!(generation, error = %err, "superseded cycle failed");
                }
                Err(err)
            }
        }
    }

    async fn run_cycle(&self, generation: u64) -> Result<CycleOutcome, DashboardError> {
        let resolution = self.resolver.plan().await?;

        let location = {
            let latest = self.generation.lock();
            if *latest != generation {
                tracing::debug!(generation, latest = *latest, "superseded before commit");
                return Ok(CycleOutcome::Superseded { generation });
            }
            self.resolver.commit(&resolution)?;
            self.store.load()?.unwrap_or_else(default_location)
        };

        let snapshot = self.fetcher.fetch(&location.key).await?;
        let view = render(&location.label, &snapshot);

        let latest = self.generation.lock();
        if *latest != generation {
            tracing::debug!(generation, latest = *latest, "discarding superseded cycle");
            return Ok(CycleOutcome::Superseded { generation });
        }

        self.ensure_settings_dialog(&location.label);
        self.surface.replace(view);
        tracing::info!(generation, key = %location.key, label = %location.label, "rendered weather");

        Ok(CycleOutcome::Rendered { generation, location, decision: resolution.decision })
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.generation.lock() == generation
    }

    fn ensure_settings_dialog(&self, label: &str) {
        if self.ui.modals.has_dialog(SETTINGS_MODAL_ID) {
            return;
        }
        self.ui.modals.create_dialog(Dialog {
            id: SETTINGS_MODAL_ID.to_string(),
            title: "Weather settings".to_string(),
            body: settings::settings_body(label, &[]),
            footer: settings::save_button(),
        });
    }

    /// Location settings bound to this dashboard.
    pub fn settings(self: &Arc<Self>) -> SettingsController {
        SettingsController::new(self.clone())
    }

    /// The currently mounted weather container, if any cycle has rendered.
    pub fn current_view(&self) -> Option<ViewNode> {
        self.surface.current()
    }

    pub fn location(&self) -> Result<Option<PersistedLocation>, DashboardError> {
        Ok(self.store.load()?)
    }

    pub(crate) fn service(&self) -> &Arc<dyn WeatherService> {
        &self.service
    }

    pub(crate) fn store(&self) -> &LocationStore {
        &self.store
    }

    pub(crate) fn ui(&self) -> &Ui {
        &self.ui
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{FetchFailure, SnapshotPart},
        testing::{FakeGeolocator, FakeService, Harness, place, sample_snapshot, snapshot_named},
    };
    use std::sync::atomic::Ordering;
    use tokio::sync::Notify;

    fn title_of(view: &ViewNode) -> String {
        view.find(&|n: &ViewNode| n.tag == "h1").map(ViewNode::text_content).unwrap_or_default()
    }

    #[tokio::test]
    async fn first_start_without_geolocation_renders_default_location() {
        let h = Harness::new(FakeService::with_snapshot("274663", sample_snapshot()));
        let dashboard = h.dashboard(None);

        let outcome = dashboard.start().await.unwrap();

        assert_eq!(outcome, CycleOutcome::Rendered {
            generation: 1,
            location: default_location(),
            decision: LocationDecision::UseDefault,
        });
        let view = dashboard.current_view().unwrap();
        assert_eq!(title_of(&view), "Weather in Warsaw");
        assert_eq!(view.get_attr("data-location-label"), Some("Warsaw, Masovia, Poland"));
        assert_eq!(h.busy.visible(), 0);
        assert_eq!(h.busy.shown(), 1);
    }

    #[tokio::test]
    async fn geolocated_start_fetches_for_geolocated_key() {
        let h = Harness::new(FakeService::with_snapshot("2696858", snapshot_named("Lyon")));
        *h.service.geolocated.lock() = Some(place("2696858", "Lyon", "Rhône", "France"));
        let dashboard = h.dashboard(Some(Arc::new(FakeGeolocator::at(45.76, 4.83))));

        dashboard.start().await.unwrap();

        assert_eq!(title_of(&dashboard.current_view().unwrap()), "Weather in Lyon");
        assert_eq!(
            dashboard.location().unwrap(),
            Some(PersistedLocation::new("2696858", "Lyon, Rhône, France"))
        );
    }

    #[tokio::test]
    async fn settings_dialog_is_created_once() {
        let h = Harness::new(FakeService::with_snapshot("274663", sample_snapshot()));
        let dashboard = h.dashboard(None);

        dashboard.start().await.unwrap();
        dashboard.refresh().await.unwrap();

        let dialogs = h.modals.dialogs.lock();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].id, SETTINGS_MODAL_ID);
        assert_eq!(dialogs[0].title, "Weather settings");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_view_and_notifies_once() {
        let h = Harness::new(FakeService::with_snapshot("274663", sample_snapshot()));
        let dashboard = h.dashboard(None);
        dashboard.start().await.unwrap();
        let before = dashboard.current_view().unwrap();

        *h.service.failing_part.lock() = Some(SnapshotPart::Hourly);
        let err = dashboard.refresh().await.unwrap_err();

        assert!(matches!(err, DashboardError::Fetch(FetchFailure::Retrieval { .. })));
        assert_eq!(dashboard.current_view().unwrap(), before);
        assert_eq!(h.notifier.titles(), vec!["Fetch weather data error"]);
        assert_eq!(h.busy.visible(), 0);
    }

    #[tokio::test]
    async fn failed_first_fetch_renders_nothing() {
        let h = Harness::new(FakeService::default());
        let dashboard = h.dashboard(None);

        assert!(dashboard.start().await.is_err());
        assert!(dashboard.current_view().is_none());
        // the location is still resolved and kept for the next attempt
        assert_eq!(dashboard.location().unwrap(), Some(default_location()));
        assert_eq!(h.busy.visible(), 0);
    }

    #[tokio::test]
    async fn stale_cycle_does_not_overwrite_newer_render() {
        let service = FakeService::with_snapshot("274663", snapshot_named("Warsaw"));
        service.snapshots.lock().insert("2696858".into(), snapshot_named("Lyon"));
        let h = Harness::new(service);
        let dashboard = h.dashboard(None);

        // the first cycle will hang on its five-day request until released
        h.kv.set(crate::store::LOCATION_KEY, "274663").unwrap();
        h.kv.set(crate::store::LOCATION_LABEL, "Warsaw, Masovia, Poland").unwrap();
        let gate = h.service.gate("274663");

        let slow = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.refresh().await })
        };
        while h.service.fetch_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let lyon = PersistedLocation::new("2696858", "Lyon, Rhône, France");
        let fast = dashboard.switch_location(&lyon).await.unwrap();
        assert!(matches!(fast, CycleOutcome::Rendered { generation: 2, .. }));

        gate.notify_one();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(slow, CycleOutcome::Superseded { generation: 1 });
        assert_eq!(title_of(&dashboard.current_view().unwrap()), "Weather in Lyon");
        assert_eq!(dashboard.location().unwrap(), Some(lyon));
        assert_eq!(h.busy.visible(), 0);
    }

    fn lyon_service() -> FakeService {
        let service = FakeService::with_snapshot("274663", sample_snapshot());
        service.snapshots.lock().insert("2696858".into(), snapshot_named("Lyon"));
        service
            .search_results
            .lock()
            .insert("Ly".into(), vec![place("2696858", "Lyon", "Rhône", "France")]);
        service
    }

    #[tokio::test]
    async fn superseded_cycle_does_not_persist_its_geolocated_place() {
        let service = lyon_service();
        *service.geolocated.lock() = Some(place("274663", "Warsaw", "Masovia", "Poland"));
        let h = Harness::new(service);
        let gate = Arc::new(Notify::new());
        let geolocator = Arc::new(FakeGeolocator::at(52.23, 21.01).with_gate(gate.clone()));
        let dashboard = h.dashboard(Some(geolocator.clone()));

        let first = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.start().await })
        };
        while geolocator.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let mut settings = dashboard.settings();
        settings.on_search_input("Ly").await.unwrap();
        let saved = settings.on_save("Lyon, Rhône, France").await.unwrap();
        assert!(matches!(saved, CycleOutcome::Rendered { generation: 2, .. }));

        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), CycleOutcome::Superseded { generation: 1 });

        assert_eq!(
            dashboard.location().unwrap(),
            Some(PersistedLocation::new("2696858", "Lyon, Rhône, France"))
        );
        assert_eq!(title_of(&dashboard.current_view().unwrap()), "Weather in Lyon");
        assert_eq!(h.service.geolocate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.busy.visible(), 0);
    }

    #[tokio::test]
    async fn superseded_cycle_stays_quiet_about_denied_geolocation() {
        let h = Harness::new(lyon_service());
        let gate = Arc::new(Notify::new());
        let geolocator = Arc::new(FakeGeolocator::denied().with_gate(gate.clone()));
        let dashboard = h.dashboard(Some(geolocator.clone()));

        let first = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move { dashboard.start().await })
        };
        while geolocator.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let mut settings = dashboard.settings();
        settings.on_search_input("Ly").await.unwrap();
        settings.on_save("Lyon, Rhône, France").await.unwrap();

        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), CycleOutcome::Superseded { generation: 1 });

        assert!(h.notifier.titles().is_empty());
        assert_eq!(dashboard.location().unwrap().unwrap().key, "2696858");
    }
}
