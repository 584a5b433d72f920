//! Location picker shown in the settings dialog.

use std::sync::Arc;

use crate::{
    dashboard::{CycleOutcome, Dashboard},
    error::DashboardError,
    model::{LocationCandidate, PersistedLocation, Place},
    view::{Action, ViewNode},
};

pub const SEARCH_INPUT_ID: &str = "countrySearch";
pub const CANDIDATE_LIST_ID: &str = "datalistOptions";

/// Label → key index built from one city search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateMap {
    entries: Vec<LocationCandidate>,
}

impl CandidateMap {
    /// Index `places` by label; a repeated label keeps the later key.
    pub fn from_places(places: &[Place]) -> Self {
        let mut map = Self::default();
        for candidate in places.iter().map(LocationCandidate::from) {
            match map.entries.iter_mut().find(|c| c.label == candidate.label) {
                Some(existing) => existing.key = candidate.key,
                None => map.entries.push(candidate),
            }
        }
        map
    }

    pub fn get(&self, label: &str) -> Option<&LocationCandidate> {
        self.entries.iter().find(|c| c.label == label)
    }

    pub fn as_slice(&self) -> &[LocationCandidate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty query; the previous candidates were kept.
    Skipped,
    /// Candidates were replaced with this many results.
    Updated(usize),
}

/// Result of dispatching a view action to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Searched(SearchOutcome),
    Saved(CycleOutcome),
    /// The action is handled by the modal host, not the controller.
    Ignored,
}

/// Drives the location search and saves the picked location.
#[derive(Debug)]
pub struct SettingsController {
    dashboard: Arc<Dashboard>,
    input: String,
    candidates: CandidateMap,
}

impl SettingsController {
    /// The search input starts out holding the persisted label.
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        let input = match dashboard.store().load() {
            Ok(location) => location.map(|l| l.label).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted location");
                String::new()
            }
        };
        Self { dashboard, input, candidates: CandidateMap::default() }
    }

    /// Current value of the search input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the search input value without searching.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn candidates(&self) -> &[LocationCandidate] {
        self.candidates.as_slice()
    }

    /// The search input changed to `query`.
    pub async fn on_search_input(&mut self, query: &str) -> Result<SearchOutcome, DashboardError> {
        self.input = query.to_string();
        if query.is_empty() {
            return Ok(SearchOutcome::Skipped);
        }

        self.candidates = CandidateMap::default();
        match self.dashboard.service().city_search(query).await {
            Ok(places) => {
                self.candidates = CandidateMap::from_places(&places);
                tracing::debug!(query, results = self.candidates.len(), "city search");
                Ok(SearchOutcome::Updated(self.candidates.len()))
            }
            Err(err) => {
                tracing::warn!(query, error = %err, "city search failed");
                self.dashboard.ui().notifier.error("Fetch weather data error", &err.to_string());
                Err(DashboardError::Search(err))
            }
        }
    }

    /// Persist the candidate labelled `selected_label` and re-run the cycle.
    pub async fn on_save(&mut self, selected_label: &str) -> Result<CycleOutcome, DashboardError> {
        let Some(candidate) = self.candidates.get(selected_label).cloned() else {
            let err = DashboardError::InvalidLocationSelection { label: selected_label.to_string() };
            tracing::warn!(label = selected_label, "rejected unknown location");
            self.dashboard.ui().notifier.error("Invalid location", &err.to_string());
            return Err(err);
        };

        self.dashboard.switch_location(&PersistedLocation::from(candidate)).await
    }

    /// Save whatever the search input holds right now.
    pub async fn save(&mut self) -> Result<CycleOutcome, DashboardError> {
        let label = self.input.clone();
        self.on_save(&label).await
    }

    /// Route an action bound in the settings view.
    pub async fn dispatch(&mut self, action: Action) -> Result<Dispatched, DashboardError> {
        match action {
            Action::SearchInput => {
                let query = self.input.clone();
                self.on_search_input(&query).await.map(Dispatched::Searched)
            }
            Action::SaveSettings => self.save().await.map(Dispatched::Saved),
            Action::OpenSettings => Ok(Dispatched::Ignored),
        }
    }

    /// Settings dialog body for the current input and candidates.
    pub fn view(&self) -> ViewNode {
        settings_body(&self.input, self.candidates())
    }
}

/// Search form with the candidate list.
pub fn settings_body(input_value: &str, candidates: &[LocationCandidate]) -> ViewNode {
    let input = ViewNode::new("input")
        .class("form-control")
        .attr("list", CANDIDATE_LIST_ID)
        .attr("id", SEARCH_INPUT_ID)
        .attr("placeholder", "Type to search...")
        .attr("autocomplete", "off")
        .attr("value", input_value)
        .on("keyup", Action::SearchInput);

    let options = candidates.iter().map(|c| {
        ViewNode::new("option").attr("data-value", c.key.clone()).attr("value", c.label.clone())
    });

    ViewNode::new("div").class("container").child(
        ViewNode::new("form").class("row").child(
            ViewNode::new("div")
                .class("form-floating col px-0")
                .child(input)
                .child(ViewNode::new("label").attr("for", SEARCH_INPUT_ID).text("Location"))
                .child(ViewNode::new("datalist").attr("id", CANDIDATE_LIST_ID).children(options)),
        ),
    )
}

pub fn save_button() -> ViewNode {
    ViewNode::new("button")
        .attr("type", "button")
        .class("btn btn-primary col-3")
        .attr("data-bs-dismiss", "modal")
        .on("click", Action::SaveSettings)
        .text("Save & Close")
}
