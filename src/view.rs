//! Page view state
//!
//! The page has three regions (loading, chart, error). [`ViewController`]
//! drives a [`RegionSurface`] so that at most one of them is shown.

use serde::Serialize;
use tracing::debug;

/// A toggleable region of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Loading,
    Chart,
    Error,
}

/// Whatever displays the regions. Bound once when the controller is built.
pub trait RegionSurface {
    fn show(&mut self, region: Region);
    fn hide(&mut self, region: Region);
    fn set_error_text(&mut self, text: &str);
}

/// Which region the page currently presents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum ViewState {
    Idle,
    Loading,
    Success,
    Error(String),
}

impl ViewState {
    /// Region shown in this state, if any
    #[must_use]
    pub fn visible_region(&self) -> Option<Region> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading => Some(Region::Loading),
            ViewState::Success => Some(Region::Chart),
            ViewState::Error(_) => Some(Region::Error),
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// State machine over the three regions. Starts `Idle`.
#[derive(Debug)]
pub struct ViewController<S: RegionSurface> {
    surface: S,
    state: ViewState,
}

impl<S: RegionSurface> ViewController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn enter_loading(&mut self) {
        self.surface.hide(Region::Error);
        self.surface.hide(Region::Chart);
        self.surface.show(Region::Loading);
        self.transition(ViewState::Loading);
    }

    pub fn enter_success(&mut self) {
        self.surface.hide(Region::Loading);
        self.surface.hide(Region::Error);
        self.surface.show(Region::Chart);
        self.transition(ViewState::Success);
    }

    pub fn enter_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.surface.hide(Region::Loading);
        self.surface.hide(Region::Chart);
        self.surface.set_error_text(&message);
        self.surface.show(Region::Error);
        self.transition(ViewState::Error(message));
    }

    fn transition(&mut self, next: ViewState) {
        debug!(from = ?self.state, to = ?next, "View state change");
        self.state = next;
    }
}

/// Region visibility kept in memory, read back when the page is rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRegions {
    pub loading: bool,
    pub chart: bool,
    pub error: bool,
    pub error_text: String,
}

impl PageRegions {
    #[must_use]
    pub fn is_visible(&self, region: Region) -> bool {
        match region {
            Region::Loading => self.loading,
            Region::Chart => self.chart,
            Region::Error => self.error,
        }
    }

    /// Number of regions currently shown
    #[must_use]
    pub fn visible_count(&self) -> usize {
        [self.loading, self.chart, self.error]
            .into_iter()
            .filter(|shown| *shown)
            .count()
    }

    fn slot(&mut self, region: Region) -> &mut bool {
        match region {
            Region::Loading => &mut self.loading,
            Region::Chart => &mut self.chart,
            Region::Error => &mut self.error,
        }
    }
}

impl RegionSurface for PageRegions {
    fn show(&mut self, region: Region) {
        *self.slot(region) = true;
    }

    fn hide(&mut self, region: Region) {
        *self.slot(region) = false;
    }

    fn set_error_text(&mut self, text: &str) {
        self.error_text = text.to_string();
    }
}
