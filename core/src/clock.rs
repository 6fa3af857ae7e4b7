//! Composition root: owns the passage store and the refresh state, and runs
//! the per-tick pipeline resolve -> decode -> wrap -> draw -> paint.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::books::Reference;
use crate::compositor::{self, Frame, PassageView};
use crate::config::{DisplaySettings, StorePaths};
use crate::display::{Display, RefreshMode};
use crate::framebuffer::DisplayBuffers;
use crate::fs::Volume;
use crate::refresh::{MinuteTrigger, RefreshController};
use crate::slot::{self, map_to_slot};
use crate::store::{PassageStore, StoreError};
use crate::version;

/// Local wall-clock time, already timezone adjusted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub hour: u8,
    pub minute: u8,
    /// 0 = Sunday.
    pub weekday: u8,
    /// 0 = January.
    pub month: u8,
    pub day: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temperature_c: f32,
    pub valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkStatus {
    pub connected: bool,
    pub address: Option<String>,
}

impl NetworkStatus {
    pub fn setup_url(&self) -> Option<String> {
        if !self.connected {
            return None;
        }
        self.address.as_ref().map(|addr| format!("http://{addr}/"))
    }
}

/// Everything the collaborators hand over on a tick.
#[derive(Debug, Clone)]
pub struct TickInputs {
    pub time: LocalTime,
    pub settings: DisplaySettings,
    pub weather: Option<WeatherReading>,
    pub network: NetworkStatus,
}

/// A resolved passage: reference plus decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub reference: Reference,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotReady,
    NoPassage,
    Passage(Passage),
}

/// Handed back after each committed paint so collaborators can log it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub hour: u8,
    pub minute: u8,
    pub reference: Option<Reference>,
    pub lines: Vec<String>,
    pub mode: RefreshMode,
}

pub struct VerseClock<V: Volume> {
    store: PassageStore<V>,
    refresh: RefreshController,
    trigger: MinuteTrigger,
}

impl<V: Volume> VerseClock<V> {
    /// Loads the store once. A failed load leaves the clock permanently in
    /// the not-ready state until reboot.
    pub fn new(volume: V, paths: StorePaths) -> Self {
        log::info!(
            "verse clock {} ({}) built {}",
            version::VERSION,
            version::DEVICE_ID,
            version::BUILD_TIME
        );
        let mut store = PassageStore::new(volume, paths);
        if let Err(err) = store.load() {
            log::error!("passage store unavailable: {}", err);
        }
        Self {
            store,
            refresh: RefreshController::new(),
            trigger: MinuteTrigger::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    pub fn is_primed(&self) -> bool {
        self.refresh.is_primed()
    }

    /// Resolves the passage for a time. Per-lookup faults degrade to
    /// `NoPassage` for this call only.
    pub fn resolve(&mut self, hour24: u8, minute: u8) -> Resolution {
        if !self.store.is_ready() {
            return Resolution::NotReady;
        }
        match self.fetch(hour24, minute) {
            Ok(Some(passage)) => Resolution::Passage(passage),
            Ok(None) => Resolution::NoPassage,
            Err(err) => {
                log::warn!("passage for {:02}:{:02} unreadable: {}", hour24, minute, err);
                Resolution::NoPassage
            }
        }
    }

    fn fetch(&mut self, hour24: u8, minute: u8) -> Result<Option<Passage>, StoreError> {
        if let Ok(toc) = self.store.toc_record(map_to_slot(hour24, minute)) {
            if toc.count > 1 {
                log::debug!("slot {:02}:{:02} has {} entries, using the first", hour24, minute, toc.count);
            }
        }
        let Some(record) = slot::resolve(&mut self.store, hour24, minute)? else {
            return Ok(None);
        };
        let text = self.store.decode(&record)?;
        Ok(Some(Passage {
            reference: record.reference(),
            text,
        }))
    }

    /// Renders at most once per distinct wall-clock minute. Returns `None`
    /// when nothing was painted.
    pub fn tick(
        &mut self,
        inputs: &TickInputs,
        buffers: &mut DisplayBuffers,
        display: &mut impl Display,
    ) -> Option<RenderReport> {
        let time = inputs.time;
        if !self.trigger.fire(time.hour, time.minute) {
            return None;
        }

        let resolution = self.resolve(time.hour, time.minute);
        let passage = match &resolution {
            Resolution::NotReady => PassageView::NotReady,
            Resolution::NoPassage => PassageView::NoPassage,
            Resolution::Passage(p) => PassageView::Passage {
                reference: p.reference,
                text: &p.text,
            },
        };
        let setup_url = inputs.network.setup_url();
        let frame = Frame {
            time,
            settings: inputs.settings,
            passage,
            weather: inputs.weather,
            setup_url: setup_url.as_deref(),
        };
        let lines = compositor::compose(buffers, &frame);
        let mode = self.refresh.render(display, buffers);

        let reference = match &resolution {
            Resolution::Passage(p) => Some(p.reference),
            _ => None,
        };
        match reference {
            Some(r) => log::info!("{:02}:{:02} -> {} ({:?} refresh)", time.hour, time.minute, r, mode),
            None => log::info!("{:02}:{:02} -> none ({:?} refresh)", time.hour, time.minute, mode),
        }

        Some(RenderReport {
            hour: time.hour,
            minute: time.minute,
            reference,
            lines,
            mode,
        })
    }
}
