//! Time-to-slot mapping and the resolution policy.
//!
//! The table covers hours 1..=23 and minutes 1..=59 (chapter and verse
//! numbers). Instants outside it alias to the nearest covered value.

use crate::store::{PassageRecord, SLOT_COUNT, StoreError};

const FIRST_HOUR: u8 = 1;
const LAST_HOUR: u8 = 23;
const FIRST_MINUTE: u8 = 1;
const LAST_MINUTE: u8 = 59;
const MINUTES_PER_HOUR: u16 = (LAST_MINUTE - FIRST_MINUTE + 1) as u16;

/// Index into the slot directory, always below [`SLOT_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u16);

impl Slot {
    pub fn new(index: u16) -> Option<Self> {
        ((index as usize) < SLOT_COUNT).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The (hour, minute) this slot stands for.
    pub fn time(self) -> (u8, u8) {
        let hour = (self.0 / MINUTES_PER_HOUR) as u8 + FIRST_HOUR;
        let minute = (self.0 % MINUTES_PER_HOUR) as u8 + FIRST_MINUTE;
        (hour, minute)
    }
}

pub fn map_to_slot(hour24: u8, minute: u8) -> Slot {
    let hour = hour24.clamp(FIRST_HOUR, LAST_HOUR) as u16;
    let minute = minute.clamp(FIRST_MINUTE, LAST_MINUTE) as u16;
    Slot((hour - FIRST_HOUR as u16) * MINUTES_PER_HOUR + (minute - FIRST_MINUTE as u16))
}

pub trait SlotLookup {
    fn lookup(&mut self, slot: Slot) -> Result<Option<PassageRecord>, StoreError>;
}

/// Looks up the slot for the given time; when it is empty in the afternoon,
/// retries once with the 12-hour alias. Only the first entry of a slot is
/// ever used.
pub fn resolve<L: SlotLookup>(
    store: &mut L,
    hour24: u8,
    minute: u8,
) -> Result<Option<PassageRecord>, StoreError> {
    if let Some(record) = store.lookup(map_to_slot(hour24, minute))? {
        return Ok(Some(record));
    }
    if hour24 > 12 {
        log::debug!("slot {:02}:{:02} empty, trying {:02}:{:02}", hour24, minute, hour24 - 12, minute);
        return store.lookup(map_to_slot(hour24 - 12, minute));
    }
    Ok(None)
}
