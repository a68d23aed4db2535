// Multi-touch slots
//
// One slot per simultaneous contact, indexed by the device finger id.
// A slot goes None -> Pressed -> JustReleased -> None; the just-pressed
// and just-released edges are each visible for exactly one frame.

/// Number of simultaneous contacts tracked
pub const MAX_TOUCHES: usize = 8;

/// Status of a touch slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchPhase {
    /// No contact
    #[default]
    None,
    /// Contact held; `just_pressed` during the first frame only
    Pressed { just_pressed: bool },
    /// Contact ended this frame
    JustReleased,
}

/// Snapshot of one contact in logical screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSlot {
    pub x: i32,
    pub y: i32,
    pub phase: TouchPhase,
}

impl TouchSlot {
    /// Whether the contact is held (including its first frame)
    pub fn is_pressed(&self) -> bool {
        matches!(self.phase, TouchPhase::Pressed { .. })
    }

    /// Whether the contact began this frame
    pub fn just_pressed(&self) -> bool {
        self.phase == TouchPhase::Pressed { just_pressed: true }
    }

    /// Whether the contact ended this frame
    pub fn just_released(&self) -> bool {
        self.phase == TouchPhase::JustReleased
    }
}

/// Fixed arena of touch slots
#[derive(Debug, Clone, Default)]
pub struct TouchSlots {
    slots: [TouchSlot; MAX_TOUCHES],
}

impl TouchSlots {
    /// Create empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for a finger id, or None when the id exceeds the capacity
    fn slot_mut(&mut self, finger_id: u64) -> Option<&mut TouchSlot> {
        let index = usize::try_from(finger_id).ok()?;
        self.slots.get_mut(index)
    }

    /// Contact began at logical `(x, y)`
    pub fn finger_down(&mut self, finger_id: u64, x: i32, y: i32) {
        let Some(slot) = self.slot_mut(finger_id) else {
            return;
        };
        slot.x = x;
        slot.y = y;
        if slot.phase == TouchPhase::None {
            slot.phase = TouchPhase::Pressed { just_pressed: true };
        }
    }

    /// Contact moved to logical `(x, y)`
    pub fn finger_motion(&mut self, finger_id: u64, x: i32, y: i32) {
        let Some(slot) = self.slot_mut(finger_id) else {
            return;
        };
        slot.x = x;
        slot.y = y;
        if slot.phase == TouchPhase::None {
            slot.phase = TouchPhase::Pressed {
                just_pressed: false,
            };
        }
    }

    /// Contact ended; the slot keeps its last position
    pub fn finger_up(&mut self, finger_id: u64) {
        if let Some(slot) = self.slot_mut(finger_id) {
            slot.phase = TouchPhase::JustReleased;
        }
    }

    /// End-of-frame edge flush
    pub fn flush(&mut self) {
        for slot in &mut self.slots {
            slot.phase = match slot.phase {
                TouchPhase::Pressed { .. } => TouchPhase::Pressed {
                    just_pressed: false,
                },
                TouchPhase::JustReleased | TouchPhase::None => TouchPhase::None,
            };
        }
    }

    /// Bit `n` set for every slot that is not None
    pub fn mask(&self) -> u8 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.phase != TouchPhase::None)
            .fold(0u8, |mask, (n, _)| mask | (1 << n))
    }

    /// Snapshot of a slot; out-of-range indices read as an empty slot
    pub fn get(&self, index: usize) -> TouchSlot {
        self.slots.get(index).copied().unwrap_or_default()
    }

    /// All slots
    pub fn slots(&self) -> &[TouchSlot; MAX_TOUCHES] {
        &self.slots
    }
}
