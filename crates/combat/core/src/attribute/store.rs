//! Fixed-schema attribute storage.

use super::AttributeKind;

/// One attribute record: the permanent base value plus the current value
/// (base with all active modifiers aggregated in).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub base: f32,
    pub current: f32,
}

impl Attribute {
    pub const fn new(value: f32) -> Self {
        Self {
            base: value,
            current: value,
        }
    }
}

/// Per-character attribute table, one record per [`AttributeKind`].
///
/// The store is pure data with controlled mutation: nothing outside this
/// crate writes a field directly. All writes go through
/// [`CombatEngine`](crate::engine::CombatEngine), which runs the change
/// policy and the post-commit clamps, so an `AttributeStore` read at any
/// point is always policy-consistent.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeStore {
    records: [Attribute; AttributeKind::COUNT],
}

impl AttributeStore {
    /// Creates a store with every attribute at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store initialized for a fresh character: health and stamina
    /// start at their maximums, the Damage scratch at zero.
    pub fn with_vitals(max_health: f32, max_stamina: f32, move_speed: f32) -> Self {
        let mut store = Self::new();
        store.records[AttributeKind::MaxHealth.index()] = Attribute::new(max_health);
        store.records[AttributeKind::Health.index()] = Attribute::new(max_health);
        store.records[AttributeKind::MaxStamina.index()] = Attribute::new(max_stamina);
        store.records[AttributeKind::Stamina.index()] = Attribute::new(max_stamina);
        store.records[AttributeKind::MoveSpeed.index()] = Attribute::new(move_speed);
        store
    }

    /// Full record for one attribute.
    #[inline]
    pub fn attribute(&self, kind: AttributeKind) -> Attribute {
        self.records[kind.index()]
    }

    /// Current value of one attribute.
    #[inline]
    pub fn current(&self, kind: AttributeKind) -> f32 {
        self.records[kind.index()].current
    }

    /// Base value of one attribute.
    #[inline]
    pub fn base(&self, kind: AttributeKind) -> f32 {
        self.records[kind.index()].base
    }

    // ===== typed accessors =====

    #[inline]
    pub fn health(&self) -> f32 {
        self.current(AttributeKind::Health)
    }

    #[inline]
    pub fn max_health(&self) -> f32 {
        self.current(AttributeKind::MaxHealth)
    }

    #[inline]
    pub fn stamina(&self) -> f32 {
        self.current(AttributeKind::Stamina)
    }

    #[inline]
    pub fn max_stamina(&self) -> f32 {
        self.current(AttributeKind::MaxStamina)
    }

    #[inline]
    pub fn move_speed(&self) -> f32 {
        self.current(AttributeKind::MoveSpeed)
    }

    #[inline]
    pub fn experience(&self) -> f32 {
        self.current(AttributeKind::Experience)
    }

    #[inline]
    pub fn gold(&self) -> f32 {
        self.current(AttributeKind::Gold)
    }

    /// Alive means strictly positive health.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health() > 0.0
    }

    // ===== controlled mutation (engine only) =====

    #[inline]
    pub(crate) fn set_current(&mut self, kind: AttributeKind, value: f32) {
        debug_assert!(value.is_finite());
        self.records[kind.index()].current = value;
    }

    #[inline]
    pub(crate) fn set_base(&mut self, kind: AttributeKind, value: f32) {
        debug_assert!(value.is_finite());
        self.records[kind.index()].base = value;
    }

    /// Restores a record byte-exactly. Rollback path only; skips policy on
    /// purpose because the journal recorded a value that already passed it.
    #[inline]
    pub(crate) fn restore(&mut self, kind: AttributeKind, record: Attribute) {
        self.records[kind.index()] = record;
    }
}
