//! The fixed attribute schema.

/// Identifies one attribute in the fixed schema.
///
/// The discriminant doubles as the storage index in [`AttributeStore`], so
/// variant order is part of the state layout and of the digest computed over
/// it.
///
/// [`AttributeStore`]: super::AttributeStore
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKind {
    /// Current health. When it reaches 0 the owner dies. Capped by MaxHealth.
    /// Negative changes should go through the Damage meta attribute.
    Health,

    /// MaxHealth is its own attribute since gameplay effects may modify it.
    MaxHealth,

    /// Passive health regeneration per second.
    HealthRegen,

    /// Current stamina, spent to execute special abilities. Capped by MaxStamina.
    Stamina,

    /// MaxStamina is its own attribute since gameplay effects may modify it.
    MaxStamina,

    /// Passive stamina regeneration per second.
    StaminaRegen,

    /// How fast the character can move, in units per second.
    MoveSpeed,

    /// Accumulated experience. Uncapped; raised by bounty effects.
    Experience,

    /// Accumulated gold. Uncapped; raised by bounty effects.
    Gold,

    /// Meta attribute consumed by the damage resolution pipeline and turned
    /// into a Health loss. Transient server-side scratch, never replicated.
    Damage,
}

impl AttributeKind {
    /// Number of attributes in the schema.
    pub const COUNT: usize = <Self as strum::EnumCount>::COUNT;

    /// Storage index of this attribute.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true for transient scratch attributes that only carry a
    /// one-shot computation and must read back as zero afterwards.
    #[inline]
    pub const fn is_meta(self) -> bool {
        matches!(self, AttributeKind::Damage)
    }

    /// The max attribute capping this one, if any.
    #[inline]
    pub const fn paired_max(self) -> Option<AttributeKind> {
        match self {
            AttributeKind::Health => Some(AttributeKind::MaxHealth),
            AttributeKind::Stamina => Some(AttributeKind::MaxStamina),
            _ => None,
        }
    }

    /// The current attribute this max attribute caps, if any.
    #[inline]
    pub const fn paired_current(self) -> Option<AttributeKind> {
        match self {
            AttributeKind::MaxHealth => Some(AttributeKind::Health),
            AttributeKind::MaxStamina => Some(AttributeKind::Stamina),
            _ => None,
        }
    }
}
