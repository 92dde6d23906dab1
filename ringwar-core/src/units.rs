//! Unit class definitions and unit state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;
use crate::restriction::Restriction;

/// Player identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Unit identifier, unique within a board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Movement rule variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveRule {
    /// Destination check only
    Plain(Restriction),
    /// Intermediate cells must be empty
    Blocker(Restriction),
    /// Must close in on enemies visible along `scan`
    ForcedAdvance { step: Restriction, scan: Restriction },
    /// Both restrictions' paths, blocker-checked and deduplicated
    Union(Restriction, Restriction),
}

impl MoveRule {
    /// Every restriction whose path table this rule reads
    pub fn restrictions(&self) -> Vec<Restriction> {
        match *self {
            MoveRule::Plain(r) | MoveRule::Blocker(r) => vec![r],
            MoveRule::ForcedAdvance { step, scan } => vec![step, scan],
            MoveRule::Union(a, b) => vec![a, b],
        }
    }
}

// ============================================================================
// UNIT CLASSES
// ============================================================================

/// Unit class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Warrior,
    Wizard,
    Priestess,
    Pawn,
    MatronMother,
    HolyChampion,
}

/// Static class profile
#[derive(Clone, Copy, Debug)]
pub struct ClassProfile {
    pub name: &'static str,
    pub rule: MoveRule,
    pub value: f32,
    pub essential: bool,
    pub can_kill: bool,
    pub can_die: bool,
    /// Copies in a standard army
    pub default_count: usize,
}

const STEP: Restriction = Restriction::hops(1);
const LINES: Restriction = Restriction::lines(true, true);
const WIZARD_WALK: Restriction = Restriction::hops(3);

impl UnitClass {
    pub const ALL: [UnitClass; 6] = [
        UnitClass::Warrior,
        UnitClass::Wizard,
        UnitClass::Priestess,
        UnitClass::Pawn,
        UnitClass::MatronMother,
        UnitClass::HolyChampion,
    ];

    pub fn profile(self) -> ClassProfile {
        match self {
            UnitClass::Warrior => ClassProfile {
                name: "Warrior",
                rule: MoveRule::Plain(STEP),
                value: 3.0,
                essential: false,
                can_kill: true,
                can_die: true,
                default_count: 4,
            },
            UnitClass::Wizard => ClassProfile {
                name: "Wizard",
                rule: MoveRule::Plain(WIZARD_WALK),
                value: 6.0,
                essential: false,
                can_kill: true,
                can_die: true,
                default_count: 2,
            },
            UnitClass::Priestess => ClassProfile {
                name: "Priestess",
                rule: MoveRule::Blocker(LINES),
                value: 5.0,
                essential: false,
                can_kill: true,
                can_die: true,
                default_count: 2,
            },
            UnitClass::Pawn => ClassProfile {
                name: "Pawn",
                rule: MoveRule::ForcedAdvance { step: STEP, scan: LINES },
                value: 1.0,
                essential: false,
                can_kill: true,
                can_die: true,
                default_count: 8,
            },
            UnitClass::MatronMother => ClassProfile {
                name: "Matron Mother",
                rule: MoveRule::Plain(STEP),
                value: 10.0,
                essential: true,
                can_kill: true,
                can_die: true,
                default_count: 1,
            },
            UnitClass::HolyChampion => ClassProfile {
                name: "Holy Champion",
                rule: MoveRule::Union(WIZARD_WALK, LINES),
                value: 4.0,
                essential: true,
                can_kill: false,
                can_die: false,
                default_count: 1,
            },
        }
    }

    /// Every restriction used by any class
    pub fn all_restrictions() -> Vec<Restriction> {
        let mut rules: Vec<Restriction> = Vec::new();
        for class in Self::ALL {
            for r in class.profile().rule.restrictions() {
                if !rules.contains(&r) {
                    rules.push(r);
                }
            }
        }
        rules
    }
}

// ============================================================================
// UNIT STATE
// ============================================================================

/// A unit on the board
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub class: UnitClass,
    pub rule: MoveRule,
    pub value: f32,
    pub essential: bool,
    pub can_kill: bool,
    pub can_die: bool,
    pub position: NodeId,
}

impl Unit {
    /// Unit with its class defaults
    pub fn new(id: UnitId, owner: PlayerId, class: UnitClass, position: NodeId) -> Self {
        let profile = class.profile();
        Self {
            id,
            owner,
            class,
            rule: profile.rule,
            value: profile.value,
            essential: profile.essential,
            can_kill: profile.can_kill,
            can_die: profile.can_die,
            position,
        }
    }

    /// Override the class value
    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn with_rule(mut self, rule: MoveRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_essential(mut self, essential: bool) -> Self {
        self.essential = essential;
        self
    }
}
