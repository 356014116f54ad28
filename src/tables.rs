//! Threshold lookup tables for derived statistics.
//!
//! Every derivation in this system is a step function: a sparse set of
//! score thresholds, each bound to the value that applies from that
//! threshold up to the next one. [`value_from_table`] is the single
//! evaluator shared by all of them.

use crate::actor::{Literacy, Saves, SpokenLanguages};

/// Resolve a step-function table at `input`.
///
/// Returns the value bound to the greatest threshold `<= input`, or `None`
/// when `input` sits below every threshold. Tables are sparse; entries must
/// be sorted by threshold.
///
/// A miss is not an error: callers leave the derived field unset.
pub fn value_from_table<V: Copy>(table: &[(u32, V)], input: i32) -> Option<V> {
    let mut output = None;
    for &(threshold, value) in table {
        if (threshold as i32) > input {
            break;
        }
        output = Some(value);
    }
    output
}

/// Standard ability-score modifier scale (-3 to +3).
pub const STANDARD_MODIFIERS: &[(u32, i32)] = &[
    (0, -3),
    (3, -3),
    (4, -2),
    (6, -1),
    (9, 0),
    (13, 1),
    (16, 2),
    (18, 3),
];

/// Capped modifier scale (-2 to +2), used for initiative (dex) and
/// NPC reactions (cha).
pub const CAPPED_MODIFIERS: &[(u32, i32)] = &[
    (0, -2),
    (3, -2),
    (4, -1),
    (6, -1),
    (9, 0),
    (13, 1),
    (16, 1),
    (18, 2),
];

/// Open-doors exploration modifier from strength.
pub const OPEN_DOORS: &[(u32, i32)] = &[(0, 0), (3, 1), (9, 2), (13, 3), (16, 4), (18, 5)];

/// Literacy level from intelligence. No entry below 3: the field stays
/// unset for scores of 0-2.
pub const LITERACY: &[(u32, Literacy)] = &[
    (3, Literacy::Illiterate),
    (6, Literacy::Basic),
    (9, Literacy::Literate),
];

/// Spoken-language proficiency from intelligence.
pub const SPOKEN_LANGUAGES: &[(u32, SpokenLanguages)] = &[
    (0, SpokenLanguages::NativeBroken),
    (3, SpokenLanguages::Native),
    (13, SpokenLanguages::NativePlus1),
    (16, SpokenLanguages::NativePlus2),
    (18, SpokenLanguages::NativePlus3),
];

/// Monster saving throws by hit dice, B/X bands.
pub const MONSTER_SAVES: &[(u32, Saves)] = &[
    (0, Saves::new(14, 15, 16, 17, 18)),
    (1, Saves::new(12, 13, 14, 15, 16)),
    (4, Saves::new(10, 11, 12, 13, 14)),
    (7, Saves::new(8, 9, 10, 10, 12)),
    (10, Saves::new(6, 7, 8, 8, 10)),
    (13, Saves::new(4, 5, 6, 5, 8)),
    (16, Saves::new(2, 3, 4, 3, 6)),
    (19, Saves::new(2, 2, 2, 2, 4)),
    (22, Saves::new(2, 2, 2, 2, 2)),
];

/// Monster attack target number (descending) by hit dice.
pub const MONSTER_THAC0: &[(u32, i32)] = &[
    (0, 20),
    (1, 19),
    (2, 18),
    (3, 17),
    (4, 16),
    (5, 15),
    (6, 14),
    (7, 13),
    (9, 12),
    (11, 11),
    (13, 10),
    (15, 9),
    (17, 8),
    (19, 7),
    (21, 6),
    (23, 5),
];

/// THAC0 used when hit dice sit below every table threshold.
pub const DEFAULT_MONSTER_THAC0: i32 = 20;
