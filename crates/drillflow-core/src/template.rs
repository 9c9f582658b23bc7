//! Formation templates
//!
//! A template is a reusable arrangement of numbered slots (a block, an arc,
//! a company front). Applying one to a formation replaces its positions
//! using a slot-to-member mapping; [`auto_map_slots`] builds that mapping
//! from the roster when the author doesn't hand-assign members.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::chart::MemberId;
use crate::roster::{InstrumentFamily, Roster};

/// A numbered spot in a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateSlot {
    /// Slot number, unique within the template.
    pub index: u32,
    /// Field position in yards.
    pub position: Vec2,
    /// Facing angle in degrees.
    pub facing_deg: f32,
    /// Which section ideally fills this slot. A suggestion, not a rule.
    pub preferred_family: InstrumentFamily,
}

/// A reusable formation shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationTemplate {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Author credit.
    #[serde(default)]
    pub author: String,
    /// The slots making up the shape.
    pub slots: Vec<TemplateSlot>,
}

/// Build a slot-to-member mapping from the active roster.
///
/// Two passes: first each slot is matched to the highest-rated unassigned
/// member of its preferred family, scarcest families served first so a lone
/// drum major isn't stolen by a generic slot; then any slots still empty are
/// filled by the remaining members in rating order. Members are never
/// assigned twice; surplus slots stay unmapped.
pub fn auto_map_slots(template: &FormationTemplate, roster: &Roster) -> HashMap<u32, MemberId> {
    let active: Vec<_> = roster.active_members().collect();
    let mut mapping: HashMap<u32, MemberId> = HashMap::new();
    let mut assigned: HashSet<MemberId> = HashSet::new();

    let family_count = |family: InstrumentFamily| {
        active
            .iter()
            .filter(|m| m.instrument.family() == family)
            .count()
    };

    // Pass 1: preferred-family matches, rarest families first.
    let mut slots: Vec<&TemplateSlot> = template.slots.iter().collect();
    slots.sort_by_key(|s| family_count(s.preferred_family));

    for slot in &slots {
        let best = active
            .iter()
            .filter(|m| {
                !assigned.contains(&m.id) && m.instrument.family() == slot.preferred_family
            })
            .max_by(|a, b| {
                a.overall_rating()
                    .partial_cmp(&b.overall_rating())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(member) = best {
            mapping.insert(slot.index, member.id);
            assigned.insert(member.id);
        }
    }

    // Pass 2: fill remaining slots with anyone left, best rated first.
    let mut available: Vec<_> = active
        .iter()
        .filter(|m| !assigned.contains(&m.id))
        .collect();
    available.sort_by(|a, b| {
        b.overall_rating()
            .partial_cmp(&a.overall_rating())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut unmapped: Vec<&TemplateSlot> = template
        .slots
        .iter()
        .filter(|s| !mapping.contains_key(&s.index))
        .collect();
    unmapped.sort_by_key(|s| s.index);

    for (slot, member) in unmapped.iter().zip(available.iter()) {
        mapping.insert(slot.index, member.id);
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{BandMember, InstrumentType, MemberStatus};
    use uuid::Uuid;

    fn member(instrument: InstrumentType, rating: f32) -> BandMember {
        BandMember {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "Member".to_string(),
            instrument,
            year_in_school: 2,
            status: MemberStatus::Active,
            musicianship: rating,
            marching: rating,
            stamina: rating,
            showmanship: rating,
        }
    }

    fn slot(index: u32, family: InstrumentFamily) -> TemplateSlot {
        TemplateSlot {
            index,
            position: Vec2::new(50.0, 26.67),
            facing_deg: 0.0,
            preferred_family: family,
        }
    }

    #[test]
    fn test_auto_map_prefers_family() {
        let brass = member(InstrumentType::Trumpet, 0.5);
        let drum = member(InstrumentType::SnareDrum, 0.5);
        let roster = Roster {
            school_id: "s".to_string(),
            members: vec![brass.clone(), drum.clone()],
        };

        let template = FormationTemplate {
            id: "tpl_pair".to_string(),
            name: "Pair".to_string(),
            description: String::new(),
            author: String::new(),
            slots: vec![
                slot(0, InstrumentFamily::Brass),
                slot(1, InstrumentFamily::BatteryPercussion),
            ],
        };

        let mapping = auto_map_slots(&template, &roster);
        assert_eq!(mapping.get(&0), Some(&brass.id));
        assert_eq!(mapping.get(&1), Some(&drum.id));
    }

    #[test]
    fn test_auto_map_never_double_assigns() {
        let roster = Roster {
            school_id: "s".to_string(),
            members: vec![
                member(InstrumentType::Trumpet, 0.9),
                member(InstrumentType::Trombone, 0.7),
            ],
        };

        let template = FormationTemplate {
            id: "tpl_block".to_string(),
            name: "Block".to_string(),
            description: String::new(),
            author: String::new(),
            slots: (0..4).map(|i| slot(i, InstrumentFamily::Brass)).collect(),
        };

        let mapping = auto_map_slots(&template, &roster);
        assert_eq!(mapping.len(), 2);
        let ids: HashSet<_> = mapping.values().collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_auto_map_picks_highest_rated() {
        let strong = member(InstrumentType::Trumpet, 0.9);
        let weak = member(InstrumentType::Trombone, 0.3);
        let roster = Roster {
            school_id: "s".to_string(),
            members: vec![weak, strong.clone()],
        };

        let template = FormationTemplate {
            id: "tpl_solo".to_string(),
            name: "Solo".to_string(),
            description: String::new(),
            author: String::new(),
            slots: vec![slot(0, InstrumentFamily::Brass)],
        };

        let mapping = auto_map_slots(&template, &roster);
        assert_eq!(mapping.get(&0), Some(&strong.id));
    }

    #[test]
    fn test_auto_map_fills_unmatched_slots_from_leftovers() {
        let guard = member(InstrumentType::Flag, 0.6);
        let roster = Roster {
            school_id: "s".to_string(),
            members: vec![guard.clone()],
        };

        let template = FormationTemplate {
            id: "tpl_one".to_string(),
            name: "One".to_string(),
            description: String::new(),
            author: String::new(),
            slots: vec![slot(0, InstrumentFamily::Brass)],
        };

        // No brass available: pass 2 places the color guard member anyway.
        let mapping = auto_map_slots(&template, &roster);
        assert_eq!(mapping.get(&0), Some(&guard.id));
    }
}
