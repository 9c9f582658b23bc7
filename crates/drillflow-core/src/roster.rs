//! Band roster
//!
//! Read-only member data consumed by the scoring engine and the template
//! auto-mapper. Recruiting, morale and the rest of band management happen
//! outside the core; only the fields the engine reads are modeled here.

use serde::{Deserialize, Serialize};

use crate::chart::MemberId;

/// Instrument assigned to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum InstrumentType {
    Trumpet,
    Trombone,
    FrenchHorn,
    Mellophone,
    Baritone,
    Tuba,
    Sousaphone,
    Flute,
    Piccolo,
    Clarinet,
    Saxophone,
    SnareDrum,
    BassDrum,
    TenorDrums,
    Cymbals,
    Xylophone,
    Marimba,
    Vibraphone,
    Timpani,
    Flag,
    Rifle,
    Saber,
    DrumMajor,
}

/// Instrument section grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentFamily {
    /// Trumpets through sousaphones.
    Brass,
    /// Flutes, clarinets, saxes.
    Woodwind,
    /// Marching drumline.
    BatteryPercussion,
    /// Pit: mallets and timpani.
    FrontEnsemble,
    /// Flags, rifles, sabers.
    ColorGuard,
    /// Drum majors.
    Leadership,
}

impl InstrumentType {
    /// Section this instrument belongs to.
    pub fn family(self) -> InstrumentFamily {
        use InstrumentType::*;
        match self {
            Trumpet | Trombone | FrenchHorn | Mellophone | Baritone | Tuba | Sousaphone => {
                InstrumentFamily::Brass
            }
            Flute | Piccolo | Clarinet | Saxophone => InstrumentFamily::Woodwind,
            SnareDrum | BassDrum | TenorDrums | Cymbals => InstrumentFamily::BatteryPercussion,
            Xylophone | Marimba | Vibraphone | Timpani => InstrumentFamily::FrontEnsemble,
            Flag | Rifle | Saber => InstrumentFamily::ColorGuard,
            DrumMajor => InstrumentFamily::Leadership,
        }
    }
}

/// Whether a member can take the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MemberStatus {
    /// Marching and playing.
    #[default]
    Active,
    /// Temporarily off the field.
    Injured,
    /// Sitting out by choice of the director.
    Benched,
    /// No longer in the band.
    Graduated,
}

/// One of the four rated skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Tone, intonation, technique.
    Musicianship,
    /// Step precision and posture.
    Marching,
    /// Endurance across a full show.
    Stamina,
    /// Stage presence.
    Showmanship,
}

/// A band member with per-skill ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandMember {
    /// Unique ID, referenced by chart positions.
    pub id: MemberId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Assigned instrument.
    pub instrument: InstrumentType,
    /// 1-4, freshman to senior.
    pub year_in_school: u8,
    /// Availability status.
    pub status: MemberStatus,
    /// Skill rating 0-1.
    pub musicianship: f32,
    /// Skill rating 0-1.
    pub marching: f32,
    /// Skill rating 0-1.
    pub stamina: f32,
    /// Skill rating 0-1.
    pub showmanship: f32,
}

impl BandMember {
    /// Full display name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Read a skill rating.
    pub fn skill(&self, kind: SkillKind) -> f32 {
        match kind {
            SkillKind::Musicianship => self.musicianship,
            SkillKind::Marching => self.marching,
            SkillKind::Stamina => self.stamina,
            SkillKind::Showmanship => self.showmanship,
        }
    }

    /// Write a skill rating, clamped to 0-1.
    pub fn set_skill(&mut self, kind: SkillKind, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match kind {
            SkillKind::Musicianship => self.musicianship = value,
            SkillKind::Marching => self.marching = value,
            SkillKind::Stamina => self.stamina = value,
            SkillKind::Showmanship => self.showmanship = value,
        }
    }

    /// Mean of the four skill ratings.
    pub fn overall_rating(&self) -> f32 {
        (self.musicianship + self.marching + self.stamina + self.showmanship) / 4.0
    }
}

/// The full band roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// School this roster belongs to.
    pub school_id: String,
    /// All members, active or not.
    pub members: Vec<BandMember>,
}

impl Roster {
    /// Members currently able to take the field.
    pub fn active_members(&self) -> impl Iterator<Item = &BandMember> {
        self.members
            .iter()
            .filter(|m| m.status == MemberStatus::Active)
    }

    /// Look up a member by id.
    pub fn member(&self, id: MemberId) -> Option<&BandMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Number of active members.
    pub fn active_count(&self) -> usize {
        self.active_members().count()
    }

    /// Average of a skill over active members, or 0.5 when there are none.
    pub fn average_skill(&self, kind: SkillKind) -> f32 {
        let mut total = 0.0;
        let mut count = 0;
        for member in self.active_members() {
            total += member.skill(kind);
            count += 1;
        }
        if count > 0 {
            total / count as f32
        } else {
            0.5
        }
    }
}
