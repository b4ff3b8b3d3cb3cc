use serde::{Deserialize, Serialize};

/// Unit and building identifiers as stored in the map file.
///
/// Gaps in the numbering are ids the game never uses.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    Footman = 0x00,
    Grunt = 0x01,
    Peasant = 0x02,
    Peon = 0x03,
    Ballista = 0x04,
    Catapult = 0x05,
    Knight = 0x06,
    Ogre = 0x07,
    Archer = 0x08,
    Axethrower = 0x09,
    Mage = 0x0a,
    DeathKnight = 0x0b,
    Paladin = 0x0c,
    OgreMage = 0x0d,
    Dwarves = 0x0e,
    GoblinSappers = 0x0f,
    AttackPeasant = 0x10,
    AttackPeon = 0x11,
    Ranger = 0x12,
    Berserker = 0x13,
    Alleria = 0x14,
    TeronGorefiend = 0x15,
    KurdranAndSkyree = 0x16,
    Dentarg = 0x17,
    Khadgar = 0x18,
    GromHellscream = 0x19,
    HumanTanker = 0x1a,
    OrcTanker = 0x1b,
    HumanTransport = 0x1c,
    OrcTransport = 0x1d,
    ElvenDestroyer = 0x1e,
    TrollDestroyer = 0x1f,
    Battleship = 0x20,
    Juggernaught = 0x21,
    Deathwing = 0x23,
    GnomishSubmarine = 0x26,
    GiantTurtle = 0x27,
    GnomishFlyingMachine = 0x28,
    GoblinZeppelin = 0x29,
    GryphonRider = 0x2a,
    Dragon = 0x2b,
    Turalyon = 0x2c,
    EyeOfKilrogg = 0x2d,
    Danath = 0x2e,
    KorgathBladefist = 0x2f,
    Chogall = 0x31,
    Lothar = 0x32,
    Guldan = 0x33,
    UtherLightbringer = 0x34,
    Zuljin = 0x35,
    Skeleton = 0x37,
    Daemon = 0x38,
    Critter = 0x39,
    Farm = 0x3a,
    PigFarm = 0x3b,
    HumanBarracks = 0x3c,
    OrcBarracks = 0x3d,
    Church = 0x3e,
    AltarOfStorms = 0x3f,
    HumanScoutTower = 0x40,
    OrcScoutTower = 0x41,
    Stables = 0x42,
    OgreMound = 0x43,
    GnomishInventor = 0x44,
    GoblinAlchemist = 0x45,
    GryphonAviary = 0x46,
    DragonRoost = 0x47,
    HumanShipyard = 0x48,
    OrcShipyard = 0x49,
    TownHall = 0x4a,
    GreatHall = 0x4b,
    ElvenLumberMill = 0x4c,
    TrollLumberMill = 0x4d,
    HumanFoundry = 0x4e,
    OrcFoundry = 0x4f,
    MageTower = 0x50,
    TempleOfTheDamned = 0x51,
    HumanBlacksmith = 0x52,
    OrcBlacksmith = 0x53,
    HumanRefinery = 0x54,
    OrcRefinery = 0x55,
    HumanOilWell = 0x56,
    OrcOilWell = 0x57,
    Keep = 0x58,
    Stronghold = 0x59,
    Castle = 0x5a,
    Fortress = 0x5b,
    GoldMine = 0x5c,
    OilPatch = 0x5d,
    HumanStart = 0x5e,
    OrcStart = 0x5f,
    HumanGuardTower = 0x60,
    OrcGuardTower = 0x61,
    HumanCannonTower = 0x62,
    OrcCannonTower = 0x63,
    CircleOfPower = 0x64,
    DarkPortal = 0x65,
    Runestone = 0x66,
    HumanWall = 0x67,
    OrcWall = 0x68,
}

impl UnitType {
    pub const ALL: [UnitType; 100] = [
        UnitType::Footman,
        UnitType::Grunt,
        UnitType::Peasant,
        UnitType::Peon,
        UnitType::Ballista,
        UnitType::Catapult,
        UnitType::Knight,
        UnitType::Ogre,
        UnitType::Archer,
        UnitType::Axethrower,
        UnitType::Mage,
        UnitType::DeathKnight,
        UnitType::Paladin,
        UnitType::OgreMage,
        UnitType::Dwarves,
        UnitType::GoblinSappers,
        UnitType::AttackPeasant,
        UnitType::AttackPeon,
        UnitType::Ranger,
        UnitType::Berserker,
        UnitType::Alleria,
        UnitType::TeronGorefiend,
        UnitType::KurdranAndSkyree,
        UnitType::Dentarg,
        UnitType::Khadgar,
        UnitType::GromHellscream,
        UnitType::HumanTanker,
        UnitType::OrcTanker,
        UnitType::HumanTransport,
        UnitType::OrcTransport,
        UnitType::ElvenDestroyer,
        UnitType::TrollDestroyer,
        UnitType::Battleship,
        UnitType::Juggernaught,
        UnitType::Deathwing,
        UnitType::GnomishSubmarine,
        UnitType::GiantTurtle,
        UnitType::GnomishFlyingMachine,
        UnitType::GoblinZeppelin,
        UnitType::GryphonRider,
        UnitType::Dragon,
        UnitType::Turalyon,
        UnitType::EyeOfKilrogg,
        UnitType::Danath,
        UnitType::KorgathBladefist,
        UnitType::Chogall,
        UnitType::Lothar,
        UnitType::Guldan,
        UnitType::UtherLightbringer,
        UnitType::Zuljin,
        UnitType::Skeleton,
        UnitType::Daemon,
        UnitType::Critter,
        UnitType::Farm,
        UnitType::PigFarm,
        UnitType::HumanBarracks,
        UnitType::OrcBarracks,
        UnitType::Church,
        UnitType::AltarOfStorms,
        UnitType::HumanScoutTower,
        UnitType::OrcScoutTower,
        UnitType::Stables,
        UnitType::OgreMound,
        UnitType::GnomishInventor,
        UnitType::GoblinAlchemist,
        UnitType::GryphonAviary,
        UnitType::DragonRoost,
        UnitType::HumanShipyard,
        UnitType::OrcShipyard,
        UnitType::TownHall,
        UnitType::GreatHall,
        UnitType::ElvenLumberMill,
        UnitType::TrollLumberMill,
        UnitType::HumanFoundry,
        UnitType::OrcFoundry,
        UnitType::MageTower,
        UnitType::TempleOfTheDamned,
        UnitType::HumanBlacksmith,
        UnitType::OrcBlacksmith,
        UnitType::HumanRefinery,
        UnitType::OrcRefinery,
        UnitType::HumanOilWell,
        UnitType::OrcOilWell,
        UnitType::Keep,
        UnitType::Stronghold,
        UnitType::Castle,
        UnitType::Fortress,
        UnitType::GoldMine,
        UnitType::OilPatch,
        UnitType::HumanStart,
        UnitType::OrcStart,
        UnitType::HumanGuardTower,
        UnitType::OrcGuardTower,
        UnitType::HumanCannonTower,
        UnitType::OrcCannonTower,
        UnitType::CircleOfPower,
        UnitType::DarkPortal,
        UnitType::Runestone,
        UnitType::HumanWall,
        UnitType::OrcWall,
    ];

    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|unit| unit.id() == raw)
    }

    /// Footprint in cells (width, height). Not stored in the file.
    pub const fn footprint(self) -> (u8, u8) {
        use UnitType::*;
        match self {
            TownHall | GreatHall | Keep | Stronghold | Castle | Fortress | DarkPortal => (4, 4),
            HumanBarracks | OrcBarracks | Church | AltarOfStorms | Stables | OgreMound
            | GnomishInventor | GoblinAlchemist | GryphonAviary | DragonRoost | HumanShipyard
            | OrcShipyard | ElvenLumberMill | TrollLumberMill | HumanFoundry | OrcFoundry
            | MageTower | TempleOfTheDamned | HumanBlacksmith | OrcBlacksmith | HumanRefinery
            | OrcRefinery | HumanOilWell | OrcOilWell | GoldMine => (3, 3),
            Farm | PigFarm | HumanScoutTower | OrcScoutTower | HumanGuardTower | OrcGuardTower
            | HumanCannonTower | OrcCannonTower | CircleOfPower | Runestone | OilPatch => (2, 2),
            _ => (1, 1),
        }
    }

    /// Flying units live in the "above" layer of a cell.
    pub const fn is_flying(self) -> bool {
        matches!(
            self,
            UnitType::KurdranAndSkyree
                | UnitType::Deathwing
                | UnitType::GnomishFlyingMachine
                | UnitType::GoblinZeppelin
                | UnitType::GryphonRider
                | UnitType::Dragon
                | UnitType::EyeOfKilrogg
                | UnitType::Daemon
        )
    }

    pub const fn is_start_location(self) -> bool {
        matches!(self, UnitType::HumanStart | UnitType::OrcStart)
    }

    /// Units whose `alter` value is a resource amount (in units of 2500).
    pub const fn is_resource(self) -> bool {
        matches!(self, UnitType::GoldMine | UnitType::OilPatch)
    }

    pub const fn start_location(human: bool) -> Self {
        if human {
            UnitType::HumanStart
        } else {
            UnitType::OrcStart
        }
    }
}
