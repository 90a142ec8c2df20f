//! Route checkpoints and the ledger columns they write to

use fuelops_types::Direction;
use serde::{Deserialize, Serialize};

/// A fuel column of the ledger record.
///
/// Every field belongs to exactly one direction. Serialized with the
/// camelCase column names used by the ledger sheet (`darGoing`, `zambiaReturn`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerField {
    MmsaYard,
    TangaYard,
    DarYard,
    DarGoing,
    MoroGoing,
    MbeyaGoing,
    TdmGoing,
    ZambiaGoing,
    CongoFuel,
    ZambiaReturn,
    TdmReturn,
    MbeyaReturn,
    MoroReturn,
    DarReturn,
    TangaReturn,
}

impl LedgerField {
    /// All fields in route order: yards, the way out, then the way back.
    pub const ALL: [LedgerField; 15] = [
        LedgerField::MmsaYard,
        LedgerField::TangaYard,
        LedgerField::DarYard,
        LedgerField::DarGoing,
        LedgerField::MoroGoing,
        LedgerField::MbeyaGoing,
        LedgerField::TdmGoing,
        LedgerField::ZambiaGoing,
        LedgerField::CongoFuel,
        LedgerField::ZambiaReturn,
        LedgerField::TdmReturn,
        LedgerField::MbeyaReturn,
        LedgerField::MoroReturn,
        LedgerField::DarReturn,
        LedgerField::TangaReturn,
    ];

    pub fn direction(self) -> Direction {
        match self {
            LedgerField::MmsaYard
            | LedgerField::TangaYard
            | LedgerField::DarYard
            | LedgerField::DarGoing
            | LedgerField::MoroGoing
            | LedgerField::MbeyaGoing
            | LedgerField::TdmGoing
            | LedgerField::ZambiaGoing
            | LedgerField::CongoFuel => Direction::Going,
            LedgerField::ZambiaReturn
            | LedgerField::TdmReturn
            | LedgerField::MbeyaReturn
            | LedgerField::MoroReturn
            | LedgerField::DarReturn
            | LedgerField::TangaReturn => Direction::Returning,
        }
    }

    /// Column name as stored and exported.
    pub fn name(self) -> &'static str {
        match self {
            LedgerField::MmsaYard => "mmsaYard",
            LedgerField::TangaYard => "tangaYard",
            LedgerField::DarYard => "darYard",
            LedgerField::DarGoing => "darGoing",
            LedgerField::MoroGoing => "moroGoing",
            LedgerField::MbeyaGoing => "mbeyaGoing",
            LedgerField::TdmGoing => "tdmGoing",
            LedgerField::ZambiaGoing => "zambiaGoing",
            LedgerField::CongoFuel => "congoFuel",
            LedgerField::ZambiaReturn => "zambiaReturn",
            LedgerField::TdmReturn => "tdmReturn",
            LedgerField::MbeyaReturn => "mbeyaReturn",
            LedgerField::MoroReturn => "moroReturn",
            LedgerField::DarReturn => "darReturn",
            LedgerField::TangaReturn => "tangaReturn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LedgerField::MmsaYard => "MMSA Yard",
            LedgerField::TangaYard => "Tanga Yard",
            LedgerField::DarYard => "Dar Yard",
            LedgerField::DarGoing => "Dar Going",
            LedgerField::MoroGoing => "Moro Going",
            LedgerField::MbeyaGoing => "Mbeya Going",
            LedgerField::TdmGoing => "Tdm Going",
            LedgerField::ZambiaGoing => "Zambia Going",
            LedgerField::CongoFuel => "Congo Fuel",
            LedgerField::ZambiaReturn => "Zambia Return",
            LedgerField::TdmReturn => "Tdm Return",
            LedgerField::MbeyaReturn => "Mbeya Return",
            LedgerField::MoroReturn => "Moro Return",
            LedgerField::DarReturn => "Dar Return",
            LedgerField::TangaReturn => "Tanga Return",
        }
    }

    /// The checkpoint a custom station writing to this field resolves to.
    pub fn canonical_checkpoint(self) -> Checkpoint {
        match self {
            LedgerField::MmsaYard => Checkpoint::MmsaYard,
            LedgerField::TangaYard => Checkpoint::TangaYard,
            LedgerField::DarYard => Checkpoint::DarYard,
            LedgerField::DarGoing => Checkpoint::DarGoing,
            LedgerField::MoroGoing => Checkpoint::MoroGoing,
            LedgerField::MbeyaGoing => Checkpoint::MbeyaGoing,
            LedgerField::TdmGoing => Checkpoint::TdmGoing,
            LedgerField::ZambiaGoing => Checkpoint::ZambiaGoing,
            LedgerField::CongoFuel => Checkpoint::CongoGoing,
            LedgerField::ZambiaReturn => Checkpoint::ZambiaReturn,
            LedgerField::TdmReturn => Checkpoint::TdmReturn,
            LedgerField::MbeyaReturn => Checkpoint::MbeyaReturn,
            LedgerField::MoroReturn => Checkpoint::MoroReturn,
            LedgerField::DarReturn => Checkpoint::DarReturn,
            LedgerField::TangaReturn => Checkpoint::TangaReturn,
        }
    }

    /// Parse a column name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for LedgerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named point along the route where fuel is dispensed and recorded.
///
/// `ZambiaNdola` and `ZambiaKapiri` are physical sub-stops of the Zambia
/// return leg. Both write to `zambiaReturn`; the field total is what counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Checkpoint {
    MmsaYard,
    TangaYard,
    DarYard,
    DarGoing,
    MoroGoing,
    MbeyaGoing,
    TdmGoing,
    ZambiaGoing,
    CongoGoing,
    ZambiaReturn,
    ZambiaNdola,
    ZambiaKapiri,
    TdmReturn,
    MbeyaReturn,
    MoroReturn,
    DarReturn,
    TangaReturn,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 17] = [
        Checkpoint::MmsaYard,
        Checkpoint::TangaYard,
        Checkpoint::DarYard,
        Checkpoint::DarGoing,
        Checkpoint::MoroGoing,
        Checkpoint::MbeyaGoing,
        Checkpoint::TdmGoing,
        Checkpoint::ZambiaGoing,
        Checkpoint::CongoGoing,
        Checkpoint::ZambiaReturn,
        Checkpoint::ZambiaNdola,
        Checkpoint::ZambiaKapiri,
        Checkpoint::TdmReturn,
        Checkpoint::MbeyaReturn,
        Checkpoint::MoroReturn,
        Checkpoint::DarReturn,
        Checkpoint::TangaReturn,
    ];

    pub fn field(self) -> LedgerField {
        match self {
            Checkpoint::MmsaYard => LedgerField::MmsaYard,
            Checkpoint::TangaYard => LedgerField::TangaYard,
            Checkpoint::DarYard => LedgerField::DarYard,
            Checkpoint::DarGoing => LedgerField::DarGoing,
            Checkpoint::MoroGoing => LedgerField::MoroGoing,
            Checkpoint::MbeyaGoing => LedgerField::MbeyaGoing,
            Checkpoint::TdmGoing => LedgerField::TdmGoing,
            Checkpoint::ZambiaGoing => LedgerField::ZambiaGoing,
            Checkpoint::CongoGoing => LedgerField::CongoFuel,
            Checkpoint::ZambiaReturn | Checkpoint::ZambiaNdola | Checkpoint::ZambiaKapiri => {
                LedgerField::ZambiaReturn
            }
            Checkpoint::TdmReturn => LedgerField::TdmReturn,
            Checkpoint::MbeyaReturn => LedgerField::MbeyaReturn,
            Checkpoint::MoroReturn => LedgerField::MoroReturn,
            Checkpoint::DarReturn => LedgerField::DarReturn,
            Checkpoint::TangaReturn => LedgerField::TangaReturn,
        }
    }

    /// Direction is derived from the field, so a checkpoint can never
    /// alias a field of the other direction.
    pub fn direction(self) -> Direction {
        self.field().direction()
    }

    pub fn label(self) -> &'static str {
        match self {
            Checkpoint::MmsaYard => "Mombasa Yard",
            Checkpoint::TangaYard => "Tanga Yard",
            Checkpoint::DarYard => "Dar Yard",
            Checkpoint::DarGoing => "Dar Going",
            Checkpoint::MoroGoing => "Morogoro Going",
            Checkpoint::MbeyaGoing => "Mbeya Going",
            Checkpoint::TdmGoing => "Tunduma Going",
            Checkpoint::ZambiaGoing => "Zambia Going",
            Checkpoint::CongoGoing => "Congo Going",
            Checkpoint::ZambiaReturn => "Zambia Return",
            Checkpoint::ZambiaNdola => "Zambia Ndola",
            Checkpoint::ZambiaKapiri => "Zambia Kapiri",
            Checkpoint::TdmReturn => "Tunduma Return",
            Checkpoint::MbeyaReturn => "Mbeya Return",
            Checkpoint::MoroReturn => "Morogoro Return",
            Checkpoint::DarReturn => "Dar Return",
            Checkpoint::TangaReturn => "Tanga Return",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Checkpoint::MmsaYard => "MMSA_YARD",
            Checkpoint::TangaYard => "TANGA_YARD",
            Checkpoint::DarYard => "DAR_YARD",
            Checkpoint::DarGoing => "DAR_GOING",
            Checkpoint::MoroGoing => "MORO_GOING",
            Checkpoint::MbeyaGoing => "MBEYA_GOING",
            Checkpoint::TdmGoing => "TDM_GOING",
            Checkpoint::ZambiaGoing => "ZAMBIA_GOING",
            Checkpoint::CongoGoing => "CONGO_GOING",
            Checkpoint::ZambiaReturn => "ZAMBIA_RETURN",
            Checkpoint::ZambiaNdola => "ZAMBIA_NDOLA",
            Checkpoint::ZambiaKapiri => "ZAMBIA_KAPIRI",
            Checkpoint::TdmReturn => "TDM_RETURN",
            Checkpoint::MbeyaReturn => "MBEYA_RETURN",
            Checkpoint::MoroReturn => "MORO_RETURN",
            Checkpoint::DarReturn => "DAR_RETURN",
            Checkpoint::TangaReturn => "TANGA_RETURN",
        }
    }

    /// Split Zambia-return sub-stops from the older catalogue revision.
    pub fn is_sub_stop(self) -> bool {
        matches!(self, Checkpoint::ZambiaNdola | Checkpoint::ZambiaKapiri)
    }

    pub fn parse(code: &str) -> Option<Self> {
        let wanted = code.trim().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|checkpoint| checkpoint.code().eq_ignore_ascii_case(&wanted))
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
