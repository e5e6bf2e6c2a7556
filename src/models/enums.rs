use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub const ALL: &'static [$name] = &[$(Self::$variant),+];
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ProjectType {
    ResidentialNewBuild => "Residential - New Build",
    ResidentialRearExtension => "Residential - Extension (Rear)",
    ResidentialSideExtension => "Residential - Extension (Side)",
    ResidentialLoftConversion => "Residential - Loft Conversion",
    ResidentialRenovation => "Residential - Renovation",
    CommercialNewBuild => "Commercial - New Build",
    CommercialChangeOfUse => "Commercial - Change of Use",
    MixedUseDevelopment => "Mixed Use Development",
});

str_enum!(DocumentType {
    SitePlan => "Site Plan",
    FloorPlansExisting => "Floor Plans - Existing",
    FloorPlansProposed => "Floor Plans - Proposed",
    ElevationsExisting => "Elevations - Existing",
    ElevationsProposed => "Elevations - Proposed",
    Sections => "Sections",
    DesignAccessStatement => "Design & Access Statement",
    PlanningStatement => "Planning Statement",
    OtherSupporting => "Other Supporting Documents",
});

str_enum!(Framework {
    Nppf => "NPPF",
    Ppg => "PPG",
    Pdr => "PDR",
    Ldf => "LDF",
    Lp => "LP",
    Bre => "BRE",
    Spd => "SPD",
});

impl Framework {
    /// Full name shown in prompts and CLI help.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nppf => "National Planning Policy Framework",
            Self::Ppg => "Planning Practice Guidance",
            Self::Pdr => "Permitted Development Rights",
            Self::Ldf => "Local Development Framework",
            Self::Lp => "London Plan (Greater London only)",
            Self::Bre => "Building Regulations",
            Self::Spd => "Supplementary Planning Documents",
        }
    }
}

str_enum!(ComplianceStatus {
    Compliant => "Compliant",
    PartiallyCompliant => "Partially Compliant",
    NonCompliant => "Non-Compliant",
});
