// -------------------------------------------------------------------------------------------------

/// Selects which combination of the three wheels covering a threshold counts as a trigger.
///
/// Modes correspond to the regions of a three-set Venn diagram. Regions are inclusive: `A`
/// triggers whenever wheel A covers the threshold, regardless of the other wheels.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
    strum::VariantArray,
)]
pub enum OverlapMode {
    #[default]
    A,
    B,
    C,
    #[strum(serialize = "A+B")]
    AB,
    #[strum(serialize = "B+C")]
    BC,
    #[strum(serialize = "A+C")]
    AC,
    #[strum(serialize = "A+B+C")]
    ABC,
}

impl OverlapMode {
    /// Combine the three wheels' coverage of a threshold into a trigger decision.
    #[inline]
    pub fn triggers(&self, a: bool, b: bool, c: bool) -> bool {
        match self {
            Self::A => a,
            Self::B => b,
            Self::C => c,
            Self::AB => a && b,
            Self::BC => b && c,
            Self::AC => a && c,
            Self::ABC => a && b && c,
        }
    }
}

// -------------------------------------------------------------------------------------------------
