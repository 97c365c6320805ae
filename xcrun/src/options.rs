//! Decoding of user-supplied option strings into closed enumerations.

use crate::error::DriverError;
use std::fmt;
use xcgrid::{AtomicGridSize, ExecutionSpace, PruningScheme, RadialQuad};

/// The command-line option a value was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    GridSpec,
    RadialQuad,
    PruneScheme,
    LbExecSpace,
    IntExecSpace,
}

impl OptionKind {
    pub fn flag(self) -> &'static str {
        match self {
            OptionKind::GridSpec => "--grid-spec",
            OptionKind::RadialQuad => "--radial-quad",
            OptionKind::PruneScheme => "--prune-scheme",
            OptionKind::LbExecSpace => "--lb-exec-space",
            OptionKind::IntExecSpace => "--int-exec-space",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionKind::GridSpec => "atomic grid size",
            OptionKind::RadialQuad => "radial quadrature",
            OptionKind::PruneScheme => "pruning scheme",
            OptionKind::LbExecSpace => "load balancer execution space",
            OptionKind::IntExecSpace => "integrator execution space",
        })
    }
}

/// An enumeration that can be looked up by its lowercase spelling.
pub trait Decode: Copy + 'static {
    /// Every accepted spelling, lowercase, with the member it selects.
    const TABLE: &'static [(&'static str, Self)];
}

impl Decode for ExecutionSpace {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("host", ExecutionSpace::Host),
        ("device", ExecutionSpace::Device),
    ];
}

impl Decode for RadialQuad {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("becke", RadialQuad::Becke),
        ("muraknowles", RadialQuad::MuraKnowles),
        ("mura-knowles", RadialQuad::MuraKnowles),
        ("treutlerahlrichs", RadialQuad::TreutlerAhlrichs),
        ("treutler-ahlrichs", RadialQuad::TreutlerAhlrichs),
        ("murrayhandylaming", RadialQuad::MurrayHandyLaming),
        ("murray-handy-laming", RadialQuad::MurrayHandyLaming),
    ];
}

impl Decode for AtomicGridSize {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("fine", AtomicGridSize::Fine),
        ("ultrafine", AtomicGridSize::UltraFine),
        ("superfine", AtomicGridSize::SuperFine),
        ("gm3", AtomicGridSize::Gm3),
        ("gm5", AtomicGridSize::Gm5),
    ];
}

impl Decode for PruningScheme {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("unpruned", PruningScheme::Unpruned),
        ("robust", PruningScheme::Robust),
        ("treutler", PruningScheme::Treutler),
    ];
}

/// Looks `input` up case-insensitively. Anything not in the table is an
/// [`DriverError::InvalidOption`].
pub fn decode<T: Decode>(option: OptionKind, input: &str) -> Result<T, DriverError> {
    let key = input.to_lowercase();
    T::TABLE
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|&(_, member)| member)
        .ok_or_else(|| DriverError::InvalidOption {
            option,
            value: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Display;

    /// Every member is reachable from its display name, in any case, and a
    /// miss is reported against `option`.
    fn check_total<T>(option: OptionKind, members: &[T])
    where
        T: Decode + Display + PartialEq + fmt::Debug,
    {
        for member in members {
            let name = member.to_string();
            for spelling in [name.clone(), name.to_lowercase(), name.to_uppercase()] {
                let decoded: T = decode(option, &spelling).unwrap();
                assert_eq!(&decoded, member, "{spelling}");
            }
        }
        for (spelling, _) in T::TABLE {
            assert_eq!(*spelling, spelling.to_lowercase());
        }
        match decode::<T>(option, "no-such-value").unwrap_err() {
            DriverError::InvalidOption { option: reported, .. } => assert_eq!(reported, option),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn tables_cover_every_member() {
        check_total(OptionKind::LbExecSpace, &ExecutionSpace::ALL);
        check_total(OptionKind::IntExecSpace, &ExecutionSpace::ALL);
        check_total(OptionKind::RadialQuad, &RadialQuad::ALL);
        check_total(OptionKind::GridSpec, &AtomicGridSize::ALL);
        check_total(OptionKind::PruneScheme, &PruningScheme::ALL);
    }

    #[test]
    fn hyphenated_quadrature_names_are_aliases() {
        let quad: RadialQuad = decode(OptionKind::RadialQuad, "Mura-Knowles").unwrap();
        assert_eq!(quad, RadialQuad::MuraKnowles);
        let quad: RadialQuad = decode(OptionKind::RadialQuad, "murray-handy-laming").unwrap();
        assert_eq!(quad, RadialQuad::MurrayHandyLaming);
    }

    #[test]
    fn unknown_and_partial_strings_are_rejected() {
        for input in ["bogus", "fin", "fine ", "", "ultra-fine"] {
            let err = decode::<AtomicGridSize>(OptionKind::GridSpec, input).unwrap_err();
            match err {
                DriverError::InvalidOption { option, value } => {
                    assert_eq!(option, OptionKind::GridSpec);
                    assert_eq!(value, input);
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn execution_space_reports_which_option_failed() {
        let err = decode::<ExecutionSpace>(OptionKind::IntExecSpace, "GPU").unwrap_err();
        assert_eq!(err.code(), 1);
        assert_eq!(
            err.to_string(),
            "invalid integrator execution space 'GPU' for --int-exec-space"
        );
    }
}
