use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(pub String);

/// Chemical elements supported by the structure adapters, H through Kr.
///
/// Each element carries its standard atomic weight, which the LAMMPS reader
/// uses to recover element identities from per-type masses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
}

const ALL: [Element; 36] = [
    Element::H,
    Element::He,
    Element::Li,
    Element::Be,
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Ne,
    Element::Na,
    Element::Mg,
    Element::Al,
    Element::Si,
    Element::P,
    Element::S,
    Element::Cl,
    Element::Ar,
    Element::K,
    Element::Ca,
    Element::Sc,
    Element::Ti,
    Element::V,
    Element::Cr,
    Element::Mn,
    Element::Fe,
    Element::Co,
    Element::Ni,
    Element::Cu,
    Element::Zn,
    Element::Ga,
    Element::Ge,
    Element::As,
    Element::Se,
    Element::Br,
    Element::Kr,
];

const SYMBOLS: [&str; 36] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr",
];

const MASSES: [f64; 36] = [
    1.008, 4.0026, 6.94, 9.0122, 10.81, 12.011, 14.007, 15.999, 18.998, 20.180, 22.990, 24.305,
    26.982, 28.085, 30.974, 32.06, 35.45, 39.948, 39.098, 40.078, 44.956, 47.867, 50.942, 51.996,
    54.938, 55.845, 58.933, 58.693, 63.546, 65.38, 69.723, 72.630, 74.922, 78.971, 79.904, 83.798,
];

impl Element {
    #[inline]
    pub fn atomic_number(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn symbol(self) -> &'static str {
        SYMBOLS[self as usize - 1]
    }

    /// Standard atomic weight in amu.
    #[inline]
    pub fn mass(self) -> f64 {
        MASSES[self as usize - 1]
    }

    /// Finds the element whose standard atomic weight is closest to `mass`.
    ///
    /// Returns `None` when no supported element lies within 0.3 amu; the
    /// tolerance keeps neighboring weights (K vs Ar, Co vs Ni) unambiguous.
    pub fn from_mass(mass: f64) -> Option<Element> {
        let mut best: Option<(Element, f64)> = None;
        for element in ALL {
            let delta = (element.mass() - mass).abs();
            if best.map_or(true, |(_, d)| delta < d) {
                best = Some((element, delta));
            }
        }
        best.filter(|&(_, delta)| delta < 0.3).map(|(e, _)| e)
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SYMBOLS
            .iter()
            .position(|&sym| sym.eq_ignore_ascii_case(trimmed))
            .map(|idx| ALL[idx])
            .ok_or_else(|| ParseElementError(trimmed.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_round_trip() {
        for element in ALL {
            assert_eq!(element.symbol().parse::<Element>().unwrap(), element);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("he".parse::<Element>().unwrap(), Element::He);
        assert_eq!(" C ".parse::<Element>().unwrap(), Element::C);
    }

    #[test]
    fn parse_rejects_unknown_symbols() {
        assert!("Xx".parse::<Element>().is_err());
        assert!("".parse::<Element>().is_err());
    }

    #[test]
    fn mass_lookup_distinguishes_neighbors() {
        assert_eq!(Element::from_mass(1.00794), Some(Element::H));
        assert_eq!(Element::from_mass(12.0107), Some(Element::C));
        assert_eq!(Element::from_mass(39.0983), Some(Element::K));
        assert_eq!(Element::from_mass(39.948), Some(Element::Ar));
        assert_eq!(Element::from_mass(200.0), None);
    }
}
