use super::atom::Atom;
use super::types::Element;

/// A periodic atomic structure: atoms plus the three lattice vectors.
///
/// Lattice vectors are stored as rows, in Å. This is the canonical form
/// every raw simulation format is converted into before descriptor
/// computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub atoms: Vec<Atom>,
    pub lattice: [[f64; 3]; 3],
}

impl Structure {
    pub fn new(lattice: [[f64; 3]; 3]) -> Self {
        Self {
            atoms: Vec::new(),
            lattice,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Cell volume in Å³ (absolute value of the lattice determinant).
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.lattice;
        let bxc = cross(b, c);
        (a[0] * bxc[0] + a[1] * bxc[1] + a[2] * bxc[2]).abs()
    }

    /// Distinct species in order of first appearance.
    pub fn species(&self) -> Vec<Element> {
        let mut seen = Vec::new();
        for atom in &self.atoms {
            if !seen.contains(&atom.element) {
                seen.push(atom.element);
            }
        }
        seen
    }
}

/// Converts fractional coordinates to Cartesian for a row-vector lattice.
pub fn frac_to_cartesian(lattice: &[[f64; 3]; 3], frac: [f64; 3]) -> [f64; 3] {
    let mut cart = [0.0; 3];
    for axis in 0..3 {
        cart[axis] = frac[0] * lattice[0][axis]
            + frac[1] * lattice[1][axis]
            + frac[2] * lattice[2][axis];
    }
    cart
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn volume_of_cubic_cell() {
        let s = Structure::new([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        assert_relative_eq!(s.volume(), 64.0, epsilon = 1e-12);
    }

    #[test]
    fn species_preserves_first_appearance_order() {
        let mut s = Structure::new([[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]]);
        s.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::H, [1.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::C, [2.0, 0.0, 0.0]));
        assert_eq!(s.species(), vec![Element::C, Element::H]);
    }

    #[test]
    fn fractional_conversion_uses_row_vectors() {
        let lattice = [[2.0, 0.0, 0.0], [1.0, 3.0, 0.0], [0.0, 0.0, 4.0]];
        let cart = frac_to_cartesian(&lattice, [0.5, 0.5, 0.25]);
        assert_relative_eq!(cart[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(cart[1], 1.5, epsilon = 1e-12);
        assert_relative_eq!(cart[2], 1.0, epsilon = 1e-12);
    }
}
