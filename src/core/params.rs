//! ParameterSet: Ordnung, Typ, Endbedingungen, Parametrisierung und Rationalität.
//!
//! Die Werte werden vom Host gelesen/geschrieben und beschränken alle
//! weiteren Operationen der Engine.

use serde::{Deserialize, Serialize};

/// Parameterrichtung einer Kurve oder Fläche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    U,
    V,
}

impl Axis {
    /// Die jeweils andere Richtung.
    pub fn other(self) -> Self {
        match self {
            Axis::U => Axis::V,
            Axis::V => Axis::U,
        }
    }
}

/// Geometrietyp der Spline-Darstellung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeomType {
    /// Ordnung = Kontrollpunktanzahl, keine inneren Knoten
    Bezier,
    #[default]
    Bspline,
}

/// Randverhalten eines Knotenvektors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndCondition {
    /// Endknoten mit Vielfachheit = Ordnung (Kurve interpoliert die Randpunkte)
    #[default]
    Open,
    /// Gleichmäßige Knoten ohne Randvielfachheit
    Float,
    /// Geschlossen; die ersten (Ordnung − 1) Punkte wiederholen sich am Ende
    Periodic,
}

impl EndCondition {
    /// Popup-Index (0 Open, 1 Float, 2 Periodic) → Endbedingung.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Open),
            1 => Some(Self::Float),
            2 => Some(Self::Periodic),
            _ => None,
        }
    }
}

/// Parametrisierung bei der Knotenerzeugung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParamType {
    #[default]
    Uniform,
    Centripetal,
    ChordLength,
}

impl ParamType {
    /// Popup-Index (0 Uniform, 1 Centripetal, 2 ChordLength) → Parametrisierung.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Uniform),
            1 => Some(Self::Centripetal),
            2 => Some(Self::ChordLength),
            _ => None,
        }
    }

    /// Exponent auf die Sehnenlänge (0 = gleichmäßig, ½ = zentripetal, 1 = Sehne).
    pub fn exponent(self) -> f64 {
        match self {
            ParamType::Uniform => 0.0,
            ParamType::Centripetal => 0.5,
            ParamType::ChordLength => 1.0,
        }
    }
}

/// Parametersatz der aktuell editierten (oder zu erzeugenden) Geometrie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub u_order: usize,
    pub v_order: usize,
    pub geom_type: GeomType,
    pub u_end: EndCondition,
    pub v_end: EndCondition,
    pub u_param: ParamType,
    pub v_param: ParamType,
    pub rational: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            u_order: 4,
            v_order: 4,
            geom_type: GeomType::Bspline,
            u_end: EndCondition::Open,
            v_end: EndCondition::Open,
            u_param: ParamType::Uniform,
            v_param: ParamType::Uniform,
            rational: false,
        }
    }
}

impl ParameterSet {
    /// Ordnung der gegebenen Richtung.
    pub fn order(&self, axis: Axis) -> usize {
        match axis {
            Axis::U => self.u_order,
            Axis::V => self.v_order,
        }
    }

    /// Endbedingung der gegebenen Richtung.
    pub fn end_condition(&self, axis: Axis) -> EndCondition {
        match axis {
            Axis::U => self.u_end,
            Axis::V => self.v_end,
        }
    }

    /// Parametrisierung der gegebenen Richtung.
    pub fn param_type(&self, axis: Axis) -> ParamType {
        match axis {
            Axis::U => self.u_param,
            Axis::V => self.v_param,
        }
    }

    /// Setzt die Ordnung; Ordnungen < 1 werden verworfen.
    pub fn set_order(&mut self, axis: Axis, order: usize) -> bool {
        if order == 0 {
            return false;
        }
        match axis {
            Axis::U => self.u_order = order,
            Axis::V => self.v_order = order,
        }
        true
    }

    pub fn set_end_condition(&mut self, axis: Axis, end: EndCondition) {
        match axis {
            Axis::U => self.u_end = end,
            Axis::V => self.v_end = end,
        }
    }

    pub fn set_param_type(&mut self, axis: Axis, param: ParamType) {
        match axis {
            Axis::U => self.u_param = param,
            Axis::V => self.v_param = param,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_indices_map_to_variants() {
        assert_eq!(EndCondition::from_index(2), Some(EndCondition::Periodic));
        assert_eq!(EndCondition::from_index(3), None);
        assert_eq!(ParamType::from_index(1), Some(ParamType::Centripetal));
        assert_eq!(ParamType::from_index(-1), None);
    }

    #[test]
    fn test_set_order_rejects_zero() {
        let mut params = ParameterSet::default();
        assert!(!params.set_order(Axis::U, 0));
        assert_eq!(params.u_order, 4);
        assert!(params.set_order(Axis::V, 3));
        assert_eq!(params.order(Axis::V), 3);
    }
}
