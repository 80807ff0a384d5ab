//! Core-Domänentypen und Engines: Parameter, Geometrie, Verfeinerung,
//! Multiresolution, Trimmen und Picking.

pub mod error;
pub mod geometry;
pub mod knot_vector;
pub mod multires;
pub mod params;
pub mod pick;
pub mod primitives;
pub mod refine;
pub mod trim;
pub mod view;

pub use error::EditError;
pub use geometry::{CurveGeom, EditableGeometry, SplineAxis, SurfaceGeom};
pub use multires::{modify, prep_kvs, MultiResLevels};
pub use params::{Axis, EndCondition, GeomType, ParamType, ParameterSet};
pub use pick::{find_closest_control_point, find_closest_parameter, PickResult};
pub use primitives::PrimitiveKind;
pub use refine::{
    degree_raise, domain_from_srf, merge_srfs, refine_srf, reverse_srf, subdiv_srf, Continuity,
    Reversal, ReverseMode, Subdivision,
};
pub use trim::{trim_srf, TrimLoop};
pub use view::{PickRay, PickView};
