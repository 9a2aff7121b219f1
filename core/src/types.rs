//! Shared primitive types used across the entire crate.

/// Calendar year of an intake or closure date.
pub type Ano = i32;

/// Month period key in `YYYY-MM` form. Sorts chronologically as a string.
pub type Periodo = String;

/// Sentinel used wherever a categorical source value is absent.
pub const NAO_INFORMADO: &str = "Não Informado";
