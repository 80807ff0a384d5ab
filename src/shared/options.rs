//! Zentrale Konfiguration der Editier-Engine.
//!
//! `EngineOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Verlauf ─────────────────────────────────────────────────────────

/// Maximale Anzahl an Undo-Frames; ältere werden verworfen.
pub const HISTORY_MAX_DEPTH: usize = 200;

// ── Geometrie ───────────────────────────────────────────────────────

/// Toleranz für übereinstimmende Randkurven beim Verschmelzen.
pub const MERGE_TOLERANCE: f64 = 1e-6;
/// Maximaler Abstand zwischen Anfang und Ende einer Trim-Schleife.
pub const TRIM_CLOSURE_TOLERANCE: f64 = 1e-6;
/// Kontrollpunkte je Richtung für neue Startformen.
pub const PRIMITIVE_CONTROL_COUNT: usize = 4;

// ── Picking ─────────────────────────────────────────────────────────

/// Stützstellen je Richtung für die grobe Parametersuche.
pub const PICK_GRID_SAMPLES: usize = 16;
/// Maximale Gauß-Newton-Schritte nach der groben Suche.
pub const PICK_NEWTON_ITERATIONS: usize = 12;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Engine-Optionen.
/// Wird als `freeform_edit.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Maximale Undo-Tiefe
    pub history_max_depth: usize,
    /// Randtoleranz beim Verschmelzen
    pub merge_tolerance: f64,
    /// Schließtoleranz für Trim-Schleifen
    pub trim_closure_tolerance: f64,
    /// Rasterstützstellen der Parametersuche
    pub pick_grid_samples: usize,
    /// Newton-Iterationen der Parametersuche
    pub pick_newton_iterations: usize,
    /// Knoten mit hoher Vielfachheit in allen Multiresolution-Stufen festhalten
    pub multires_respect_discontinuities: bool,
    /// Kontrollpunkte je Richtung für Startformen
    pub primitive_control_count: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_max_depth: HISTORY_MAX_DEPTH,
            merge_tolerance: MERGE_TOLERANCE,
            trim_closure_tolerance: TRIM_CLOSURE_TOLERANCE,
            pick_grid_samples: PICK_GRID_SAMPLES,
            pick_newton_iterations: PICK_NEWTON_ITERATIONS,
            multires_respect_discontinuities: true,
            primitive_control_count: PRIMITIVE_CONTROL_COUNT,
        }
    }
}

impl EngineOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("freeform-replay"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("freeform_edit.toml")
    }
}
