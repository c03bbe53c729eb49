//! Spectral line catalogs.
//!
//! A catalog is an ordered list of named lines with vacuum wavelengths
//! in angstrom. Names may carry mathtext-style markup (`H$\alpha$`,
//! `CaI$_{422}$`); [`display_text`] renders that as plain Unicode for
//! output formats without a math renderer.

use serde::{Deserialize, Serialize};

use crate::types::EchellogramError;

/// Angstrom per micrometre.
pub const ANGSTROM_PER_MICRON: f64 = 10_000.0;

/// One named line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogLine {
    pub name: String,
    pub wavelength_angstrom: f64,
}

impl CatalogLine {
    #[must_use]
    pub fn new(name: impl Into<String>, wavelength_angstrom: f64) -> Self {
        Self {
            name: name.into(),
            wavelength_angstrom,
        }
    }

    /// Wavelength in micrometres.
    #[must_use]
    pub fn wavelength_um(&self) -> f64 {
        self.wavelength_angstrom / ANGSTROM_PER_MICRON
    }
}

/// Accepted JSON shapes for a catalog file.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<CatalogLine>),
    Map(serde_json::Map<String, serde_json::Value>),
}

/// An ordered collection of catalog lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineCatalog(Vec<CatalogLine>);

impl LineCatalog {
    #[must_use]
    pub const fn new(lines: Vec<CatalogLine>) -> Self {
        Self(lines)
    }

    #[must_use]
    pub fn lines(&self) -> &[CatalogLine] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lines of interest in stellar spectra, spanning the near-UV to
    /// the near-IR.
    #[must_use]
    pub fn stellar() -> Self {
        let lines = [
            // Balmer series
            ("H$\\alpha$", 6564.8131),
            ("H$\\beta$", 4863.3582),
            ("H$\\gamma$", 4341.2202),
            ("H$\\delta$", 4101.7103),
            // Sodium
            ("Na $D_1$", 5895.92),
            ("Na $D_2$", 5889.95),
            ("NaI", 8191.2515),
            // Silicon
            ("SiIII$_1$", 4552.622),
            ("SiIII$_2$", 4567.840),
            ("SiIII$_3$", 4574.757),
            // Calcium
            ("CaI$_{422}$", 4226.7270),
            ("CaI$_{616}$", 6164.2055),
            ("CaII-K", 3933.6614),
            ("CaII-H", 3968.4673),
            // Calcium triplet
            ("CaII$_1$", 8498.02),
            ("CaII$_2$", 8542.09),
            ("CaII$_3$", 8662.140),
            // Iron
            ("FeI$_1$", 4384.8318),
            ("FeI$_2$", 4406.0371),
            ("FeI$_{869}$", 8691.3867),
            ("FeH", 9940.0),
            // Helium D3
            ("He-d", 5875.618),
            ("MgI", 5174.141),
            // Rubidium
            ("Rb-B$_1$", 7929.781),
            ("Rb-B$_2$", 7969.7918),
            // Calcium hydride bands
            ("CaH2", 6831.862),
            ("CaH3", 6976.9239),
        ];
        Self(
            lines
                .into_iter()
                .map(|(name, wl)| CatalogLine::new(name, wl))
                .collect(),
        )
    }

    /// Parse a catalog from JSON.
    ///
    /// Accepts either an array of `{"name": ..., "wavelength_angstrom": ...}`
    /// objects or an object mapping names to wavelengths in angstrom.
    /// Object form keeps the file's key order.
    ///
    /// # Errors
    ///
    /// Returns [`EchellogramError::Catalog`] for malformed JSON and
    /// [`EchellogramError::InvalidConfig`] for non-numeric or non-finite
    /// wavelengths.
    pub fn from_json(json: &str) -> Result<Self, EchellogramError> {
        let lines = match serde_json::from_str::<CatalogFile>(json)? {
            CatalogFile::List(lines) => lines,
            CatalogFile::Map(map) => map
                .into_iter()
                .map(|(name, value)| {
                    value
                        .as_f64()
                        .map(|wl| CatalogLine::new(name.clone(), wl))
                        .ok_or_else(|| {
                            EchellogramError::InvalidConfig(format!(
                                "catalog line {name:?} has non-numeric wavelength {value}"
                            ))
                        })
                })
                .collect::<Result<_, _>>()?,
        };
        if let Some(bad) = lines.iter().find(|l| !l.wavelength_angstrom.is_finite()) {
            return Err(EchellogramError::InvalidConfig(format!(
                "catalog line {:?} has non-finite wavelength",
                bad.name
            )));
        }
        Ok(Self(lines))
    }
}

/// Render mathtext-style markup as plain Unicode.
///
/// Strips `$` delimiters, replaces the Greek letter commands used by
/// line names, and turns `_x` / `_{xyz}` digit subscripts into Unicode
/// subscript characters. Anything else is passed through unchanged.
///
/// ```
/// use echellogram_layout::catalog::display_text;
///
/// assert_eq!(display_text("H$\\alpha$"), "Hα");
/// assert_eq!(display_text("CaI$_{422}$"), "CaI₄₂₂");
/// assert_eq!(display_text("Na $D_1$"), "Na D₁");
/// ```
#[must_use]
pub fn display_text(markup: &str) -> String {
    const GREEK: &[(&str, &str)] = &[
        ("\\alpha", "α"),
        ("\\beta", "β"),
        ("\\gamma", "γ"),
        ("\\delta", "δ"),
        ("\\epsilon", "ε"),
        ("\\lambda", "λ"),
        ("\\mu", "μ"),
    ];

    let mut text = markup.replace('$', "");
    for (command, letter) in GREEK {
        text = text.replace(command, letter);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '_' {
            out.push(ch);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            for inner in chars.by_ref() {
                if inner == '}' {
                    break;
                }
                out.push(subscript(inner));
            }
        } else if let Some(next) = chars.next() {
            out.push(subscript(next));
        }
    }
    out
}

/// Unicode subscript for digits; other characters are returned as is.
const fn subscript(ch: char) -> char {
    match ch {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        other => other,
    }
}
