//! One-shot detection of how the host engine resolves styles and `min-height`.
//!
//! Older engines disagree with the standard in two ways that matter here:
//! some only report box-model properties under vendor-prefixed names, and
//! some always treat `min-height` as a content-box length even when the
//! element declares `box-sizing: border-box`. Both are measured once with an
//! offscreen probe and captured in an [`EngineProfile`] that the rest of the
//! crate consults instead of branching on engine quirks inline.

use log::{debug, warn};

use crate::host::{GeometryHost, ProbeHost, StyleHost};

/// Vendor prefixes tried, in order, when a property is not reported unprefixed.
pub static VENDOR_PREFIXES: [&str; 6] = ["", "-webkit-", "-moz-", "-ms-", "-MS-", "-o-"];

/// Declarations applied to the probe element.
const PROBE_DECLARATIONS: [(&str, &str); 3] = [
    ("padding-top", "20px"),
    ("box-sizing", "border-box"),
    ("min-height", "100px"),
];

/// Height the probe renders at when `min-height` honours `border-box`.
const PROBE_EXPECTED_HEIGHT: f64 = 100.0;

/// How the engine interprets an inline `min-height`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum MinHeightModel {
    /// `min-height` follows the element's declared `box-sizing`.
    #[default]
    Declared,
    /// `min-height` is always a content-box length (legacy engine defect).
    AlwaysContentBox,
}

/// How computed-style properties are looked up by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PropertyLookup {
    /// Unprefixed names are reported; no fallback needed.
    Standard,
    /// Try each entry of [`VENDOR_PREFIXES`] and take the first non-empty value.
    #[default]
    PrefixFallback,
}

impl PropertyLookup {
    /// Prefixes to try for this lookup strategy.
    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &VENDOR_PREFIXES[..1],
            Self::PrefixFallback => &VENDOR_PREFIXES,
        }
    }

    /// Resolve `property` on `node`, returning an empty string when no
    /// prefix yields a value.
    pub fn resolve<H: StyleHost + ?Sized>(self, host: &H, node: H::Node, property: &str) -> String {
        for prefix in self.prefixes() {
            let name = format!("{prefix}{property}");
            if let Some(value) = host
                .computed_value(node, &name)
                .filter(|value| !value.is_empty())
            {
                return value;
            }
        }
        String::new()
    }
}

/// Engine behaviour captured once per aligner instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct EngineProfile {
    pub min_height: MinHeightModel,
    pub lookup: PropertyLookup,
}

impl EngineProfile {
    /// Standards-compliant engine.
    pub const STANDARD: Self = Self {
        min_height: MinHeightModel::Declared,
        lookup: PropertyLookup::Standard,
    };

    /// Whether `min-height` must always be written as a content-box length.
    pub fn has_legacy_min_height_quirk(self) -> bool {
        self.min_height == MinHeightModel::AlwaysContentBox
    }

    /// Measure the host with an offscreen probe element.
    ///
    /// Never fails: a host that cannot insert the probe gets the default
    /// profile (declared `min-height`, prefix fallback lookup).
    pub fn detect<H>(host: &mut H) -> Self
    where
        H: ProbeHost + GeometryHost + StyleHost + ?Sized,
    {
        let probe = match host.insert_offscreen_probe(&PROBE_DECLARATIONS) {
            Ok(probe) => probe,
            Err(err) => {
                warn!("equal_align: capability probe unavailable, assuming defaults: {err}");
                return Self::default();
            }
        };

        let min_height = match host.offset_height(probe) {
            Ok(height) if (height - PROBE_EXPECTED_HEIGHT).abs() < f64::EPSILON => {
                MinHeightModel::Declared
            }
            Ok(height) => {
                debug!("equal_align: probe rendered at {height}px, min-height is content-box only");
                MinHeightModel::AlwaysContentBox
            }
            Err(err) => {
                warn!("equal_align: probe height unreadable: {err}");
                MinHeightModel::Declared
            }
        };

        let lookup = match host.computed_value(probe, "box-sizing") {
            Some(value) if !value.is_empty() => PropertyLookup::Standard,
            _ => PropertyLookup::PrefixFallback,
        };

        if let Err(err) = host.remove_probe(probe) {
            warn!("equal_align: failed to remove capability probe: {err}");
        }

        let profile = Self { min_height, lookup };
        debug!("equal_align: detected {profile:?}");
        profile
    }
}
