//! Structured render styles
//!
//! A [`Style`] is the engine's nested configuration object (`stick`,
//! `sphere`, `cartoon`, `surface`, `line` keys). It comes either from a
//! JSON attribute supplied by the host or from the simple-mode settings
//! through [`derive_style`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Structured render options handed to the engine
///
/// Never empty: constructors replace empty or unusable input with
/// [`Style::fallback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(Map<String, Value>);

impl Style {
    /// Stick radius of the fallback style
    pub const FALLBACK_STICK_RADIUS: f64 = 0.22;
    /// Sphere scale of the fallback style
    pub const FALLBACK_SPHERE_SCALE: f64 = 0.28;

    /// The hardcoded safe style: thin sticks plus small spheres
    pub fn fallback() -> Self {
        Style(object(json!({
            "stick": { "radius": Self::FALLBACK_STICK_RADIUS },
            "sphere": { "scale": Self::FALLBACK_SPHERE_SCALE },
        })))
    }

    /// Wrap a map, falling back when it is empty
    pub fn from_map(map: Map<String, Value>) -> Self {
        if map.is_empty() {
            Self::fallback()
        } else {
            Style(map)
        }
    }

    /// Parse a JSON object that carries at least one key
    ///
    /// Returns `None` for invalid JSON, non-objects and `{}`.
    pub fn parse_object(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) if !map.is_empty() => Some(Style(map)),
            Ok(_) => {
                log::debug!("style attribute is not a non-empty object: {}", raw);
                None
            }
            Err(e) => {
                log::debug!("style attribute is not valid JSON ({}): {}", e, raw);
                None
            }
        }
    }

    /// Style from a mount attribute, never failing
    pub fn from_attribute(raw: &str) -> Self {
        Self::parse_object(raw).unwrap_or_else(Self::fallback)
    }

    /// Top-level representation keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Options of one representation
    pub fn get(&self, representation: &str) -> Option<&Value> {
        self.0.get(representation)
    }

    /// Whether the style draws the given representation
    pub fn has(&self, representation: &str) -> bool {
        self.0.contains_key(representation)
    }

    /// The underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A JSON object always serializes
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Simple-mode representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    #[default]
    Cartoon,
    Stick,
    BallAndStick,
    Surface,
    Line,
    Sphere,
}

impl Representation {
    /// All representations, in menu order
    pub const ALL: [Representation; 6] = [
        Representation::Cartoon,
        Representation::Stick,
        Representation::BallAndStick,
        Representation::Surface,
        Representation::Line,
        Representation::Sphere,
    ];

    /// Parse from a name (case-insensitive), accepting common misspellings
    pub fn from_str_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cartoon" => Some(Representation::Cartoon),
            "stick" => Some(Representation::Stick),
            "ballandstick" | "ballsandstick" | "ballnstick" | "ballsandsticks" => {
                Some(Representation::BallAndStick)
            }
            "surface" => Some(Representation::Surface),
            "line" => Some(Representation::Line),
            "sphere" => Some(Representation::Sphere),
            _ => None,
        }
    }

    /// Parse leniently: unrecognized names draw cartoons
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str_alias(s).unwrap_or_default()
    }

    /// Setting value name
    pub fn name(&self) -> &'static str {
        match self {
            Representation::Cartoon => "cartoon",
            Representation::Stick => "stick",
            Representation::BallAndStick => "ballandstick",
            Representation::Surface => "surface",
            Representation::Line => "line",
            Representation::Sphere => "sphere",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Simple-mode color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Spectrum,
    Chain,
    Element,
    Residue,
    BFactor,
    White,
    Grey,
    Rainbow,
}

impl ColorScheme {
    /// Parse from a name (case-insensitive)
    pub fn from_str_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "spectrum" => Some(ColorScheme::Spectrum),
            "chain" => Some(ColorScheme::Chain),
            "element" => Some(ColorScheme::Element),
            "residue" => Some(ColorScheme::Residue),
            "bfactor" => Some(ColorScheme::BFactor),
            "white" => Some(ColorScheme::White),
            "grey" => Some(ColorScheme::Grey),
            "rainbow" => Some(ColorScheme::Rainbow),
            _ => None,
        }
    }

    /// Parse leniently: unrecognized names use the spectrum
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str_alias(s).unwrap_or_default()
    }

    /// Setting value name
    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Spectrum => "spectrum",
            ColorScheme::Chain => "chain",
            ColorScheme::Element => "element",
            ColorScheme::Residue => "residue",
            ColorScheme::BFactor => "bfactor",
            ColorScheme::White => "white",
            ColorScheme::Grey => "grey",
            ColorScheme::Rainbow => "rainbow",
        }
    }

    /// Engine colorscheme token
    ///
    /// `rainbow` has no scheme of its own and draws as `spectrum`.
    pub fn engine_token(&self) -> &'static str {
        match self {
            ColorScheme::Spectrum | ColorScheme::Rainbow => "spectrum",
            ColorScheme::Chain => "chain",
            ColorScheme::Element => "elem",
            ColorScheme::Residue => "residue",
            ColorScheme::BFactor => "b",
            ColorScheme::White => "whiteCarbon",
            ColorScheme::Grey => "greyCarbon",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build a structured style from simple-mode settings
pub fn derive_style(
    representation: Representation,
    color: ColorScheme,
    stick_radius: f64,
    sphere_scale: f64,
    surface_opacity: f64,
) -> Style {
    let cs = color.engine_token();
    let value = match representation {
        Representation::Stick => json!({
            "stick": { "radius": stick_radius, "colorscheme": cs },
        }),
        Representation::BallAndStick => json!({
            "stick": { "radius": stick_radius },
            "sphere": { "scale": sphere_scale, "colorscheme": cs },
        }),
        Representation::Line => json!({
            "line": { "colorscheme": cs },
        }),
        Representation::Sphere => json!({
            "sphere": { "scale": sphere_scale, "colorscheme": cs },
        }),
        Representation::Surface => json!({
            "cartoon": { "color": cs },
            "surface": { "opacity": surface_opacity },
        }),
        Representation::Cartoon => json!({
            "cartoon": { "color": cs },
        }),
    };
    Style::from_map(object(value))
}

/// How the host chose to express the style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleMode {
    /// Dropdown settings run through [`derive_style`]
    #[default]
    Simple,
    /// Raw JSON style object
    Json,
}

impl StyleMode {
    /// Parse leniently: anything but `json` is simple mode
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            StyleMode::Json
        } else {
            StyleMode::Simple
        }
    }
}

/// Simple-mode style settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleStyle {
    pub representation: Representation,
    pub color: ColorScheme,
    pub stick_radius: f64,
    pub sphere_scale: f64,
    pub surface_opacity: f64,
}

impl Default for SimpleStyle {
    fn default() -> Self {
        SimpleStyle {
            representation: Representation::BallAndStick,
            color: ColorScheme::Spectrum,
            stick_radius: 0.2,
            sphere_scale: 0.3,
            surface_opacity: 0.6,
        }
    }
}

impl SimpleStyle {
    /// Derive the structured style
    pub fn derive(&self) -> Style {
        derive_style(
            self.representation,
            self.color,
            self.stick_radius,
            self.sphere_scale,
            self.surface_opacity,
        )
    }
}

/// Pick the style for a mount
///
/// JSON mode uses the raw object when it is valid and non-empty; every
/// other case derives from the simple settings.
pub fn resolve_style(mode: StyleMode, json: Option<&str>, simple: &SimpleStyle) -> Style {
    if mode == StyleMode::Json {
        if let Some(style) = json.and_then(Style::parse_object) {
            return style;
        }
        log::debug!("JSON style mode without a usable object, deriving from simple settings");
    }
    simple.derive()
}
