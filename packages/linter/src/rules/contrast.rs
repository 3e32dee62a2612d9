use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::{annotate_once, Rule};
use mentor_parser::ast::{Node, NodeKind};
use regex::Regex;
use std::sync::OnceLock;

const NOTE: &str = "Adjusted color for WCAG AA contrast";

/// WCAG AA minimum for normal text
const MIN_CONTRAST: f64 = 4.5;
const WHITE: [u8; 3] = [0xff, 0xff, 0xff];

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap())
}

/// Darkens hex text colors that are hard to read on white
pub struct ColorContrastRule;

impl Rule for ColorContrastRule {
    fn name(&self) -> &'static str {
        "color-contrast"
    }

    fn description(&self) -> &'static str {
        "Text colors need a 4.5:1 contrast ratio against white"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Accessibility
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Style
    }

    fn class(&self) -> RuleClass {
        RuleClass::Fix
    }

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        low_contrast_color(node).is_some()
    }

    fn describe(&self, node: &Node) -> String {
        let value = node.text("value").unwrap_or_default();
        match low_contrast_color(node) {
            Some(rgb) => format!(
                "Adjusted color {} to {} for contrast.",
                value,
                to_hex(compliant_color(rgb))
            ),
            None => format!("Adjusted color {} for contrast.", value),
        }
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        let rgb = low_contrast_color(node).ok_or(RuleError::MissingField {
            kind: node.kind,
            field: "value",
        })?;
        node.set("value", to_hex(compliant_color(rgb)));
        annotate_once(node, NOTE);
        Ok(Effect::Mutated)
    }
}

/// The parsed color of a `color: #hex` declaration below the contrast minimum
fn low_contrast_color(node: &Node) -> Option<[u8; 3]> {
    if !node.is(NodeKind::Declaration) {
        return None;
    }
    let property = node.text("property")?;
    if !property.eq_ignore_ascii_case("color") {
        return None;
    }
    let rgb = parse_hex(node.text("value")?)?;
    (contrast_ratio(rgb, WHITE) < MIN_CONTRAST).then_some(rgb)
}

fn parse_hex(value: &str) -> Option<[u8; 3]> {
    let value = value.trim();
    if !hex_color_pattern().is_match(value) {
        return None;
    }
    let digits = &value[1..];
    let channel = |text: &str| u8::from_str_radix(text, 16).ok();
    if digits.len() == 3 {
        let mut rgb = [0u8; 3];
        for (index, digit) in digits.chars().enumerate() {
            let nibble = channel(&digit.to_string())?;
            rgb[index] = nibble * 17;
        }
        Some(rgb)
    } else {
        Some([
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ])
    }
}

fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

fn relative_luminance(rgb: [u8; 3]) -> f64 {
    let linear = |channel: u8| {
        let c = f64::from(channel) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(rgb[0]) + 0.7152 * linear(rgb[1]) + 0.0722 * linear(rgb[2])
}

/// WCAG contrast ratio between two colors, from 1.0 to 21.0
pub fn contrast_ratio(a: [u8; 3], b: [u8; 3]) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// The lightest uniform darkening of `rgb` that meets the contrast minimum
fn compliant_color(rgb: [u8; 3]) -> [u8; 3] {
    for step in 0..=100u32 {
        let factor = 1.0 - f64::from(step) / 100.0;
        let candidate = rgb.map(|channel| (f64::from(channel) * factor).round() as u8);
        if contrast_ratio(candidate, WHITE) >= MIN_CONTRAST {
            return candidate;
        }
    }
    [0, 0, 0]
}
