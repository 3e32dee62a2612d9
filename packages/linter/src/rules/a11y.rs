use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::{annotate_once, is_element, Rule};
use mentor_parser::ast::{Node, NodeKind};
use mentor_parser::markup::{attribute_value, has_attribute, text_attribute};

const ALT_NOTE: &str = "Added alt attribute for accessibility";
const ROLE_NOTE: &str = "Consider adding a role attribute for accessibility";
const DEFAULT_ALT: &str = "Image description";

/// Images must carry alternative text for screen readers
pub struct ImgAltRule;

impl Rule for ImgAltRule {
    fn name(&self) -> &'static str {
        "img-alt"
    }

    fn description(&self) -> &'static str {
        "Images must have alternative text for screen readers"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Accessibility
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Markup
    }

    fn class(&self) -> RuleClass {
        RuleClass::Fix
    }

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        is_element(node, "img")
            && !has_attribute(node, "alt")
            && !has_attribute(node, "aria-label")
            && !has_attribute(node, "aria-labelledby")
    }

    fn describe(&self, _node: &Node) -> String {
        "Added alt attribute to <img>.".to_string()
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        let kind = node.kind;
        node.children_mut("attributes")
            .ok_or(RuleError::MissingField {
                kind,
                field: "attributes",
            })?
            .push(text_attribute("alt", DEFAULT_ALT));
        annotate_once(node, ALT_NOTE);
        Ok(Effect::Mutated)
    }
}

/// Notes buttons and divs without a `role` when the file uses no ARIA at all
pub struct InteractiveRoleRule;

impl Rule for InteractiveRoleRule {
    fn name(&self) -> &'static str {
        "interactive-role"
    }

    fn description(&self) -> &'static str {
        "Interactive elements should expose an accessibility role"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Accessibility
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Markup
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn matches(&self, node: &Node, context: &RuleContext) -> bool {
        (is_element(node, "button") || is_element(node, "div"))
            && !has_attribute(node, "role")
            && !node.has_annotation(ROLE_NOTE)
            && !context.source.contains("aria-")
    }

    fn describe(&self, node: &Node) -> String {
        format!(
            "Flagged <{}> without an accessibility role.",
            node.text("name").unwrap_or("element")
        )
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(ROLE_NOTE);
        Ok(Effect::Mutated)
    }
}

/// `role` values must come from the WAI-ARIA role list
pub struct ValidAriaRoleRule;

impl Rule for ValidAriaRoleRule {
    fn name(&self) -> &'static str {
        "valid-aria-role"
    }

    fn description(&self) -> &'static str {
        "Use a valid ARIA role"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Accessibility
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Markup
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        node.is(NodeKind::Element)
            && invalid_role(node).map_or(false, |role| !node.has_annotation(&role_note(role)))
    }

    fn describe(&self, node: &Node) -> String {
        format!(
            "Flagged invalid ARIA role '{}' on <{}>.",
            invalid_role(node).unwrap_or_default(),
            node.text("name").unwrap_or("element")
        )
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        let note = invalid_role(node).map(role_note).ok_or(RuleError::MissingField {
            kind: node.kind,
            field: "role",
        })?;
        node.annotate(note);
        Ok(Effect::Mutated)
    }
}

fn role_note(role: &str) -> String {
    format!("Invalid ARIA role '{}'", role)
}

/// First token of the `role` attribute that is not a known role
fn invalid_role(element: &Node) -> Option<&str> {
    attribute_value(element, "role")?
        .split_whitespace()
        .find(|role| !is_valid_aria_role(role))
}

/// Check if a role is a valid ARIA role
fn is_valid_aria_role(role: &str) -> bool {
    matches!(
        role,
        // Document structure roles
        "application"
            | "article"
            | "cell"
            | "columnheader"
            | "complementary"
            | "contentinfo"
            | "definition"
            | "directory"
            | "document"
            | "feed"
            | "figure"
            | "generic"
            | "group"
            | "heading"
            | "img"
            | "list"
            | "listitem"
            | "main"
            | "math"
            | "meter"
            | "navigation"
            | "none"
            | "note"
            | "presentation"
            | "region"
            | "row"
            | "rowgroup"
            | "rowheader"
            | "separator"
            | "table"
            | "term"
            | "toolbar"
            // Widget roles
            | "button"
            | "checkbox"
            | "gridcell"
            | "link"
            | "menuitem"
            | "menuitemcheckbox"
            | "menuitemradio"
            | "option"
            | "progressbar"
            | "radio"
            | "scrollbar"
            | "searchbox"
            | "slider"
            | "spinbutton"
            | "switch"
            | "tab"
            | "tabpanel"
            | "textbox"
            | "tooltip"
            | "treeitem"
            // Live region roles
            | "alert"
            | "log"
            | "marquee"
            | "status"
            | "timer"
            // Landmark roles
            | "banner"
            | "form"
            | "search"
            // Window roles
            | "alertdialog"
            | "dialog"
            // Composite roles
            | "combobox"
            | "grid"
            | "listbox"
            | "menu"
            | "menubar"
            | "radiogroup"
            | "tablist"
            | "tree"
            | "treegrid"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::run_markup;

    #[test]
    fn test_img_without_alt() {
        let (output, log) = run_markup("<img src=\"a.png\">");

        assert_eq!(
            output,
            "<!-- Added alt attribute for accessibility --><img src=\"a.png\" alt=\"Image description\">"
        );
        assert_eq!(log, vec!["Added alt attribute to <img>.".to_string()]);
    }

    #[test]
    fn test_img_with_alt() {
        let source = "<img src=\"a.png\" alt=\"Logo\"><img aria-label=\"Chart\" src=\"b.png\">";
        let (output, log) = run_markup(source);

        assert_eq!(output, source);
        assert!(log.is_empty());
    }

    #[test]
    fn test_alt_fix_is_idempotent() {
        let (once, _) = run_markup("<p><IMG src=\"a.png\" /></p>");
        let (twice, log) = run_markup(&once);

        assert_eq!(once, twice);
        assert!(log.is_empty());
    }

    #[test]
    fn test_interactive_elements_without_aria() {
        let (output, log) = run_markup("<div><button>Go</button></div>");

        assert_eq!(
            log,
            vec![
                "Flagged <button> without an accessibility role.".to_string(),
                "Flagged <div> without an accessibility role.".to_string(),
            ]
        );
        assert!(output.starts_with(
            "<!-- Consider adding a role attribute for accessibility --><div>"
        ));
    }

    #[test]
    fn test_any_aria_attribute_suppresses_role_note() {
        let (_, log) = run_markup("<div><button>Go</button><span aria-hidden=\"true\">*</span></div>");
        assert!(log.is_empty());
    }

    #[test]
    fn test_invalid_aria_role() {
        let (output, log) = run_markup("<span role=\"invalid-role\">x</span>");

        assert_eq!(
            output,
            "<!-- Invalid ARIA role 'invalid-role' --><span role=\"invalid-role\">x</span>"
        );
        assert_eq!(
            log,
            vec!["Flagged invalid ARIA role 'invalid-role' on <span>.".to_string()]
        );

        let (again, log) = run_markup(&output);
        assert_eq!(again, output);
        assert!(log.is_empty());
    }

    #[test]
    fn test_valid_roles() {
        assert!(is_valid_aria_role("navigation"));
        assert!(is_valid_aria_role("tabpanel"));
        assert!(is_valid_aria_role("status"));
        assert!(is_valid_aria_role("alertdialog"));
        assert!(!is_valid_aria_role("busy"));
        assert!(!is_valid_aria_role("Button"));
    }
}
