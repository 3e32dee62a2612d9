use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::Rule;
use mentor_parser::ast::{Node, NodeKind};
use mentor_parser::builders::{
    call, catch_clause, expression_statement, identifier, member, try_statement,
    unwrap_expression,
};

const NOTE: &str = "Added error handling for fetch()";

/// Wraps unguarded `fetch(..)` statements in try/catch
pub struct FetchErrorHandlingRule;

impl Rule for FetchErrorHandlingRule {
    fn name(&self) -> &'static str {
        "fetch-error-handling"
    }

    fn description(&self) -> &'static str {
        "Network requests should handle failures"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Quality
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Script
    }

    fn class(&self) -> RuleClass {
        RuleClass::Fix
    }

    fn matches(&self, node: &Node, context: &RuleContext) -> bool {
        node.is(NodeKind::ExpressionStatement)
            && node
                .child("expression")
                .map_or(false, |expression| is_fetch_call(unwrap_expression(expression)))
            && !context.enclosed_by_try()
    }

    fn describe(&self, _node: &Node) -> String {
        "Added error handling for fetch() call.".to_string()
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        let log_error = expression_statement(call(
            member(identifier("console"), "error"),
            vec![identifier("error")],
        ));
        let handler = catch_clause(Some(identifier("error")), vec![log_error]);

        // The statement's own notes move up to the wrapper
        let mut wrapper = try_statement(vec![Node::hole()], Some(handler), None)
            .with_comments(std::mem::take(&mut node.comments));
        wrapper.annotate(NOTE);
        Ok(Effect::Wrap(wrapper))
    }
}

fn is_fetch_call(expression: &Node) -> bool {
    expression.is(NodeKind::CallExpression)
        && expression.child("callee").map_or(false, |callee| {
            callee.is(NodeKind::Identifier) && callee.text("name") == Some("fetch")
        })
}

#[cfg(test)]
mod tests {
    use crate::rules::testing::run_js;

    #[test]
    fn test_fetch_statement_is_wrapped() {
        let (output, log) = run_js("fetch(url);");

        assert_eq!(
            output,
            "// Added error handling for fetch()\ntry {\n  fetch(url);\n} catch (error) {\n  console.error(error);\n}\n"
        );
        assert_eq!(log, vec!["Added error handling for fetch() call.".to_string()]);
    }

    #[test]
    fn test_awaited_fetch_in_function() {
        let (output, log) = run_js("async function load() {\n  await fetch('/api');\n}\n");

        assert!(output.contains("  try {\n    await fetch('/api');\n  } catch (error) {"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_guarded_fetch_is_left_alone() {
        let source = "try {\n  fetch(url);\n} catch (e) {\n  report(e);\n}\n";
        let (output, log) = run_js(source);

        assert_eq!(output, source);
        assert!(log.is_empty());
    }

    #[test]
    fn test_try_outside_function_does_not_guard_callback() {
        let (_, log) = run_js("try {\n  run(() => {\n    fetch(url);\n  });\n} catch (e) {}\n");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_existing_comments_stay_above_wrapper() {
        let (output, _) = run_js("// load data\nfetch(url);");

        assert!(output.starts_with("// load data\n// Added error handling for fetch()\ntry {"));
    }

    #[test]
    fn test_wrapping_is_idempotent() {
        let (once, _) = run_js("fetch(url);");
        let (twice, log) = run_js(&once);

        assert_eq!(once, twice);
        assert!(log.is_empty());
    }
}
