// SPDX-License-Identifier: MIT

//! Message templates
//!
//! A small, sandboxed template language for user-visible text such as
//! review messages. Templates are compiled ahead of time against the
//! closed variable namespace in [`context::NAMESPACE`]:
//! - `WTF {{ author }}?`
//! - `{% if label %}Labels: {{ label }}{% endif %}`
//! - `{% for l in label %}- {{ l }}\n{% endfor %}`

mod context;
mod lexer;
mod parser;

pub use context::{TemplateContext, TemplateValue, NAMESPACE};

use crate::kit::error::TemplateError;
use parser::Node;

/// A compiled template whose variables are all known to be resolvable
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Compile a template: syntax first, then variable resolution
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let nodes = parser::parse(lexer::tokenize(source)?)?;
        check_variables(&nodes, &mut Vec::new())?;
        Ok(Self {
            source: source.to_string(),
            nodes,
        })
    }

    /// Compile and render against a representative context
    pub fn validate(source: &str) -> Result<Self, TemplateError> {
        let template = Self::compile(source)?;
        template.render(&TemplateContext::sample())?;
        Ok(template)
    }

    pub fn render(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::new();
        let mut scope = Vec::new();
        render_nodes(&self.nodes, ctx, &mut scope, &mut out)?;
        Ok(out)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Compile and render in one step
pub fn render(source: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
    Template::compile(source)?.render(ctx)
}

fn check_variables(nodes: &[Node], scope: &mut Vec<String>) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Output { name, .. } => {
                if !is_known(name, scope) {
                    return Err(TemplateError::UnknownVariable(name.clone()));
                }
            }
            Node::If {
                name,
                then,
                otherwise,
                ..
            } => {
                if !is_known(name, scope) {
                    return Err(TemplateError::UnknownVariable(name.clone()));
                }
                check_variables(then, scope)?;
                check_variables(otherwise, scope)?;
            }
            Node::For {
                item, list, body, ..
            } => {
                if !is_known(list, scope) {
                    return Err(TemplateError::UnknownVariable(list.clone()));
                }
                scope.push(item.clone());
                let result = check_variables(body, scope);
                scope.pop();
                result?;
            }
        }
    }
    Ok(())
}

fn is_known(name: &str, scope: &[String]) -> bool {
    scope.iter().any(|s| s == name) || TemplateContext::is_declared(name)
}

fn lookup<'a>(
    name: &str,
    ctx: &'a TemplateContext,
    scope: &'a [(String, TemplateValue)],
) -> Result<&'a TemplateValue, TemplateError> {
    scope
        .iter()
        .rev()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
        .or_else(|| ctx.get(name))
        .ok_or_else(|| TemplateError::UnknownVariable(name.to_string()))
}

fn render_nodes(
    nodes: &[Node],
    ctx: &TemplateContext,
    scope: &mut Vec<(String, TemplateValue)>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output { name, .. } => {
                let value = lookup(name, ctx, scope)?;
                out.push_str(&value.to_string());
            }
            Node::If {
                name,
                negated,
                then,
                otherwise,
                ..
            } => {
                let truthy = lookup(name, ctx, scope)?.truthy();
                let branch = if truthy != *negated { then } else { otherwise };
                render_nodes(branch, ctx, scope, out)?;
            }
            Node::For {
                item, list, body, ..
            } => {
                let items = lookup(list, ctx, scope)?.items();
                for value in items {
                    scope.push((item.clone(), TemplateValue::Text(value)));
                    let result = render_nodes(body, ctx, scope, out);
                    scope.pop();
                    result?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::snapshot::PullRequestSnapshot;

    fn ctx() -> TemplateContext {
        TemplateContext::from_snapshot(&PullRequestSnapshot {
            number: 7,
            author: "alice".to_string(),
            base: "main".to_string(),
            labels: vec!["bug".to_string(), "ui".to_string()],
            ..Default::default()
        })
    }

    #[test]
    fn test_render_known_variable() {
        assert_eq!(render("WTF {{author}}?", &ctx()).unwrap(), "WTF alice?");
        assert_eq!(render("WTF {{ author }}?", &ctx()).unwrap(), "WTF alice?");
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(render("WTF?", &ctx()).unwrap(), "WTF?");
        assert_eq!(render("", &ctx()).unwrap(), "");
    }

    #[test]
    fn test_syntax_error_message() {
        let err = render("Thank you {{", &ctx()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is an error in your message: unexpected 'end of template' at line 1"
        );
    }

    #[test]
    fn test_unknown_variable_message() {
        let err = render("Thank you {{hello}}", &ctx()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is an error in your message, the following variable is unknown: hello"
        );
    }

    #[test]
    fn test_unknown_variable_in_untaken_branch() {
        let err = Template::compile("{% if label %}ok{% else %}{{ nope }}{% endif %}").unwrap_err();
        assert_eq!(err, TemplateError::UnknownVariable("nope".to_string()));
    }

    #[test]
    fn test_syntax_error_wins_over_unknown_variable() {
        let err = Template::compile("{{ hello }} {{").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_if_and_for() {
        let source = "{% if label %}Labels:{% for l in label %} [{{ l }}]{% endfor %}{% endif %}";
        assert_eq!(render(source, &ctx()).unwrap(), "Labels: [bug] [ui]");

        let source = "{% if not body %}No description{% else %}{{ body }}{% endif %}";
        assert_eq!(render(source, &ctx()).unwrap(), "No description");
    }

    #[test]
    fn test_loop_variable_is_scoped() {
        let err = Template::compile("{% for l in label %}{% endfor %}{{ l }}").unwrap_err();
        assert_eq!(err, TemplateError::UnknownVariable("l".to_string()));
    }

    #[test]
    fn test_multiline_error_line() {
        let err = render("Hello\n\n{{ author", &ctx()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::syntax(
                "expected token 'end of print statement', got 'end of template'",
                3
            )
        );
    }

    #[test]
    fn test_validate() {
        assert!(Template::validate("Thanks {{ author }} for #{{ number }}").is_ok());
        assert!(Template::validate("Thanks {{ who }}").is_err());
    }
}
