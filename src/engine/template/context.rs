// SPDX-License-Identifier: MIT

//! Template variable namespace

use std::collections::BTreeMap;

use crate::kit::snapshot::PullRequestSnapshot;

/// Every variable a template may reference. Anything else is rejected
/// when the template is compiled.
pub const NAMESPACE: &[&str] = &["author", "number", "title", "body", "base", "head", "label"];

/// Value bound to a template variable
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<String>),
}

impl TemplateValue {
    pub fn truthy(&self) -> bool {
        match self {
            TemplateValue::Text(s) => !s.is_empty(),
            TemplateValue::List(items) => !items.is_empty(),
        }
    }

    /// Items iterated by `{% for %}`; text iterates as a single item
    pub fn items(&self) -> Vec<String> {
        match self {
            TemplateValue::Text(s) if s.is_empty() => Vec::new(),
            TemplateValue::Text(s) => vec![s.clone()],
            TemplateValue::List(items) => items.clone(),
        }
    }
}

impl std::fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateValue::Text(s) => f.write_str(s),
            TemplateValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Values for the template namespace, derived from one pull request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    values: BTreeMap<&'static str, TemplateValue>,
}

impl TemplateContext {
    pub fn from_snapshot(pr: &PullRequestSnapshot) -> Self {
        let mut values = BTreeMap::new();
        values.insert("author", TemplateValue::Text(pr.author.clone()));
        values.insert("number", TemplateValue::Text(pr.number.to_string()));
        values.insert("title", TemplateValue::Text(pr.title.clone()));
        values.insert(
            "body",
            TemplateValue::Text(pr.body.clone().unwrap_or_default()),
        );
        values.insert("base", TemplateValue::Text(pr.base.clone()));
        values.insert("head", TemplateValue::Text(pr.head.clone()));
        values.insert("label", TemplateValue::List(pr.labels.clone()));
        Self { values }
    }

    /// Representative context used to validate templates at load time
    pub fn sample() -> Self {
        Self::from_snapshot(&PullRequestSnapshot {
            number: 1,
            base: "main".to_string(),
            head: "feature".to_string(),
            author: "octocat".to_string(),
            title: "Sample pull request".to_string(),
            body: Some("Sample description".to_string()),
            labels: vec!["sample".to_string()],
            ..Default::default()
        })
    }

    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.values.get(name)
    }

    pub fn is_declared(name: &str) -> bool {
        NAMESPACE.contains(&name)
    }
}
