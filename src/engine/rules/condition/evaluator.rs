//! Condition evaluator

use super::ast::{CompareOp, Condition};
use crate::kit::snapshot::{Attribute, PullRequestSnapshot};

/// Evaluate a condition against a pull request snapshot.
///
/// Total: a condition on an attribute the snapshot does not have is false,
/// negated or not.
pub fn evaluate(cond: &Condition, snapshot: &PullRequestSnapshot) -> bool {
    let Some(attr) = snapshot.attribute(&cond.attribute) else {
        return false;
    };
    let attr = if cond.count {
        Attribute::Number(attr.cardinality())
    } else {
        attr
    };

    let result = match &cond.op {
        None => attr.truthy(),
        Some(op) => evaluate_compare(&attr, op, cond),
    };
    result != cond.negated
}

fn evaluate_compare(attr: &Attribute, op: &CompareOp, cond: &Condition) -> bool {
    let value = cond.value.as_str();
    match op {
        CompareOp::Eq => values_equal(attr, value),
        CompareOp::NotEq => !values_equal(attr, value),
        CompareOp::Gt => compare_numbers(attr, value, |a, b| a > b),
        CompareOp::Gte => compare_numbers(attr, value, |a, b| a >= b),
        CompareOp::Lt => compare_numbers(attr, value, |a, b| a < b),
        CompareOp::Lte => compare_numbers(attr, value, |a, b| a <= b),
        CompareOp::Includes => check_includes(attr, value),
        CompareOp::Matches => match &cond.pattern {
            Some(re) => match attr {
                Attribute::Text(s) => re.is_match(s),
                Attribute::List(items) => items.iter().any(|item| re.is_match(item)),
                Attribute::Number(n) => re.is_match(&n.to_string()),
                Attribute::Bool(b) => re.is_match(&b.to_string()),
            },
            None => false,
        },
    }
}

fn values_equal(attr: &Attribute, value: &str) -> bool {
    match attr {
        Attribute::Text(s) => s == value,
        Attribute::Number(n) => value
            .parse::<f64>()
            .map(|v| (n - v).abs() < f64::EPSILON)
            .unwrap_or(false),
        Attribute::Bool(b) => value.parse::<bool>().map(|v| v == *b).unwrap_or(false),
        // List equality is membership, so `label=bug` reads naturally
        Attribute::List(items) => items.iter().any(|item| item == value),
    }
}

fn compare_numbers<F>(attr: &Attribute, value: &str, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    let left = match attr {
        Attribute::Number(n) => Some(*n),
        Attribute::Text(s) => s.trim().parse::<f64>().ok(),
        Attribute::Bool(_) | Attribute::List(_) => None,
    };
    match (left, value.parse::<f64>()) {
        (Some(l), Ok(r)) => cmp(l, r),
        _ => false,
    }
}

fn check_includes(attr: &Attribute, value: &str) -> bool {
    match attr {
        Attribute::List(items) => items.iter().any(|item| item == value),
        Attribute::Text(s) => s.contains(value),
        Attribute::Number(_) | Attribute::Bool(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::condition::parser::parse;
    use crate::kit::snapshot::{Review, ReviewState};

    fn pr() -> PullRequestSnapshot {
        PullRequestSnapshot {
            number: 12,
            base: "main".to_string(),
            head: "feature/login".to_string(),
            author: "alice".to_string(),
            title: "feat: add login".to_string(),
            labels: vec!["bug".to_string(), "urgent".to_string()],
            files: vec!["src/lib.rs".to_string(), "README.md".to_string()],
            draft: true,
            ..Default::default()
        }
    }

    fn check(condition: &str, snapshot: &PullRequestSnapshot) -> bool {
        evaluate(&parse(condition).unwrap(), snapshot)
    }

    #[test]
    fn test_string_equality() {
        let pr = pr();
        assert!(check("base=main", &pr));
        assert!(!check("base=develop", &pr));
        assert!(check("author!=bob", &pr));
        assert!(!check("author!=alice", &pr));
    }

    #[test]
    fn test_list_membership() {
        let pr = pr();
        assert!(check("label=bug", &pr));
        assert!(!check("label=frontend", &pr));
        assert!(check("label!=frontend", &pr));
        assert!(check("label includes urgent", &pr));
        assert!(check("-label=wip", &pr));
        assert!(!check("-label=bug", &pr));
    }

    #[test]
    fn test_count_prefix() {
        let pr = pr();
        assert!(check("#label=2", &pr));
        assert!(check("#files>=2", &pr));
        assert!(!check("#files>2", &pr));
        assert!(check("#files<3", &pr));
        assert!(check("#assignee=0", &pr));
    }

    #[test]
    fn test_approved_reviews_count() {
        let mut pr = pr();
        assert!(!check("#approved-reviews-by>=1", &pr));

        pr.reviews.push(Review {
            reviewer: "prflow-bot".to_string(),
            state: ReviewState::Approved,
            body: None,
            submitted_at: None,
        });
        assert!(check("#approved-reviews-by>=1", &pr));
        assert!(check("approved-reviews-by=prflow-bot", &pr));
    }

    #[test]
    fn test_number_comparison() {
        let pr = pr();
        assert!(check("number>10", &pr));
        assert!(check("number=12", &pr));
        assert!(!check("number<12", &pr));
        assert!(check("number<=12", &pr));
        // Non-numeric right-hand side never compares
        assert!(!check("number>abc", &pr));
        assert!(!check("base>1", &pr));
    }

    #[test]
    fn test_boolean_attributes() {
        let pr = pr();
        assert!(check("draft", &pr));
        assert!(!check("-draft", &pr));
        assert!(check("draft=true", &pr));
        assert!(!check("merged", &pr));
        assert!(check("-merged", &pr));
    }

    #[test]
    fn test_regex_match() {
        let pr = pr();
        assert!(check("title~=^feat", &pr));
        assert!(!check("title~=^fix", &pr));
        assert!(check("files~=\\.rs$", &pr));
        assert!(check("head~=^feature/", &pr));
    }

    #[test]
    fn test_unknown_attribute_fails_closed() {
        let pr = pr();
        assert!(!check("nonexistent=foo", &pr));
        assert!(!check("nonexistent!=foo", &pr));
        assert!(!check("-nonexistent=foo", &pr));
        assert!(!check("#nonexistent>=0", &pr));
        assert!(!check("nonexistent", &pr));
    }

    #[test]
    fn test_empty_snapshot_is_total() {
        let pr = PullRequestSnapshot::default();
        for condition in [
            "base=main",
            "#approved-reviews-by>=1",
            "body includes x",
            "mergeable-state~=clean",
            "conflict",
        ] {
            assert!(!check(condition, &pr), "{} should not match", condition);
        }
    }
}
