//! Condition grammar for policy documents.
//!
//! Conditions are short predicates over pull request metadata:
//!
//! - `'ignore-product' not in labels`
//! - `base.ref == 'master'`
//! - `'WIP' not in title`
//! - `'*.lock' in files`
//! - `'label-a' in labels or 'label-b' in labels`
//!
//! A string is parsed once into an [`Expr`] tree. The grammar is a fixed,
//! ordered list of forms and the first form matching the whole string
//! decides the parse. Anything else becomes [`Expr::Unrecognized`], which
//! evaluates to `false`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::PullRequestContext;

/// Where a `files` pattern is anchored, from its `*` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAnchor {
    /// `'X' in files`: a path equals X
    Exact,
    /// `'*X' in files`: a path ends with X
    Suffix,
    /// `'X*' in files`: a path starts with X
    Prefix,
    /// `'*X*' in files`: a path contains X
    Contains,
}

impl FileAnchor {
    /// Split a `files` literal into its anchor and the bare fragment.
    fn classify(literal: &str) -> (Self, &str) {
        let leading = literal.strip_prefix('*');
        let trailing = literal.strip_suffix('*');

        match (leading, trailing) {
            (Some(rest), Some(_)) if rest.len() > 1 => (Self::Contains, &rest[..rest.len() - 1]),
            (Some(rest), _) if !rest.is_empty() && !rest.ends_with('*') => (Self::Suffix, rest),
            (None, Some(rest)) if !rest.is_empty() => (Self::Prefix, rest),
            _ => (Self::Exact, literal),
        }
    }

    fn matches(self, path: &str, fragment: &str) -> bool {
        match self {
            Self::Exact => path == fragment,
            Self::Suffix => path.ends_with(fragment),
            Self::Prefix => path.starts_with(fragment),
            Self::Contains => path.contains(fragment),
        }
    }
}

/// A parsed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    InLabels(String),
    BaseRefEquals(String),
    BaseRefNotEquals(String),
    InTitle(String),
    InFiles { fragment: String, anchor: FileAnchor },
    /// `'X' not in <target>`, holding the parse of `'X' in <target>`
    Not(Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Unrecognized(String),
}

impl Expr {
    /// Parse a condition string. Never fails.
    pub fn parse(source: &str) -> Self {
        let source = source.trim();

        for (form, pattern) in grammar() {
            if let Some(caps) = pattern.captures(source) {
                let first = caps.get(1).map_or("", |m| m.as_str());
                let second = caps.get(2).map_or("", |m| m.as_str());
                return form.build(first, second);
            }
        }

        Self::Unrecognized(source.to_string())
    }

    /// Evaluate against a pull request. Unrecognized input is `false`.
    pub fn evaluate(&self, context: &PullRequestContext) -> bool {
        match self {
            Self::InLabels(label) => context.has_label(label),
            Self::BaseRefEquals(branch) => context.base_branch == *branch,
            Self::BaseRefNotEquals(branch) => context.base_branch != *branch,
            Self::InTitle(fragment) => context.title.contains(fragment.as_str()),
            Self::InFiles { fragment, anchor } => context.file_paths().any(|path| anchor.matches(path, fragment)),
            Self::Not(inner) => !inner.evaluate(context),
            Self::Or(left, right) => left.evaluate(context) || right.evaluate(context),
            Self::Unrecognized(source) => {
                warn!(condition = %source, "Condition matches no known form, treating as unmet");
                false
            }
        }
    }

    /// Whether every node of the tree was recognized.
    pub fn is_recognized(&self) -> bool {
        match self {
            Self::Unrecognized(_) => false,
            Self::Not(inner) => inner.is_recognized(),
            Self::Or(left, right) => left.is_recognized() && right.is_recognized(),
            _ => true,
        }
    }
}

/// The grammar forms, in the order they are tried.
#[derive(Debug, Clone, Copy)]
enum Form {
    InLabels,
    BaseRefEquals,
    BaseRefNotEquals,
    InTitle,
    InFiles,
    NotIn,
    Or,
}

impl Form {
    fn build(self, first: &str, second: &str) -> Expr {
        match self {
            Form::InLabels => Expr::InLabels(first.to_string()),
            Form::BaseRefEquals => Expr::BaseRefEquals(first.to_string()),
            Form::BaseRefNotEquals => Expr::BaseRefNotEquals(first.to_string()),
            Form::InTitle => Expr::InTitle(first.to_string()),
            Form::InFiles => {
                let (anchor, fragment) = FileAnchor::classify(first);
                Expr::InFiles {
                    fragment: fragment.to_string(),
                    anchor,
                }
            }
            Form::NotIn => Expr::Not(Box::new(Expr::parse(&format!("'{}' in {}", first, second)))),
            Form::Or => Expr::Or(Box::new(Expr::parse(first)), Box::new(Expr::parse(second))),
        }
    }
}

fn grammar() -> &'static [(Form, Regex)] {
    static GRAMMAR: OnceLock<Vec<(Form, Regex)>> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        [
            (Form::InLabels, r"^'([^']+)' in labels$"),
            (Form::BaseRefEquals, r"^base\.ref == '([^']+)'$"),
            (Form::BaseRefNotEquals, r"^base\.ref != '([^']+)'$"),
            (Form::InTitle, r"^'([^']+)' in title$"),
            (Form::InFiles, r"^'([^']+)' in files$"),
            (Form::NotIn, r"^'([^']+)' not in (\S+)$"),
            // Greedy: `A or B or C` splits on the last ` or `.
            (Form::Or, r"^(.+) or (.+)$"),
        ]
        .into_iter()
        .filter_map(|(form, pattern)| Regex::new(pattern).ok().map(|re| (form, re)))
        .collect()
    })
}

/// A condition as written in the policy document, with its parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let expr = Expr::parse(&source);
        Self { source, expr }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn is_recognized(&self) -> bool {
        self.expr.is_recognized()
    }

    pub fn evaluate(&self, context: &PullRequestContext) -> bool {
        self.expr.evaluate(context)
    }
}

impl From<String> for Condition {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

impl From<&str> for Condition {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.source
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse and evaluate a condition string in one step.
pub fn evaluate(condition: &str, context: &PullRequestContext) -> bool {
    Expr::parse(condition).evaluate(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PullRequestContext {
        PullRequestContext::new("WIP: Add parser", "carol", "main", "abc123")
            .with_label("bug")
            .with_label("needs review")
            .with_file("src/parser.rs")
            .with_file("package-lock.json")
            .with_file("docs/guide.md")
    }

    #[test]
    fn test_in_labels() {
        let ctx = context();
        assert!(evaluate("'bug' in labels", &ctx));
        assert!(evaluate("'needs review' in labels", &ctx));
        assert!(!evaluate("'feature' in labels", &ctx));
    }

    #[test]
    fn test_base_ref() {
        let ctx = context();
        assert!(evaluate("base.ref == 'main'", &ctx));
        assert!(!evaluate("base.ref == 'develop'", &ctx));
        assert!(evaluate("base.ref != 'develop'", &ctx));
        assert!(!evaluate("base.ref != 'main'", &ctx));
    }

    #[test]
    fn test_in_title_is_substring() {
        let ctx = context();
        assert!(evaluate("'WIP' in title", &ctx));
        assert!(evaluate("'Add pa' in title", &ctx));
        assert!(!evaluate("'wip' in title", &ctx));
    }

    #[test]
    fn test_files_exact() {
        let ctx = context();
        assert!(evaluate("'src/parser.rs' in files", &ctx));
        assert!(!evaluate("'parser.rs' in files", &ctx));
    }

    #[test]
    fn test_files_suffix() {
        let ctx = context();
        assert!(evaluate("'*lock.json' in files", &ctx));
        assert!(evaluate("'*.md' in files", &ctx));
        assert!(!evaluate("'*.py' in files", &ctx));
    }

    #[test]
    fn test_files_prefix() {
        let ctx = context();
        assert!(evaluate("'docs/*' in files", &ctx));
        assert!(!evaluate("'tests/*' in files", &ctx));
    }

    #[test]
    fn test_files_contains() {
        let ctx = context();
        assert!(evaluate("'*parser*' in files", &ctx));
        assert!(!evaluate("'*lexer*' in files", &ctx));
    }

    #[test]
    fn test_file_anchor_classification() {
        assert_eq!(FileAnchor::classify("a.rs"), (FileAnchor::Exact, "a.rs"));
        assert_eq!(FileAnchor::classify("*.rs"), (FileAnchor::Suffix, ".rs"));
        assert_eq!(FileAnchor::classify("src/*"), (FileAnchor::Prefix, "src/"));
        assert_eq!(FileAnchor::classify("*lock*"), (FileAnchor::Contains, "lock"));
        assert_eq!(FileAnchor::classify("*"), (FileAnchor::Exact, "*"));
        assert_eq!(FileAnchor::classify("**"), (FileAnchor::Exact, "**"));
    }

    #[test]
    fn test_not_in_negates_in() {
        let label_sets: Vec<Vec<&str>> = vec![vec![], vec!["bug"], vec!["skip"], vec!["bug", "skip"]];

        for labels in label_sets {
            let mut ctx = PullRequestContext::new("t", "carol", "main", "abc");
            for label in &labels {
                ctx = ctx.with_label(*label);
            }
            assert_eq!(
                evaluate("'skip' not in labels", &ctx),
                !evaluate("'skip' in labels", &ctx),
                "labels: {:?}",
                labels
            );
        }
    }

    #[test]
    fn test_not_in_title_and_files() {
        let ctx = context();
        assert!(!evaluate("'WIP' not in title", &ctx));
        assert!(evaluate("'DRAFT' not in title", &ctx));
        assert!(!evaluate("'*.md' not in files", &ctx));
        assert!(evaluate("'*.py' not in files", &ctx));
    }

    #[test]
    fn test_not_in_unknown_target_is_true() {
        let ctx = context();
        let expr = Expr::parse("'carol' not in authors");

        assert!(!expr.is_recognized());
        assert!(expr.evaluate(&ctx));
    }

    #[test]
    fn test_or() {
        let ctx = context();
        assert!(evaluate("'feature' in labels or 'bug' in labels", &ctx));
        assert!(evaluate("'bug' in labels or 'feature' in labels", &ctx));
        assert!(!evaluate("'feature' in labels or base.ref == 'develop'", &ctx));
    }

    #[test]
    fn test_or_chains_nest_on_the_left() {
        let expr = Expr::parse("'a' in labels or 'b' in labels or 'c' in labels");

        assert_eq!(
            expr,
            Expr::Or(
                Box::new(Expr::Or(
                    Box::new(Expr::InLabels("a".to_string())),
                    Box::new(Expr::InLabels("b".to_string())),
                )),
                Box::new(Expr::InLabels("c".to_string())),
            )
        );
    }

    #[test]
    fn test_label_containing_or_is_not_split() {
        let ctx = PullRequestContext::new("t", "carol", "main", "abc").with_label("this or that");
        assert!(evaluate("'this or that' in labels", &ctx));
    }

    #[test]
    fn test_unrecognized_fails_closed() {
        let ctx = context();
        assert!(!evaluate("", &ctx));
        assert!(!evaluate("labels contains 'bug'", &ctx));
        assert!(!evaluate("'bug' in labels and 'x' in labels", &ctx));
        assert!(!evaluate("'bug' in labels # trailing", &ctx));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(evaluate("  'bug' in labels\n", &context()));
    }

    #[test]
    fn test_condition_deserializes_from_string() {
        let condition: Condition = serde_yaml::from_str("\"'*.md' in files\"").unwrap();

        assert_eq!(condition.source(), "'*.md' in files");
        assert_eq!(
            condition.expr(),
            &Expr::InFiles {
                fragment: ".md".to_string(),
                anchor: FileAnchor::Suffix
            }
        );
        assert!(condition.is_recognized());
    }
}
