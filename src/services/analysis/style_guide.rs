// Style Rule Engine
// Per-guide pattern rules plus guide-specific structural checks, and the compliance score

use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::models::{AnnotatedDocument, StyleGuideType, StyleRule, StyleViolation};
use crate::services::errors::EngineError;
use crate::services::lexicon::Lexicons;

const MAX_ACADEMIC_SENTENCE_TOKENS: usize = 40;

struct CompiledRule {
    rule: StyleRule,
    regex: Regex,
}

/// Style checker with every guide's patterns compiled once
pub struct StyleGuideChecker {
    rules: BTreeMap<StyleGuideType, Vec<CompiledRule>>,
}

impl StyleGuideChecker {
    pub fn new(lexicons: &Lexicons) -> Result<Self, EngineError> {
        let mut rules = BTreeMap::new();
        for guide in StyleGuideType::ALL {
            let compiled = lexicons
                .rules_for(guide)
                .iter()
                .map(|rule| {
                    RegexBuilder::new(&rule.pattern)
                        .case_insensitive(true)
                        .build()
                        .map(|regex| CompiledRule { rule: rule.clone(), regex })
                        .map_err(|e| {
                            EngineError::InvalidConfiguration(format!(
                                "Invalid pattern for style rule '{}': {}",
                                rule.name, e
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rules.insert(guide, compiled);
        }
        Ok(Self { rules })
    }

    /// Violations in rule-table order, then the guide's structural checks.
    pub fn check(&self, text: &str, doc: &AnnotatedDocument, guide: StyleGuideType) -> Vec<StyleViolation> {
        let mut violations = Vec::new();

        for compiled in self.rules.get(&guide).map(|r| r.as_slice()).unwrap_or(&[]) {
            for m in compiled.regex.find_iter(text) {
                violations.push(StyleViolation {
                    rule_name: compiled.rule.name.clone(),
                    description: compiled.rule.description.clone(),
                    text: m.as_str().to_string(),
                    suggestion: compiled.rule.suggestion.clone(),
                    start: m.start(),
                    end: m.end(),
                    severity: compiled.rule.severity,
                });
            }
        }

        match guide {
            StyleGuideType::Academic => violations.extend(self.check_sentence_complexity(doc)),
            StyleGuideType::Technical => violations.extend(self.check_terminology_consistency(doc)),
            _ => {}
        }

        violations
    }

    fn check_sentence_complexity(&self, doc: &AnnotatedDocument) -> Vec<StyleViolation> {
        doc.sentences
            .iter()
            .filter(|s| s.word_tokens().count() > MAX_ACADEMIC_SENTENCE_TOKENS)
            .map(|s| StyleViolation {
                rule_name: "sentence_length".to_string(),
                description: "Sentence may be too complex".to_string(),
                text: s.text.clone(),
                suggestion: "Consider breaking into multiple sentences".to_string(),
                start: s.start,
                end: s.end,
                severity: 1,
            })
            .collect()
    }

    /// Nouns whose lowercase form appeared earlier with a different casing
    fn check_terminology_consistency(&self, doc: &AnnotatedDocument) -> Vec<StyleViolation> {
        let mut first_casing: FxHashMap<String, &str> = FxHashMap::default();
        let mut violations = Vec::new();

        for token in doc.tokens().filter(|t| t.is_nominal()) {
            let lower = token.lower();
            match first_casing.get(&lower) {
                Some(canonical) if *canonical != token.text => {
                    violations.push(StyleViolation {
                        rule_name: "inconsistent_terminology".to_string(),
                        description: "Inconsistent term usage".to_string(),
                        text: token.text.clone(),
                        suggestion: format!("Use '{}' consistently", canonical),
                        start: token.idx,
                        end: token.end(),
                        severity: 2,
                    });
                }
                Some(_) => {}
                None => {
                    first_casing.insert(lower, token.text.as_str());
                }
            }
        }
        violations
    }
}

/// `1 - Σseverity / (3n)`; exactly 1.0 without violations
pub fn compliance_score(violations: &[StyleViolation]) -> f64 {
    if violations.is_empty() {
        return 1.0;
    }
    let total: f64 = violations.iter().map(|v| v.severity as f64).sum();
    1.0 - total / (3.0 * violations.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::{HeuristicEngine, LinguisticEngine};

    fn check(text: &str, guide: StyleGuideType) -> Vec<StyleViolation> {
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        let checker = StyleGuideChecker::new(&Lexicons::default()).unwrap();
        checker.check(text, &doc, guide)
    }

    #[test]
    fn test_academic_first_person() {
        let text = "I believe this research shows important results.";
        let violations = check(text, StyleGuideType::Academic);
        let first = violations.iter().find(|v| v.rule_name == "first_person").unwrap();
        assert_eq!(first.text, "I");
        assert_eq!((first.start, first.end), (0, 1));
        assert_eq!(first.severity, 2);
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let violations = check("Obviously WE know. Of course.", StyleGuideType::Academic);
        let names: Vec<&str> = violations.iter().map(|v| v.rule_name.as_str()).collect();
        assert_eq!(names, vec!["first_person", "citation_needed", "citation_needed"]);
    }

    #[test]
    fn test_business_rules_in_table_order() {
        let violations = check("We leverage synergy. The plan was approved.", StyleGuideType::Business);
        let names: Vec<&str> = violations.iter().map(|v| v.rule_name.as_str()).collect();
        assert_eq!(names, vec!["passive_voice", "jargon", "jargon"]);
        assert_eq!(violations[0].text, "was approved");
    }

    #[test]
    fn test_technical_terminology_consistency() {
        let text = "The Parser reads input. The parser returns tokens.";
        let violations = check(text, StyleGuideType::Technical);
        let term = violations
            .iter()
            .find(|v| v.rule_name == "inconsistent_terminology")
            .unwrap();
        assert_eq!(term.text, "parser");
        assert_eq!(term.suggestion, "Use 'Parser' consistently");
        assert_eq!(&text[term.start..term.end], "parser");
    }

    #[test]
    fn test_academic_long_sentence() {
        let long = format!("{}.", vec!["word"; 41].join(" "));
        let violations = check(&long, StyleGuideType::Academic);
        assert!(violations.iter().any(|v| v.rule_name == "sentence_length"));
        let short = format!("{}.", vec!["word"; 40].join(" "));
        assert!(!check(&short, StyleGuideType::Academic)
            .iter()
            .any(|v| v.rule_name == "sentence_length"));
    }

    #[test]
    fn test_creative_has_no_rules() {
        assert!(check("I obviously can't do it.", StyleGuideType::Creative).is_empty());
    }

    #[test]
    fn test_compliance_score_bounds() {
        assert_eq!(compliance_score(&[]), 1.0);
        let violations = check("I believe we clearly can't.", StyleGuideType::Academic);
        let score = compliance_score(&violations);
        assert!((0.0..=1.0).contains(&score));
        let worst = StyleViolation {
            rule_name: "citation_needed".into(),
            description: String::new(),
            text: "clearly".into(),
            suggestion: String::new(),
            start: 0,
            end: 7,
            severity: 3,
        };
        assert_eq!(compliance_score(&[worst]), 0.0);
    }
}
