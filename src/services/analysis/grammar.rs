// Grammar Issue Detector
// Subject-verb agreement and a/an article checks over an annotated document

use crate::models::{AnnotatedDocument, GrammarIssue, GrammarIssueKind, Sentence, Token};
use crate::services::text_processor::whitespace_word_count;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Singular,
    Plural,
    Unknown,
}

fn subject_number(token: &Token) -> Number {
    match token.tag.as_str() {
        "NN" | "NNP" => Number::Singular,
        _ => Number::Plural,
    }
}

fn verb_number(token: &Token) -> Number {
    match token.tag.as_str() {
        "VBZ" => Number::Singular,
        "VBP" => Number::Plural,
        _ => Number::Unknown,
    }
}

fn starts_with_vowel(word: &str) -> bool {
    word.chars()
        .next()
        .map(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarChecker;

impl GrammarChecker {
    pub fn new() -> Self {
        Self
    }

    /// All issues: subject-verb pass over every sentence, then the article pass.
    pub fn detect(&self, doc: &AnnotatedDocument) -> Vec<GrammarIssue> {
        let mut issues: Vec<GrammarIssue> = doc
            .sentences
            .iter()
            .filter_map(|s| self.check_subject_verb(s))
            .collect();
        for sent in &doc.sentences {
            issues.extend(self.check_articles(sent));
        }
        issues
    }

    /// First disagreeing subject/root-verb pair in the sentence, if any.
    fn check_subject_verb(&self, sent: &Sentence) -> Option<GrammarIssue> {
        let mut subject: Option<&Token> = None;
        let mut verb: Option<&Token> = None;

        for token in &sent.tokens {
            if token.dep == "nsubj" {
                subject = Some(token);
            } else if token.dep == "ROOT" && token.pos == "VERB" {
                verb = Some(token);
            }

            let (Some(s), Some(v)) = (subject, verb) else {
                continue;
            };
            let sn = subject_number(s);
            let vn = verb_number(v);
            if vn != Number::Unknown && sn != vn {
                return Some(GrammarIssue {
                    kind: GrammarIssueKind::SubjectVerbAgreement {
                        subject: s.text.clone(),
                        verb: v.text.clone(),
                    },
                    text: sent.text.clone(),
                    start: sent.start,
                    end: sent.end,
                });
            }
        }
        None
    }

    fn check_articles(&self, sent: &Sentence) -> Vec<GrammarIssue> {
        let mut issues = Vec::new();
        for token in &sent.tokens {
            if token.pos != "DET" || token.dep != "det" {
                continue;
            }
            let Some(head) = sent.head_of(token) else {
                continue;
            };
            if !head.is_nominal() {
                continue;
            }
            let article = token.lower();
            let correct = match article.as_str() {
                "a" => !starts_with_vowel(&head.text),
                "an" => starts_with_vowel(&head.text),
                _ => true,
            };
            if !correct {
                issues.push(GrammarIssue {
                    kind: GrammarIssueKind::ArticleUsage {
                        article: token.text.clone(),
                        noun: head.text.clone(),
                    },
                    text: sent.text.clone(),
                    start: sent.start,
                    end: sent.end,
                });
            }
        }
        issues
    }

    /// Report-only enhancement: the text comes back verbatim.
    pub fn enhance(&self, text: &str, doc: &AnnotatedDocument) -> (String, Vec<GrammarIssue>) {
        (text.to_string(), self.detect(doc))
    }

    /// `1 - issues / words`, or 1.0 for text without words
    pub fn improvement_score(&self, text: &str, issue_count: usize) -> f64 {
        let words = whitespace_word_count(text);
        if words == 0 {
            return 1.0;
        }
        (1.0 - issue_count as f64 / words as f64).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::engine::{HeuristicEngine, LinguisticEngine};

    fn detect(text: &str) -> Vec<GrammarIssue> {
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        GrammarChecker::new().detect(&doc)
    }

    #[test]
    fn test_article_issues() {
        let issues = detect("I saw an cat and a elephant.");
        let articles: Vec<_> = issues
            .iter()
            .filter(|i| i.kind_name() == "article_usage")
            .collect();
        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles[0].kind,
            GrammarIssueKind::ArticleUsage { article: "an".into(), noun: "cat".into() }
        );
        assert_eq!(articles[0].start, 0);
        assert_eq!(articles[0].end, 28);
    }

    #[test]
    fn test_subject_verb_disagreement() {
        let issues = detect("The cat run fast.");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].kind,
            GrammarIssueKind::SubjectVerbAgreement { subject: "cat".into(), verb: "run".into() }
        );
        assert!(detect("The cat runs fast.").is_empty());
    }

    #[test]
    fn test_unknown_verb_number_is_not_reported() {
        // Past tense carries no number
        assert!(detect("The cats ran fast.").is_empty());
    }

    #[test]
    fn test_spans_within_text() {
        let text = "The cat run fast. I saw an owl and an dog.";
        for issue in detect(text) {
            assert!(issue.start <= issue.end && issue.end <= text.len());
            assert_eq!(&text[issue.start..issue.end], issue.text);
        }
    }

    #[test]
    fn test_empty_document() {
        let checker = GrammarChecker::new();
        assert!(checker.detect(&AnnotatedDocument::empty("")).is_empty());
    }

    #[test]
    fn test_enhance_is_verbatim() {
        let text = "I saw an cat.";
        let doc = HeuristicEngine::default().annotate(text).unwrap();
        let (enhanced, issues) = GrammarChecker::new().enhance(text, &doc);
        assert_eq!(enhanced, text);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_improvement_score() {
        let checker = GrammarChecker::new();
        assert_eq!(checker.improvement_score("", 0), 1.0);
        assert!((checker.improvement_score("I saw an cat.", 1) - 0.75).abs() < 1e-9);
    }
}
