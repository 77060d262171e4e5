// Heuristic Engine
// Local rule-based annotator: closed-class lexicon + verb morphology + positional dependencies.
// Used when the annotation service is unavailable; far less accurate than a trained parser.

use rustc_hash::FxHashSet;
use std::sync::{Arc, OnceLock};

use crate::models::{AnnotatedDocument, Entity, Sentence, Token};
use crate::services::engine::{bag_of_words_similarity, LinguisticEngine};
use crate::services::errors::AnalysisError;
use crate::services::stopwords::StopwordFilter;
use crate::services::text_processor::{is_punctuation, split_sentences_advanced, tokenize};

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "every", "each", "some", "any", "no",
    "another",
];
const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "myself",
    "itself", "someone", "everyone",
];
const POSSESSIVES: &[&str] = &["my", "your", "his", "its", "our", "their"];
const COORDINATORS: &[&str] = &["and", "or", "but", "nor", "yet"];
const SUBORDINATORS: &[&str] = &[
    "because", "although", "though", "while", "since", "unless", "whereas", "if", "whether",
    "until", "when", "whenever",
];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "of", "for", "with", "by", "from", "to", "into", "onto", "over", "under",
    "about", "through", "after", "before", "between", "during", "without", "within", "across",
    "against", "among",
];
const ADVERBS: &[&str] = &[
    "not", "very", "also", "too", "so", "just", "often", "never", "always", "quite", "really",
    "then", "there", "here", "now", "fast", "well", "still",
];
const ADJECTIVES: &[&str] = &[
    "good", "great", "excellent", "bad", "poor", "terrible", "big", "small", "new", "old",
    "important", "happy", "sad", "angry", "afraid", "long", "short", "high", "low", "large",
    "simple", "complex", "clear", "different", "many", "few", "other", "same", "best", "better",
    "amazing", "wonderful", "unhappy", "furious", "scared", "worried", "surprised", "delighted",
    "pleased", "superior",
];
const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less"];

const VERB_STEMS: &[&str] = &[
    "run", "see", "go", "make", "take", "show", "use", "work", "write", "read", "accept",
    "return", "process", "configure", "need", "think", "believe", "know", "weigh", "measure",
    "chase", "eat", "like", "love", "hate", "want", "get", "give", "find", "say", "tell", "help",
    "start", "begin", "end", "seem", "look", "feel", "become", "leave", "put", "mean", "keep",
    "let", "call", "try", "ask", "play", "move", "live", "bring", "happen", "provide", "include",
    "continue", "set", "learn", "change", "lead", "understand", "follow", "create", "speak",
    "allow", "add", "spend", "grow", "open", "walk", "win", "offer", "remember", "consider",
    "appear", "buy", "wait", "serve", "send", "expect", "build", "stay", "fall", "reach",
    "remain", "suggest", "require", "report", "decide", "jump", "sing", "fly", "swim", "sleep",
    "contain", "leverage",
];
const IRREGULAR_PAST: &[&str] = &[
    "saw", "went", "ran", "made", "took", "wrote", "ate", "found", "gave", "got", "said", "told",
    "thought", "knew", "came", "became", "left", "felt", "brought", "began", "built", "bought",
    "sent", "kept", "seen", "written", "taken", "given", "known", "done",
];
const BE_FORMS: &[&str] = &["is", "are", "am", "was", "were", "be", "been", "being"];
const AUX_FORMS: &[(&str, &str)] = &[
    ("is", "VBZ"),
    ("are", "VBP"),
    ("am", "VBP"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("be", "VB"),
    ("been", "VBN"),
    ("being", "VBG"),
    ("has", "VBZ"),
    ("have", "VBP"),
    ("had", "VBD"),
    ("does", "VBZ"),
    ("do", "VBP"),
    ("did", "VBD"),
    ("will", "MD"),
    ("shall", "MD"),
    ("can", "MD"),
    ("could", "MD"),
    ("would", "MD"),
    ("should", "MD"),
    ("may", "MD"),
    ("might", "MD"),
    ("must", "MD"),
];

fn verb_stems() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| VERB_STEMS.iter().copied().collect())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VerbForm {
    Base,
    ThirdSingular,
    Past,
    Gerund,
}

/// Recognize an inflected form of a known verb.
fn verb_form(lower: &str) -> Option<VerbForm> {
    let stems = verb_stems();
    if IRREGULAR_PAST.contains(&lower) {
        return Some(VerbForm::Past);
    }
    if stems.contains(lower) {
        return Some(VerbForm::Base);
    }
    if let Some(stem) = lower.strip_suffix("ing") {
        if stems.contains(stem) || stems.contains(format!("{}e", stem).as_str()) {
            return Some(VerbForm::Gerund);
        }
    }
    if let Some(stem) = lower.strip_suffix("ed") {
        if stems.contains(stem) || stems.contains(format!("{}e", stem).as_str()) {
            return Some(VerbForm::Past);
        }
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        if stems.contains(format!("{}y", stem).as_str()) {
            return Some(VerbForm::ThirdSingular);
        }
    }
    if let Some(stem) = lower.strip_suffix("es") {
        if stems.contains(stem) {
            return Some(VerbForm::ThirdSingular);
        }
    }
    if let Some(stem) = lower.strip_suffix('s') {
        if stems.contains(stem) {
            return Some(VerbForm::ThirdSingular);
        }
    }
    None
}

fn is_adjective(lower: &str) -> bool {
    ADJECTIVES.contains(&lower)
        || (lower.len() > 5 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)))
}

/// First pass: lexical class of a token before positional resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lex {
    Punct,
    Num,
    Det,
    Pron,
    Poss,
    Cconj,
    Sconj,
    Adp,
    Aux(&'static str),
    Adv,
    Adj,
    Open,
}

fn lexical_class(text: &str, lower: &str) -> Lex {
    if is_punctuation(text) {
        return Lex::Punct;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return Lex::Num;
    }
    if DETERMINERS.contains(&lower) {
        return Lex::Det;
    }
    if PRONOUNS.contains(&lower) {
        return Lex::Pron;
    }
    if POSSESSIVES.contains(&lower) {
        return Lex::Poss;
    }
    if COORDINATORS.contains(&lower) {
        return Lex::Cconj;
    }
    if SUBORDINATORS.contains(&lower) {
        return Lex::Sconj;
    }
    if PREPOSITIONS.contains(&lower) {
        return Lex::Adp;
    }
    if let Some((_, tag)) = AUX_FORMS.iter().find(|(w, _)| *w == lower) {
        return Lex::Aux(*tag);
    }
    if ADVERBS.contains(&lower) || (lower.len() > 3 && lower.ends_with("ly")) {
        return Lex::Adv;
    }
    if is_adjective(lower) {
        return Lex::Adj;
    }
    Lex::Open
}

fn token(text: &str, idx: usize, pos: &str, tag: &str, is_stop: bool) -> Token {
    Token {
        text: text.to_string(),
        idx,
        pos: pos.to_string(),
        tag: tag.to_string(),
        dep: String::new(),
        head: 0,
        is_stop,
        is_punct: pos == "PUNCT",
    }
}

fn punct_tag(text: &str) -> &'static str {
    match text {
        "," => ",",
        "." | "!" | "?" => ".",
        _ => ":",
    }
}

fn noun_tag(lower: &str, proper: bool) -> &'static str {
    let plural = lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss");
    match (proper, plural) {
        (true, true) => "NNPS",
        (true, false) => "NNP",
        (false, true) => "NNS",
        (false, false) => "NN",
    }
}

#[derive(Debug, Clone)]
pub struct HeuristicEngine {
    stopwords: Arc<StopwordFilter>,
}

impl Default for HeuristicEngine {
    fn default() -> Self {
        Self::new(Arc::new(StopwordFilter::english()))
    }
}

impl HeuristicEngine {
    pub fn new(stopwords: Arc<StopwordFilter>) -> Self {
        Self { stopwords }
    }

    fn annotate_sentence(&self, doc_text: &str, start: usize, end: usize, sent_idx: usize) -> Sentence {
        let sent_text = &doc_text[start..end];
        let raw = tokenize(sent_text);
        let lexes: Vec<Lex> = raw
            .iter()
            .map(|(_, t)| lexical_class(t, &t.to_lowercase()))
            .collect();
        let first_word = lexes.iter().position(|l| *l != Lex::Punct);

        let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());
        let mut root: Option<usize> = None;
        let mut prev_aux: Option<(usize, &'static str)> = None;

        for (i, ((off, text), lex)) in raw.iter().zip(lexes.iter()).enumerate() {
            let idx = start + off;
            let lower = text.to_lowercase();
            let is_stop = *lex != Lex::Punct && self.stopwords.is_stopword(&lower);
            let prev_pos = tokens
                .iter()
                .rev()
                .find(|t: &&Token| t.pos != "ADV" && t.pos != "PUNCT")
                .map(|t| t.pos.clone());

            let tok = match lex {
                Lex::Punct => token(text, idx, "PUNCT", punct_tag(text), false),
                Lex::Num => token(text, idx, "NUM", "CD", is_stop),
                Lex::Det => token(text, idx, "DET", "DT", is_stop),
                Lex::Pron => token(text, idx, "PRON", "PRP", is_stop),
                Lex::Poss => token(text, idx, "PRON", "PRP$", is_stop),
                Lex::Cconj => token(text, idx, "CCONJ", "CC", is_stop),
                Lex::Sconj => token(text, idx, "SCONJ", "IN", is_stop),
                Lex::Adp => token(text, idx, "ADP", "IN", is_stop),
                Lex::Aux(tag) => {
                    prev_aux = Some((i, *tag));
                    token(text, idx, "AUX", tag, is_stop)
                }
                Lex::Adv => token(text, idx, "ADV", "RB", is_stop),
                Lex::Adj => token(text, idx, "ADJ", "JJ", is_stop),
                Lex::Open => {
                    let capitalized = text.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
                    let acronym = text.len() >= 2 && text.chars().all(|c| c.is_ascii_uppercase());
                    let proper = acronym || (capitalized && Some(i) != first_word);
                    let verb_slot = matches!(prev_pos.as_deref(), Some("NOUN" | "PROPN" | "PRON" | "AUX"));
                    let form = if proper { None } else { verb_form(&lower) };

                    match form {
                        Some(form) if verb_slot || (root.is_some() && prev_pos.as_deref() == Some("CCONJ")) => {
                            let after_aux = prev_aux.map(|(_, t)| t);
                            let tag = match form {
                                VerbForm::Gerund => "VBG",
                                VerbForm::Past if matches!(after_aux, Some(t) if t != "MD") => "VBN",
                                VerbForm::Past => "VBD",
                                _ if after_aux == Some("MD") => "VB",
                                VerbForm::ThirdSingular => "VBZ",
                                _ if prev_pos.as_deref() == Some("AUX") => "VB",
                                _ => "VBP",
                            };
                            if root.is_none() {
                                root = Some(i);
                            }
                            token(text, idx, "VERB", tag, is_stop)
                        }
                        _ if proper => token(text, idx, "PROPN", noun_tag(&lower, true), is_stop),
                        _ => token(text, idx, "NOUN", noun_tag(&lower, false), is_stop),
                    }
                }
            };
            tokens.push(tok);
        }

        let root = root
            .or_else(|| tokens.iter().position(|t| t.pos == "AUX"))
            .or_else(|| tokens.iter().position(|t| !t.is_punct))
            .unwrap_or(0);
        assign_dependencies(&mut tokens, root);
        let entities = collect_entities(&tokens, sent_idx);

        Sentence {
            start,
            end,
            text: sent_text.to_string(),
            tokens,
            entities,
        }
    }
}

fn next_nominal(tokens: &[Token], from: usize) -> Option<usize> {
    tokens[from + 1..]
        .iter()
        .position(|t| t.is_nominal() || t.pos == "VERB" || t.is_punct)
        .map(|p| p + from + 1)
        .filter(|&j| tokens[j].is_nominal())
}

fn assign_dependencies(tokens: &mut [Token], root: usize) {
    if tokens.is_empty() {
        return;
    }
    let root_is_participle = tokens[root].tag == "VBN";
    let n = tokens.len();

    // Nominal heads before the root: the last one outside a prepositional phrase is the subject.
    let mut subject: Option<usize> = None;
    let mut in_pp = false;
    for i in 0..root.min(n) {
        match tokens[i].pos.as_str() {
            "ADP" => in_pp = true,
            "NOUN" | "PROPN" | "PRON" if tokens[i].tag != "PRP$" => {
                let continues = i + 1 < root && tokens[i + 1].is_nominal();
                if !in_pp && !continues {
                    subject = Some(i);
                }
                if !continues {
                    in_pp = false;
                }
            }
            "CCONJ" | "PUNCT" => in_pp = false,
            _ => {}
        }
    }

    let mut seen_object = false;
    let mut after_adp: Option<usize> = None;
    for i in 0..n {
        let (dep, head) = if i == root {
            ("ROOT", i)
        } else {
            let t = &tokens[i];
            match t.pos.as_str() {
                "PUNCT" => ("punct", root),
                "DET" => ("det", next_nominal(tokens, i).unwrap_or(root)),
                "NUM" => ("nummod", next_nominal(tokens, i).unwrap_or(root)),
                "ADJ" => match next_nominal(tokens, i) {
                    Some(j) => ("amod", j),
                    None => ("acomp", root),
                },
                "ADV" => ("advmod", root),
                "CCONJ" => ("cc", root),
                "SCONJ" => ("mark", root),
                "ADP" => {
                    after_adp = Some(i);
                    ("prep", root)
                }
                "AUX" if i < root => {
                    let passive = root_is_participle
                        && BE_FORMS.contains(&t.text.to_lowercase().as_str());
                    (if passive { "auxpass" } else { "aux" }, root)
                }
                "AUX" => ("dep", root),
                "VERB" => ("conj", root),
                "PRON" if t.tag == "PRP$" => ("poss", next_nominal(tokens, i).unwrap_or(root)),
                _ if Some(i) == subject => (if root_is_participle { "nsubjpass" } else { "nsubj" }, root),
                _ => {
                    let compound = i + 1 < n && tokens[i + 1].is_nominal();
                    if compound {
                        ("compound", i + 1)
                    } else if let Some(p) = after_adp.take() {
                        ("pobj", p)
                    } else if i > root && !seen_object {
                        seen_object = true;
                        ("dobj", root)
                    } else {
                        ("dep", root)
                    }
                }
            }
        };
        tokens[i].dep = dep.to_string();
        tokens[i].head = head;
    }
}

fn collect_entities(tokens: &[Token], sent_idx: usize) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].pos != "PROPN" && tokens[i].pos != "NUM" {
            i += 1;
            continue;
        }
        let numeric = tokens[i].pos == "NUM";
        let mut j = i + 1;
        while j < tokens.len() && !numeric && tokens[j].pos == "PROPN" {
            j += 1;
        }
        let start = tokens[i].idx;
        let end = tokens[j - 1].end();
        let text = tokens[i..j]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let label = if numeric {
            "CARDINAL"
        } else if j - i == 1 && tokens[i].text.chars().all(|c| c.is_ascii_uppercase()) {
            "ORG"
        } else {
            "MISC"
        };
        entities.push(Entity {
            text,
            label: label.to_string(),
            start,
            end,
            sentence: sent_idx,
        });
        i = j;
    }
    entities
}

impl LinguisticEngine for HeuristicEngine {
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument, AnalysisError> {
        let sentences = split_sentences_advanced(text)
            .into_iter()
            .enumerate()
            .map(|(i, s)| self.annotate_sentence(text, s.start, s.end, i))
            .collect();
        AnnotatedDocument::new(text, sentences).map_err(|e| AnalysisError::processing("Annotation failed", e))
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        bag_of_words_similarity(a, b, |w| self.stopwords.is_stopword(w))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotate(text: &str) -> AnnotatedDocument {
        HeuristicEngine::default().annotate(text).unwrap()
    }

    fn find<'a>(doc: &'a AnnotatedDocument, text: &str) -> &'a Token {
        doc.tokens().find(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_subject_and_root() {
        let doc = annotate("The cat runs fast.");
        let cat = find(&doc, "cat");
        let runs = find(&doc, "runs");
        assert_eq!(cat.dep, "nsubj");
        assert_eq!(cat.tag, "NN");
        assert_eq!(runs.dep, "ROOT");
        assert_eq!(runs.pos, "VERB");
        assert_eq!(runs.tag, "VBZ");
        assert_eq!(find(&annotate("The cat run fast."), "run").tag, "VBP");
    }

    #[test]
    fn test_determiner_heads() {
        let doc = annotate("I saw an cat and a elephant.");
        let sent = &doc.sentences[0];
        let an = find(&doc, "an");
        assert_eq!(an.dep, "det");
        assert_eq!(sent.tokens[an.head].text, "cat");
        let a = find(&doc, "a");
        assert_eq!(sent.tokens[a.head].text, "elephant");
        assert_eq!(find(&doc, "and").dep, "cc");
    }

    #[test]
    fn test_passive_auxiliary() {
        let doc = annotate("The report was written by the team.");
        assert_eq!(find(&doc, "was").dep, "auxpass");
        assert_eq!(find(&doc, "written").dep, "ROOT");
    }

    #[test]
    fn test_subordinator_marks_clause() {
        let doc = annotate("We stayed because it rained.");
        assert_eq!(find(&doc, "because").dep, "mark");
    }

    #[test]
    fn test_offsets_and_entities() {
        let text = "Rust helps. The team at Mozilla built it.";
        let doc = annotate(text);
        assert_eq!(doc.sentences.len(), 2);
        for t in doc.tokens() {
            assert_eq!(&text[t.idx..t.end()], t.text);
        }
        let ents: Vec<&str> = doc.entities().map(|e| e.text.as_str()).collect();
        assert_eq!(ents, vec!["Mozilla"]);
    }

    #[test]
    fn test_empty_text_has_no_sentences() {
        assert!(annotate("").sentences.is_empty());
    }
}
