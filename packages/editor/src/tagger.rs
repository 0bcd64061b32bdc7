//! # Identity Tagger
//!
//! Gives every element a stable identifier persisted as the `data-uid`
//! attribute, and builds the identifier → element index.
//!
//! Elements that already carry a valid identifier keep it untouched, so
//! tagging an already-tagged document changes nothing. New identifiers come
//! from a monotonically increasing counter that never hands out a value
//! already present in the document.

use std::collections::{HashMap, HashSet};
use visedit_common::visitor::{walk_element, walk_element_mut, Visitor, VisitorMut};
use visedit_parser::ast::*;
use visedit_parser::IDGenerator;

/// Reserved attribute holding an element's identifier
pub const UID_ATTRIBUTE: &str = "data-uid";

/// Prefix of generated identifiers (`el-0`, `el-1`, ...)
pub const UID_PREFIX: &str = "el-";

/// Identifier → element index
///
/// Elements are addressed by paths from the document roots (see
/// [`Document::element_at`]). Markup embedded in expressions is indexed like
/// any other element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UidIndex {
    paths: HashMap<String, Vec<usize>>,
}

impl UidIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uid: &str) -> Option<&[usize]> {
        self.paths.get(uid).map(Vec::as_slice)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.paths.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn insert(&mut self, uid: String, path: Vec<usize>) {
        self.paths.insert(uid, path);
    }

    /// Identifiers in document order
    pub fn uids(&self) -> Vec<&str> {
        let mut entries: Vec<(&Vec<usize>, &String)> =
            self.paths.iter().map(|(uid, path)| (path, uid)).collect();
        entries.sort();
        entries.into_iter().map(|(_, uid)| uid.as_str()).collect()
    }
}

/// What a tagging pass did
#[derive(Debug, Clone, Default)]
pub struct TagReport {
    pub index: UidIndex,
    /// Identifiers appended to elements that had none
    pub assigned: Vec<String>,
    /// Identifiers written over duplicate or malformed values
    pub rewritten: Vec<String>,
}

impl TagReport {
    /// Whether the pass changed the tree
    pub fn modified(&self) -> bool {
        !self.assigned.is_empty() || !self.rewritten.is_empty()
    }
}

/// State of the reserved attribute on one element
enum UidState {
    Missing,
    Valid(String),
    /// Present, but without a usable literal value
    Malformed,
}

fn uid_state(element: &Element) -> UidState {
    match element.attribute(UID_ATTRIBUTE) {
        None => UidState::Missing,
        Some(attr) => match attr.literal_value() {
            Some(value) if !value.trim().is_empty() => UidState::Valid(value.to_string()),
            _ => UidState::Malformed,
        },
    }
}

/// Read the identifier an element carries, if it has a valid one
pub fn element_uid(element: &Element) -> Option<&str> {
    element
        .attribute(UID_ATTRIBUTE)
        .and_then(NamedAttribute::literal_value)
        .filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct IdentityTagger {
    counter: u64,
}

impl IdentityTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next counter value (the suffix of the next generated identifier)
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Tag every element of `doc` in document order and index it.
    ///
    /// `ids` supplies span ids for the attribute nodes the pass creates.
    pub fn tag(&mut self, doc: &mut Document, ids: &mut IDGenerator) -> TagReport {
        let mut existing = UidCollector::default();
        existing.visit_document(doc);

        let mut pass = TagPass {
            tagger: self,
            ids,
            taken: existing.uids,
            seen: HashSet::new(),
            paths: PathTracker::new(),
            report: TagReport::default(),
        };
        pass.visit_document_mut(doc);

        let report = pass.report;
        tracing::debug!(
            "Tagged {} elements ({} assigned, {} rewritten)",
            report.index.len(),
            report.assigned.len(),
            report.rewritten.len()
        );
        report
    }

    fn fresh_uid(&mut self, taken: &mut HashSet<String>) -> String {
        loop {
            let candidate = format!("{}{}", UID_PREFIX, self.counter);
            self.counter += 1;
            if taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Element paths during a walk; steps count elements in
/// [`Element::nested_elements`] order, which is the order visitors walk in.
struct PathTracker {
    path: Vec<usize>,
    next: Vec<usize>,
}

impl PathTracker {
    fn new() -> Self {
        Self {
            path: Vec::new(),
            next: vec![0],
        }
    }

    /// Step into the next element at the current depth, returning its path
    fn enter(&mut self) -> Vec<usize> {
        let step = match self.next.last_mut() {
            Some(next) => {
                *next += 1;
                *next - 1
            }
            None => 0,
        };
        self.path.push(step);
        self.next.push(0);
        self.path.clone()
    }

    fn leave(&mut self) {
        self.path.pop();
        self.next.pop();
    }
}

struct TagPass<'a> {
    tagger: &'a mut IdentityTagger,
    ids: &'a mut IDGenerator,
    /// Every identifier present in the document or handed out in this pass
    taken: HashSet<String>,
    /// Identifiers already claimed by an earlier element in document order
    seen: HashSet<String>,
    paths: PathTracker,
    report: TagReport,
}

impl VisitorMut for TagPass<'_> {
    fn visit_element_mut(&mut self, element: &mut Element) {
        let path = self.paths.enter();
        let uid = self.claim_uid(element);
        self.report.index.insert(uid, path);

        walk_element_mut(self, element);
        self.paths.leave();
    }
}

impl TagPass<'_> {
    fn claim_uid(&mut self, element: &mut Element) -> String {
        match uid_state(element) {
            UidState::Valid(uid) if self.seen.insert(uid.clone()) => uid,
            UidState::Valid(duplicate) => {
                let uid = self.tagger.fresh_uid(&mut self.taken);
                tracing::warn!(
                    "Duplicate identifier '{}' on <{}>, rewritten to '{}'",
                    duplicate,
                    element.name,
                    uid
                );
                self.rewrite_uid(element, &uid);
                uid
            }
            UidState::Malformed => {
                let uid = self.tagger.fresh_uid(&mut self.taken);
                tracing::warn!("Malformed identifier on <{}>, rewritten to '{}'", element.name, uid);
                self.rewrite_uid(element, &uid);
                uid
            }
            UidState::Missing => {
                let uid = self.tagger.fresh_uid(&mut self.taken);
                let quote = attribute_quote(element);
                element.attributes.push(Attribute::Named(NamedAttribute {
                    name: UID_ATTRIBUTE.to_string(),
                    value: Some(self.literal(&uid, quote)),
                    span: Span::synthetic(self.ids.new_id()),
                }));
                self.seen.insert(uid.clone());
                self.report.assigned.push(uid.clone());
                uid
            }
        }
    }

    fn rewrite_uid(&mut self, element: &mut Element, uid: &str) {
        let quote = attribute_quote(element);
        let value = self.literal(uid, quote);
        if let Some(attr) = element.attribute_mut(UID_ATTRIBUTE) {
            attr.value = Some(value);
        }
        self.seen.insert(uid.to_string());
        self.report.rewritten.push(uid.to_string());
    }

    fn literal(&mut self, value: &str, quote: char) -> AttributeValue {
        AttributeValue::Literal(StringLiteral {
            value: value.to_string(),
            quote,
            span: Span::synthetic(self.ids.new_id()),
        })
    }
}

#[derive(Default)]
struct UidCollector {
    uids: HashSet<String>,
}

impl Visitor for UidCollector {
    fn visit_element(&mut self, element: &Element) {
        if let Some(uid) = element_uid(element) {
            self.uids.insert(uid.to_string());
        }
        walk_element(self, element);
    }
}

/// Quote used by the element's existing literal attributes, double by default
fn attribute_quote(element: &Element) -> char {
    element
        .attributes
        .iter()
        .find_map(|attr| match attr {
            Attribute::Named(NamedAttribute {
                value: Some(AttributeValue::Literal(literal)),
                span,
                ..
            }) if !span.synthetic => Some(literal.quote),
            _ => None,
        })
        .unwrap_or('"')
}

struct IndexBuilder {
    paths: PathTracker,
    index: UidIndex,
}

impl Visitor for IndexBuilder {
    fn visit_element(&mut self, element: &Element) {
        let path = self.paths.enter();
        if let Some(uid) = element_uid(element) {
            if !self.index.contains(uid) {
                self.index.insert(uid.to_string(), path);
            }
        }

        walk_element(self, element);
        self.paths.leave();
    }
}

/// Build the index of an already-tagged tree without modifying it
pub fn build_index(doc: &Document) -> UidIndex {
    let mut builder = IndexBuilder {
        paths: PathTracker::new(),
        index: UidIndex::new(),
    };
    builder.visit_document(doc);
    builder.index
}
