//! Referents: recognized entities with attribute slots and text occurrences.
//!
//! # Kinds
//!
//! The set of referent kinds is closed. Each kind declares three static
//! attribute tables that drive every comparison in the engine:
//!
//! ```text
//! kind          name attrs          exclusive attrs              qualifier attrs
//! ------------  ------------------  ---------------------------  ----------------------
//! Geo           NAME                TYPE, HIGHER, ALPHA2         HIGHER
//! Street        NAME                TYPE, NUMBER, GEO            GEO, NUMBER
//! Organization  NAME                TYPE, GEO, HIGHER            GEO, HIGHER
//! Person        LASTNAME, IDENTITY  FIRSTNAME, MIDDLENAME, SEX   FIRSTNAME, MIDDLENAME
//! Generic       NAME                -                            -
//! ```
//!
//! - *Name* values become term variants and are the identity evidence.
//! - *Exclusive* attributes are single-valued: two different values conflict.
//! - *Qualifier* attributes narrow a description. "Moscow" is more general
//!   than "Moscow, HIGHER=Russia"; the two are related but never merged.
//!
//! # Handles
//!
//! Referents do not point at each other. A slot that refers to another
//! referent stores its [`ReferentId`], and the owning [`crate::ReferentArena`]
//! resolves it.

use crate::{MorphGender, TextAnnotation, TextsCompareType, Termin};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Handle of a referent inside one document's [`crate::ReferentArena`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReferentId(u32);

impl ReferentId {
    /// Wrap a raw index.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ReferentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Well-known attribute (slot) names.
pub mod attrs {
    /// Name of a place, street, organization or generic entity.
    pub const NAME: &str = "NAME";
    /// Type word ("city", "street", "LLC").
    pub const TYPE: &str = "TYPE";
    /// Enclosing entity (region of a city, parent of an organization).
    pub const HIGHER: &str = "HIGHER";
    /// Two-letter country code.
    pub const ALPHA2: &str = "ALPHA2";
    /// Geographic owner of a street or organization.
    pub const GEO: &str = "GEO";
    /// House or street number.
    pub const NUMBER: &str = "NUMBER";
    /// Family name.
    pub const LASTNAME: &str = "LASTNAME";
    /// Given name (or its initial).
    pub const FIRSTNAME: &str = "FIRSTNAME";
    /// Patronymic or middle name (or its initial).
    pub const MIDDLENAME: &str = "MIDDLENAME";
    /// Full name written as one identifier, word order irrelevant.
    pub const IDENTITY: &str = "IDENTITY";
    /// `MALE` or `FEMALE`.
    pub const SEX: &str = "SEX";

    /// Attribute names are upper-case without surrounding whitespace.
    ///
    /// ```
    /// assert_eq!(refmerge_core::attrs::normalize(" geo "), "GEO");
    /// ```
    #[must_use]
    pub fn normalize(name: &str) -> String {
        name.trim().to_uppercase()
    }
}

/// Closed set of referent kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferentKind {
    /// Countries, regions, cities.
    Geo,
    /// Streets and other linear address objects.
    Street,
    /// Companies, agencies, institutions.
    Organization,
    /// People.
    Person,
    /// Anything else; identified by `NAME` only.
    #[default]
    Generic,
}

impl ReferentKind {
    /// Every kind.
    pub const ALL: [ReferentKind; 5] = [
        ReferentKind::Geo,
        ReferentKind::Street,
        ReferentKind::Organization,
        ReferentKind::Person,
        ReferentKind::Generic,
    ];

    /// Upper-case type name.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            ReferentKind::Geo => "GEO",
            ReferentKind::Street => "STREET",
            ReferentKind::Organization => "ORGANIZATION",
            ReferentKind::Person => "PERSON",
            ReferentKind::Generic => "GENERIC",
        }
    }

    /// Attributes whose values are identity evidence and become term variants.
    #[must_use]
    pub const fn name_attributes(self) -> &'static [&'static str] {
        match self {
            ReferentKind::Person => &[attrs::LASTNAME, attrs::IDENTITY],
            _ => &[attrs::NAME],
        }
    }

    /// Single-valued attributes.
    #[must_use]
    pub const fn exclusive_attributes(self) -> &'static [&'static str] {
        match self {
            ReferentKind::Geo => &[attrs::TYPE, attrs::HIGHER, attrs::ALPHA2],
            ReferentKind::Street => &[attrs::TYPE, attrs::NUMBER, attrs::GEO],
            ReferentKind::Organization => &[attrs::TYPE, attrs::GEO, attrs::HIGHER],
            ReferentKind::Person => &[attrs::FIRSTNAME, attrs::MIDDLENAME, attrs::SEX],
            ReferentKind::Generic => &[],
        }
    }

    /// Attributes that make a description narrower.
    #[must_use]
    pub const fn qualifier_attributes(self) -> &'static [&'static str] {
        match self {
            ReferentKind::Geo => &[attrs::HIGHER],
            ReferentKind::Street => &[attrs::GEO, attrs::NUMBER],
            ReferentKind::Organization => &[attrs::GEO, attrs::HIGHER],
            ReferentKind::Person => &[attrs::FIRSTNAME, attrs::MIDDLENAME],
            ReferentKind::Generic => &[],
        }
    }

    /// True if `attr` is single-valued for this kind.
    #[must_use]
    pub fn is_exclusive(self, attr: &str) -> bool {
        self.exclusive_attributes().contains(&attr)
    }
}

impl std::fmt::Display for ReferentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ReferentKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        ReferentKind::ALL
            .into_iter()
            .find(|k| k.type_name().eq_ignore_ascii_case(s.trim()))
            .or_else(|| match s.trim().to_ascii_lowercase().as_str() {
                "org" => Some(ReferentKind::Organization),
                "location" | "loc" | "city" => Some(ReferentKind::Geo),
                "per" => Some(ReferentKind::Person),
                _ => None,
            })
            .ok_or_else(|| crate::Error::parse(format!("unknown referent kind '{}'", s)))
    }
}

/// Value stored in a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotValue {
    /// Free text.
    Text(String),
    /// Integer.
    Int(i64),
    /// Another referent of the same document.
    Referent(ReferentId),
}

impl SlotValue {
    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Referent handle, if this is a referent value.
    #[must_use]
    pub fn as_referent(&self) -> Option<ReferentId> {
        match self {
            SlotValue::Referent(id) => Some(*id),
            _ => None,
        }
    }

    /// Value equality; text compares case-insensitively.
    #[must_use]
    pub fn matches(&self, other: &SlotValue) -> bool {
        match (self, other) {
            (SlotValue::Text(a), SlotValue::Text(b)) => eq_text(a, b),
            _ => self == other,
        }
    }
}

impl std::fmt::Display for SlotValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotValue::Text(s) => f.write_str(s),
            SlotValue::Int(n) => write!(f, "{}", n),
            SlotValue::Referent(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for SlotValue {
    fn from(s: &str) -> Self {
        SlotValue::Text(s.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(s: String) -> Self {
        SlotValue::Text(s)
    }
}

impl From<i64> for SlotValue {
    fn from(n: i64) -> Self {
        SlotValue::Int(n)
    }
}

impl From<ReferentId> for SlotValue {
    fn from(id: ReferentId) -> Self {
        SlotValue::Referent(id)
    }
}

/// One attribute value of a referent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: SlotValue,
    /// How many mentions supported this value
    #[serde(default)]
    pub count: u32,
}

/// Strictness of [`Referent::can_be_equals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqualsMode {
    /// Same kind and no conflicting exclusive attribute.
    Compatible,
    /// Compatible and at least one name value in common.
    SharedName,
}

/// A recognized entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Referent {
    kind: ReferentKind,
    slots: Vec<Slot>,
    #[serde(default)]
    occurrence: Vec<TextAnnotation>,
    #[serde(default)]
    ext_referents: Vec<ReferentId>,
}

impl Referent {
    /// Create an empty referent.
    #[must_use]
    pub fn new(kind: ReferentKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Builder: add a slot value.
    #[must_use]
    pub fn with_slot(mut self, name: &str, value: impl Into<SlotValue>) -> Self {
        self.add_slot(name, value, false, 0);
        self
    }

    /// Builder: add an occurrence.
    #[must_use]
    pub fn with_occurrence(mut self, begin_char: usize, end_char: usize) -> Self {
        self.add_occurrence(TextAnnotation::new(begin_char, end_char));
        self
    }

    /// Kind.
    #[must_use]
    pub fn kind(&self) -> ReferentKind {
        self.kind
    }

    /// Upper-case type name of the kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    // -------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------

    /// All slots in insertion order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Add a value; an equal existing value only gets its count bumped.
    ///
    /// With `clear_old`, every existing value of the attribute is dropped first.
    pub fn add_slot(
        &mut self,
        name: &str,
        value: impl Into<SlotValue>,
        clear_old: bool,
        stat_count: u32,
    ) -> &Slot {
        let value = value.into();
        if clear_old {
            self.slots.retain(|s| s.name != name);
        }
        if let Some(i) = self
            .slots
            .iter()
            .position(|s| s.name == name && s.value.matches(&value))
        {
            self.slots[i].count += stat_count;
            return &self.slots[i];
        }
        self.slots.push(Slot {
            name: name.to_string(),
            value,
            count: stat_count,
        });
        &self.slots[self.slots.len() - 1]
    }

    /// Drop every value of an attribute. Returns how many were removed.
    pub fn remove_slots(&mut self, name: &str) -> usize {
        let before = self.slots.len();
        self.slots.retain(|s| s.name != name);
        before - self.slots.len()
    }

    /// First slot of `name`, optionally with a matching value.
    #[must_use]
    pub fn find_slot(&self, name: &str, value: Option<&SlotValue>) -> Option<&Slot> {
        self.slots
            .iter()
            .filter(|s| s.name == name)
            .find(|s| value.map_or(true, |v| s.value.matches(v)))
    }

    /// True if the attribute has at least one value.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.slots.iter().any(|s| s.name == name)
    }

    /// First value of an attribute.
    #[must_use]
    pub fn slot_value(&self, name: &str) -> Option<&SlotValue> {
        self.find_slot(name, None).map(|s| &s.value)
    }

    /// First value of an attribute, rendered as a string.
    #[must_use]
    pub fn string_value(&self, name: &str) -> Option<String> {
        self.slot_value(name).map(ToString::to_string)
    }

    /// Every value of an attribute, rendered as strings.
    #[must_use]
    pub fn string_values(&self, name: &str) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.value.to_string())
            .collect()
    }

    /// First value of an attribute as an integer, or `default`.
    #[must_use]
    pub fn int_value(&self, name: &str, default: i64) -> i64 {
        match self.slot_value(name) {
            Some(SlotValue::Int(n)) => *n,
            Some(SlotValue::Text(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Text values of this kind's name attributes, in slot order.
    #[must_use]
    pub fn name_values(&self) -> Vec<&str> {
        let names = self.kind.name_attributes();
        self.slots
            .iter()
            .filter(|s| names.contains(&s.name.as_str()))
            .filter_map(|s| s.value.as_text())
            .collect()
    }

    /// Repoint slot values from `old` to `new`. Returns true if anything changed.
    pub fn replace_slot_referent(&mut self, old: ReferentId, new: ReferentId) -> bool {
        let mut changed = false;
        for slot in &mut self.slots {
            if slot.value == SlotValue::Referent(old) {
                slot.value = SlotValue::Referent(new);
                changed = true;
            }
        }
        if changed {
            // Repointing can make two values of one attribute identical.
            let mut seen: Vec<(String, SlotValue)> = Vec::new();
            self.slots.retain(|s| {
                let key = (s.name.clone(), s.value.clone());
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }
        for ext in &mut self.ext_referents {
            if *ext == old {
                *ext = new;
                changed = true;
            }
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Occurrences
    // -------------------------------------------------------------------------

    /// Text occurrences, ordered by begin offset.
    #[must_use]
    pub fn occurrence(&self) -> &[TextAnnotation] {
        &self.occurrence
    }

    /// Record a mention.
    ///
    /// An equal or covering occurrence absorbs it; an overlapping one is widened;
    /// otherwise it is inserted in begin-offset order.
    pub fn add_occurrence(&mut self, mut annotation: TextAnnotation) {
        for existing in &mut self.occurrence {
            match existing.compare_with(&annotation) {
                TextsCompareType::Equivalent | TextsCompareType::Contains => return,
                TextsCompareType::In | TextsCompareType::Intersect => {
                    existing.merge(&annotation);
                    self.occurrence.sort_by_key(|o| o.begin_char);
                    return;
                }
                TextsCompareType::Early | TextsCompareType::Later => {}
            }
        }
        if self.occurrence.is_empty() {
            annotation.essential = true;
            self.occurrence.push(annotation);
            return;
        }
        annotation.essential = false;
        let at = self
            .occurrence
            .partition_point(|o| o.begin_char <= annotation.begin_char);
        self.occurrence.insert(at, annotation);
    }

    /// Union another referent's occurrences into this one.
    pub fn merge_occurrences(&mut self, other: &Referent) {
        for annotation in &other.occurrence {
            self.add_occurrence(*annotation);
        }
    }

    /// True if some occurrence overlaps `[begin_char, end_char)`.
    #[must_use]
    pub fn check_occurrence(&self, begin_char: usize, end_char: usize) -> bool {
        self.occurrence.iter().any(|o| {
            !matches!(
                o.compare(begin_char, end_char),
                TextsCompareType::Early | TextsCompareType::Later
            )
        })
    }

    // -------------------------------------------------------------------------
    // External cross-references
    // -------------------------------------------------------------------------

    /// Referents discovered inside this one that still need registering.
    #[must_use]
    pub fn ext_referents(&self) -> &[ReferentId] {
        &self.ext_referents
    }

    /// Record a nested referent that must be registered with this one.
    pub fn add_ext_referent(&mut self, id: ReferentId) {
        if !self.ext_referents.contains(&id) {
            self.ext_referents.push(id);
        }
    }

    /// Take the pending nested referents, leaving none.
    pub fn take_ext_referents(&mut self) -> Vec<ReferentId> {
        std::mem::take(&mut self.ext_referents)
    }

    // -------------------------------------------------------------------------
    // Comparison and merging
    // -------------------------------------------------------------------------

    /// Could `self` and `other` describe the same entity?
    #[must_use]
    pub fn can_be_equals(&self, other: &Referent, mode: EqualsMode) -> bool {
        if self.kind != other.kind {
            return false;
        }
        for attr in self.kind.exclusive_attributes() {
            if !self.compatible_values(other, attr) {
                return false;
            }
        }
        match mode {
            EqualsMode::Compatible => true,
            EqualsMode::SharedName => self.shares_name(other),
        }
    }

    /// Is `self` a broader description that subsumes `other`?
    ///
    /// Requires a shared name and a strict subset of qualifier attributes.
    #[must_use]
    pub fn can_be_general_for(&self, other: &Referent) -> bool {
        if !self.can_be_equals(other, EqualsMode::SharedName) {
            return false;
        }
        let mine = self.qualifiers();
        let theirs = other.qualifiers();
        mine.len() < theirs.len() && mine.is_subset(&theirs)
    }

    /// Merge another referent's slots into this one.
    ///
    /// Equal values add their counts. For an exclusive attribute already set
    /// here, the incoming value replaces the old one when
    /// `overwrite_on_conflict` is true and is dropped otherwise.
    pub fn merge_slots(&mut self, other: &Referent, overwrite_on_conflict: bool) {
        let mut overwritten: Vec<&str> = Vec::new();
        for slot in &other.slots {
            if let Some(existing) = self
                .slots
                .iter_mut()
                .find(|s| s.name == slot.name && s.value.matches(&slot.value))
            {
                existing.count += slot.count;
                continue;
            }
            let name = slot.name.as_str();
            if self.kind.is_exclusive(name)
                && self.has_attr(name)
                && !overwritten.contains(&name)
            {
                if !overwrite_on_conflict {
                    continue;
                }
                log::trace!(
                    "{}: {} overwritten with '{}'",
                    self.type_name(),
                    name,
                    slot.value
                );
                self.slots.retain(|s| s.name != name);
                overwritten.push(name);
            }
            self.slots.push(slot.clone());
        }
        for ext in &other.ext_referents {
            self.add_ext_referent(*ext);
        }
    }

    /// Term variants derived from this referent's name attributes.
    #[must_use]
    pub fn create_termins(&self) -> Vec<Termin> {
        let mut termins: Vec<Termin> = Vec::new();
        let mut push = |t: Termin| {
            if !t.is_empty() && !termins.contains(&t) {
                termins.push(t);
            }
        };
        match self.kind {
            ReferentKind::Person => {
                let gender = match self.string_value(attrs::SEX).as_deref() {
                    Some(s) if s.eq_ignore_ascii_case("MALE") => MorphGender::MASCULINE,
                    Some(s) if s.eq_ignore_ascii_case("FEMALE") => MorphGender::FEMININE,
                    _ => MorphGender::UNDEFINED,
                };
                for slot in &self.slots {
                    let Some(text) = slot.value.as_text() else {
                        continue;
                    };
                    match slot.name.as_str() {
                        attrs::IDENTITY => {
                            push(Termin::new(text).ignoring_order().with_tag(attrs::IDENTITY))
                        }
                        attrs::LASTNAME => push(Termin::new(text).with_gender(gender)),
                        _ => {}
                    }
                }
            }
            ReferentKind::Organization => {
                for text in self.name_values() {
                    push(Termin::new(text));
                    let words: Vec<&str> = text.split_whitespace().collect();
                    if words.len() == 2 {
                        push(Termin::internal(&words.concat()));
                    }
                }
            }
            ReferentKind::Geo | ReferentKind::Street | ReferentKind::Generic => {
                for text in self.name_values() {
                    push(Termin::new(text));
                }
            }
        }
        termins
    }

    fn compatible_values(&self, other: &Referent, attr: &str) -> bool {
        let mine: Vec<&SlotValue> = self.values_of(attr).collect();
        let theirs: Vec<&SlotValue> = other.values_of(attr).collect();
        if mine.is_empty() || theirs.is_empty() {
            return true;
        }
        let initials_ok = self.kind == ReferentKind::Person
            && (attr == attrs::FIRSTNAME || attr == attrs::MIDDLENAME);
        mine.iter().any(|a| {
            theirs.iter().any(|b| {
                a.matches(b)
                    || (initials_ok
                        && matches!((a.as_text(), b.as_text()), (Some(x), Some(y)) if initial_matches(x, y)))
            })
        })
    }

    fn shares_name(&self, other: &Referent) -> bool {
        let mut any_names = false;
        for attr in self.kind.name_attributes() {
            for a in self.values_of(attr) {
                any_names = true;
                if other.values_of(attr).any(|b| a.matches(b)) {
                    return true;
                }
            }
        }
        if any_names || other.kind.name_attributes().iter().any(|a| other.has_attr(a)) {
            return false;
        }
        // Neither side has a name: fall back to identical slot sets.
        !self.slots.is_empty()
            && self
                .slots
                .iter()
                .all(|s| other.find_slot(&s.name, Some(&s.value)).is_some())
            && other
                .slots
                .iter()
                .all(|s| self.find_slot(&s.name, Some(&s.value)).is_some())
    }

    fn qualifiers(&self) -> BTreeSet<&'static str> {
        self.kind
            .qualifier_attributes()
            .iter()
            .copied()
            .filter(|a| self.has_attr(a))
            .collect()
    }

    fn values_of<'a>(&'a self, attr: &'a str) -> impl Iterator<Item = &'a SlotValue> + 'a {
        self.slots
            .iter()
            .filter(move |s| s.name == attr)
            .map(|s| &s.value)
    }
}

impl std::fmt::Display for Referent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())?;
        for (i, slot) in self.slots.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { ", " })?;
            write!(f, "{}={}", slot.name, slot.value)?;
        }
        Ok(())
    }
}

fn eq_text(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

/// "I." or "I" against "Ivan".
fn initial_matches(a: &str, b: &str) -> bool {
    fn initial(s: &str) -> Option<char> {
        let s = s.trim().trim_end_matches('.');
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => c.to_uppercase().next(),
            _ => None,
        }
    }
    fn first(s: &str) -> Option<char> {
        s.trim().chars().next().and_then(|c| c.to_uppercase().next())
    }
    match (initial(a), initial(b)) {
        (Some(x), None) => first(b) == Some(x),
        (None, Some(y)) => first(a) == Some(y),
        (Some(x), Some(y)) => x == y,
        (None, None) => false,
    }
}
