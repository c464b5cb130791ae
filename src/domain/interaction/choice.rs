//! Choice domain, recorded choices and choice sequences.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::InteractionError;

/// Position of an option within its [`ChoiceDomain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionIndex(usize);

impl OptionIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for OptionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finite, ordered set of options a visitor can pick from.
///
/// Always non-empty with distinct keys. The domain-defined alternate of an
/// option is its cyclic successor, which for a binary domain is simply the
/// other value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ChoiceDomain {
    options: Vec<String>,
}

impl ChoiceDomain {
    /// Creates a domain from option keys in display order.
    pub fn new<I, S>(options: I) -> Result<Self, InteractionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Err(InteractionError::EmptyDomain);
        }
        let mut seen = HashSet::new();
        for key in &options {
            if !seen.insert(key.as_str()) {
                return Err(InteractionError::DuplicateOption(key.clone()));
            }
        }
        Ok(Self { options })
    }

    /// Creates a two-option domain.
    pub fn binary(first: impl Into<String>, second: impl Into<String>) -> Result<Self, InteractionError> {
        Self::new([first.into(), second.into()])
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_binary(&self) -> bool {
        self.options.len() == 2
    }

    pub fn contains(&self, option: OptionIndex) -> bool {
        option.0 < self.options.len()
    }

    /// Validates that `option` belongs to this domain.
    pub fn check(&self, option: OptionIndex) -> Result<OptionIndex, InteractionError> {
        if self.contains(option) {
            Ok(option)
        } else {
            Err(InteractionError::UnknownOption {
                option: option.0,
                domain_size: self.options.len(),
            })
        }
    }

    /// Returns the key of an option.
    pub fn key(&self, option: OptionIndex) -> Result<&str, InteractionError> {
        self.check(option).map(|o| self.options[o.0].as_str())
    }

    /// Looks an option up by key.
    pub fn index_of(&self, key: &str) -> Result<OptionIndex, InteractionError> {
        self.options
            .iter()
            .position(|k| k == key)
            .map(OptionIndex)
            .ok_or_else(|| InteractionError::UnknownOptionKey(key.to_string()))
    }

    /// Returns the domain-defined alternate of an option.
    ///
    /// Single-member domains map an option to itself.
    pub fn alternate(&self, option: OptionIndex) -> Result<OptionIndex, InteractionError> {
        let option = self.check(option)?;
        Ok(OptionIndex((option.0 + 1) % self.options.len()))
    }

    /// Returns every option except `option`, in domain order.
    pub fn others(&self, option: OptionIndex) -> Result<Vec<OptionIndex>, InteractionError> {
        let option = self.check(option)?;
        Ok((0..self.options.len())
            .filter(|i| *i != option.0)
            .map(OptionIndex)
            .collect())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for ChoiceDomain {
    type Error = InteractionError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChoiceDomain> for Vec<String> {
    fn from(domain: ChoiceDomain) -> Self {
        domain.options
    }
}

/// One recorded decision: the option picked at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    pub step: usize,
    pub option: OptionIndex,
}

/// Ordered sequence of picked options; position `i` is step `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceSequence(Vec<OptionIndex>);

impl ChoiceSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a sequence from option keys, validating each against the domain.
    pub fn from_keys<'a, I>(domain: &ChoiceDomain, keys: I) -> Result<Self, InteractionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .map(|k| domain.index_of(k))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<OptionIndex> {
        self.0.get(step).copied()
    }

    pub fn last(&self) -> Option<Choice> {
        self.0.last().map(|option| Choice {
            step: self.0.len() - 1,
            option: *option,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Choice> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(step, option)| Choice { step, option: *option })
    }

    pub fn options(&self) -> &[OptionIndex] {
        &self.0
    }

    /// Returns a copy with the option at `index` replaced.
    pub fn with_replaced(&self, index: usize, option: OptionIndex) -> Result<Self, InteractionError> {
        if index >= self.0.len() {
            return Err(InteractionError::index_out_of_range(index, self.0.len()));
        }
        let mut options = self.0.clone();
        options[index] = option;
        Ok(Self(options))
    }

    /// Renders the sequence as option keys.
    pub fn keys<'d>(&self, domain: &'d ChoiceDomain) -> Result<Vec<&'d str>, InteractionError> {
        self.0.iter().map(|o| domain.key(*o)).collect()
    }

    pub(crate) fn push(&mut self, option: OptionIndex) {
        self.0.push(option);
    }

    pub(crate) fn pop(&mut self) -> Option<OptionIndex> {
        self.0.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}
