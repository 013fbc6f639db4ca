use crate::error::Error;
use crate::TermId;
use std::collections::HashMap;

/// Bidirectional term <-> id mapping.
///
/// Ids are dense, zero-based and handed out in first-seen order. An id is
/// never reassigned.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    ids: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `term`, assigning the next free id if it is new.
    pub fn add_if_absent(&mut self, term: &str) -> Result<TermId, Error> {
        if let Some(&id) = self.ids.get(term) {
            return Ok(id);
        }
        let id = TermId::try_from(self.terms.len()).map_err(|_| Error::DictionaryFull)?;
        self.ids.insert(term.to_owned(), id);
        self.terms.push(term.to_owned());
        Ok(id)
    }

    pub fn get_term_id(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn get_term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.ids.contains_key(term)
    }

    pub fn size(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// (term, id) pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermId)> + '_ {
        self.terms.iter().enumerate().map(|(id, term)| (term.as_str(), id as TermId))
    }
}
