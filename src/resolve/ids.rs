//! Operation identifier registry.
//!
//! Declared ids are kept when free. A collision gets the first free numeric
//! suffix starting at `2`, so the same document always yields the same ids.

use crate::ir::HttpMethod;
use std::collections::HashSet;

/// Ids claimed so far in one run
#[derive(Debug, Default)]
pub struct OperationIds {
    used: HashSet<String>,
}

impl OperationIds {
    /// Claim `preferred`, or the first free suffixed variant of it.
    ///
    /// Returns the claimed id and whether it differs from `preferred`.
    pub fn claim(&mut self, preferred: &str) -> (String, bool) {
        if self.used.insert(preferred.to_string()) {
            return (preferred.to_string(), false);
        }
        let mut counter = 2usize;
        loop {
            let candidate = format!("{preferred}{counter}");
            if self.used.insert(candidate.clone()) {
                return (candidate, true);
            }
            counter += 1;
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}

/// Id for an operation that declares none: `{method}{PascalPath}`, with
/// `{param}` segments rendered as `By{Param}`.
///
/// `get /pets/{petId}/toys` becomes `getPetsByPetIdToys`.
#[must_use]
pub fn derive_id(method: HttpMethod, path: &str) -> String {
    let mut id = method.as_str().to_string();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => {
                id.push_str("By");
                id.push_str(&pascal_case(param));
            }
            None => id.push_str(&pascal_case(segment)),
        }
    }
    id
}

fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
