//! String interning, symbols and property keys.
//!
//! Named property keys are compared by identity: two interned strings with
//! the same text are the same allocation, so dictionary equality never has to
//! look at characters. The hash is computed once, at intern time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use core_types::{SymbolId, Value};
use rustc_hash::{FxHashMap, FxHasher};

/// Hash of a string key: `h = 31 * h + unit` over UTF-16 code units.
///
/// # Example
///
/// ```
/// use object_model::string_hash;
///
/// assert_eq!(string_hash("\0\u{2}\u{5}"), 67);
/// assert_eq!(string_hash(""), 0);
/// ```
pub fn string_hash(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Hash of a symbol key, derived from its identity.
pub fn symbol_hash(id: SymbolId) -> u32 {
    let mut hasher = FxHasher::default();
    id.hash(&mut hasher);
    hasher.finish() as u32
}

/// A string owned by a [`StringTable`]; equality is pointer identity.
#[derive(Clone)]
pub struct InternedString {
    text: Rc<str>,
    hash: u32,
}

impl InternedString {
    /// The characters
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Hash computed when the string was interned.
    pub fn hash_code(&self) -> u32 {
        self.hash
    }
}

impl PartialEq for InternedString {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.text, &other.text)
    }
}

impl Eq for InternedString {}

impl Hash for InternedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.text)
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The global intern table.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: FxHashMap<Rc<str>, InternedString>,
}

impl StringTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical string for `text`, creating it on first use.
    pub fn intern(&mut self, text: &str) -> InternedString {
        if let Some(existing) = self.strings.get(text) {
            return existing.clone();
        }
        let shared: Rc<str> = Rc::from(text);
        let interned = InternedString {
            text: Rc::clone(&shared),
            hash: string_hash(text),
        };
        self.strings.insert(shared, interned.clone());
        interned
    }

    /// Looks up `text` without interning it.
    pub fn get(&self, text: &str) -> Option<InternedString> {
        self.strings.get(text).cloned()
    }

    /// Number of distinct strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Descriptions of the symbols created by one heap.
#[derive(Debug, Default)]
pub struct SymbolTable {
    descriptions: Vec<Option<String>>,
}

impl SymbolTable {
    /// Creates a fresh, unique symbol.
    pub fn create(&mut self, description: Option<&str>) -> SymbolId {
        let id = SymbolId(self.descriptions.len() as u32);
        self.descriptions.push(description.map(str::to_owned));
        id
    }

    /// The description passed at creation, if any.
    pub fn description(&self, id: SymbolId) -> Option<&str> {
        self.descriptions.get(id.0 as usize)?.as_deref()
    }
}

/// A canonicalised named property key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Interned string key
    String(InternedString),
    /// Symbol key
    Symbol(SymbolId),
}

impl PropertyKey {
    /// Hash used by name-keyed dictionaries.
    pub fn hash_code(&self) -> u32 {
        match self {
            PropertyKey::String(s) => s.hash_code(),
            PropertyKey::Symbol(id) => symbol_hash(*id),
        }
    }

    /// Whether this is a string key.
    pub fn is_string(&self) -> bool {
        matches!(self, PropertyKey::String(_))
    }

    /// The text of a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s.as_str()),
            PropertyKey::Symbol(_) => None,
        }
    }

    /// The key as a script-visible value.
    pub fn to_value(&self) -> Value {
        match self {
            PropertyKey::String(s) => Value::String(s.as_str().to_owned()),
            PropertyKey::Symbol(id) => Value::Symbol(*id),
        }
    }
}

impl From<InternedString> for PropertyKey {
    fn from(s: InternedString) -> Self {
        PropertyKey::String(s)
    }
}

impl From<SymbolId> for PropertyKey {
    fn from(id: SymbolId) -> Self {
        PropertyKey::Symbol(id)
    }
}
