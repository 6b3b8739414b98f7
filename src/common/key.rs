use serde::{Serialize, Serializer, ser::SerializeMap};

/// Key component.
///
/// ```rust
/// use dynamodb_compose::common::key;
///
/// let key = key::Key::new("GameTitle", "Alien Adventure");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

impl<T> Key<T> {
    /// Creates a key component.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Primary key (partition key and optional sort key).
///
/// Serializes as a map of one or two attributes, so it can be passed anywhere
/// a primary key record is accepted.
///
/// ```rust
/// use dynamodb_compose::common::key;
///
/// let keys = key::Keys::new(key::Key::new("GameTitle", "Alien Adventure"))
///     .sort_key(key::Key::new("UserId", "User-5"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

impl<T> Keys<T> {
    /// Creates a primary key with a partition key only.
    pub fn new(partition_key: Key<T>) -> Self {
        Self {
            partition_key,
            sort_key: None,
        }
    }

    /// Adds the sort key.
    pub fn sort_key(mut self, sort_key: Key<T>) -> Self {
        self.sort_key = Some(sort_key);
        self
    }
}

impl<T: Serialize> Serialize for Keys<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.sort_key.is_some() { 2 } else { 1 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.partition_key.name, &self.partition_key.value)?;
        if let Some(sort_key) = &self.sort_key {
            map.serialize_entry(&sort_key.name, &sort_key.value)?;
        }
        map.end()
    }
}
