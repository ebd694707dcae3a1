use std::{collections::HashMap, fmt, sync::Arc};

use super::{errors::FormatError, pages::CommaPageListCodec};

/// A paired encode/decode transformation between `T` and a text column.
pub trait TextCodec<T>: Send + Sync {
    /// Name the codec is registered under.
    fn name(&self) -> &'static str;
    fn encode(&self, value: &T) -> Result<String, FormatError>;
    fn decode(&self, raw: &str) -> Result<T, FormatError>;
}

/// Shared handle to a page list codec.
pub type PageListCodec = Arc<dyn TextCodec<Vec<u32>>>;

/// Named codecs available to the persistence layer.
///
/// Built once during setup and read-only afterwards.
#[derive(Clone)]
pub struct CodecRegistry {
    page_lists: Arc<HashMap<&'static str, PageListCodec>>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::default()
    }

    /// Looks up a page list codec by name.
    pub fn page_list(&self, name: &str) -> Option<PageListCodec> {
        self.page_lists.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.page_lists.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CodecRegistry {
    /// Registry holding the built-in codecs.
    fn default() -> Self {
        Self::builder().register(CommaPageListCodec).build()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("page_lists", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct CodecRegistryBuilder {
    page_lists: HashMap<&'static str, PageListCodec>,
}

impl CodecRegistryBuilder {
    /// Adds a page list codec. A later registration under the same name
    /// replaces the earlier one.
    pub fn register<C>(mut self, codec: C) -> Self
    where
        C: TextCodec<Vec<u32>> + 'static,
    {
        let name = codec.name();
        if self.page_lists.insert(name, Arc::new(codec)).is_some() {
            tracing::warn!("page list codec {name} registered twice; keeping the last one");
        }
        self
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            page_lists: Arc::new(self.page_lists),
        }
    }
}
