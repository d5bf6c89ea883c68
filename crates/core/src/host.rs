use std::collections::BTreeMap;
use uriscope_api::{FactoryDecl, ReaderDecl};

/// The narrow boundary to the host symbol-resolution environment. The
/// compiler sees declarations and raw options through this trait and
/// nothing else of the host.
pub trait HostEnv: Send + Sync {
    fn factories(&self) -> Vec<FactoryDecl>;
    fn readers(&self) -> Vec<ReaderDecl>;
    fn options(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Host over a fixed set of declarations.
#[derive(Default)]
pub struct StaticHost {
    pub factories: Vec<FactoryDecl>,
    pub readers: Vec<ReaderDecl>,
    pub options: BTreeMap<String, String>,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory(mut self, factory: FactoryDecl) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn with_reader(mut self, reader: ReaderDecl) -> Self {
        self.readers.push(reader);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

impl HostEnv for StaticHost {
    fn factories(&self) -> Vec<FactoryDecl> {
        self.factories.clone()
    }

    fn readers(&self) -> Vec<ReaderDecl> {
        self.readers.clone()
    }

    fn options(&self) -> BTreeMap<String, String> {
        self.options.clone()
    }
}
