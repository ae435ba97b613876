//! File names for generated chunks.
//!
//! A pass that produces a single chunk writes it under the canonical name
//! (`sitemap.xml` by default). A pass that produces several names each one
//! through a [`ChunkNamer`], and when an index is built its last document
//! takes over the canonical name so crawlers find the index at the usual
//! location.

use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// Strategy that names one chunk of a multi-chunk pass.
///
/// Implemented for any `Fn(u32, &str) -> String`, so a closure can be passed
/// directly:
///
/// ```rust
/// use litesitemap_core::ChunkNamer;
///
/// let namer = |serial: u32, canonical: &str| format!("part{serial}.{canonical}");
/// assert_eq!(namer.chunk_name(3, "sitemap.xml"), "part3.sitemap.xml");
/// ```
pub trait ChunkNamer: Send + Sync {
    /// Name for the chunk with 1-based `serial`, given the canonical name.
    fn chunk_name(&self, serial: u32, canonical: &str) -> String;
}

impl<F> ChunkNamer for F
where
    F: Fn(u32, &str) -> String + Send + Sync,
{
    fn chunk_name(&self, serial: u32, canonical: &str) -> String {
        self(serial, canonical)
    }
}

/// `{serial}-{canonical}`, e.g. `2-sitemap.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPrefixNamer;

impl ChunkNamer for SerialPrefixNamer {
    fn chunk_name(&self, serial: u32, canonical: &str) -> String {
        format!("{serial}-{canonical}")
    }
}

/// Names built from a text template with `{n}` and `{name}` placeholders.
///
/// This is how settings files and the command line customize naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNamer {
    template: String,
}

impl TemplateNamer {
    /// Placeholder replaced by the serial number.
    pub const SERIAL: &'static str = "{n}";
    /// Placeholder replaced by the canonical name.
    pub const CANONICAL: &'static str = "{name}";

    /// Build a namer from `template`.
    ///
    /// The template must contain `{n}`, otherwise every chunk would get the
    /// same name.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(Self::SERIAL) {
            return Err(Error::Config(format!(
                "chunk name template \"{template}\" must contain {}",
                Self::SERIAL
            )));
        }
        if template.contains('/') || template.contains('\\') {
            return Err(Error::Config(format!(
                "chunk name template \"{template}\" must not contain path separators"
            )));
        }
        Ok(Self { template })
    }
}

impl ChunkNamer for TemplateNamer {
    fn chunk_name(&self, serial: u32, canonical: &str) -> String {
        self.template
            .replace(Self::SERIAL, &serial.to_string())
            .replace(Self::CANONICAL, canonical)
    }
}

/// Shared handle to a naming strategy, as stored in [`crate::Settings`].
#[derive(Clone)]
pub struct ChunkNaming(Arc<dyn ChunkNamer>);

impl ChunkNaming {
    /// Wrap a strategy.
    pub fn new(namer: impl ChunkNamer + 'static) -> Self {
        Self(Arc::new(namer))
    }

    /// Name for the chunk with `serial`.
    #[must_use]
    pub fn chunk_name(&self, serial: u32, canonical: &str) -> String {
        self.0.chunk_name(serial, canonical)
    }
}

impl Default for ChunkNaming {
    fn default() -> Self {
        Self::new(SerialPrefixNamer)
    }
}

impl fmt::Debug for ChunkNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChunkNaming(..)")
    }
}

/// Something that carries a serial number and can be given a final name.
pub trait Nameable {
    /// 1-based serial assigned when the chunk was finalized.
    fn serial(&self) -> u32;
    /// Final file name, if one was assigned already.
    fn final_name(&self) -> Option<&str>;
    /// Assign the final file name.
    fn set_final_name(&mut self, name: String);
}

/// Assigns final names to the chunks of a pass.
#[derive(Debug, Clone)]
pub struct NamingResolver<'a> {
    canonical: &'a str,
    naming: &'a ChunkNaming,
}

impl<'a> NamingResolver<'a> {
    /// Resolver for `canonical` using `naming` for multi-chunk passes.
    #[must_use]
    pub const fn new(canonical: &'a str, naming: &'a ChunkNaming) -> Self {
        Self { canonical, naming }
    }

    /// Generated name for `serial`.
    #[must_use]
    pub fn generated(&self, serial: u32) -> String {
        self.naming.chunk_name(serial, self.canonical)
    }

    /// Name every chunk of the URL pass.
    ///
    /// A single chunk gets the canonical name; otherwise each chunk gets its
    /// generated name.
    pub fn assign<T: Nameable>(&self, chunks: &mut [T]) {
        if let [only] = chunks {
            only.set_final_name(self.canonical.to_string());
            return;
        }
        for chunk in chunks.iter_mut() {
            let name = self.generated(chunk.serial());
            chunk.set_final_name(name);
        }
    }

    /// Give the last index chunk the canonical name.
    pub fn promote_last<T: Nameable>(&self, chunks: &mut [T]) {
        if let Some(last) = chunks.last_mut() {
            tracing::debug!(
                from = last.final_name().unwrap_or_default(),
                to = self.canonical,
                "promoting final index chunk"
            );
            last.set_final_name(self.canonical.to_string());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named {
        serial: u32,
        name: Option<String>,
    }

    impl Nameable for Named {
        fn serial(&self) -> u32 {
            self.serial
        }
        fn final_name(&self) -> Option<&str> {
            self.name.as_deref()
        }
        fn set_final_name(&mut self, name: String) {
            self.name = Some(name);
        }
    }

    fn chunks(serials: &[u32]) -> Vec<Named> {
        serials
            .iter()
            .map(|&serial| Named { serial, name: None })
            .collect()
    }

    fn names(chunks: &[Named]) -> Vec<&str> {
        chunks.iter().filter_map(Named::final_name).collect()
    }

    #[test]
    fn test_single_chunk_gets_canonical_name() {
        let naming = ChunkNaming::default();
        let resolver = NamingResolver::new("sitemap.xml", &naming);
        let mut single = chunks(&[1]);

        resolver.assign(&mut single);

        assert_eq!(names(&single), vec!["sitemap.xml"]);
    }

    #[test]
    fn test_multiple_chunks_get_serial_names() {
        let naming = ChunkNaming::default();
        let resolver = NamingResolver::new("sitemap.xml", &naming);
        let mut many = chunks(&[1, 2, 3]);

        resolver.assign(&mut many);

        assert_eq!(
            names(&many),
            vec!["1-sitemap.xml", "2-sitemap.xml", "3-sitemap.xml"]
        );
    }

    #[test]
    fn test_promote_last_renames_final_index() {
        let naming = ChunkNaming::default();
        let resolver = NamingResolver::new("sitemap.xml", &naming);
        let mut index = vec![
            Named {
                serial: 4,
                name: Some("4-sitemap.xml".to_string()),
            },
            Named {
                serial: 5,
                name: Some("5-sitemap.xml".to_string()),
            },
        ];

        resolver.promote_last(&mut index);

        assert_eq!(names(&index), vec!["4-sitemap.xml", "sitemap.xml"]);
    }

    #[test]
    fn test_closure_namer() {
        let naming = ChunkNaming::new(|serial: u32, canonical: &str| {
            format!("{canonical}.{serial:03}")
        });
        let resolver = NamingResolver::new("map.xml", &naming);

        assert_eq!(resolver.generated(7), "map.xml.007");
    }

    #[test]
    fn test_template_namer() {
        let namer = TemplateNamer::new("sitemap-{n}.xml").unwrap();

        assert_eq!(namer.chunk_name(2, "sitemap.xml"), "sitemap-2.xml");
        assert_eq!(
            TemplateNamer::new("{name}.{n}")
                .unwrap()
                .chunk_name(1, "sitemap.xml"),
            "sitemap.xml.1"
        );
    }

    #[test]
    fn test_template_without_serial_is_rejected() {
        assert!(matches!(
            TemplateNamer::new("static-{name}"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            TemplateNamer::new("sub/{n}-{name}"),
            Err(Error::Config(_))
        ));
    }
}
