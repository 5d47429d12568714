use std::cmp::Ordering;
use std::sync::Arc;

use crate::identity::{IdentifierRegistry, MemoryIdentifierRegistry, TokenGenerator, UuidTokenGenerator};
use crate::{FluxError, FluxResult};

/// Marker separating an upload's stem from the chunk index
pub const CHUNK_MARKER: &str = "_chunk_";

/// Naming scheme for uploads and their chunks
pub trait NameProvider: Send + Sync {
    /// Unique, extension-preserving name for a new upload
    fn unique_file_name(&self, file_name: &str) -> String;

    /// Wildcard pattern matching every chunk of `file_name`
    fn file_search_pattern(&self, file_name: &str) -> FluxResult<String>;

    /// Name of chunk `chunk_index` of `file_name`
    fn chunk_file_name(&self, file_name: &str, chunk_index: u64) -> String;

    /// Key shared by every spelling of `file_name` that addresses the same chunks
    fn upload_key(&self, file_name: &str) -> String {
        let (stem, _) = split_file_name(file_name);
        to_snake_case(stem)
    }
}

/// Default naming: `<stem>_<token><ext>` uploads, `<stem>_chunk_<n><ext>` chunks, all snake_cased
pub struct DefaultNameProvider {
    tokens: Arc<dyn TokenGenerator>,
    registry: Arc<dyn IdentifierRegistry>,
}

impl DefaultNameProvider {
    pub fn new() -> Self {
        Self::with_strategies(UuidTokenGenerator, MemoryIdentifierRegistry::new())
    }

    /// Build with a custom token source and collision check
    pub fn with_strategies<T, R>(tokens: T, registry: R) -> Self
    where
        T: TokenGenerator + 'static,
        R: IdentifierRegistry + 'static,
    {
        Self {
            tokens: Arc::new(tokens),
            registry: Arc::new(registry),
        }
    }

    /// Share a registry between several providers
    pub fn with_shared_registry<T: TokenGenerator + 'static>(
        tokens: T,
        registry: Arc<dyn IdentifierRegistry>,
    ) -> Self {
        Self {
            tokens: Arc::new(tokens),
            registry,
        }
    }

    fn reserve_token(&self) -> String {
        loop {
            let token = self.tokens.generate();
            if self.registry.try_reserve(&token) {
                return token;
            }
            tracing::debug!(%token, "upload token already issued, regenerating");
        }
    }
}

impl Default for DefaultNameProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl NameProvider for DefaultNameProvider {
    fn unique_file_name(&self, file_name: &str) -> String {
        let (stem, extension) = split_file_name(file_name);
        let token = self.reserve_token();
        to_snake_case(&format!("{stem}_{token}{extension}"))
    }

    fn file_search_pattern(&self, file_name: &str) -> FluxResult<String> {
        let (stem, extension) = split_file_name(file_name);
        if extension.is_empty() {
            return Err(FluxError::MissingExtension);
        }
        Ok(format!("{}{CHUNK_MARKER}*", to_snake_case(stem)))
    }

    fn chunk_file_name(&self, file_name: &str, chunk_index: u64) -> String {
        let (stem, extension) = split_file_name(file_name);
        format!("{}{CHUNK_MARKER}{chunk_index}{extension}", to_snake_case(stem))
    }
}

/// Lowercase, underscore-separated rendering of arbitrary text.
///
/// Trims, collapses whitespace runs, splits lower→upper ASCII boundaries
/// and replaces whitespace with `_`. Whitespace-only input yields `""`.
pub fn to_snake_case(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(trimmed.len() + 8);
    let mut prev: Option<char> = None;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !prev.is_some_and(char::is_whitespace) {
                out.push('_');
            }
        } else {
            if prev.is_some_and(|p| p.is_ascii_lowercase()) && ch.is_ascii_uppercase() {
                out.push('_');
            }
            out.push(ch);
        }
        prev = Some(ch);
    }
    out.to_lowercase()
}

/// Split a file name into `(stem, extension)`.
///
/// Any directory prefix is dropped. The extension keeps its leading dot and
/// is empty when the name has no dot or ends with one.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => (&base[..idx], &base[idx..]),
        Some(idx) => (&base[..idx], ""),
        None => (base, ""),
    }
}

/// Numeric index embedded in a chunk name or path, if any
pub fn chunk_index(name: &str) -> Option<u64> {
    let base = name.rsplit(['/', '\\']).next()?;
    let (_, tail) = base.rsplit_once(CHUNK_MARKER)?;
    let end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    tail[..end].parse().ok()
}

/// Order chunk names by embedded index; names without one sort last, by name
pub fn order_by_chunk_index<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| {
        let (a, b) = (a.as_ref(), b.as_ref());
        match (chunk_index(a), chunk_index(b)) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    });
}
