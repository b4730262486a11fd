use uuid::Uuid;

/// Namespace for catalog ids. Fixed, so ids depend only on the relative path:
/// the same tree layout yields the same ids on every run and every machine.
pub static CATALOG_NAMESPACE: std::sync::LazyLock<Uuid> =
    std::sync::LazyLock::new(|| Uuid::new_v5(&Uuid::NAMESPACE_URL, b"urn:vidshelf:catalog"));

/// Derive the stable UUIDv5 for a `/`-separated path relative to the catalog root.
///
/// UUIDv5 is SHA-1 based, so accidental collisions are negligible for any real
/// library. It is not meant to resist an adversary crafting file names.
pub fn entry_id(relative_path: &str) -> Uuid {
    Uuid::new_v5(&CATALOG_NAMESPACE, relative_path.as_bytes())
}
